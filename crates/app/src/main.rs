//! `activity-export` binary
//!
//! Wires the SQLite source, the delimited file writer and the export job,
//! then either runs once or hands the job to the cron scheduler until
//! Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use activity_export_core::ExportJob;
use activity_export_domain::ExportConfig;
use activity_export_infra::observability::{init_logging, JobMetrics};
use activity_export_infra::{
    config, DbManager, DelimitedFileWriter, ExportScheduler, SqliteActivityLogRepository,
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "activity-export")]
#[command(about = "Export accumulated activity logs to a delimited file for BI", long_about = None)]
struct Cli {
    /// Configuration file (TOML or JSON). Without it, the environment is
    /// used first and standard locations are probed.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run a single export and exit
    #[arg(long)]
    once: bool,

    /// Override the configured output path
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dotenv = dotenvy::dotenv();

    let mut config = match cli.config {
        Some(path) => config::load_from_file(Some(path)),
        None => config::load(),
    }
    .context("failed to load configuration")?;

    if let Some(output) = cli.output {
        config.output_path = output;
        config.validate().context("invalid output path")?;
    }

    init_logging(&config.logging).context("failed to initialise logging")?;

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let job = Arc::new(build_job(&config)?);

    if cli.once {
        info!(output_path = %config.output_path, "Running single export");
        job.run(&config.output_path).await;
        return Ok(());
    }

    let metrics = Arc::new(JobMetrics::new());
    let mut scheduler = ExportScheduler::new(&config, job, metrics);
    scheduler.start().await.context("failed to start export scheduler")?;

    info!(
        cron = %config.schedule.cron_expression,
        output_path = %config.output_path,
        "Waiting for export triggers; press Ctrl-C to stop"
    );

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
    }

    info!("Shutdown requested");
    scheduler.stop().await.context("failed to stop export scheduler")?;
    Ok(())
}

fn build_job(config: &ExportConfig) -> Result<ExportJob> {
    let db = DbManager::new(&config.database.path, config.database.pool_size)
        .context("failed to open activity database")?;
    db.run_migrations().context("failed to prepare activity database schema")?;
    db.health_check().context("activity database is not responding")?;
    info!(db_path = %db.path().display(), "Activity database ready");
    let db = Arc::new(db);

    let mut source = SqliteActivityLogRepository::new(db);
    if let Some(hours) = config.database.lookback_hours {
        let window = i64::try_from(hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .context("database.lookback_hours is too large")?;
        source = source.with_lookback(window);
    }

    let writer = DelimitedFileWriter::new(&config.writer);

    Ok(ExportJob::with_policy(Arc::new(source), Arc::new(writer), config.failure_policy))
}
