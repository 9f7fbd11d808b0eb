//! Export job scheduler.
//!
//! Provides a cron-based scheduler that triggers export runs. Join handles are
//! tracked, cancellation is explicit, and every asynchronous operation is
//! wrapped in a timeout. A trigger that fires while the previous run is still
//! in flight is skipped, so runs against the same output path never overlap.
//! A run that outlives the job timeout is reported but left to finish.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use activity_export_infra::observability::JobMetrics;
//! use activity_export_infra::scheduling::{
//!     ExportRunner, ExportScheduler, ExportSchedulerConfig, SchedulerResult,
//! };
//! use async_trait::async_trait;
//!
//! struct NoopRunner;
//!
//! #[async_trait]
//! impl ExportRunner for NoopRunner {
//!     async fn run(&self, _output_path: &str) {}
//! }
//!
//! # async fn example() -> SchedulerResult<()> {
//! let mut scheduler = ExportScheduler::with_config(
//!     ExportSchedulerConfig {
//!         cron_expression: "0 0 2 * * *".into(), // daily at 02:00
//!         output_path: "/var/exports/activity.dat".into(),
//!         ..Default::default()
//!     },
//!     Arc::new(NoopRunner),
//!     Arc::new(JobMetrics::new()),
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use activity_export_core::ExportJob;
use activity_export_domain::constants::{DEFAULT_CRON_EXPRESSION, DEFAULT_JOB_TIMEOUT_SECS};
use activity_export_domain::ExportConfig;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::observability::JobMetrics;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Something the scheduler can trigger with the configured output path.
///
/// Runs report their own failures; the scheduler only sees completion.
#[async_trait]
pub trait ExportRunner: Send + Sync {
    async fn run(&self, output_path: &str);
}

#[async_trait]
impl ExportRunner for ExportJob {
    async fn run(&self, output_path: &str) {
        ExportJob::run(self, output_path).await;
    }
}

/// Configuration for the export scheduler.
#[derive(Debug, Clone)]
pub struct ExportSchedulerConfig {
    /// Cron expression describing the execution schedule.
    pub cron_expression: String,
    /// Destination handed to every run.
    pub output_path: String,
    /// How long a trigger waits on a run before counting it as timed out.
    /// The run itself is not cancelled.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for ExportSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_CRON_EXPRESSION.into(),
            output_path: String::new(),
            job_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl ExportSchedulerConfig {
    /// Take the schedule and destination from the loaded configuration.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            cron_expression: config.schedule.cron_expression.clone(),
            output_path: config.output_path.clone(),
            job_timeout: config.schedule.job_timeout(),
            ..Self::default()
        }
    }
}

/// Export scheduler with explicit lifecycle management.
pub struct ExportScheduler {
    scheduler: Arc<RwLock<Option<JobScheduler>>>,
    config: ExportSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    metrics: Arc<JobMetrics>,
    runner: Arc<dyn ExportRunner>,
    in_flight: Arc<AtomicBool>,
}

impl ExportScheduler {
    pub fn new(
        config: &ExportConfig,
        runner: Arc<dyn ExportRunner>,
        metrics: Arc<JobMetrics>,
    ) -> Self {
        Self::with_config(ExportSchedulerConfig::from_config(config), runner, metrics)
    }

    pub fn with_config(
        config: ExportSchedulerConfig,
        runner: Arc<dyn ExportRunner>,
        metrics: Arc<JobMetrics>,
    ) -> Self {
        Self {
            scheduler: Arc::new(RwLock::new(None)),
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            metrics,
            runner,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn metrics(&self) -> &Arc<JobMetrics> {
        &self.metrics
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?
            .map_err(|source| SchedulerError::StartFailed(source.to_string()))?;

        {
            let mut guard = self.scheduler.write().await;
            *guard = Some(scheduler_instance);
        }

        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel).await;
        });

        self.monitor_handle = Some(handle);
        info!(output_path = %self.config.output_path, "Export scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    ///
    /// A run that is in flight when the scheduler shuts down is not awaited.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let scheduler = {
            let mut guard = self.scheduler.write().await;
            guard.take()
        };

        let Some(mut scheduler) = scheduler else {
            return Err(SchedulerError::NotRunning);
        };

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?
            .map_err(|source| SchedulerError::StopFailed(source.to_string()))?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })??;
        }

        info!(metrics = ?self.metrics.snapshot(), "Export scheduler stopped");
        Ok(())
    }

    /// Returns true when the monitor task is active.
    pub fn is_running(&self) -> bool {
        self.monitor_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Trigger one run immediately, subject to the same overlap guard and
    /// timeout as scheduled runs.
    pub async fn run_now(&self) {
        run_guarded(
            Arc::clone(&self.runner),
            self.config.output_path.clone(),
            self.config.job_timeout,
            Arc::clone(&self.in_flight),
            Arc::clone(&self.metrics),
        )
        .await;
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed(source.to_string()))?;

        let cron_expr = self.config.cron_expression.clone();
        let runner = Arc::clone(&self.runner);
        let metrics = Arc::clone(&self.metrics);
        let in_flight = Arc::clone(&self.in_flight);
        let output_path = self.config.output_path.clone();
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_async(cron_expr.as_str(), move |_id, _lock| {
            let runner = Arc::clone(&runner);
            let metrics = Arc::clone(&metrics);
            let in_flight = Arc::clone(&in_flight);
            let output_path = output_path.clone();

            Box::pin(async move {
                run_guarded(runner, output_path, job_timeout, in_flight, metrics).await;
            })
        })
        .map_err(|source| SchedulerError::InvalidCron {
            expression: cron_expr.clone(),
            reason: source.to_string(),
        })?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed(source.to_string()))?;

        debug!(cron = %cron_expr, job_id = %job_id, "Registered export job");
        Ok(scheduler)
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("Export scheduler monitor cancelled");
    }
}

/// Clears the in-flight flag when the run task finishes or unwinds.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: Arc<AtomicBool>) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn run_guarded(
    runner: Arc<dyn ExportRunner>,
    output_path: String,
    job_timeout: Duration,
    in_flight: Arc<AtomicBool>,
    metrics: Arc<JobMetrics>,
) {
    let Some(guard) = InFlightGuard::acquire(in_flight) else {
        metrics.record_skipped_overlap();
        warn!(output_path = %output_path, "Previous export still running; skipping trigger");
        return;
    };

    metrics.record_run_started();
    let started = Instant::now();

    // The run owns the guard, so a timed-out run keeps later triggers out
    // until it has really finished.
    let path = output_path.clone();
    let mut handle = tokio::spawn(async move {
        runner.run(&path).await;
        drop(guard);
    });

    match tokio::time::timeout(job_timeout, &mut handle).await {
        Ok(Ok(())) => {
            metrics.record_run_completed(started.elapsed());
            debug!(elapsed_ms = started.elapsed().as_millis(), "Export run finished");
        }
        Ok(Err(err)) => {
            let err = SchedulerError::from(err);
            error!(error = %err, output_path = %output_path, "Export run aborted");
        }
        Err(_) => {
            metrics.record_timeout();
            warn!(
                timeout_secs = job_timeout.as_secs(),
                output_path = %output_path,
                "Export run exceeded its timeout; later triggers are skipped until it finishes"
            );
        }
    }
}

impl Drop for ExportScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ExportScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    struct CountingRunner {
        runs: AtomicUsize,
        delay: Duration,
    }

    impl CountingRunner {
        fn new(delay: Duration) -> Self {
            Self { runs: AtomicUsize::new(0), delay }
        }

        fn run_count(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExportRunner for CountingRunner {
        async fn run(&self, output_path: &str) {
            assert_eq!(output_path, "/tmp/activity.dat");
            self.runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
        }
    }

    fn fast_config() -> ExportSchedulerConfig {
        ExportSchedulerConfig {
            cron_expression: "*/1 * * * * *".into(), // every second
            output_path: "/tmp/activity.dat".into(),
            job_timeout: Duration::from_secs(2),
            start_timeout: Duration::from_secs(2),
            stop_timeout: Duration::from_secs(2),
            join_timeout: Duration::from_secs(2),
        }
    }

    fn scheduler_with(
        runner: Arc<CountingRunner>,
        config: ExportSchedulerConfig,
    ) -> ExportScheduler {
        ExportScheduler::with_config(config, runner, Arc::new(JobMetrics::new()))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lifecycle_runs_successfully() {
        let runner = Arc::new(CountingRunner::new(Duration::ZERO));
        let mut scheduler = scheduler_with(runner.clone(), fast_config());

        scheduler.start().await.expect("start succeeds");
        tokio::time::sleep(Duration::from_secs(2)).await;
        scheduler.stop().await.expect("stop succeeds");

        assert!(runner.run_count() >= 1);
        assert!(scheduler.metrics().runs_completed() >= 1);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn double_start_is_rejected() {
        let runner = Arc::new(CountingRunner::new(Duration::ZERO));
        let mut scheduler = scheduler_with(runner, fast_config());

        scheduler.start().await.expect("first start");
        let err = scheduler.start().await.expect_err("second start fails");
        assert!(matches!(err, SchedulerError::AlreadyRunning));
        scheduler.stop().await.expect("stop succeeds");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn restart_after_stop_succeeds() {
        let runner = Arc::new(CountingRunner::new(Duration::ZERO));
        let mut scheduler = scheduler_with(runner, fast_config());

        scheduler.start().await.expect("start succeeds");
        scheduler.stop().await.expect("stop succeeds");
        assert!(!scheduler.is_running());

        scheduler.start().await.expect("start again");
        scheduler.stop().await.expect("stop again");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_without_start_is_rejected() {
        let runner = Arc::new(CountingRunner::new(Duration::ZERO));
        let mut scheduler = scheduler_with(runner, fast_config());

        let err = scheduler.stop().await.expect_err("stop fails");
        assert!(matches!(err, SchedulerError::NotRunning));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_cron_is_rejected_on_start() {
        let runner = Arc::new(CountingRunner::new(Duration::ZERO));
        let config =
            ExportSchedulerConfig { cron_expression: "whenever".into(), ..fast_config() };
        let mut scheduler = scheduler_with(runner, config);

        let err = scheduler.start().await.expect_err("start fails");
        assert!(matches!(err, SchedulerError::InvalidCron { .. }));
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn overlapping_trigger_is_skipped() {
        let runner = Arc::new(CountingRunner::new(Duration::from_millis(300)));
        let scheduler = scheduler_with(runner.clone(), fast_config());

        tokio::join!(scheduler.run_now(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            scheduler.run_now().await;
        });

        assert_eq!(runner.run_count(), 1);
        assert_eq!(scheduler.metrics().skipped_overlaps(), 1);
        assert_eq!(scheduler.metrics().runs_completed(), 1);

        // The guard is released once the first run completes.
        scheduler.run_now().await;
        assert_eq!(runner.run_count(), 2);
    }

    /// Blocks a worker thread the way a stalled file write does.
    struct StalledRunner {
        runs: AtomicUsize,
        stall: Duration,
    }

    #[async_trait]
    impl ExportRunner for StalledRunner {
        async fn run(&self, _output_path: &str) {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let stall = self.stall;
            tokio::task::spawn_blocking(move || std::thread::sleep(stall)).await.unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn timed_out_run_keeps_later_triggers_out_until_it_finishes() {
        let runner = Arc::new(StalledRunner {
            runs: AtomicUsize::new(0),
            stall: Duration::from_millis(600),
        });
        let config =
            ExportSchedulerConfig { job_timeout: Duration::from_millis(100), ..fast_config() };
        let scheduler =
            ExportScheduler::with_config(config, runner.clone(), Arc::new(JobMetrics::new()));

        scheduler.run_now().await;
        assert_eq!(scheduler.metrics().timeouts(), 1);

        scheduler.run_now().await;
        assert_eq!(scheduler.metrics().skipped_overlaps(), 1);
        assert_eq!(runner.runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(900)).await;
        scheduler.run_now().await;
        assert_eq!(runner.runs.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.metrics().runs_started(), 2);
        assert_eq!(scheduler.metrics().skipped_overlaps(), 1);
    }

    #[test]
    fn config_is_derived_from_export_config() {
        let export: ExportConfig = toml::from_str(
            r#"
output_path = "/var/exports/activity.dat"

[database]
path = "/var/lib/activity.db"

[schedule]
cron_expression = "0 30 1 * * *"
job_timeout_secs = 45
"#,
        )
        .unwrap();

        let config = ExportSchedulerConfig::from_config(&export);
        assert_eq!(config.cron_expression, "0 30 1 * * *");
        assert_eq!(config.output_path, "/var/exports/activity.dat");
        assert_eq!(config.job_timeout, Duration::from_secs(45));
        assert_eq!(config.stop_timeout, Duration::from_secs(5));
    }
}
