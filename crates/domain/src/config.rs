//! Configuration structures
//!
//! Deserialized from TOML/JSON files or assembled from environment variables
//! by the infrastructure loader. Only `output_path` and `failure_policy` are
//! consumed by the export job itself; the remaining sections configure the
//! adapters around it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CRON_EXPRESSION, DEFAULT_DB_POOL_SIZE, DEFAULT_DELIMITER, DEFAULT_JOB_TIMEOUT_SECS,
    DEFAULT_LOG_LEVEL, QUOTE_CHAR,
};
use crate::impl_domain_status_conversions;
use crate::{ExportError, Result};

/// What the export job does when a single record cannot be projected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole run; no output file is written.
    #[default]
    AbortRun,
    /// Log and skip the offending record, export the rest.
    SkipRecord,
}

impl_domain_status_conversions!(FailurePolicy {
    AbortRun => "abort_run",
    SkipRecord => "skip_record",
});

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Destination of the export file, overwritten on every run.
    pub output_path: String,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub writer: WriterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Restrict the export to activity newer than this many hours.
    #[serde(default)]
    pub lookback_hours: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Six-field cron expression (seconds first).
    #[serde(default = "default_cron_expression")]
    pub cron_expression: String,
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,
}

impl ScheduleConfig {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron_expression: default_cron_expression(),
            job_timeout_secs: default_job_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub include_header: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { delimiter: default_delimiter(), include_header: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

impl ExportConfig {
    /// Check invariants serde cannot express.
    ///
    /// # Errors
    /// Returns `ExportError::Config` describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.output_path.trim().is_empty() {
            return Err(ExportError::Config("output_path must not be empty".into()));
        }
        if self.database.path.trim().is_empty() {
            return Err(ExportError::Config("database.path must not be empty".into()));
        }
        if self.database.pool_size == 0 {
            return Err(ExportError::Config("database.pool_size must be at least 1".into()));
        }
        if self.schedule.job_timeout_secs == 0 {
            return Err(ExportError::Config("schedule.job_timeout_secs must be positive".into()));
        }
        let delimiter = self.writer.delimiter;
        if delimiter == QUOTE_CHAR || delimiter == '\n' || delimiter == '\r' {
            return Err(ExportError::Config(format!(
                "writer.delimiter {delimiter:?} cannot be used as a field separator"
            )));
        }
        Ok(())
    }
}

fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

fn default_cron_expression() -> String {
    DEFAULT_CRON_EXPRESSION.to_string()
}

fn default_job_timeout_secs() -> u64 {
    DEFAULT_JOB_TIMEOUT_SECS
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
