//! Export job orchestrator
//!
//! Drives one export run: fetch pending activity logs, project each one in
//! fetch order, and hand the collection to the writer. [`ExportJob::run`] is
//! the trigger-facing entry point and never returns an error; everything
//! that goes wrong is logged at the run boundary.

use std::path::PathBuf;
use std::sync::Arc;

use activity_export_domain::{
    impl_domain_status_conversions, ActivityLog, ExportRecord, FailurePolicy, Result,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::ports::{ActivityLogSource, ExportWriter};
use super::projector::project;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobPhase {
    #[default]
    Idle,
    Fetching,
    Transforming,
    Writing,
    Failed,
}

impl_domain_status_conversions!(JobPhase {
    Idle => "idle",
    Fetching => "fetching",
    Transforming => "transforming",
    Writing => "writing",
    Failed => "failed",
});

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub fetched: usize,
    pub exported: usize,
    pub skipped: usize,
    pub output_path: PathBuf,
}

/// Orchestrates fetch → classify/project → write.
///
/// Not reentrant: callers must not run the same job concurrently against the
/// same output path. The scheduler enforces this.
pub struct ExportJob {
    source: Arc<dyn ActivityLogSource>,
    writer: Arc<dyn ExportWriter>,
    failure_policy: FailurePolicy,
    phase: Mutex<JobPhase>,
}

impl ExportJob {
    /// Create a job that aborts the run on the first bad record.
    pub fn new(source: Arc<dyn ActivityLogSource>, writer: Arc<dyn ExportWriter>) -> Self {
        Self::with_policy(source, writer, FailurePolicy::default())
    }

    pub fn with_policy(
        source: Arc<dyn ActivityLogSource>,
        writer: Arc<dyn ExportWriter>,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self { source, writer, failure_policy, phase: Mutex::new(JobPhase::Idle) }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn phase(&self) -> JobPhase {
        *self.phase.lock()
    }

    /// Run one export and swallow any failure after logging it.
    ///
    /// A failure at any stage means no output file is written for this run;
    /// the next trigger starts from fresh data.
    pub async fn run(&self, output_path: &str) {
        match self.execute(output_path).await {
            Ok(summary) => {
                info!(
                    output_path = %summary.output_path.display(),
                    fetched = summary.fetched,
                    exported = summary.exported,
                    skipped = summary.skipped,
                    "Activity export completed"
                );
            }
            Err(err) => {
                error!(
                    error = %err,
                    kind = err.label(),
                    output_path,
                    "Exception when generating activity logs file"
                );
            }
        }
    }

    /// Run one export and return the failure instead of logging it.
    ///
    /// The job is back in [`JobPhase::Idle`] when this returns, passing
    /// through [`JobPhase::Failed`] if any stage failed.
    ///
    /// # Errors
    /// - `DataAccess` when fetching fails
    /// - `NullReference` when a record cannot be projected under
    ///   [`FailurePolicy::AbortRun`]
    /// - `Io` when the writer fails
    #[instrument(skip(self), fields(policy = %self.failure_policy))]
    pub async fn execute(&self, output_path: &str) -> Result<ExportSummary> {
        debug!(output_path, "Running activity export");

        let result = self.run_stages(output_path).await;
        if result.is_err() {
            self.set_phase(JobPhase::Failed);
        }
        self.set_phase(JobPhase::Idle);
        result
    }

    async fn run_stages(&self, output_path: &str) -> Result<ExportSummary> {
        self.set_phase(JobPhase::Fetching);
        let logs = self.source.fetch_pending_activity_logs().await?;
        debug!(count = logs.len(), "Retrieved activity logs");

        self.set_phase(JobPhase::Transforming);
        let (records, skipped) = self.transform(&logs)?;
        debug!(count = records.len(), skipped, "Populated export records");

        self.set_phase(JobPhase::Writing);
        let destination = PathBuf::from(output_path);
        self.writer.write(&records, &destination).await?;

        Ok(ExportSummary {
            fetched: logs.len(),
            exported: records.len(),
            skipped,
            output_path: destination,
        })
    }

    /// Project `logs` in order. Returns the records and the number skipped.
    ///
    /// # Errors
    /// Under [`FailurePolicy::AbortRun`], the first projection error.
    pub fn transform(&self, logs: &[ActivityLog]) -> Result<(Vec<ExportRecord>, usize)> {
        let mut records = Vec::with_capacity(logs.len());
        let mut skipped = 0;

        for log in logs {
            match project(log) {
                Ok(record) => records.push(record),
                Err(err) if self.failure_policy == FailurePolicy::SkipRecord => {
                    skipped += 1;
                    warn!(
                        log_id = log.id,
                        action = %log.action,
                        error = %err,
                        "Skipping activity log"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok((records, skipped))
    }

    fn set_phase(&self, next: JobPhase) {
        let mut phase = self.phase.lock();
        if *phase != next {
            debug!(from = %*phase, to = %next, "Export job phase change");
            *phase = next;
        }
    }
}
