//! Scheduling infrastructure for automated export runs
//!
//! The export scheduler follows the runtime rules used across this crate:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations
//! - Structured tracing with `JobMetrics` integration

pub mod error;
pub mod export_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use export_scheduler::{ExportRunner, ExportScheduler, ExportSchedulerConfig};
