//! Port interfaces for the export pipeline

use std::path::Path;

use activity_export_domain::{ActivityLog, ExportRecord, Result};
use async_trait::async_trait;

/// Trait for retrieving activity logs awaiting export
#[async_trait]
pub trait ActivityLogSource: Send + Sync {
    /// Fetch every pending activity log, in the order they should be
    /// exported.
    ///
    /// # Errors
    /// Returns `ExportError::DataAccess` when the data layer fails.
    async fn fetch_pending_activity_logs(&self) -> Result<Vec<ActivityLog>>;
}

/// Trait for serializing export records to their destination
#[async_trait]
pub trait ExportWriter: Send + Sync {
    /// Replace the content at `destination` with `records`, in order.
    ///
    /// Implementations must not leave a mix of old and new content behind
    /// when they fail.
    ///
    /// # Errors
    /// Returns `ExportError::Io` on any filesystem failure.
    async fn write(&self, records: &[ExportRecord], destination: &Path) -> Result<()>;
}
