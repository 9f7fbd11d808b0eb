//! Action classifier
//!
//! Maps every [`ActionKind`] to exactly one [`ProjectionStrategy`]. The match
//! is exhaustive, so each activity log yields exactly one export record.

use activity_export_domain::{ActionKind, ActivityLog, ExportRecord, Result};

use super::projector;

/// Which projector shapes the export record for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionStrategy {
    Request,
    LinkReject,
    Expiry,
    Other,
}

impl ProjectionStrategy {
    /// Stable label for log fields.
    pub fn name(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::LinkReject => "link_reject",
            Self::Expiry => "expiry",
            Self::Other => "other",
        }
    }

    /// Project `log` with the projector this strategy stands for.
    ///
    /// # Errors
    /// Returns `ExportError::NullReference` when a relationship the
    /// projector needs is absent.
    pub fn project(self, log: &ActivityLog) -> Result<ExportRecord> {
        match self {
            Self::Request => projector::project_request(log),
            Self::LinkReject => projector::project_link_reject(log),
            Self::Expiry => projector::project_expiry(log),
            Self::Other => projector::project_other(log),
        }
    }
}

/// Pick the projection strategy for an action kind.
pub fn classify(action: &ActionKind) -> ProjectionStrategy {
    match action {
        ActionKind::Request => ProjectionStrategy::Request,
        ActionKind::Link | ActionKind::Reject => ProjectionStrategy::LinkReject,
        ActionKind::Expire => ProjectionStrategy::Expiry,
        ActionKind::Other(_) => ProjectionStrategy::Other,
    }
}
