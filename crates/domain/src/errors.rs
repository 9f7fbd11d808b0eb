//! Error types used throughout the export pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the activity export
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ExportError {
    /// Fetching activity logs from the data layer failed.
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// A required relationship (recipient, invitation) was absent.
    #[error("Null reference: {0}")]
    NullReference(String),

    /// Writing the export file failed.
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExportError {
    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DataAccess(_) => "data_access",
            Self::NullReference(_) => "null_reference",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
