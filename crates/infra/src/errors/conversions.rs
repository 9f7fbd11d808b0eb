//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use activity_export_domain::ExportError;
use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ExportError);

impl From<InfraError> for ExportError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ExportError> for InfraError {
    fn from(value: ExportError) -> Self {
        InfraError(value)
    }
}

trait IntoExportError {
    fn into_export_error(self) -> ExportError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → ExportError */
/* -------------------------------------------------------------------------- */

impl IntoExportError for SqlError {
    fn into_export_error(self) -> ExportError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => ExportError::DataAccess("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        ExportError::DataAccess("database is locked".into())
                    }
                    ErrorCode::CannotOpen => {
                        ExportError::DataAccess(format!("unable to open database: {message}"))
                    }
                    _ => ExportError::DataAccess(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => ExportError::DataAccess("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                ExportError::DataAccess(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                ExportError::DataAccess(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => ExportError::DataAccess(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => ExportError::DataAccess(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_export_error())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → ExportError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(ExportError::DataAccess(format!("connection pool: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ExportError */
/* -------------------------------------------------------------------------- */

impl IntoExportError for IoError {
    fn into_export_error(self) -> ExportError {
        let reason = match self.kind() {
            ErrorKind::NotFound => "path not found",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::WriteZero => "write returned zero bytes",
            _ => return ExportError::Io(self.to_string()),
        };
        ExportError::Io(format!("{reason}: {self}"))
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_export_error())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → ExportError */
/* -------------------------------------------------------------------------- */

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(ExportError::Internal(format!("blocking task failed: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
