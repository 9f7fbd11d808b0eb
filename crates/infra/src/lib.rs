//! # Activity Export Infrastructure
//!
//! Infrastructure implementations of the core export ports.
//!
//! This crate contains:
//! - SQLite data access for pending activity logs
//! - The atomic delimited-file export writer
//! - Configuration loading (environment, TOML, JSON)
//! - The cron scheduler that triggers export runs
//! - Logging setup and scheduler metrics
//!
//! ## Architecture
//! - Implements traits defined in `activity-export-core`
//! - Contains all "impure" code (database, filesystem, timers)

pub mod config;
pub mod database;
pub mod errors;
pub mod export;
pub mod observability;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, SqliteActivityLogRepository};
pub use errors::InfraError;
pub use export::DelimitedFileWriter;
pub use scheduling::{ExportRunner, ExportScheduler, ExportSchedulerConfig};
