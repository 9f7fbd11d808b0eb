//! Domain types and models
//!
//! - [`activity`]: the read-only source entities fetched from the data layer
//! - [`export`]: the flattened record written to the BI file

pub mod activity;
pub mod export;

pub use activity::{ActionKind, ActivityLog, Invitation, Recipient};
pub use export::{ExportRecord, ExportRecordBuilder};
