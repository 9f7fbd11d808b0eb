//! # Activity Export Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The action classifier and per-group projectors
//! - Port interfaces (traits) for data access and file output
//! - The `ExportJob` orchestrator
//!
//! ## Architecture Principles
//! - Only depends on `activity-export-domain`
//! - No database, filesystem, or scheduler code
//! - All external dependencies via traits

pub mod export;

pub use export::classifier::{classify, ProjectionStrategy};
pub use export::ports::{ActivityLogSource, ExportWriter};
pub use export::projector::project;
pub use export::service::{ExportJob, ExportSummary, JobPhase};
