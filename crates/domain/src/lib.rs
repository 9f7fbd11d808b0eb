//! # Activity Export Domain
//!
//! Business domain types for the activity-log BI export.
//!
//! This crate contains:
//! - Source entities (`ActivityLog`, `Recipient`, `Invitation`)
//! - The flattened, write-once `ExportRecord`
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
