//! Database implementations

pub mod activity_log_repository;
pub mod manager;

pub use activity_log_repository::*;
pub use manager::*;
