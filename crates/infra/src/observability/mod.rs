//! Observability infrastructure for logging and scheduler metrics
//!
//! - [`logging`]: one-time `tracing-subscriber` setup for the binary
//! - [`metrics`]: in-process counters and duration samples for export runs
//!
//! Metrics locks recover from poisoning instead of panicking; a poisoned
//! ring buffer is still a valid ring buffer.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{JobMetrics, JobMetricsSnapshot};
