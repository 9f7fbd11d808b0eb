//! Activity-log export pipeline
//!
//! fetch → classify → project → write. The classifier and projectors are
//! pure; [`service::ExportJob`] drives them against the ports in [`ports`].

pub mod classifier;
pub mod ports;
pub mod projector;
pub mod service;

pub use classifier::{classify, ProjectionStrategy};
pub use ports::{ActivityLogSource, ExportWriter};
pub use service::{ExportJob, ExportSummary, JobPhase};

#[cfg(test)]
pub(crate) mod fixtures;
