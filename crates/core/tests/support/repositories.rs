//! Mock port implementations for testing
//!
//! Deterministic, in-memory stand-ins for the data-access and writer ports.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use activity_export_core::{ActivityLogSource, ExportWriter};
use activity_export_domain::{ActivityLog, ExportError, ExportRecord, Result as DomainResult};
use async_trait::async_trait;

/// In-memory mock for `ActivityLogSource`.
///
/// Returns the seeded logs on every fetch, or the seeded error.
#[derive(Clone)]
pub struct MockActivityLogSource {
    outcome: Arc<std::result::Result<Vec<ActivityLog>, ExportError>>,
    fetches: Arc<AtomicUsize>,
}

impl MockActivityLogSource {
    pub fn new(logs: Vec<ActivityLog>) -> Self {
        Self { outcome: Arc::new(Ok(logs)), fetches: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn failing(error: ExportError) -> Self {
        Self { outcome: Arc::new(Err(error)), fetches: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivityLogSource for MockActivityLogSource {
    async fn fetch_pending_activity_logs(&self) -> DomainResult<Vec<ActivityLog>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        (*self.outcome).clone()
    }
}

/// A single captured `write` call.
#[derive(Debug, Clone)]
pub struct WriteCall {
    pub records: Vec<ExportRecord>,
    pub destination: PathBuf,
}

/// Records every `write` call; optionally fails them all.
#[derive(Default, Clone)]
pub struct RecordingExportWriter {
    calls: Arc<Mutex<Vec<WriteCall>>>,
    failure: Option<ExportError>,
}

impl RecordingExportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: ExportError) -> Self {
        Self { failure: Some(error), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<WriteCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExportWriter for RecordingExportWriter {
    async fn write(&self, records: &[ExportRecord], destination: &Path) -> DomainResult<()> {
        self.calls.lock().unwrap().push(WriteCall {
            records: records.to_vec(),
            destination: destination.to_path_buf(),
        });
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
