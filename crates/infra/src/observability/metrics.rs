//! Export run metrics
//!
//! Counters for scheduler-driven runs plus a ring buffer of recent run
//! durations for percentile reporting.
//!
//! ## Design
//! - **VecDeque ring buffer** for O(1) eviction
//! - **Poison-safe locking** with explicit match pattern (no .expect())
//! - **Relaxed atomics**: every counter is independent

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Number of run durations kept for percentile calculations.
pub const DURATION_SAMPLE_CAPACITY: usize = 256;

/// Metrics for scheduler-driven export runs
#[derive(Debug)]
pub struct JobMetrics {
    /// Triggers that started a run
    runs_started: AtomicU64,
    /// Runs that returned before the job timeout
    runs_completed: AtomicU64,
    /// Runs cancelled by the job timeout
    timeouts: AtomicU64,
    /// Triggers skipped because the previous run was still in flight
    skipped_overlaps: AtomicU64,
    /// Durations of completed runs in milliseconds (ring buffer)
    durations_ms: Mutex<VecDeque<u64>>,
}

/// Point-in-time copy of [`JobMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobMetricsSnapshot {
    pub runs_started: u64,
    pub runs_completed: u64,
    pub timeouts: u64,
    pub skipped_overlaps: u64,
    pub last_duration_ms: Option<u64>,
    pub p95_duration_ms: Option<u64>,
}

impl Default for JobMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl JobMetrics {
    pub fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_completed: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            skipped_overlaps: AtomicU64::new(0),
            durations_ms: Mutex::new(VecDeque::with_capacity(DURATION_SAMPLE_CAPACITY)),
        }
    }

    pub fn record_run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a run that finished within the timeout.
    pub fn record_run_completed(&self, duration: Duration) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);

        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let mut samples = self.lock_durations("record_run_completed");
        samples.push_back(ms);
        if samples.len() > DURATION_SAMPLE_CAPACITY {
            samples.pop_front();
        }
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_overlap(&self) {
        self.skipped_overlaps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Relaxed)
    }

    pub fn runs_completed(&self) -> u64 {
        self.runs_completed.load(Ordering::Relaxed)
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    pub fn skipped_overlaps(&self) -> u64 {
        self.skipped_overlaps.load(Ordering::Relaxed)
    }

    /// Duration of the most recent completed run.
    pub fn last_duration(&self) -> Option<Duration> {
        self.lock_durations("last_duration").back().copied().map(Duration::from_millis)
    }

    /// Nearest-rank percentile over the retained samples, `None` when empty.
    pub fn duration_percentile(&self, percentile: f64) -> Option<Duration> {
        let mut sorted: Vec<u64> =
            self.lock_durations("duration_percentile").iter().copied().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_unstable();

        let clamped = percentile.clamp(0.0, 100.0);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let rank = (clamped * sorted.len() as f64 / 100.0).ceil() as usize;
        let index = rank.saturating_sub(1).min(sorted.len() - 1);
        Some(Duration::from_millis(sorted[index]))
    }

    pub fn snapshot(&self) -> JobMetricsSnapshot {
        let as_ms = |d: Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        JobMetricsSnapshot {
            runs_started: self.runs_started(),
            runs_completed: self.runs_completed(),
            timeouts: self.timeouts(),
            skipped_overlaps: self.skipped_overlaps(),
            last_duration_ms: self.last_duration().map(as_ms),
            p95_duration_ms: self.duration_percentile(95.0).map(as_ms),
        }
    }

    fn lock_durations(&self, operation: &'static str) -> std::sync::MutexGuard<'_, VecDeque<u64>> {
        match self.durations_ms.lock() {
            Ok(guard) => guard,
            Err(poison_err) => {
                tracing::warn!(
                    metric = "JobMetrics::durations_ms",
                    operation,
                    "Mutex poisoned, recovering data"
                );
                poison_err.into_inner()
            }
        }
    }
}
