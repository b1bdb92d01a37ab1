//! Timing metrics derived from counter runs.

pub mod reporter;

pub use reporter::{ComparisonReport, ComparisonRow};

use core::time::Duration;

use crate::harness::CounterReport;

/// Timing figures for one run.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    /// Per-worker wall time (in nanoseconds)
    pub worker_nanos: Vec<u64>,
    /// Increments per second over the whole run
    pub throughput: f64,
    /// Increments actually performed
    pub operations: u64,
    /// Total duration
    pub duration: Duration,
}

impl RunMetrics {
    #[must_use]
    pub const fn new(operations: u64, duration: Duration) -> Self {
        Self {
            worker_nanos: Vec::new(),
            throughput: 0.0,
            operations,
            duration,
        }
    }

    /// Collects the metrics of a finished run.
    #[must_use]
    pub fn from_report(report: &CounterReport) -> Self {
        let worker_nanos = report
            .worker_times
            .iter()
            .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
            .collect();

        Self::new(report.attempted(), report.elapsed)
            .with_throughput()
            .with_worker_nanos(worker_nanos)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn with_throughput(mut self) -> Self {
        let secs = self.duration.as_secs_f64();
        self.throughput = if secs > 0.0 {
            self.operations as f64 / secs
        } else {
            0.0
        };
        self
    }

    #[must_use]
    pub fn with_worker_nanos(mut self, worker_nanos: Vec<u64>) -> Self {
        self.worker_nanos = worker_nanos;
        self
    }

    #[must_use]
    pub fn fastest_worker(&self) -> Option<u64> {
        self.worker_nanos.iter().min().copied()
    }

    #[must_use]
    pub fn slowest_worker(&self) -> Option<u64> {
        self.worker_nanos.iter().max().copied()
    }

    /// Average worker time in nanoseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_worker(&self) -> Option<f64> {
        if self.worker_nanos.is_empty() {
            None
        } else {
            let sum: u64 = self.worker_nanos.iter().sum();
            Some(sum as f64 / self.worker_nanos.len() as f64)
        }
    }

    /// Slowest over fastest worker; 1.0 means perfectly even.
    ///
    /// Blocking strategies tend to spread wider than `Atomic`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn spread(&self) -> Option<f64> {
        match (self.fastest_worker(), self.slowest_worker()) {
            (Some(0), Some(_)) | (None, _) | (_, None) => None,
            (Some(fastest), Some(slowest)) => Some(slowest as f64 / fastest as f64),
        }
    }
}
