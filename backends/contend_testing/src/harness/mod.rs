//! Shared-counter correctness harness.
//!
//! A run goes `Idle → Running → Done`. While `Running`, the harness submits
//! one job per worker to a [`WorkerPool`] it borrows; each job calls
//! [`Counter::increment_with`] a fixed number of times. The run reaches
//! `Done` only after every job has reported back, and only then is the final
//! value read.
//!
//! A worker that panics or gets interrupted is recorded as a
//! [`WorkerFailure`]; its siblings keep going and the failures come back in
//! the [`CounterReport`]. Nothing is retried.

use core::time::Duration;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Instant;

use contend_sync::WaitError;
use derive_more::From;

use crate::counter::{Counter, Strategy};
use crate::pool::{PoolError, WorkerPool};

pub mod config;

pub use config::HarnessConfig;

pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum HarnessError {
    ZeroWorkers,
    ZeroIncrements,
    #[from]
    Pool(PoolError),
}

impl core::error::Error for HarnessError {}

impl core::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HarnessError::ZeroWorkers => write!(f, "worker count must be greater than zero"),
            HarnessError::ZeroIncrements => {
                write!(f, "increments per worker must be greater than zero")
            }
            HarnessError::Pool(err) => write!(f, "worker pool error: {err}"),
        }
    }
}

/// Where a harness is in its current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    Idle,
    Running,
    Done,
}

/// Why a worker stopped before finishing its increments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Panicked(String),
    Interrupted(WaitError),
}

impl core::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FailureReason::Panicked(message) => write!(f, "panicked: {message}"),
            FailureReason::Interrupted(error) => write!(f, "interrupted: {error}"),
        }
    }
}

/// A worker that did not complete, captured after join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    pub worker: usize,
    /// Increments this worker finished before stopping.
    pub completed: usize,
    pub reason: FailureReason,
}

/// Outcome of one run, available once every worker has been joined.
#[derive(Debug, Clone)]
pub struct CounterReport {
    pub strategy: Strategy,
    pub workers: usize,
    pub increments_per_worker: usize,
    pub final_value: u64,
    pub elapsed: Duration,
    /// Wall time of each worker, indexed by worker id.
    pub worker_times: Vec<Duration>,
    pub failures: Vec<WorkerFailure>,
}

impl CounterReport {
    /// `workers × increments_per_worker`.
    #[must_use]
    pub fn expected(&self) -> u64 {
        (self.workers as u64) * (self.increments_per_worker as u64)
    }

    /// The final value matches the expected count and no worker failed.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.failures.is_empty() && self.final_value == self.expected()
    }

    /// Increments that went missing, counting only those workers that ran.
    #[must_use]
    pub fn lost_updates(&self) -> u64 {
        let attempted: u64 = self.attempted();
        attempted.saturating_sub(self.final_value)
    }

    /// Increments the workers actually performed.
    #[must_use]
    pub fn attempted(&self) -> u64 {
        let short: u64 = self
            .failures
            .iter()
            .map(|failure| (self.increments_per_worker - failure.completed) as u64)
            .sum();
        self.expected() - short
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Increments per second over the whole run.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.attempted() as f64 / secs
        }
    }
}

/// Message a worker job sends back when it ends.
struct WorkerOutcome {
    worker: usize,
    elapsed: Duration,
    failure: Option<WorkerFailure>,
}

/// Drives counter runs on a borrowed [`WorkerPool`].
///
/// # Examples
///
/// ```
/// use contend_testing::{CounterHarness, Strategy, WorkerPool};
///
/// let pool = WorkerPool::new(4).unwrap();
/// let harness = CounterHarness::new(&pool);
///
/// let report = harness.run(Strategy::Atomic, 4, 1_000).unwrap();
/// assert_eq!(report.final_value, 4_000);
/// assert!(report.is_correct());
/// ```
pub struct CounterHarness<'p> {
    pool: &'p WorkerPool,
    phase: Mutex<RunPhase>,
}

impl<'p> CounterHarness<'p> {
    #[must_use]
    pub fn new(pool: &'p WorkerPool) -> Self {
        Self {
            pool,
            phase: Mutex::new(RunPhase::Idle),
        }
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        match self.phase.lock() {
            Ok(g) => *g,
            Err(e) => *e.into_inner(),
        }
    }

    fn enter(&self, phase: RunPhase) {
        let mut guard = match self.phase.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        tracing::debug!("counter harness: {:?} -> {:?}", *guard, phase);
        *guard = phase;
    }

    /// Runs `workers` workers of `increments_per_worker` increments each.
    ///
    /// # Errors
    ///
    /// Configuration errors for zero counts, [`HarnessError::Pool`] when the
    /// pool refuses jobs. Worker failures are not errors, they are in the
    /// report.
    pub fn run(
        &self,
        strategy: Strategy,
        workers: usize,
        increments_per_worker: usize,
    ) -> HarnessResult<CounterReport> {
        let config = HarnessConfig::new()
            .workers(workers)
            .increments(increments_per_worker);
        self.run_with(&config, strategy, |_, _| {})
    }

    /// Runs with a full configuration and a hook called before every
    /// increment with `(worker, iteration)`.
    ///
    /// The hook is where tests inject delays or panics.
    ///
    /// # Errors
    ///
    /// Same as [`CounterHarness::run`].
    pub fn run_with<H>(
        &self,
        config: &HarnessConfig,
        strategy: Strategy,
        hook: H,
    ) -> HarnessResult<CounterReport>
    where
        H: Fn(usize, usize) + Send + Sync + 'static,
    {
        config.validate()?;

        let workers = config.get_workers();
        let increments = config.get_increments();
        let counter = Arc::new(Counter::new(strategy));
        let hook = Arc::new(hook);
        let wait = config.start_wait();
        let (sender, receiver) = mpsc::channel::<WorkerOutcome>();

        self.enter(RunPhase::Running);
        let start = Instant::now();

        let mut submitted = 0;
        let mut refused = None;
        for worker in 0..workers {
            let counter = Arc::clone(&counter);
            let hook = Arc::clone(&hook);
            let sender = sender.clone();
            let wait = wait.clone();

            let job = move || {
                let started = Instant::now();
                let mut completed = 0;
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    for iteration in 0..increments {
                        // Stop between increments too, not only while blocked.
                        wait.check()?;
                        (*hook)(worker, iteration);
                        counter.increment_with(&wait)?;
                        completed += 1;
                    }
                    Ok::<(), WaitError>(())
                }));

                let reason = match outcome {
                    Ok(Ok(())) => None,
                    Ok(Err(error)) => Some(FailureReason::Interrupted(error)),
                    Err(payload) => Some(FailureReason::Panicked(panic_message(payload.as_ref()))),
                };

                // The receiver only goes away once the harness stopped listening.
                let _ = sender.send(WorkerOutcome {
                    worker,
                    elapsed: started.elapsed(),
                    failure: reason.map(|reason| WorkerFailure {
                        worker,
                        completed,
                        reason,
                    }),
                });
            };

            match self.pool.execute(job) {
                Ok(()) => submitted += 1,
                Err(err) => {
                    refused = Some(err);
                    break;
                }
            }
        }
        drop(sender);

        // Join-all: every submitted job reports exactly once.
        let mut worker_times = vec![Duration::ZERO; workers];
        let mut failures = Vec::new();
        for _ in 0..submitted {
            let Ok(outcome) = receiver.recv() else {
                break;
            };
            worker_times[outcome.worker] = outcome.elapsed;
            if let Some(failure) = outcome.failure {
                tracing::warn!(
                    "{strategy} worker {} failed after {} increments: {}",
                    failure.worker,
                    failure.completed,
                    failure.reason
                );
                failures.push(failure);
            }
        }
        let elapsed = start.elapsed();
        self.enter(RunPhase::Done);

        if let Some(err) = refused {
            return Err(err.into());
        }

        failures.sort_by_key(|failure| failure.worker);
        let report = CounterReport {
            strategy,
            workers,
            increments_per_worker: increments,
            final_value: counter.value(),
            elapsed,
            worker_times,
            failures,
        };

        tracing::info!(
            "{strategy}: final count {} (expected {}) in {:?}",
            report.final_value,
            report.expected(),
            report.elapsed
        );
        Ok(report)
    }

    /// Runs each strategy in turn with the same configuration.
    ///
    /// # Errors
    ///
    /// Stops at the first run that returns an error.
    pub fn compare(
        &self,
        config: &HarnessConfig,
        strategies: &[Strategy],
    ) -> HarnessResult<Vec<CounterReport>> {
        strategies
            .iter()
            .map(|strategy| self.run_with(config, *strategy, |_, _| {}))
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}
