//! Race-condition harness and scenarios built on `contend_sync`.
//!
//! This crate provides:
//! - **Counter strategies**: one shared counter per synchronization strategy,
//!   from deliberately unsynchronized to semaphore-guarded, see [`counter`]
//! - **Worker pool**: an explicitly owned fixed-size pool, see [`pool`]
//! - **Counter harness**: runs strategies on the pool and reports final
//!   counts, lost updates and worker failures, see [`harness`]
//! - **Metrics**: per-run timing and side-by-side comparison tables
//! - **Scenarios**: paced producer/consumer and many-to-many buffer runs
//!
//! # Examples
//!
//! ```rust
//! use contend_testing::{ComparisonReport, CounterHarness, HarnessConfig, Strategy, WorkerPool};
//!
//! let pool = WorkerPool::new(2).unwrap();
//! let harness = CounterHarness::new(&pool);
//! let config = HarnessConfig::new().workers(2).increments(1_000);
//!
//! let reports = harness.compare(&config, &Strategy::SYNCHRONIZED).unwrap();
//! assert!(reports.iter().all(|report| report.final_value == 2_000));
//!
//! let table = ComparisonReport::new("2 workers x 1000", &reports);
//! assert_eq!(table.incorrect().count(), 0);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod counter;
pub mod harness;
pub mod metrics;
pub mod pool;
pub mod scenarios;

// Re-export commonly used items
pub use counter::{Counter, Strategy};
pub use harness::{
    CounterHarness, CounterReport, FailureReason, HarnessConfig, HarnessError, HarnessResult,
    RunPhase, WorkerFailure,
};
pub use metrics::{ComparisonReport, ComparisonRow, RunMetrics};
pub use pool::{PoolError, PoolResult, WorkerPool};
pub use scenarios::{
    run_many_to_many, run_producer_consumer, ManyToManyConfig, ScenarioConfig, ScenarioOutcome,
};
