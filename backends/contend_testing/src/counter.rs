//! Shared counters, one per synchronization strategy.
//!
//! | Strategy | Mechanism | Guarantee |
//! |----------|-----------|-----------|
//! | `Unsynchronized` | separate load and store | none, loses updates under contention |
//! | `Mutex` | `parking_lot::Mutex` critical section | correct final value |
//! | `Atomic` | `fetch_add` | correct final value, never blocks |
//! | `Lock` | `parking_lot::ReentrantMutex`, acquire/release | correct final value, reentrant |
//! | `Semaphore` | one-permit [`Semaphore`] around load and store | correct final value |

use core::cell::Cell;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use contend_sync::{Semaphore, Wait, WaitError, WAIT_SLICE};
use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};

/// How a [`Counter`] protects its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Unsynchronized,
    Mutex,
    Atomic,
    Lock,
    Semaphore,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Unsynchronized,
        Strategy::Mutex,
        Strategy::Atomic,
        Strategy::Lock,
        Strategy::Semaphore,
    ];

    /// Strategies whose final value is guaranteed.
    pub const SYNCHRONIZED: [Strategy; 4] = [
        Strategy::Mutex,
        Strategy::Atomic,
        Strategy::Lock,
        Strategy::Semaphore,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Unsynchronized => "unsynchronized",
            Strategy::Mutex => "mutex",
            Strategy::Atomic => "atomic",
            Strategy::Lock => "lock",
            Strategy::Semaphore => "semaphore",
        }
    }

    /// True when every increment is guaranteed to be counted.
    #[must_use]
    pub const fn is_synchronized(self) -> bool {
        !matches!(self, Strategy::Unsynchronized)
    }

    /// True when `increment` may park the calling thread.
    #[must_use]
    pub const fn may_block(self) -> bool {
        matches!(self, Strategy::Mutex | Strategy::Lock | Strategy::Semaphore)
    }
}

impl core::fmt::Display for Strategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("synchronized") || value.eq_ignore_ascii_case("monitor") {
            return Ok(Strategy::Mutex);
        }
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown strategy: {value:?}"))
    }
}

/// A shared counter whose increments go through one [`Strategy`].
///
/// # Examples
///
/// ```
/// use contend_testing::{Counter, Strategy};
///
/// let counter = Counter::new(Strategy::Semaphore);
/// counter.increment();
/// counter.increment();
/// assert_eq!(counter.value(), 2);
/// ```
pub enum Counter {
    Unsynchronized(AtomicU64),
    Mutex(Mutex<u64>),
    Atomic(AtomicU64),
    Lock(ReentrantMutex<Cell<u64>>),
    Semaphore { permit: Semaphore, value: AtomicU64 },
}

impl Counter {
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Unsynchronized => Counter::Unsynchronized(AtomicU64::new(0)),
            Strategy::Mutex => Counter::Mutex(Mutex::new(0)),
            Strategy::Atomic => Counter::Atomic(AtomicU64::new(0)),
            Strategy::Lock => Counter::Lock(ReentrantMutex::new(Cell::new(0))),
            Strategy::Semaphore => Counter::Semaphore {
                permit: Semaphore::new(1),
                value: AtomicU64::new(0),
            },
        }
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        match self {
            Counter::Unsynchronized(_) => Strategy::Unsynchronized,
            Counter::Mutex(_) => Strategy::Mutex,
            Counter::Atomic(_) => Strategy::Atomic,
            Counter::Lock(_) => Strategy::Lock,
            Counter::Semaphore { .. } => Strategy::Semaphore,
        }
    }

    /// Adds one, blocking as long as the strategy requires.
    pub fn increment(&self) {
        match self {
            Counter::Unsynchronized(value) => {
                // Read-modify-write split in two: concurrent increments overwrite each other.
                let current = value.load(Ordering::Relaxed);
                value.store(current + 1, Ordering::Relaxed);
            }
            Counter::Mutex(value) => {
                *value.lock() += 1;
            }
            Counter::Atomic(value) => {
                value.fetch_add(1, Ordering::Relaxed);
            }
            Counter::Lock(lock) => {
                let guard = lock.lock();
                guard.set(guard.get() + 1);
                drop(guard);
            }
            Counter::Semaphore { permit, value } => {
                let _permit = permit.acquire();
                let current = value.load(Ordering::Relaxed);
                value.store(current + 1, Ordering::Relaxed);
            }
        }
    }

    /// Adds one, giving up when `wait` says so.
    ///
    /// Only the blocking strategies can fail. A failed increment leaves the
    /// value unchanged and holds no lock or permit.
    ///
    /// # Errors
    ///
    /// Returns the [`WaitError`] from `wait`.
    pub fn increment_with(&self, wait: &Wait) -> Result<(), WaitError> {
        if wait.is_forever() {
            self.increment();
            return Ok(());
        }

        match self {
            Counter::Unsynchronized(_) | Counter::Atomic(_) => {
                self.increment();
            }
            Counter::Mutex(value) => {
                let mut guard = loop {
                    if let Some(guard) = value.try_lock_for(WAIT_SLICE) {
                        break guard;
                    }
                    wait.check()?;
                };
                *guard += 1;
            }
            Counter::Lock(lock) => {
                let guard = loop {
                    if let Some(guard) = lock.try_lock_for(WAIT_SLICE) {
                        break guard;
                    }
                    wait.check()?;
                };
                guard.set(guard.get() + 1);
            }
            Counter::Semaphore { permit, value } => {
                let _permit = permit.acquire_with(wait)?;
                let current = value.load(Ordering::Relaxed);
                value.store(current + 1, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reads the value through the same mechanism that guards increments.
    #[must_use]
    pub fn value(&self) -> u64 {
        match self {
            Counter::Unsynchronized(value) | Counter::Atomic(value) => {
                value.load(Ordering::Relaxed)
            }
            Counter::Mutex(value) => *value.lock(),
            Counter::Lock(lock) => lock.lock().get(),
            Counter::Semaphore { permit, value } => {
                let _permit = permit.acquire();
                value.load(Ordering::Relaxed)
            }
        }
    }
}

impl core::fmt::Debug for Counter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Counter")
            .field("strategy", &self.strategy())
            .field("value", &self.value())
            .finish()
    }
}
