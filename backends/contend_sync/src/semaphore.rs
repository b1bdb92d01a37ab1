//! Counting semaphore.
//!
//! A [`Semaphore`] holds a number of permits. [`Semaphore::acquire`] takes one,
//! blocking while none are left, and [`Semaphore::release`] hands one back and
//! wakes a waiter. Permits come back as a [`SemaphorePermit`] guard which
//! releases on drop, so an early return or a panic between acquire and release
//! cannot leak a permit.
//!
//! A semaphore with one permit is a binary semaphore and gives mutual
//! exclusion. A semaphore with zero permits works as an event: waiters block
//! until someone calls [`Semaphore::release`].
//!
//! A permit taken from one semaphore can be moved to another with
//! [`SemaphorePermit::forget`] followed by `release` on the target. The
//! bounded buffer does exactly that with its empty-slot and filled-slot
//! counters.
//!
//! # Examples
//!
//! ```
//! use contend_sync::Semaphore;
//!
//! let sema = Semaphore::new(2);
//!
//! let first = sema.acquire();
//! let second = sema.acquire();
//! assert_eq!(sema.available(), 0);
//! assert!(sema.try_acquire().is_none());
//!
//! drop(first);
//! assert_eq!(sema.available(), 1);
//! drop(second);
//! ```

use std::sync::{Condvar, Mutex};

use crate::wait::{block_while, lock, wait_while, Wait, WaitError};

/// Counting semaphore built from a mutex-protected counter and a condvar.
#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Creates a semaphore holding `permits` permits.
    #[must_use]
    pub const fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Takes a permit, blocking until one is available.
    pub fn acquire(&self) -> SemaphorePermit<'_> {
        let mut guard = block_while(&self.available, lock(&self.permits), |permits| {
            *permits == 0
        });
        *guard -= 1;
        SemaphorePermit { sema: self }
    }

    /// Takes a permit, blocking until one is available or `wait` gives up.
    ///
    /// # Errors
    ///
    /// Returns the [`WaitError`] from `wait`. No permit is held in that case.
    pub fn acquire_with(&self, wait: &Wait) -> Result<SemaphorePermit<'_>, WaitError> {
        let mut guard = wait_while(&self.available, lock(&self.permits), wait, |permits| {
            *permits == 0
        })?;
        *guard -= 1;
        Ok(SemaphorePermit { sema: self })
    }

    /// Takes a permit only if one is free right now.
    #[must_use]
    pub fn try_acquire(&self) -> Option<SemaphorePermit<'_>> {
        let mut guard = lock(&self.permits);
        if *guard == 0 {
            return None;
        }
        *guard -= 1;
        Some(SemaphorePermit { sema: self })
    }

    /// Adds a permit and wakes one waiter.
    ///
    /// Usually called by dropping a [`SemaphorePermit`]. Call it directly to
    /// signal an event or to receive a permit moved with
    /// [`SemaphorePermit::forget`].
    pub fn release(&self) {
        let mut guard = lock(&self.permits);
        *guard += 1;
        drop(guard);
        self.available.notify_one();
    }

    /// Permits free at this instant.
    #[must_use]
    pub fn available(&self) -> usize {
        *lock(&self.permits)
    }
}

/// An acquired permit, released back to its semaphore on drop.
#[must_use = "dropping the permit releases it immediately"]
#[derive(Debug)]
pub struct SemaphorePermit<'a> {
    sema: &'a Semaphore,
}

impl SemaphorePermit<'_> {
    /// Consumes the guard without releasing the permit.
    pub fn forget(self) {
        core::mem::forget(self);
    }
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        self.sema.release();
    }
}
