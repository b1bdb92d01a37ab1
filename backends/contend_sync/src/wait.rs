//! Cancellation and deadlines for blocking calls.
//!
//! Every blocking operation in this crate has a plain form that waits for as
//! long as it takes and a `_with` form that takes a [`Wait`]. A [`Wait`] can
//! carry a [`CancelToken`], a deadline, or both. While blocked, the caller
//! parks in slices of at most [`WAIT_SLICE`] and re-checks the token and the
//! deadline between slices.
//!
//! # Examples
//!
//! ```
//! use contend_sync::{CancelToken, Wait, WaitError};
//! use core::time::Duration;
//!
//! let token = CancelToken::new();
//! let wait = Wait::cancellable(&token).with_timeout(Duration::from_secs(1));
//!
//! assert_eq!(wait.check(), Ok(()));
//! token.cancel();
//! assert_eq!(wait.check(), Err(WaitError::Cancelled));
//! ```

use core::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Instant;

/// Longest time a cancellable waiter stays parked before re-checking.
pub const WAIT_SLICE: Duration = Duration::from_millis(2);

/// Indicates the token was cancelled.
const CANCELLED: usize = 1;

/// Indicates the token is still live.
const LIVE: usize = 0;

/// Why a blocking call gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitError {
    /// The [`CancelToken`] attached to the call was cancelled.
    Cancelled,
    /// The deadline attached to the call passed.
    TimedOut,
}

impl WaitError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled)
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::TimedOut)
    }
}

impl core::error::Error for WaitError {}

impl core::fmt::Display for WaitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WaitError::Cancelled => write!(f, "WaitError::Cancelled"),
            WaitError::TimedOut => write!(f, "WaitError::TimedOut"),
        }
    }
}

/// A shared flag that asks blocked calls to stop waiting.
///
/// Clones share the same flag. Cancelling is one-way.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<AtomicUsize>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicUsize::new(LIVE)),
        }
    }

    /// `cancel` flips the token to cancelled, returns false if it already was.
    #[inline]
    pub fn cancel(&self) -> bool {
        self.state
            .compare_exchange(LIVE, CANCELLED, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }
}

/// How long a blocking call is allowed to wait.
#[derive(Debug, Clone, Default)]
pub struct Wait {
    cancel: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl Wait {
    /// Wait until the operation can proceed, however long that takes.
    #[must_use]
    pub fn forever() -> Self {
        Self::default()
    }

    /// Wait until the operation can proceed or `token` is cancelled.
    #[must_use]
    pub fn cancellable(token: &CancelToken) -> Self {
        Self::forever().with_cancel(token)
    }

    /// Wait at most `timeout`, measured from now.
    #[must_use]
    pub fn timeout(timeout: Duration) -> Self {
        Self::forever().with_timeout(timeout)
    }

    #[must_use]
    pub fn with_cancel(mut self, token: &CancelToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    /// Adds a deadline `timeout` from now. An earlier deadline already set wins.
    ///
    /// A timeout too large to be represented as an [`Instant`] adds no
    /// deadline, so `Duration::MAX` means "no time limit".
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self;
        };
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    #[must_use]
    pub fn is_forever(&self) -> bool {
        self.cancel.is_none() && self.deadline.is_none()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason to stop waiting, if there is one.
    ///
    /// Cancellation is reported before an expired deadline.
    ///
    /// # Errors
    ///
    /// [`WaitError::Cancelled`] when the token was cancelled,
    /// [`WaitError::TimedOut`] when the deadline passed.
    pub fn check(&self) -> Result<(), WaitError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(WaitError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(WaitError::TimedOut);
        }
        Ok(())
    }

    /// How long the next park may last, `None` when there is nothing to re-check.
    pub(crate) fn slice(&self) -> Option<Duration> {
        if self.is_forever() {
            return None;
        }
        let slice = match self.deadline {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(WAIT_SLICE),
            None => WAIT_SLICE,
        };
        Some(slice)
    }
}

/// Locks `mutex`, recovering the guard when a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(err) => err.into_inner(),
    }
}

/// Parks on `condvar` while `blocked` holds, with no way out.
pub(crate) fn block_while<'a, T, F>(
    condvar: &Condvar,
    mut guard: MutexGuard<'a, T>,
    mut blocked: F,
) -> MutexGuard<'a, T>
where
    F: FnMut(&mut T) -> bool,
{
    while blocked(&mut guard) {
        guard = match condvar.wait(guard) {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
    }
    guard
}

/// Parks on `condvar` while `blocked` holds, giving up when `wait` says so.
///
/// The predicate is evaluated first, so a call that can proceed does so even
/// with a cancelled token. On error the guard is dropped before returning,
/// which releases the mutex.
pub(crate) fn wait_while<'a, T, F>(
    condvar: &Condvar,
    mut guard: MutexGuard<'a, T>,
    wait: &Wait,
    mut blocked: F,
) -> Result<MutexGuard<'a, T>, WaitError>
where
    F: FnMut(&mut T) -> bool,
{
    if wait.is_forever() {
        return Ok(block_while(condvar, guard, blocked));
    }

    while blocked(&mut guard) {
        wait.check()?;
        let slice = wait.slice().unwrap_or(WAIT_SLICE);
        guard = match condvar.wait_timeout(guard, slice) {
            Ok((g, _)) => g,
            Err(e) => e.into_inner().0,
        };
    }
    Ok(guard)
}
