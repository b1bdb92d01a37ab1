//! Counter run configuration.

use core::time::Duration;

use contend_sync::{CancelToken, Wait};

use super::{HarnessError, HarnessResult};

/// Configuration for one counter run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Number of worker jobs submitted to the pool
    workers: usize,
    /// Number of increments each worker performs
    increments: usize,
    /// Optional limit on how long the whole run may block
    timeout: Option<Duration>,
    /// Optional token that interrupts blocked increments
    cancel: Option<CancelToken>,
}

impl HarnessConfig {
    /// Creates a configuration with default values.
    ///
    /// Defaults:
    /// - `workers`: 2
    /// - `increments`: 10 000
    /// - no timeout, no cancellation
    #[must_use]
    pub const fn new() -> Self {
        Self {
            workers: 2,
            increments: 10_000,
            timeout: None,
            cancel: None,
        }
    }

    /// Sets the number of worker jobs submitted to the pool.
    #[must_use]
    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count;
        self
    }

    /// Sets the number of increments each worker performs.
    #[must_use]
    pub fn increments(mut self, count: usize) -> Self {
        self.increments = count;
        self
    }

    /// Bounds how long blocked increments may wait, counted from the start
    /// of the run.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Lets `token` interrupt blocked increments.
    #[must_use]
    pub fn cancel_on(mut self, token: &CancelToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    /// Returns the number of workers.
    #[must_use]
    pub const fn get_workers(&self) -> usize {
        self.workers
    }

    /// Returns the number of increments per worker.
    #[must_use]
    pub const fn get_increments(&self) -> usize {
        self.increments
    }

    /// Returns the run timeout, if any.
    #[must_use]
    pub const fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Final value a correct strategy must reach.
    #[must_use]
    pub const fn expected(&self) -> u64 {
        (self.workers as u64) * (self.increments as u64)
    }

    /// # Errors
    ///
    /// [`HarnessError::ZeroWorkers`] or [`HarnessError::ZeroIncrements`].
    pub fn validate(&self) -> HarnessResult<()> {
        if self.workers == 0 {
            return Err(HarnessError::ZeroWorkers);
        }
        if self.increments == 0 {
            return Err(HarnessError::ZeroIncrements);
        }
        Ok(())
    }

    /// The wait policy for a run starting now.
    pub(crate) fn start_wait(&self) -> Wait {
        let mut wait = Wait::forever();
        if let Some(token) = &self.cancel {
            wait = wait.with_cancel(token);
        }
        if let Some(timeout) = self.timeout {
            wait = wait.with_timeout(timeout);
        }
        wait
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}
