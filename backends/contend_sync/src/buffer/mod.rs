//! Fixed-capacity FIFO buffers for producer/consumer hand-off.
//!
//! Two synchronization styles are offered and behave the same from the
//! caller's side:
//!
//! - [`MonitorBuffer`]: one mutex and two condition variables (`not_full`,
//!   `not_empty`), waking all waiters on every change.
//! - [`SemaphoreBuffer`]: an empty-slot counter, a filled-slot counter and a
//!   binary semaphore for exclusive access to storage.
//!
//! [`BoundedBuffer`] is a closed enum over both so code can pick a style at
//! runtime with [`BufferStyle`].
//!
//! Every buffer keeps its length in `[0, capacity]`, never hands an item out
//! twice and never drops one. Blocking calls come in two forms: `produce` and
//! `consume` wait for as long as it takes, `produce_with` and `consume_with`
//! take a [`Wait`] and give up on cancellation or timeout without holding on
//! to any internal lock or permit.

use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::wait::{Wait, WaitError};

mod monitor;
mod semaphore;

pub use monitor::MonitorBuffer;
pub use semaphore::SemaphoreBuffer;

pub type BufferResult<T> = std::result::Result<T, BufferError>;

/// Configuration errors raised when building a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    ZeroCapacity,
}

impl core::error::Error for BufferError {}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BufferError::ZeroCapacity => write!(f, "buffer capacity must be greater than zero"),
        }
    }
}

/// A `produce_with` call that gave up, carrying the item it could not store.
#[derive(PartialEq, Eq)]
pub struct ProduceError<T> {
    error: WaitError,
    item: T,
}

impl<T> ProduceError<T> {
    pub(crate) fn new(error: WaitError, item: T) -> Self {
        Self { error, item }
    }

    /// Why the call gave up.
    #[must_use]
    pub fn error(&self) -> WaitError {
        self.error
    }

    /// The item that was not stored.
    #[must_use]
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Takes the item back.
    #[must_use]
    pub fn into_item(self) -> T {
        self.item
    }
}

impl<T> From<ProduceError<T>> for WaitError {
    fn from(value: ProduceError<T>) -> Self {
        value.error
    }
}

impl<T> core::fmt::Debug for ProduceError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProduceError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> core::fmt::Display for ProduceError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "produce failed: {}", self.error)
    }
}

impl<T> core::error::Error for ProduceError<T> {}

/// Which synchronization style backs a [`BoundedBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferStyle {
    #[default]
    Monitor,
    Semaphore,
}

impl BufferStyle {
    pub const ALL: [BufferStyle; 2] = [BufferStyle::Monitor, BufferStyle::Semaphore];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BufferStyle::Monitor => "monitor",
            BufferStyle::Semaphore => "semaphore",
        }
    }
}

impl core::fmt::Display for BufferStyle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BufferStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BufferStyle::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown buffer style: {value:?}"))
    }
}

/// Storage shared by both styles: the queue plus its high-water mark.
pub(crate) struct Slots<T> {
    items: VecDeque<T>,
    peak: usize,
}

impl<T> Slots<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            peak: 0,
        }
    }

    pub(crate) fn push(&mut self, item: T) {
        self.items.push_back(item);
        self.peak = self.peak.max(self.items.len());
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak
    }

    pub(crate) fn items(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// A bounded buffer in either synchronization style.
///
/// # Examples
///
/// ```
/// use contend_sync::{BoundedBuffer, BufferStyle, Wait};
/// use core::time::Duration;
///
/// for style in BufferStyle::ALL {
///     let buffer = BoundedBuffer::with_style(style, 1).unwrap();
///     buffer.produce(10);
///
///     let rejected = buffer.produce_with(11, &Wait::timeout(Duration::from_millis(5)));
///     assert_eq!(rejected.unwrap_err().into_item(), 11);
///     assert_eq!(buffer.consume(), 10);
/// }
/// ```
pub enum BoundedBuffer<T> {
    Monitor(MonitorBuffer<T>),
    Semaphore(SemaphoreBuffer<T>),
}

impl<T> Clone for BoundedBuffer<T> {
    fn clone(&self) -> Self {
        match self {
            BoundedBuffer::Monitor(buffer) => BoundedBuffer::Monitor(buffer.clone()),
            BoundedBuffer::Semaphore(buffer) => BoundedBuffer::Semaphore(buffer.clone()),
        }
    }
}

impl<T> BoundedBuffer<T> {
    /// Creates a monitor-style buffer.
    ///
    /// # Errors
    ///
    /// [`BufferError::ZeroCapacity`] when `capacity` is 0.
    pub fn new(capacity: usize) -> BufferResult<Self> {
        Self::with_style(BufferStyle::Monitor, capacity)
    }

    /// Creates a buffer of the given style.
    ///
    /// # Errors
    ///
    /// [`BufferError::ZeroCapacity`] when `capacity` is 0.
    pub fn with_style(style: BufferStyle, capacity: usize) -> BufferResult<Self> {
        Ok(match style {
            BufferStyle::Monitor => BoundedBuffer::Monitor(MonitorBuffer::new(capacity)?),
            BufferStyle::Semaphore => BoundedBuffer::Semaphore(SemaphoreBuffer::new(capacity)?),
        })
    }

    /// Which style backs this buffer.
    #[must_use]
    pub fn style(&self) -> BufferStyle {
        match self {
            BoundedBuffer::Monitor(_) => BufferStyle::Monitor,
            BoundedBuffer::Semaphore(_) => BufferStyle::Semaphore,
        }
    }

    /// Appends `item`, blocking while the buffer is full.
    pub fn produce(&self, item: T) {
        match self {
            BoundedBuffer::Monitor(buffer) => buffer.produce(item),
            BoundedBuffer::Semaphore(buffer) => buffer.produce(item),
        }
    }

    /// Appends `item`, blocking while the buffer is full until `wait` gives up.
    ///
    /// # Errors
    ///
    /// Returns the item together with the [`WaitError`] when `wait` gives up.
    pub fn produce_with(&self, item: T, wait: &Wait) -> Result<(), ProduceError<T>> {
        match self {
            BoundedBuffer::Monitor(buffer) => buffer.produce_with(item, wait),
            BoundedBuffer::Semaphore(buffer) => buffer.produce_with(item, wait),
        }
    }

    /// Removes the oldest item, blocking while the buffer is empty.
    pub fn consume(&self) -> T {
        match self {
            BoundedBuffer::Monitor(buffer) => buffer.consume(),
            BoundedBuffer::Semaphore(buffer) => buffer.consume(),
        }
    }

    /// Removes the oldest item, blocking while the buffer is empty until
    /// `wait` gives up.
    ///
    /// # Errors
    ///
    /// Returns the [`WaitError`] when `wait` gives up.
    pub fn consume_with(&self, wait: &Wait) -> Result<T, WaitError> {
        match self {
            BoundedBuffer::Monitor(buffer) => buffer.consume_with(wait),
            BoundedBuffer::Semaphore(buffer) => buffer.consume_with(wait),
        }
    }

    /// Number of items stored right now. Stale as soon as it returns when
    /// other threads are running.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            BoundedBuffer::Monitor(buffer) => buffer.len(),
            BoundedBuffer::Semaphore(buffer) => buffer.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of items the buffer holds.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match self {
            BoundedBuffer::Monitor(buffer) => buffer.capacity(),
            BoundedBuffer::Semaphore(buffer) => buffer.capacity(),
        }
    }

    /// Highest length observed since the buffer was created.
    #[must_use]
    pub fn peak_len(&self) -> usize {
        match self {
            BoundedBuffer::Monitor(buffer) => buffer.peak_len(),
            BoundedBuffer::Semaphore(buffer) => buffer.peak_len(),
        }
    }

    /// Copies the stored items, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        match self {
            BoundedBuffer::Monitor(buffer) => buffer.snapshot(),
            BoundedBuffer::Semaphore(buffer) => buffer.snapshot(),
        }
    }
}

impl<T> core::fmt::Debug for BoundedBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoundedBuffer::Monitor(buffer) => buffer.fmt(f),
            BoundedBuffer::Semaphore(buffer) => buffer.fmt(f),
        }
    }
}

impl<T> From<MonitorBuffer<T>> for BoundedBuffer<T> {
    fn from(value: MonitorBuffer<T>) -> Self {
        BoundedBuffer::Monitor(value)
    }
}

impl<T> From<SemaphoreBuffer<T>> for BoundedBuffer<T> {
    fn from(value: SemaphoreBuffer<T>) -> Self {
        BoundedBuffer::Semaphore(value)
    }
}
