//! Bounded buffer guarded by one mutex and two condition variables.

use std::sync::{Arc, Condvar, Mutex};

use super::{BufferError, BufferResult, ProduceError, Slots};
use crate::wait::{block_while, lock, wait_while, Wait, WaitError};

/// A fixed-capacity FIFO shared between producer and consumer threads.
///
/// Size checks and mutations happen under a single mutex. Producers wait on
/// `not_full`, consumers on `not_empty`, and every state change wakes all
/// waiters of the opposite condition.
///
/// # Examples
///
/// ```
/// use contend_sync::MonitorBuffer;
/// use std::thread;
///
/// let buffer = MonitorBuffer::new(2).unwrap();
///
/// let producer = {
///     let buffer = buffer.clone();
///     thread::spawn(move || {
///         for i in 0..5 {
///             buffer.produce(i);
///         }
///     })
/// };
///
/// let received: Vec<u32> = (0..5).map(|_| buffer.consume()).collect();
/// producer.join().unwrap();
///
/// assert_eq!(received, vec![0, 1, 2, 3, 4]);
/// assert!(buffer.peak_len() <= 2);
/// ```
pub struct MonitorBuffer<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    slots: Mutex<Slots<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> Clone for MonitorBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> MonitorBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// [`BufferError::ZeroCapacity`] when `capacity` is 0.
    pub fn new(capacity: usize) -> BufferResult<Self> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(Slots::with_capacity(capacity)),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity,
            }),
        })
    }

    /// Appends `item`, blocking while the buffer is full.
    pub fn produce(&self, item: T) {
        let capacity = self.inner.capacity;
        let mut guard = block_while(&self.inner.not_full, lock(&self.inner.slots), |slots| {
            slots.len() >= capacity
        });
        guard.push(item);
        drop(guard);

        self.inner.not_empty.notify_all();
    }

    /// Appends `item`, blocking while the buffer is full or until `wait` gives up.
    ///
    /// # Errors
    ///
    /// Returns the item together with the [`WaitError`]. The buffer is left
    /// untouched in that case.
    pub fn produce_with(&self, item: T, wait: &Wait) -> Result<(), ProduceError<T>> {
        let capacity = self.inner.capacity;
        let guard = lock(&self.inner.slots);
        let mut guard = match wait_while(&self.inner.not_full, guard, wait, |slots| {
            slots.len() >= capacity
        }) {
            Ok(guard) => guard,
            Err(error) => {
                tracing::debug!("produce gave up on a full buffer: {error}");
                return Err(ProduceError::new(error, item));
            }
        };
        guard.push(item);
        drop(guard);

        self.inner.not_empty.notify_all();
        Ok(())
    }

    /// Removes the oldest item, blocking while the buffer is empty.
    pub fn consume(&self) -> T {
        let mut guard = block_while(&self.inner.not_empty, lock(&self.inner.slots), |slots| {
            slots.is_empty()
        });
        let item = guard.pop().expect("Buffer was empty after wait");
        drop(guard);

        self.inner.not_full.notify_all();
        item
    }

    /// Removes the oldest item, blocking while the buffer is empty or until
    /// `wait` gives up.
    ///
    /// # Errors
    ///
    /// Returns the [`WaitError`] from `wait`. Nothing is removed in that case.
    pub fn consume_with(&self, wait: &Wait) -> Result<T, WaitError> {
        let guard = lock(&self.inner.slots);
        let mut guard = wait_while(&self.inner.not_empty, guard, wait, |slots| slots.is_empty())
            .inspect_err(|error| tracing::debug!("consume gave up on an empty buffer: {error}"))?;
        let item = guard.pop().expect("Buffer was empty after wait");
        drop(guard);

        self.inner.not_full.notify_all();
        Ok(item)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.inner.slots).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Largest length the buffer has reached so far.
    #[must_use]
    pub fn peak_len(&self) -> usize {
        lock(&self.inner.slots).peak()
    }

    /// Copies out the queued items, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        lock(&self.inner.slots).items().cloned().collect()
    }
}

impl<T> core::fmt::Debug for MonitorBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MonitorBuffer")
            .field("capacity", &self.inner.capacity)
            .field("len", &self.len())
            .finish()
    }
}
