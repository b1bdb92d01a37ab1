//! Bounded buffer guarded by three semaphores.
//!
//! `empty_slots` starts at the capacity and `filled_slots` at zero; a binary
//! `mutex` semaphore serializes access to the storage. A producer takes an
//! empty slot, then the binary permit, pushes, gives the binary permit back
//! and turns its slot into a filled slot. A consumer does the mirror image.
//!
//! The slot permit is always taken before the binary permit. Reversing the
//! order lets a producer hold the binary permit while waiting for a slot only
//! a consumer (blocked on that same binary permit) could free.

use std::sync::{Arc, Mutex};

use super::{BufferError, BufferResult, ProduceError, Slots};
use crate::semaphore::Semaphore;
use crate::wait::{lock, Wait, WaitError};

/// A fixed-capacity FIFO built from counting semaphores.
///
/// Behaves exactly like [`MonitorBuffer`](super::MonitorBuffer) from the
/// caller's side.
///
/// # Examples
///
/// ```
/// use contend_sync::SemaphoreBuffer;
///
/// let buffer = SemaphoreBuffer::new(2).unwrap();
/// buffer.produce("first");
/// buffer.produce("second");
///
/// assert_eq!(buffer.consume(), "first");
/// assert_eq!(buffer.consume(), "second");
/// ```
pub struct SemaphoreBuffer<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    empty_slots: Semaphore,
    filled_slots: Semaphore,
    mutex: Semaphore,
    // Uncontended: only touched while the binary `mutex` permit is held.
    slots: Mutex<Slots<T>>,
    capacity: usize,
}

impl<T> Clone for SemaphoreBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SemaphoreBuffer<T> {
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
                empty_slots: Semaphore::new(capacity),
                filled_slots: Semaphore::new(0),
                mutex: Semaphore::new(1),
                slots: Mutex::new(Slots::with_capacity(capacity)),
                capacity,
            }),
        })
    }

    /// Appends `item`, blocking while the buffer is full.
    pub fn produce(&self, item: T) {
        let slot = self.inner.empty_slots.acquire();
        let exclusive = self.inner.mutex.acquire();
        lock(&self.inner.slots).push(item);
        drop(exclusive);

        slot.forget();
        self.inner.filled_slots.release();
    }

    /// Appends `item`, blocking while the buffer is full or until `wait` gives up.
    ///
    /// A slot permit already taken is handed back when the binary permit
    /// cannot be obtained.
    ///
    /// # Errors
    ///
    /// Returns the item together with the [`WaitError`].
    pub fn produce_with(&self, item: T, wait: &Wait) -> Result<(), ProduceError<T>> {
        let slot = match self.inner.empty_slots.acquire_with(wait) {
            Ok(permit) => permit,
            Err(error) => {
                tracing::debug!("produce gave up waiting for an empty slot: {error}");
                return Err(ProduceError::new(error, item));
            }
        };
        let exclusive = match self.inner.mutex.acquire_with(wait) {
            Ok(permit) => permit,
            Err(error) => {
                tracing::debug!("produce gave up waiting for exclusive access: {error}");
                return Err(ProduceError::new(error, item));
            }
        };
        lock(&self.inner.slots).push(item);
        drop(exclusive);

        slot.forget();
        self.inner.filled_slots.release();
        Ok(())
    }

    /// Removes the oldest item, blocking while the buffer is empty.
    pub fn consume(&self) -> T {
        let slot = self.inner.filled_slots.acquire();
        let exclusive = self.inner.mutex.acquire();
        let item = lock(&self.inner.slots)
            .pop()
            .expect("Filled slot permit held on an empty buffer");
        drop(exclusive);

        slot.forget();
        self.inner.empty_slots.release();
        item
    }

    /// Removes the oldest item, blocking while the buffer is empty or until
    /// `wait` gives up.
    ///
    /// # Errors
    ///
    /// Returns the [`WaitError`] from `wait`. Nothing is removed in that case.
    pub fn consume_with(&self, wait: &Wait) -> Result<T, WaitError> {
        let slot = self
            .inner
            .filled_slots
            .acquire_with(wait)
            .inspect_err(|error| tracing::debug!("consume gave up waiting for an item: {error}"))?;
        let exclusive = self.inner.mutex.acquire_with(wait).inspect_err(|error| {
            tracing::debug!("consume gave up waiting for exclusive access: {error}");
        })?;
        let item = lock(&self.inner.slots)
            .pop()
            .expect("Filled slot permit held on an empty buffer");
        drop(exclusive);

        slot.forget();
        self.inner.empty_slots.release();
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

    /// Free permits as `(empty_slots, filled_slots, mutex)`.
    #[must_use]
    pub fn permits(&self) -> (usize, usize, usize) {
        (
            self.inner.empty_slots.available(),
            self.inner.filled_slots.available(),
            self.inner.mutex.available(),
        )
    }
}

impl<T> core::fmt::Debug for SemaphoreBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SemaphoreBuffer")
            .field("capacity", &self.inner.capacity)
            .field("permits", &self.permits())
            .finish()
    }
}
