//! Blocking synchronization building blocks for the contend project.
//!
//! This crate provides:
//! - **Bounded buffers**: a fixed-capacity FIFO in a monitor style and in a
//!   semaphore style, see [`buffer`]
//! - **Counting semaphore** with RAII permits, see [`semaphore`]
//! - **Cancellable waits**: [`CancelToken`] and [`Wait`] bound how long any
//!   blocking call may wait, see [`wait`]
//!
//! # Examples
//!
//! ```rust
//! use contend_sync::{BoundedBuffer, BufferStyle};
//! use std::thread;
//!
//! let buffer = BoundedBuffer::with_style(BufferStyle::Semaphore, 5).unwrap();
//!
//! let producer = {
//!     let buffer = buffer.clone();
//!     thread::spawn(move || {
//!         for i in 0..10 {
//!             buffer.produce(i);
//!         }
//!     })
//! };
//!
//! let consumed: Vec<i32> = (0..10).map(|_| buffer.consume()).collect();
//! producer.join().unwrap();
//!
//! assert_eq!(consumed, (0..10).collect::<Vec<_>>());
//! assert!(buffer.peak_len() <= 5);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod semaphore;
pub mod wait;

// Re-export commonly used items
pub use buffer::{
    BoundedBuffer, BufferError, BufferResult, BufferStyle, MonitorBuffer, ProduceError,
    SemaphoreBuffer,
};
pub use semaphore::{Semaphore, SemaphorePermit};
pub use wait::{CancelToken, Wait, WaitError, WAIT_SLICE};
