//! Fixed-size worker pool owned by whoever drives a run.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

use derive_more::From;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub type PoolResult<T> = std::result::Result<T, PoolError>;

#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum PoolError {
    /// A pool needs at least one thread.
    ZeroThreads,
    /// The pool was shut down and accepts no more jobs.
    ShutDown,
    #[from]
    Spawn(String),
}

impl core::error::Error for PoolError {}

impl core::fmt::Display for PoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PoolError::ZeroThreads => write!(f, "PoolError::ZeroThreads"),
            PoolError::ShutDown => write!(f, "PoolError::ShutDown"),
            PoolError::Spawn(reason) => write!(f, "PoolError::Spawn({reason})"),
        }
    }
}

/// A pool of threads pulling jobs from a shared FIFO queue.
///
/// Shutting down (explicitly or on drop) lets queued jobs finish, then joins
/// every thread. A job that panics does not take its thread down.
///
/// # Examples
///
/// ```
/// use contend_testing::WorkerPool;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let pool = WorkerPool::new(4).unwrap();
/// let counter = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..10 {
///     let counter_clone = Arc::clone(&counter);
///     pool.execute(move || {
///         counter_clone.fetch_add(1, Ordering::Relaxed);
///     })
///     .unwrap();
/// }
///
/// // Shutdown drains the queue before joining
/// drop(pool);
/// assert_eq!(counter.load(Ordering::Relaxed), 10);
/// ```
pub struct WorkerPool {
    threads: Vec<thread::JoinHandle<()>>,
    queue: Arc<JobQueue>,
}

impl WorkerPool {
    /// Starts a pool with `size` threads.
    ///
    /// # Errors
    ///
    /// [`PoolError::ZeroThreads`] when `size` is 0, [`PoolError::Spawn`] when
    /// the OS refuses a thread (threads already started are shut down).
    pub fn new(size: usize) -> PoolResult<Self> {
        if size == 0 {
            return Err(PoolError::ZeroThreads);
        }

        let queue = Arc::new(JobQueue::new());
        let mut pool = Self {
            threads: Vec::with_capacity(size),
            queue,
        };

        for id in 0..size {
            let queue = Arc::clone(&pool.queue);
            let spawned = thread::Builder::new()
                .name(format!("contend-worker-{id}"))
                .spawn(move || {
                    while let Some(job) = queue.pop() {
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            tracing::warn!("worker {id}: job panicked");
                        }
                    }
                });

            match spawned {
                Ok(handle) => pool.threads.push(handle),
                Err(err) => {
                    pool.shutdown();
                    return Err(PoolError::Spawn(err.to_string()));
                }
            }
        }

        tracing::debug!("worker pool started with {size} threads");
        Ok(pool)
    }

    /// Number of threads started.
    #[must_use]
    pub fn size(&self) -> usize {
        self.threads.len()
    }

    /// Queues a job.
    ///
    /// # Errors
    ///
    /// [`PoolError::ShutDown`] once the pool has been shut down.
    pub fn execute<F>(&self, job: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Box::new(job))
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.queue.state().shut_down
    }

    /// Stops accepting jobs, lets queued ones finish and joins every thread.
    ///
    /// Calling it more than once is harmless.
    pub fn shutdown(&mut self) {
        self.queue.shut_down();

        let threads = std::mem::take(&mut self.threads);
        if threads.is_empty() {
            return;
        }

        let count = threads.len();
        for handle in threads {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked outside of a job");
            }
        }
        tracing::debug!("worker pool joined {count} threads");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl core::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads.len())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

struct QueueState {
    jobs: VecDeque<Job>,
    shut_down: bool,
}

struct JobQueue {
    state: Mutex<QueueState>,
    condvar: Condvar,
}

impl JobQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                shut_down: false,
            }),
            condvar: Condvar::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    fn push(&self, job: Job) -> PoolResult<()> {
        let mut guard = self.state();
        if guard.shut_down {
            return Err(PoolError::ShutDown);
        }
        guard.jobs.push_back(job);
        drop(guard);
        self.condvar.notify_one();
        Ok(())
    }

    /// Next job, or `None` once shut down and drained.
    fn pop(&self) -> Option<Job> {
        let mut guard = self.state();

        loop {
            if let Some(job) = guard.jobs.pop_front() {
                return Some(job);
            }

            if guard.shut_down {
                return None;
            }

            guard = match self.condvar.wait(guard) {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
        }
    }

    fn shut_down(&self) {
        self.state().shut_down = true;
        self.condvar.notify_all();
    }
}
