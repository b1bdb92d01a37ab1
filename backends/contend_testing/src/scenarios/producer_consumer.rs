//! Paced producer/consumer runs.

use core::time::Duration;
use std::panic;
use std::thread;
use std::time::Instant;

use contend_sync::{BoundedBuffer, CancelToken, Wait, WaitError};

/// One producer and one consumer, each sleeping between operations.
///
/// The defaults reproduce the classic demo: ten items, a producer that is
/// five times faster than the consumer, so the buffer fills up and the
/// producer ends up blocking.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Items produced, numbered `0..items`
    items: usize,
    /// Pause after each produce
    producer_delay: Duration,
    /// Pause after each consume
    consumer_delay: Duration,
    /// Optional limit on how long a run may block, counted from its start
    timeout: Option<Duration>,
    /// Optional token that interrupts blocked calls
    cancel: Option<CancelToken>,
}

impl ScenarioConfig {
    /// Defaults:
    /// - `items`: 10
    /// - `producer_delay`: 100ms
    /// - `consumer_delay`: 500ms
    /// - no timeout, no cancellation
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: 10,
            producer_delay: Duration::from_millis(100),
            consumer_delay: Duration::from_millis(500),
            timeout: None,
            cancel: None,
        }
    }

    /// Sets how many items the producer pushes.
    #[must_use]
    pub fn items(mut self, items: usize) -> Self {
        self.items = items;
        self
    }

    /// Sets the pause after each produce.
    #[must_use]
    pub fn producer_delay(mut self, delay: Duration) -> Self {
        self.producer_delay = delay;
        self
    }

    /// Sets the pause after each consume.
    #[must_use]
    pub fn consumer_delay(mut self, delay: Duration) -> Self {
        self.consumer_delay = delay;
        self
    }

    /// Bounds how long blocked calls may wait, counted from the start of
    /// each run.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Lets `token` interrupt blocked calls.
    #[must_use]
    pub fn cancel_on(mut self, token: &CancelToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    /// Returns the number of items produced.
    #[must_use]
    pub const fn get_items(&self) -> usize {
        self.items
    }

    /// Returns the pause after each produce.
    #[must_use]
    pub const fn get_producer_delay(&self) -> Duration {
        self.producer_delay
    }

    /// Returns the pause after each consume.
    #[must_use]
    pub const fn get_consumer_delay(&self) -> Duration {
        self.consumer_delay
    }

    /// Returns the per-run timeout, if any.
    #[must_use]
    pub const fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What a scenario observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome<T> {
    /// Items in the order the consumer received them
    pub consumed: Vec<T>,
    /// Highest buffer length seen during the run
    pub peak_len: usize,
    pub elapsed: Duration,
}

/// Runs one producer pushing `0..items` and one consumer pulling them back.
///
/// # Errors
///
/// The first [`WaitError`] either side hit. Both threads are joined before
/// returning.
pub fn run_producer_consumer(
    buffer: &BoundedBuffer<usize>,
    config: &ScenarioConfig,
) -> Result<ScenarioOutcome<usize>, WaitError> {
    let items = config.items;
    let wait = start_wait(config.timeout, config.cancel.as_ref());
    let start = Instant::now();

    tracing::info!(
        "{} buffer: producing {items} items into capacity {}",
        buffer.style(),
        buffer.capacity()
    );

    let (produced, consumed) = thread::scope(|scope| {
        let producer = scope.spawn(|| -> Result<(), WaitError> {
            for item in 0..items {
                buffer
                    .produce_with(item, &wait)
                    .map_err(|err| err.error())?;
                tracing::debug!("produced {item} (len {})", buffer.len());
                thread::sleep(config.producer_delay);
            }
            Ok(())
        });

        let consumer = scope.spawn(|| -> Result<Vec<usize>, WaitError> {
            let mut consumed = Vec::with_capacity(items);
            for _ in 0..items {
                let item = buffer.consume_with(&wait)?;
                tracing::debug!("consumed {item} (len {})", buffer.len());
                consumed.push(item);
                thread::sleep(config.consumer_delay);
            }
            Ok(consumed)
        });

        (join(producer), join(consumer))
    });

    produced?;
    let consumed = consumed?;
    let outcome = ScenarioOutcome {
        consumed,
        peak_len: buffer.peak_len(),
        elapsed: start.elapsed(),
    };

    tracing::info!(
        "consumed {} items, peak length {} in {:?}",
        outcome.consumed.len(),
        outcome.peak_len,
        outcome.elapsed
    );
    Ok(outcome)
}

/// Several producers and consumers over one buffer.
#[derive(Debug, Clone)]
pub struct ManyToManyConfig {
    producers: usize,
    consumers: usize,
    /// Items each producer pushes
    ops_each: usize,
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl ManyToManyConfig {
    /// Defaults: 2 producers, 2 consumers, 50 items each, no time limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            producers: 2,
            consumers: 2,
            ops_each: 50,
            timeout: None,
            cancel: None,
        }
    }

    /// Sets the number of producer threads.
    #[must_use]
    pub fn producers(mut self, count: usize) -> Self {
        self.producers = count;
        self
    }

    /// Sets the number of consumer threads.
    #[must_use]
    pub fn consumers(mut self, count: usize) -> Self {
        self.consumers = count;
        self
    }

    /// Sets how many items each producer pushes.
    #[must_use]
    pub fn ops_each(mut self, count: usize) -> Self {
        self.ops_each = count;
        self
    }

    /// Bounds how long blocked calls may wait, counted from the start of
    /// each run.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Lets `token` interrupt blocked calls.
    #[must_use]
    pub fn cancel_on(mut self, token: &CancelToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    /// Items produced in total, which is also what the consumers take out.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.producers * self.ops_each
    }

    /// How many items consumer `index` takes; the remainder goes to the
    /// lowest indices.
    fn share(&self, index: usize) -> usize {
        let base = self.total() / self.consumers;
        let extra = usize::from(index < self.total() % self.consumers);
        base + extra
    }
}

impl Default for ManyToManyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `producers` threads each pushing `(producer, seq)` pairs and
/// `consumers` threads splitting the total between them.
///
/// Returns everything consumed, grouped per consumer in the order each
/// consumer saw it. With zero consumers (or zero producers) nothing runs.
///
/// # Errors
///
/// The first [`WaitError`] any thread hit, after every thread has joined.
pub fn run_many_to_many(
    buffer: &BoundedBuffer<(usize, usize)>,
    config: &ManyToManyConfig,
) -> Result<Vec<(usize, usize)>, WaitError> {
    if config.consumers == 0 || config.total() == 0 {
        return Ok(Vec::new());
    }

    tracing::debug!(
        "{} producers x {} items, {} consumers, capacity {}",
        config.producers,
        config.ops_each,
        config.consumers,
        buffer.capacity()
    );

    let wait = start_wait(config.timeout, config.cancel.as_ref());
    let wait = &wait;
    thread::scope(|scope| {
        let producers: Vec<_> = (0..config.producers)
            .map(|producer| {
                scope.spawn(move || -> Result<(), WaitError> {
                    for seq in 0..config.ops_each {
                        buffer
                            .produce_with((producer, seq), wait)
                            .map_err(|err| err.error())?;
                    }
                    Ok(())
                })
            })
            .collect();

        let consumers: Vec<_> = (0..config.consumers)
            .map(|consumer| {
                let share = config.share(consumer);
                scope.spawn(move || -> Result<Vec<(usize, usize)>, WaitError> {
                    (0..share)
                        .map(|_| buffer.consume_with(wait))
                        .collect()
                })
            })
            .collect();

        let mut first_error = None;
        for producer in producers {
            if let Err(err) = join(producer) {
                first_error.get_or_insert(err);
            }
        }

        let mut consumed = Vec::with_capacity(config.total());
        for consumer in consumers {
            match join(consumer) {
                Ok(items) => consumed.extend(items),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => {
                tracing::warn!("many-to-many run gave up: {err}");
                Err(err)
            }
            None => Ok(consumed),
        }
    })
}

/// The wait policy for a run starting now.
fn start_wait(timeout: Option<Duration>, cancel: Option<&CancelToken>) -> Wait {
    let mut wait = Wait::forever();
    if let Some(token) = cancel {
        wait = wait.with_cancel(token);
    }
    if let Some(timeout) = timeout {
        wait = wait.with_timeout(timeout);
    }
    wait
}

/// Joins a scoped thread, re-raising its panic on the caller.
fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        Err(payload) => panic::resume_unwind(payload),
    }
}
