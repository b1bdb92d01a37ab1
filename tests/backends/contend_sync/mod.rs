//! Buffer-level properties, checked for both synchronization styles.

pub mod cancellation;
pub mod capacity_properties;
pub mod ordering;

use core::time::Duration;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic per-thread pauses so each seed replays the same schedule
/// pressure.
pub(crate) struct Jitter {
    rng: ChaCha8Rng,
    max_micros: u64,
}

impl Jitter {
    pub(crate) fn new(seed: u64, max_micros: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_micros,
        }
    }

    /// Sleeps a random slice, or just yields about a third of the time.
    pub(crate) fn pause(&mut self) {
        if self.rng.random_bool(0.3) {
            std::thread::yield_now();
        } else {
            let micros = self.rng.random_range(0..=self.max_micros);
            std::thread::sleep(Duration::from_micros(micros));
        }
    }

    pub(crate) fn pick(&mut self, upper: usize) -> usize {
        self.rng.random_range(1..=upper)
    }
}
