use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use contend_sync::{BoundedBuffer, BufferStyle};
use ntest::timeout;
use serial_test::serial;

use super::Jitter;

/// Splits `total` into `parts` shares, remainder going to the lowest indices.
fn split(total: usize, parts: usize) -> Vec<usize> {
    (0..parts)
        .map(|index| total / parts + usize::from(index < total % parts))
        .collect()
}

/// Runs one randomized interleaving and returns every length sampled while
/// it was in flight.
fn run_interleaving(style: BufferStyle, seed: u64) -> (usize, Vec<usize>, usize) {
    let mut plan = Jitter::new(seed, 0);
    let capacity = plan.pick(6);
    let total = plan.pick(10 * capacity);
    let producers = plan.pick(3);
    let consumers = plan.pick(3);

    let buffer = BoundedBuffer::with_style(style, capacity).unwrap();
    let done = AtomicBool::new(false);

    let samples = thread::scope(|scope| {
        let sampler = scope.spawn(|| {
            let mut samples = Vec::new();
            while !done.load(Ordering::Acquire) {
                samples.push(buffer.len());
                thread::yield_now();
            }
            samples
        });

        let mut workers = Vec::new();
        for (index, share) in split(total, producers).into_iter().enumerate() {
            let buffer = &buffer;
            workers.push(scope.spawn(move || {
                let mut jitter = Jitter::new(seed ^ ((index as u64 + 1) << 8), 200);
                for item in 0..share {
                    jitter.pause();
                    buffer.produce(item);
                }
            }));
        }
        for (index, share) in split(total, consumers).into_iter().enumerate() {
            let buffer = &buffer;
            workers.push(scope.spawn(move || {
                let mut jitter = Jitter::new(seed ^ ((index as u64 + 1) << 16), 200);
                for _ in 0..share {
                    jitter.pause();
                    buffer.consume();
                }
            }));
        }

        for worker in workers {
            worker.join().unwrap();
        }
        done.store(true, Ordering::Release);
        sampler.join().unwrap()
    });

    assert!(buffer.is_empty(), "everything produced was consumed");
    (capacity, samples, buffer.peak_len())
}

#[test]
#[serial]
#[timeout(120000)]
fn length_never_exceeds_capacity_under_random_interleavings() {
    for style in BufferStyle::ALL {
        for seed in 0..16 {
            let (capacity, samples, peak) = run_interleaving(style, seed);

            assert!(peak <= capacity, "{style} seed {seed}: peak {peak} > {capacity}");
            if let Some(max) = samples.iter().max() {
                assert!(*max <= capacity, "{style} seed {seed}: sampled {max} > {capacity}");
            }
        }
    }
}

#[test]
#[timeout(20000)]
fn single_slot_buffer_alternates() {
    for style in BufferStyle::ALL {
        let buffer = BoundedBuffer::with_style(style, 1).unwrap();

        thread::scope(|scope| {
            scope.spawn(|| {
                for item in 0..100 {
                    buffer.produce(item);
                    assert!(buffer.len() <= 1);
                }
            });
            for expected in 0..100 {
                assert_eq!(buffer.consume(), expected);
            }
        });

        assert_eq!(buffer.peak_len(), 1);
    }
}

#[test]
fn split_covers_the_total() {
    assert_eq!(split(10, 3), vec![4, 3, 3]);
    assert_eq!(split(2, 3), vec![1, 1, 0]);
    assert_eq!(split(7, 1), vec![7]);
}
