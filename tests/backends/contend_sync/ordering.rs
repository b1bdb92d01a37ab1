use std::collections::HashMap;
use std::thread;

use contend_sync::{BoundedBuffer, BufferStyle};
use ntest::timeout;

use super::Jitter;

#[test]
#[timeout(30000)]
fn single_producer_single_consumer_is_fifo() {
    for style in BufferStyle::ALL {
        for seed in 0..4 {
            let buffer = BoundedBuffer::with_style(style, 4).unwrap();

            let consumed = thread::scope(|scope| {
                scope.spawn(|| {
                    let mut jitter = Jitter::new(seed, 100);
                    for item in 0..500 {
                        jitter.pause();
                        buffer.produce(item);
                    }
                });

                let mut jitter = Jitter::new(seed + 1_000, 100);
                (0..500)
                    .map(|_| {
                        jitter.pause();
                        buffer.consume()
                    })
                    .collect::<Vec<_>>()
            });

            assert_eq!(consumed, (0..500).collect::<Vec<_>>(), "{style} seed {seed}");
        }
    }
}

#[test]
#[timeout(30000)]
fn tagged_producers_lose_and_duplicate_nothing() {
    const PRODUCERS: usize = 5;
    const PER_PRODUCER: usize = 200;

    for style in BufferStyle::ALL {
        let buffer = BoundedBuffer::with_style(style, 3).unwrap();

        let consumed = thread::scope(|scope| {
            for producer in 0..PRODUCERS {
                let buffer = &buffer;
                scope.spawn(move || {
                    let mut jitter = Jitter::new(producer as u64, 50);
                    for seq in 0..PER_PRODUCER {
                        jitter.pause();
                        buffer.produce((producer, seq));
                    }
                });
            }

            (0..PRODUCERS * PER_PRODUCER)
                .map(|_| buffer.consume())
                .collect::<Vec<_>>()
        });

        let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
        for item in &consumed {
            *counts.entry(*item).or_default() += 1;
        }
        assert_eq!(counts.len(), PRODUCERS * PER_PRODUCER, "{style}: lost items");
        assert!(counts.values().all(|count| *count == 1), "{style}: duplicates");

        // Each producer's own items still come out in the order it pushed them.
        for producer in 0..PRODUCERS {
            let sequence: Vec<usize> = consumed
                .iter()
                .filter(|(tag, _)| *tag == producer)
                .map(|(_, seq)| *seq)
                .collect();
            assert_eq!(sequence, (0..PER_PRODUCER).collect::<Vec<_>>());
        }
    }
}

#[test]
#[timeout(15000)]
fn two_producers_two_consumers_do_not_deadlock() {
    for style in BufferStyle::ALL {
        let buffer = BoundedBuffer::with_style(style, 5).unwrap();

        let total: usize = thread::scope(|scope| {
            for producer in 0..2 {
                let buffer = &buffer;
                scope.spawn(move || {
                    for seq in 0..50 {
                        buffer.produce(producer * 100 + seq);
                    }
                });
            }

            let consumers: Vec<_> = (0..2)
                .map(|_| scope.spawn(|| (0..50).map(|_| buffer.consume()).count()))
                .collect();
            consumers.into_iter().map(|c| c.join().unwrap()).sum()
        });

        assert_eq!(total, 100, "{style}");
        assert!(buffer.is_empty());
        assert!(buffer.peak_len() <= 5);
    }
}
