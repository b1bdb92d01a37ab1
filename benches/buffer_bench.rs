use contend_sync::{BoundedBuffer, BufferStyle, Wait};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::thread;
use std::time::Duration;

/// Produce then consume on one thread, never blocking.
fn bench_buffer_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_round_trip_uncontended");

    for style in BufferStyle::ALL {
        group.bench_function(style.name(), |b| {
            let buffer = BoundedBuffer::with_style(style, 16).unwrap();
            b.iter(|| {
                buffer.produce(black_box(7u64));
                black_box(buffer.consume());
            });
        });
    }

    group.finish();
}

/// One producer and one consumer pushing 10k items through small buffers.
fn bench_buffer_handoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_handoff_10k");
    group.sample_size(10);

    for style in BufferStyle::ALL {
        for capacity in [1, 5, 64] {
            group.bench_with_input(
                BenchmarkId::new(style.name(), capacity),
                &capacity,
                |b, &capacity| {
                    b.iter_batched(
                        || BoundedBuffer::with_style(style, capacity).unwrap(),
                        |buffer| {
                            thread::scope(|scope| {
                                scope.spawn(|| {
                                    (0..10_000u64).for_each(|item| buffer.produce(item));
                                });
                                let sum: u64 = (0..10_000).map(|_| buffer.consume()).sum();
                                black_box(sum);
                            });
                        },
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }

    group.finish();
}

/// Cost of a bounded wait that runs out.
fn bench_consume_timeout(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_consume_timeout_1ms");

    for style in BufferStyle::ALL {
        group.bench_function(style.name(), |b| {
            let buffer: BoundedBuffer<u64> = BoundedBuffer::with_style(style, 1).unwrap();
            b.iter(|| {
                let result = buffer.consume_with(&Wait::timeout(Duration::from_millis(1)));
                black_box(result.is_err());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_buffer_uncontended,
    bench_buffer_handoff,
    bench_consume_timeout
);
criterion_main!(benches);
