use contend_testing::{CounterHarness, Strategy, WorkerPool};
use ntest::timeout;
use serial_test::serial;

const WORKER_COUNTS: [usize; 4] = [1, 2, 4, 8];
const INCREMENT_COUNTS: [usize; 2] = [100, 10_000];

#[test]
#[serial]
#[timeout(120000)]
fn synchronized_strategies_are_exact_for_every_grid_point() {
    let pool = WorkerPool::new(8).unwrap();
    let harness = CounterHarness::new(&pool);

    for strategy in Strategy::SYNCHRONIZED {
        for workers in WORKER_COUNTS {
            for increments in INCREMENT_COUNTS {
                let report = harness.run(strategy, workers, increments).unwrap();
                assert_eq!(
                    report.final_value,
                    (workers * increments) as u64,
                    "{strategy}: {workers} workers x {increments}"
                );
                assert!(!report.has_failures());
            }
        }
    }
}

#[test]
#[serial]
#[timeout(60000)]
fn more_workers_than_pool_threads_still_join_all() {
    let pool = WorkerPool::new(2).unwrap();
    let harness = CounterHarness::new(&pool);

    let report = harness.run(Strategy::Semaphore, 8, 1_000).unwrap();
    assert_eq!(report.final_value, 8_000);
    assert_eq!(report.worker_times.len(), 8);
}
