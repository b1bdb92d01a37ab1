use contend_config::{from_str, LabConfig};
use contend_sync::{BoundedBuffer, BufferStyle};
use contend_testing::{run_producer_consumer, CounterHarness, WorkerPool};
use ntest::timeout;

const LAB: &str = r#"
[counter]
workers = 3
increments = 500
strategies = ["mutex", "lock"]

[buffer]
style = "semaphore"
capacity = 2
items = 6
producer_delay_ms = 0
consumer_delay_ms = 1
timeout_ms = 5000
"#;

#[test]
#[timeout(20000)]
fn config_file_drives_both_runs() {
    let config: LabConfig = from_str(LAB).unwrap();
    config.validate().unwrap();

    let pool = WorkerPool::new(config.counter.workers).unwrap();
    let harness = CounterHarness::new(&pool);
    let reports = harness
        .compare(&config.counter.harness_config(), &config.counter.strategies)
        .unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|report| report.final_value == 1_500));

    assert_eq!(config.buffer.style, BufferStyle::Semaphore);
    let buffer = BoundedBuffer::with_style(config.buffer.style, config.buffer.capacity).unwrap();
    let outcome = run_producer_consumer(&buffer, &config.buffer.scenario_config()).unwrap();
    assert_eq!(outcome.consumed, (0..6).collect::<Vec<_>>());
    assert!(outcome.peak_len <= 2);
}
