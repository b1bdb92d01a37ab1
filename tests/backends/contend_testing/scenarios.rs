use core::time::Duration;
use std::collections::HashSet;

use contend_sync::{BoundedBuffer, BufferStyle};
use contend_testing::{run_many_to_many, run_producer_consumer, ManyToManyConfig, ScenarioConfig};
use ntest::timeout;
use serial_test::serial;

#[test]
#[serial]
#[timeout(30000)]
fn capacity_five_demo_delivers_in_order_for_both_styles() {
    for style in BufferStyle::ALL {
        let buffer = BoundedBuffer::with_style(style, 5).unwrap();
        let config = ScenarioConfig::new()
            .producer_delay(Duration::from_millis(10))
            .consumer_delay(Duration::from_millis(50));

        let outcome = run_producer_consumer(&buffer, &config).unwrap();

        assert_eq!(outcome.consumed, (0..10).collect::<Vec<_>>(), "{style}");
        assert!(outcome.peak_len <= 5, "{style}");
        assert!(outcome.elapsed < Duration::from_secs(10));
    }
}

#[test]
#[timeout(15000)]
fn two_by_two_with_fifty_each_completes() {
    for style in BufferStyle::ALL {
        let buffer = BoundedBuffer::with_style(style, 5).unwrap();
        let config = ManyToManyConfig::new()
            .producers(2)
            .consumers(2)
            .ops_each(50)
            .timeout(Duration::from_secs(10));

        let consumed = run_many_to_many(&buffer, &config).unwrap();
        let unique: HashSet<_> = consumed.iter().copied().collect();
        assert_eq!(unique.len(), 100, "{style}");
        assert!(buffer.peak_len() <= 5);
    }
}
