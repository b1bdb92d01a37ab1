use core::time::Duration;
use std::thread;

use contend_sync::{BoundedBuffer, BufferStyle, CancelToken, Wait, WaitError};
use ntest::timeout;
use tracing_test::traced_test;

#[test]
#[timeout(10000)]
fn cancelled_producer_gets_its_item_back_and_buffer_keeps_working() {
    for style in BufferStyle::ALL {
        let buffer = BoundedBuffer::with_style(style, 2).unwrap();
        buffer.produce(1);
        buffer.produce(2);

        let token = CancelToken::new();
        let blocked = {
            let buffer = buffer.clone();
            let token = token.clone();
            thread::spawn(move || buffer.produce_with(3, &Wait::cancellable(&token)))
        };

        thread::sleep(Duration::from_millis(30));
        assert!(token.cancel());
        let rejected = blocked.join().unwrap().unwrap_err();
        assert_eq!(rejected.error(), WaitError::Cancelled);
        assert_eq!(rejected.into_item(), 3);

        // Another thread can still use both ends.
        let other = {
            let buffer = buffer.clone();
            thread::spawn(move || {
                let first = buffer.consume();
                buffer.produce(4);
                first
            })
        };
        assert_eq!(other.join().unwrap(), 1);
        assert_eq!(buffer.snapshot(), vec![2, 4]);
    }
}

#[test]
#[timeout(10000)]
fn cancelled_consumer_leaves_buffer_usable() {
    for style in BufferStyle::ALL {
        let buffer: BoundedBuffer<u32> = BoundedBuffer::with_style(style, 3).unwrap();
        let token = CancelToken::new();

        let blocked = {
            let buffer = buffer.clone();
            let token = token.clone();
            thread::spawn(move || buffer.consume_with(&Wait::cancellable(&token)))
        };
        thread::sleep(Duration::from_millis(30));
        token.cancel();
        assert_eq!(blocked.join().unwrap(), Err(WaitError::Cancelled));

        let producer = {
            let buffer = buffer.clone();
            thread::spawn(move || (0..6).for_each(|item| buffer.produce(item)))
        };
        let consumed: Vec<u32> = (0..6).map(|_| buffer.consume()).collect();
        producer.join().unwrap();
        assert_eq!(consumed, (0..6).collect::<Vec<_>>());
    }
}

#[test]
#[traced_test]
#[timeout(10000)]
fn timeouts_are_reported_as_timeouts() {
    for style in BufferStyle::ALL {
        let buffer = BoundedBuffer::with_style(style, 1).unwrap();
        let wait = Wait::timeout(Duration::from_millis(20));

        assert_eq!(buffer.consume_with(&wait), Err(WaitError::TimedOut));
        buffer.produce('a');
        let rejected = buffer
            .produce_with('b', &Wait::timeout(Duration::from_millis(20)))
            .unwrap_err();
        assert!(rejected.error().is_timeout());
        assert_eq!(buffer.consume(), 'a');
    }
    assert!(logs_contain("consume gave up"));
    assert!(logs_contain("produce gave up"));
}

#[test]
#[timeout(10000)]
fn many_cancelled_waiters_do_not_starve_a_live_pair() {
    for style in BufferStyle::ALL {
        let buffer: BoundedBuffer<usize> = BoundedBuffer::with_style(style, 1).unwrap();
        let token = CancelToken::new();

        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let buffer = buffer.clone();
                let token = token.clone();
                thread::spawn(move || buffer.consume_with(&Wait::cancellable(&token)))
            })
            .collect();
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        for waiter in waiters {
            // A waiter can only win an item nobody produced yet, so all of them give up.
            assert_eq!(waiter.join().unwrap(), Err(WaitError::Cancelled));
        }

        let producer = {
            let buffer = buffer.clone();
            thread::spawn(move || (0..20).for_each(|item| buffer.produce(item)))
        };
        let sum: usize = (0..20).map(|_| buffer.consume()).sum();
        producer.join().unwrap();
        assert_eq!(sum, (0..20).sum());
    }
}
