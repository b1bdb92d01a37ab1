//! Producer/consumer scenarios over a [`contend_sync::BoundedBuffer`].
//!
//! - [`run_producer_consumer`]: one paced producer and one paced consumer
//! - [`run_many_to_many`]: several producers and consumers sharing a buffer

pub mod producer_consumer;

pub use producer_consumer::{
    run_many_to_many, run_producer_consumer, ManyToManyConfig, ScenarioConfig, ScenarioOutcome,
};
