//! Harness, pool and scenario properties.

pub mod counter_correctness;
pub mod lab_config;
pub mod race_demonstration;
pub mod scenarios;
