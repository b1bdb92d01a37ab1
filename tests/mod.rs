//! Workspace-level tests exercising the contend crates together.

#![cfg(test)]

pub mod backends;
