//! Testing utilities for the roadmap workspace
//!
//! Shared fixtures and a row store that fails on demand.

#![allow(missing_docs)]

mod fixtures;
mod flaky;

pub use fixtures::{
    connection, container, node, row, sample_snapshot, sample_store, SAMPLE_SLUG,
};
pub use flaky::{FlakyStore, Operation};
