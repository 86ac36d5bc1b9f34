//! Roadmap Progress - per-viewer completion tracking
//!
//! Progress lives on the viewer's device, not in the database:
//! - `KeyValueStore`: local durable storage (memory or one file per key)
//! - `ViewerKey`: identified user or the anonymous sentinel
//! - `ProgressTracker`: toggle, summarize, reset and purge completion per
//!   viewer and roadmap

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod record;
pub mod storage;
pub mod tracker;
pub mod viewer;

pub use error::ProgressError;
pub use record::ProgressRecord;
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use tracker::{Progress, ProgressTracker};
pub use viewer::{ProgressConfig, ViewerKey};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
