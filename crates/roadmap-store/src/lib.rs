//! Roadmap Store - persistence gateway for roadmap graphs
//!
//! - `RowStore`: async seam over a row-oriented relational store
//! - `MemoryStore`: in-process store with the schema's constraints and
//!   cascades, loadable from a JSON snapshot
//! - `RoadmapGateway`: CRUD over roadmaps, nodes, connections and post links,
//!   keeping the current roadmap's graph in memory
//!
//! # Example
//!
//! ```rust,no_run
//! use roadmap_store::{MemoryStore, RoadmapGateway};
//! use roadmap_model::NewRoadmap;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), roadmap_store::GatewayError> {
//! let gateway = RoadmapGateway::new(Arc::new(MemoryStore::new()));
//! let roadmap = gateway
//!     .create_roadmap(NewRoadmap::new("Rust").with_slug("rust"))
//!     .await?;
//! let graph = gateway.fetch_roadmap_by_slug(&roadmap.slug).await?;
//! assert!(graph.nodes.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod query;
pub mod state;

pub use backend::RowStore;
pub use error::{GatewayError, StoreError};
pub use gateway::RoadmapGateway;
pub use memory::{MemoryStore, Snapshot};
pub use query::{Embed, Filter, OrderBy, Query, Table};
pub use state::{GraphState, LinkedPost, RemovedCascade, RoadmapGraph};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
