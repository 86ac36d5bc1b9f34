//! Roadmap Core - service facade over the roadmap graph
//!
//! Composes the pieces the viewer and editor use:
//! - persistence gateway (`roadmap-store`)
//! - per-viewer progress (`roadmap-progress`)
//! - canvas view-model and editor state (`roadmap-flow`)
//!
//! # Example
//!
//! ```rust,no_run
//! use roadmap_core::{RoadmapConfig, RoadmapService};
//! use roadmap_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), roadmap_core::RoadmapError> {
//! let service = RoadmapService::from_config(Arc::new(MemoryStore::new()), RoadmapConfig::default());
//! service.fetch_roadmap_by_slug("rust").await?;
//! let nodes = service.get_flow_nodes();
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod editor;
pub mod error;
pub mod service;
pub mod session;

pub use config::{ConfigError, RoadmapConfig};
pub use editor::EditorState;
pub use error::RoadmapError;
pub use service::RoadmapService;
pub use session::Session;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
