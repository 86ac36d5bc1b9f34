//! Roadmap Model - graph entities and their storage shape
//!
//! Pure, I/O-free building blocks shared by every other crate:
//! - Entities (`Roadmap`, `Node`, `Connection`, `NodePost`, `ExternalPost`)
//! - Storage rows and the row → entity transforms
//! - Create payloads and partial-update patches
//! - Containment graph (parent/child nesting) and referential validation
//!
//! # Example
//!
//! ```rust
//! use roadmap_model::{validate_new_node, validate_slug, NodePatch, NewNode, NodeDefaults};
//!
//! let new = NewNode::new("r1", "Ownership");
//! assert!(validate_new_node(&[], &new).is_ok());
//! assert!(validate_slug("Not A Slug").is_err());
//!
//! let row = new.to_row(&NodeDefaults::default(), 0);
//! assert_eq!(row["node_type"], "topic");
//!
//! let patch = NodePatch::new().position(40.0, 80.0);
//! assert_eq!(patch.to_row().len(), 2);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod containment;
pub mod entity;
pub mod error;
pub mod ids;
pub mod patch;
pub mod row;
pub mod validation;

pub use containment::ContainmentGraph;
pub use entity::{
    Connection, ConnectionType, ExternalPost, Node, NodeColor, NodePost, NodeType, Roadmap,
};
pub use error::ValidationError;
pub use ids::{ConnectionId, NodeId, NodePostId, PostId, RoadmapId};
pub use patch::{
    ConnectionPatch, NewConnection, NewNode, NewRoadmap, NodeDefaults, NodePatch, RoadmapPatch,
};
pub use row::{
    from_row, to_row, transform_connection, transform_node, transform_node_post, transform_post,
    transform_roadmap, ConnectionRow, NodePostRow, NodeRow, PostRow, RoadmapRow, Row,
};
pub use validation::{
    audit, validate_connection_patch, validate_endpoints, validate_new_connection,
    validate_new_node, validate_node_patch, validate_parent, validate_slug, validate_title,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
