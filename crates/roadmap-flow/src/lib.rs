//! Roadmap Flow - canvas view-model for roadmap graphs
//!
//! Turns the persisted graph into what a node-graph canvas renders:
//! - `FlowNode` / `FlowEdge` projections of nodes and connections
//! - a render ordering that puts every container before its children
//! - the soft bound keeping children inside their container
//! - editor interaction state (selection, gesture buffering)
//!
//! # Example
//!
//! ```rust
//! use roadmap_flow::build_flow_edges;
//! use roadmap_model::{Connection, ConnectionId, ConnectionType, NodeId};
//!
//! let edges = build_flow_edges(&[Connection {
//!     id: ConnectionId::from("e1"),
//!     from_node_id: NodeId::from("a"),
//!     to_node_id: NodeId::from("b"),
//!     connection_type: ConnectionType::Optional,
//!     label: None,
//! }]);
//! assert!(edges[0].is_dashed());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod builder;
pub mod config;
pub mod edge;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod node;
pub mod order;

pub use builder::{build_flow_edges, build_flow_nodes, FlowBuilder};
pub use config::FlowConfig;
pub use edge::{
    connection_to_flow_edge, connection_to_flow_edge_with, EdgeRouting, EdgeStyle, FlowEdge,
    FlowEdgeData,
};
pub use editor::{
    EditorSelection, GestureBuffer, GestureKind, SelectionEvent, SelectionPhase,
};
pub use error::SelectionError;
pub use geometry::{clamp_to_parent, Rect};
pub use node::{
    node_to_flow, node_to_flow_with, Extent, FlowNode, FlowNodeData, FlowNodeKind, FlowNodeStyle,
    Position,
};
pub use order::order_for_render;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
