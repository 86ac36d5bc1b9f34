//! Graph fixtures
//!
//! The sample roadmap (`rust`) looks like this:
//!
//! ```text
//! n-basics (container)
//!   n-ownership --> n-borrowing
//! n-async (optional) <-- n-borrowing  (recommended)
//! n-traits
//! ```
//!
//! `n-ownership` links post `p1`. A second, unpublished roadmap `go` holds a
//! single node `n-go`.

use roadmap_model::{
    Connection, ConnectionId, ConnectionType, Node, NodeColor, NodeId, NodeType, RoadmapId, Row,
};
use roadmap_store::{MemoryStore, Snapshot};
use serde_json::{json, Value};
use std::sync::Arc;

pub const SAMPLE_SLUG: &str = "rust";

/// Object literal as a row
pub fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap_or_default()
}

/// Topic node of roadmap `r-rust` with default geometry
pub fn node(id: &str) -> Node {
    Node {
        id: NodeId::from(id),
        title: id.to_string(),
        description: None,
        node_type: NodeType::Topic,
        color: NodeColor::Yellow,
        icon: None,
        position_x: 0.0,
        position_y: 0.0,
        width: 200.0,
        height: 50.0,
        parent_id: None,
        roadmap_id: RoadmapId::from("r-rust"),
        order_index: 0,
        is_optional: false,
        is_recommended: false,
        is_container: false,
    }
}

/// Container node with default container geometry
pub fn container(id: &str) -> Node {
    Node {
        width: 300.0,
        height: 200.0,
        is_container: true,
        ..node(id)
    }
}

pub fn connection(id: &str, from: &str, to: &str) -> Connection {
    Connection {
        id: ConnectionId::from(id),
        from_node_id: NodeId::from(from),
        to_node_id: NodeId::from(to),
        connection_type: ConnectionType::Default,
        label: None,
    }
}

fn node_row(id: &str, roadmap: &str, order: i32, extra: Value) -> Row {
    let mut row = row(json!({
        "id": id,
        "title": id.trim_start_matches("n-"),
        "roadmap_id": roadmap,
        "order_index": order,
        "position_x": 0.0,
        "position_y": f64::from(order) * 80.0,
        "width": 200.0,
        "height": 50.0,
    }));
    if let Value::Object(extra) = extra {
        row.extend(extra);
    }
    row
}

/// Table contents of the sample roadmaps
pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        roadmaps: vec![
            row(json!({
                "id": "r-rust", "title": "Rust", "slug": "rust", "is_published": true,
                "created_at": "2024-03-01T00:00:00Z", "updated_at": "2024-03-01T00:00:00Z",
            })),
            row(json!({
                "id": "r-go", "title": "Go", "slug": "go", "is_published": false,
                "created_at": "2024-02-01T00:00:00Z", "updated_at": "2024-02-01T00:00:00Z",
            })),
        ],
        roadmap_nodes: vec![
            node_row(
                "n-basics",
                "r-rust",
                0,
                json!({"is_container": true, "width": 300.0, "height": 200.0}),
            ),
            node_row("n-ownership", "r-rust", 1, json!({"parent_id": "n-basics", "position_y": 20.0})),
            node_row("n-borrowing", "r-rust", 2, json!({"parent_id": "n-basics", "position_y": 100.0})),
            node_row("n-async", "r-rust", 3, json!({"is_optional": true, "color": "blue"})),
            node_row("n-traits", "r-rust", 4, json!({"node_type": "resource"})),
            node_row("n-go", "r-go", 0, json!({})),
        ],
        roadmap_connections: vec![
            row(json!({"id": "c-1", "from_node_id": "n-ownership", "to_node_id": "n-borrowing"})),
            row(json!({
                "id": "c-2", "from_node_id": "n-borrowing", "to_node_id": "n-async",
                "connection_type": "recommended", "label": "next",
            })),
        ],
        roadmap_node_posts: vec![row(
            json!({"id": "l-1", "node_id": "n-ownership", "post_id": "p1", "order_index": 0}),
        )],
        posts: vec![
            row(json!({"id": "p1", "title": "Borrowing", "slug": "borrowing", "status": "published"})),
            row(json!({"id": "p2", "title": "Async", "slug": "async", "status": "published", "read_time": 7})),
            row(json!({"id": "p3", "title": "Draft", "slug": "draft", "status": "draft"})),
        ],
    }
}

/// Memory store holding [`sample_snapshot`]
pub fn sample_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_snapshot(sample_snapshot()))
}
