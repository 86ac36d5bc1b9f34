//! Storage rows and row → entity transforms
//!
//! Rows mirror the relational schema: snake_case keys, nullable columns, and
//! enum columns stored as free text. Every column a row reader may see as
//! `null` or missing is an `Option` here; the transforms coerce them into the
//! entity shape.

use crate::entity::{
    Connection, ConnectionType, ExternalPost, Node, NodeColor, NodePost, NodeType, Roadmap,
};
use crate::ids::{ConnectionId, NodeId, NodePostId, PostId, RoadmapId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A raw storage row
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Width used when a non-container row has no width
pub const DEFAULT_NODE_WIDTH: f64 = 200.0;
/// Height used when a non-container row has no height
pub const DEFAULT_NODE_HEIGHT: f64 = 50.0;
/// Width used when a container row has no width
pub const DEFAULT_CONTAINER_WIDTH: f64 = 300.0;
/// Height used when a container row has no height
pub const DEFAULT_CONTAINER_HEIGHT: f64 = 200.0;

/// Decode a raw row into a typed row
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::Object(row))
}

/// Encode a typed value into a raw row
///
/// # Errors
/// Fails when `value` does not serialize to a JSON object.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, serde_json::Error> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected an object row, got {other}"
        ))),
    }
}

/// `roadmaps` table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapRow {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `roadmap_nodes` table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub position_x: Option<f64>,
    #[serde(default)]
    pub position_y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub roadmap_id: String,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default)]
    pub is_optional: Option<bool>,
    #[serde(default)]
    pub is_recommended: Option<bool>,
    #[serde(default)]
    pub is_container: Option<bool>,
}

/// `roadmap_connections` table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    #[serde(default)]
    pub connection_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// `roadmap_node_posts` table row, optionally carrying the joined post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePostRow {
    pub id: String,
    pub node_id: String,
    pub post_id: String,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<PostRow>,
}

/// `posts` table row (content subsystem)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRow {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub status: String,
    #[serde(default)]
    pub read_time: Option<u32>,
}

/// Row → [`Roadmap`]
#[must_use]
pub fn transform_roadmap(row: RoadmapRow) -> Roadmap {
    Roadmap {
        id: RoadmapId(row.id),
        title: row.title,
        slug: row.slug,
        description: row.description,
        icon: row.icon,
        is_published: row.is_published.unwrap_or(false),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Row → [`Node`]
///
/// Missing dimensions fall back to the node or container defaults.
#[must_use]
pub fn transform_node(row: NodeRow) -> Node {
    let is_container = row.is_container.unwrap_or(false);
    let (default_width, default_height) = if is_container {
        (DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT)
    } else {
        (DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)
    };

    Node {
        id: NodeId(row.id),
        title: row.title,
        description: row.description,
        node_type: row
            .node_type
            .as_deref()
            .map(NodeType::from_storage)
            .unwrap_or_default(),
        color: row
            .color
            .as_deref()
            .map(NodeColor::from_storage)
            .unwrap_or_default(),
        icon: row.icon,
        position_x: row.position_x.unwrap_or(0.0),
        position_y: row.position_y.unwrap_or(0.0),
        width: row.width.unwrap_or(default_width),
        height: row.height.unwrap_or(default_height),
        parent_id: row.parent_id.map(NodeId),
        roadmap_id: RoadmapId(row.roadmap_id),
        order_index: row.order_index.unwrap_or(0),
        is_optional: row.is_optional.unwrap_or(false),
        is_recommended: row.is_recommended.unwrap_or(false),
        is_container,
    }
}

/// Row → [`Connection`]
#[must_use]
pub fn transform_connection(row: ConnectionRow) -> Connection {
    Connection {
        id: ConnectionId(row.id),
        from_node_id: NodeId(row.from_node_id),
        to_node_id: NodeId(row.to_node_id),
        connection_type: row
            .connection_type
            .as_deref()
            .map(ConnectionType::from_storage)
            .unwrap_or_default(),
        label: row.label,
    }
}

/// Row → [`NodePost`], dropping any joined post
#[must_use]
pub fn transform_node_post(row: NodePostRow) -> NodePost {
    NodePost {
        id: NodePostId(row.id),
        node_id: NodeId(row.node_id),
        post_id: PostId(row.post_id),
        order_index: row.order_index.unwrap_or(0),
    }
}

/// Row → [`ExternalPost`]
#[must_use]
pub fn transform_post(row: PostRow) -> ExternalPost {
    ExternalPost {
        id: PostId(row.id),
        title: row.title,
        slug: row.slug,
        excerpt: row.excerpt,
        status: row.status,
        read_time: row.read_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn node_row_coerces_nulls_and_renames_fields() {
        let raw = row(json!({
            "id": "n1",
            "title": "Borrowing",
            "description": null,
            "node_type": "subtopic",
            "color": "green",
            "position_x": 10.5,
            "position_y": -4.0,
            "parent_id": "c1",
            "roadmap_id": "r1",
            "order_index": 3,
            "is_optional": true
        }));

        let node = transform_node(from_row(raw).unwrap());

        assert_eq!(node.id, NodeId::from("n1"));
        assert_eq!(node.description, None);
        assert_eq!(node.node_type, NodeType::Subtopic);
        assert_eq!(node.color, NodeColor::Green);
        assert_eq!(node.position_x, 10.5);
        assert_eq!(node.parent_id, Some(NodeId::from("c1")));
        assert_eq!(node.order_index, 3);
        assert!(node.is_optional);
        assert!(!node.is_recommended);
        assert!(!node.is_container);
        assert_eq!((node.width, node.height), (200.0, 50.0));
    }

    #[test]
    fn container_row_without_size_gets_container_defaults() {
        let raw = row(json!({
            "id": "c1",
            "title": "Basics",
            "roadmap_id": "r1",
            "is_container": true
        }));

        let node = transform_node(from_row(raw).unwrap());
        assert!(node.is_container);
        assert_eq!((node.width, node.height), (300.0, 200.0));
    }

    #[test]
    fn connection_row_narrows_type() {
        let raw = row(json!({
            "id": "e1",
            "from_node_id": "a",
            "to_node_id": "b",
            "connection_type": "optional",
            "label": "next"
        }));

        let conn = transform_connection(from_row(raw).unwrap());
        assert_eq!(conn.connection_type, ConnectionType::Optional);
        assert_eq!(conn.label.as_deref(), Some("next"));
    }

    #[test]
    fn roadmap_row_defaults_unpublished() {
        let raw = row(json!({
            "id": "r1",
            "title": "Rust",
            "slug": "rust",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }));

        let roadmap = transform_roadmap(from_row(raw).unwrap());
        assert!(!roadmap.is_published);
        assert_eq!(roadmap.slug, "rust");
    }

    #[test]
    fn node_post_row_with_join_decodes() {
        let raw = row(json!({
            "id": "l1",
            "node_id": "n1",
            "post_id": "p1",
            "order_index": 0,
            "post": {"id": "p1", "title": "Intro", "slug": "intro", "status": "published"}
        }));

        let link: NodePostRow = from_row(raw).unwrap();
        let post = transform_post(link.post.clone().unwrap());
        assert_eq!(post.title, "Intro");
        assert!(post.is_published());
        assert_eq!(transform_node_post(link).post_id, PostId::from("p1"));
    }

    #[test]
    fn to_row_rejects_non_objects() {
        assert!(to_row(&42).is_err());
        assert!(to_row(&json!({"a": 1})).is_ok());
    }
}
