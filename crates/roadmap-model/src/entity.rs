//! In-memory entities
//!
//! These are the camelCase shapes handed to the editor and viewer. Storage rows
//! live in [`crate::row`]; the transforms between the two are the only place
//! field names change.

use crate::ids::{ConnectionId, NodeId, NodePostId, PostId, RoadmapId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of topic a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Headline milestone
    Main,
    /// Regular topic
    #[default]
    Topic,
    /// Nested detail of a topic
    Subtopic,
    /// External resource
    Resource,
}

impl NodeType {
    /// Storage spelling
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Topic => "topic",
            Self::Subtopic => "subtopic",
            Self::Resource => "resource",
        }
    }

    /// Narrow a free-form storage string
    ///
    /// Unknown values fall back to [`NodeType::Topic`].
    #[must_use]
    pub fn from_storage(raw: &str) -> Self {
        match raw {
            "main" => Self::Main,
            "topic" => Self::Topic,
            "subtopic" => Self::Subtopic,
            "resource" => Self::Resource,
            other => {
                tracing::warn!(value = other, "unknown node type, using topic");
                Self::Topic
            }
        }
    }
}

/// Node accent color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeColor {
    /// Default accent
    #[default]
    Yellow,
    Purple,
    Gray,
    Green,
    Blue,
    Orange,
}

impl NodeColor {
    /// All colors in palette order
    pub const ALL: [NodeColor; 6] = [
        Self::Yellow,
        Self::Purple,
        Self::Gray,
        Self::Green,
        Self::Blue,
        Self::Orange,
    ];

    /// Storage spelling
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Gray => "gray",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Orange => "orange",
        }
    }

    /// Render color for the canvas
    #[inline]
    #[must_use]
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Yellow => "#facc15",
            Self::Purple => "#a855f7",
            Self::Gray => "#9ca3af",
            Self::Green => "#22c55e",
            Self::Blue => "#3b82f6",
            Self::Orange => "#f97316",
        }
    }

    /// Narrow a free-form storage string
    ///
    /// Unknown values fall back to [`NodeColor::Yellow`].
    #[must_use]
    pub fn from_storage(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == raw)
            .unwrap_or_else(|| {
                tracing::warn!(value = raw, "unknown node color, using yellow");
                Self::Yellow
            })
    }
}

/// Semantics of a directed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Default,
    Optional,
    Recommended,
}

impl ConnectionType {
    /// Storage spelling
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Optional => "optional",
            Self::Recommended => "recommended",
        }
    }

    /// Narrow a free-form storage string
    ///
    /// Unknown values fall back to [`ConnectionType::Default`].
    #[must_use]
    pub fn from_storage(raw: &str) -> Self {
        match raw {
            "default" => Self::Default,
            "optional" => Self::Optional,
            "recommended" => Self::Recommended,
            other => {
                tracing::warn!(value = other, "unknown connection type, using default");
                Self::Default
            }
        }
    }
}

/// A learning path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub id: RoadmapId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A topic, resource or container placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    pub description: Option<String>,
    pub node_type: NodeType,
    pub color: NodeColor,
    pub icon: Option<String>,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    pub parent_id: Option<NodeId>,
    pub roadmap_id: RoadmapId,
    pub order_index: i32,
    pub is_optional: bool,
    pub is_recommended: bool,
    pub is_container: bool,
}

impl Node {
    /// Whether the node counts towards progress
    #[inline]
    #[must_use]
    pub fn is_completable(&self) -> bool {
        !self.is_container
    }
}

/// Directed association between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    pub connection_type: ConnectionType,
    pub label: Option<String>,
}

impl Connection {
    /// Whether either endpoint is `node`
    #[inline]
    #[must_use]
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.from_node_id == node || &self.to_node_id == node
    }
}

/// Link from a node to a content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePost {
    pub id: NodePostId,
    pub node_id: NodeId,
    pub post_id: PostId,
    pub order_index: i32,
}

/// Post supplied by the content subsystem (read-only here)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPost {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub status: String,
    pub read_time: Option<u32>,
}

impl ExternalPost {
    /// Status value of posts visible to readers
    pub const PUBLISHED: &'static str = "published";

    /// Whether the post may be offered for linking
    #[inline]
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == Self::PUBLISHED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_enum_values_fall_back() {
        assert_eq!(NodeType::from_storage("chapter"), NodeType::Topic);
        assert_eq!(NodeColor::from_storage("magenta"), NodeColor::Yellow);
        assert_eq!(ConnectionType::from_storage(""), ConnectionType::Default);
    }

    #[test]
    fn known_enum_values_round_trip_storage_spelling() {
        for color in NodeColor::ALL {
            assert_eq!(NodeColor::from_storage(color.as_str()), color);
        }
        assert_eq!(NodeType::from_storage("subtopic"), NodeType::Subtopic);
        assert_eq!(
            ConnectionType::from_storage("recommended"),
            ConnectionType::Recommended
        );
    }

    #[test]
    fn every_color_has_a_hex_value() {
        for color in NodeColor::ALL {
            assert!(color.hex().starts_with('#'));
            assert_eq!(color.hex().len(), 7);
        }
    }

    #[test]
    fn node_serializes_camel_case() {
        let node = Node {
            id: NodeId::from("n1"),
            title: "Ownership".into(),
            description: None,
            node_type: NodeType::Topic,
            color: NodeColor::Blue,
            icon: None,
            position_x: 1.0,
            position_y: 2.0,
            width: 200.0,
            height: 50.0,
            parent_id: Some(NodeId::from("c1")),
            roadmap_id: RoadmapId::from("r1"),
            order_index: 0,
            is_optional: false,
            is_recommended: true,
            is_container: false,
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["parentId"], "c1");
        assert_eq!(json["nodeType"], "topic");
        assert_eq!(json["isRecommended"], true);
    }
}
