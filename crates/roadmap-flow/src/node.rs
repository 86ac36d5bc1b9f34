//! Canvas nodes
//!
//! Serializes to the shape a node-graph canvas consumes: `type`, `position`,
//! `data`, and for containers an explicit size `style` plus a drag handle.
//! Parented nodes carry `parentId` and `extent: "parent"` so the canvas keeps
//! them inside their container.

use crate::config::FlowConfig;
use roadmap_model::{Node, NodeColor, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Canvas renderer used for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowNodeKind {
    #[serde(rename = "roadmapNode")]
    Roadmap,
    #[serde(rename = "containerNode")]
    Container,
}

/// Canvas coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Explicit size given to containers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowNodeStyle {
    pub width: f64,
    pub height: f64,
}

/// Movement bound of a child node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extent {
    Parent,
}

/// Payload rendered inside a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeData {
    pub title: String,
    pub description: Option<String>,
    pub node_type: NodeType,
    pub color: NodeColor,
    pub color_hex: String,
    pub icon: Option<String>,
    pub is_optional: bool,
    pub is_recommended: bool,
    pub is_container: bool,
    pub is_completed: bool,
    pub post_count: usize,
}

/// Renderable node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: FlowNodeKind,
    pub position: Position,
    pub data: FlowNodeData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<FlowNodeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,
}

impl FlowNode {
    /// Check if the node is a container box
    #[inline]
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.kind == FlowNodeKind::Container
    }

    /// Drop the parent link, e.g. when the parent is not rendered
    pub fn detach(&mut self) {
        self.parent_id = None;
        self.extent = None;
    }
}

/// Project a node with the given settings
#[must_use]
pub fn node_to_flow_with(
    config: &FlowConfig,
    node: &Node,
    linked_post_count: usize,
    is_completed: bool,
) -> FlowNode {
    let (kind, style, drag_handle) = if node.is_container {
        (
            FlowNodeKind::Container,
            Some(FlowNodeStyle {
                width: node.width,
                height: node.height,
            }),
            Some(config.container_drag_handle.clone()),
        )
    } else {
        (FlowNodeKind::Roadmap, None, None)
    };

    FlowNode {
        id: node.id.clone(),
        kind,
        position: Position {
            x: node.position_x,
            y: node.position_y,
        },
        data: FlowNodeData {
            title: node.title.clone(),
            description: node.description.clone(),
            node_type: node.node_type,
            color: node.color,
            color_hex: node.color.hex().to_string(),
            icon: node.icon.clone(),
            is_optional: node.is_optional,
            is_recommended: node.is_recommended,
            is_container: node.is_container,
            is_completed: is_completed && node.is_completable(),
            post_count: linked_post_count,
        },
        style,
        drag_handle,
        parent_id: node.parent_id.clone(),
        extent: node.parent_id.as_ref().map(|_| Extent::Parent),
    }
}

/// Project a node with default settings
#[must_use]
pub fn node_to_flow(node: &Node, linked_post_count: usize, is_completed: bool) -> FlowNode {
    node_to_flow_with(&FlowConfig::default(), node, linked_post_count, is_completed)
}
