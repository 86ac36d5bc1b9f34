//! Canvas edges
//!
//! | connection    | routing      | stroke    | dashed | animated |
//! |---------------|--------------|-----------|--------|----------|
//! | `default`     | `smoothstep` | neutral   | no     | no       |
//! | `optional`    | `step`       | neutral   | yes    | no       |
//! | `recommended` | `smoothstep` | highlight | no     | yes      |

use crate::config::FlowConfig;
use roadmap_model::{Connection, ConnectionId, ConnectionType, NodeId};
use serde::{Deserialize, Serialize};

/// Edge routing style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRouting {
    Step,
    SmoothStep,
}

/// Stroke settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
}

/// Extra edge payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdgeData {
    pub connection_type: ConnectionType,
}

/// Renderable edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: ConnectionId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub routing: EdgeRouting,
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub style: EdgeStyle,
    pub data: FlowEdgeData,
}

impl FlowEdge {
    /// Check if the stroke is dashed
    #[inline]
    #[must_use]
    pub fn is_dashed(&self) -> bool {
        self.style.stroke_dasharray.is_some()
    }
}

/// Project a connection with the given settings
#[must_use]
pub fn connection_to_flow_edge_with(config: &FlowConfig, connection: &Connection) -> FlowEdge {
    let (routing, stroke, dash, animated) = match connection.connection_type {
        ConnectionType::Optional => (
            EdgeRouting::Step,
            &config.neutral_stroke,
            Some(config.optional_dash.clone()),
            false,
        ),
        ConnectionType::Recommended => {
            (EdgeRouting::SmoothStep, &config.highlight_stroke, None, true)
        }
        ConnectionType::Default => (EdgeRouting::SmoothStep, &config.neutral_stroke, None, false),
    };

    FlowEdge {
        id: connection.id.clone(),
        source: connection.from_node_id.clone(),
        target: connection.to_node_id.clone(),
        routing,
        animated,
        label: connection.label.clone(),
        style: EdgeStyle {
            stroke: stroke.clone(),
            stroke_width: config.stroke_width,
            stroke_dasharray: dash,
        },
        data: FlowEdgeData {
            connection_type: connection.connection_type,
        },
    }
}

/// Project a connection with default settings
#[must_use]
pub fn connection_to_flow_edge(connection: &Connection) -> FlowEdge {
    connection_to_flow_edge_with(&FlowConfig::default(), connection)
}
