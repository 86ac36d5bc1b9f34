//! Whole-graph projection
//!
//! Combines ordering, node projection and edge projection. Parent links to
//! nodes that are not part of the projected set are dropped so the canvas
//! never sees a dangling `parentId`.

use crate::config::FlowConfig;
use crate::edge::{connection_to_flow_edge_with, FlowEdge};
use crate::node::{node_to_flow_with, FlowNode};
use crate::order::order_for_render;
use roadmap_model::{Connection, Node, NodeId};
use std::collections::{HashMap, HashSet};

/// Builds flow view-models with fixed settings
#[derive(Debug, Clone, Default)]
pub struct FlowBuilder {
    config: FlowConfig,
}

impl FlowBuilder {
    #[inline]
    #[must_use]
    pub fn new(config: FlowConfig) -> Self {
        Self { config }
    }

    /// Settings in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Render-ordered flow nodes
    #[must_use]
    pub fn nodes(
        &self,
        nodes: &[Node],
        post_counts: &HashMap<NodeId, usize>,
        completed: &HashSet<NodeId>,
    ) -> Vec<FlowNode> {
        let present: HashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();

        let flow: Vec<FlowNode> = order_for_render(nodes)
            .iter()
            .map(|node| {
                let count = post_counts.get(&node.id).copied().unwrap_or(0);
                let mut flow =
                    node_to_flow_with(&self.config, node, count, completed.contains(&node.id));
                if let Some(parent) = &node.parent_id {
                    if !present.contains(parent) {
                        tracing::warn!(node_id = %node.id, parent_id = %parent, "parent not loaded, rendering at top level");
                        flow.detach();
                    }
                }
                flow
            })
            .collect();

        tracing::debug!(nodes = flow.len(), "built flow nodes");
        flow
    }

    /// Flow edges in connection order
    #[must_use]
    pub fn edges(&self, connections: &[Connection]) -> Vec<FlowEdge> {
        connections
            .iter()
            .map(|c| connection_to_flow_edge_with(&self.config, c))
            .collect()
    }
}

/// Render-ordered flow nodes with default settings
#[must_use]
pub fn build_flow_nodes(
    nodes: &[Node],
    post_counts: &HashMap<NodeId, usize>,
    completed: &HashSet<NodeId>,
) -> Vec<FlowNode> {
    FlowBuilder::default().nodes(nodes, post_counts, completed)
}

/// Flow edges with default settings
#[must_use]
pub fn build_flow_edges(connections: &[Connection]) -> Vec<FlowEdge> {
    FlowBuilder::default().edges(connections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_model::{NodeColor, NodeType, RoadmapId};

    fn node(id: &str, parent: Option<&str>, container: bool) -> Node {
        Node {
            id: NodeId::from(id),
            title: id.into(),
            description: None,
            node_type: NodeType::Topic,
            color: NodeColor::Yellow,
            icon: None,
            position_x: 0.0,
            position_y: 0.0,
            width: 200.0,
            height: 50.0,
            parent_id: parent.map(NodeId::from),
            roadmap_id: RoadmapId::from("r1"),
            order_index: 0,
            is_optional: false,
            is_recommended: false,
            is_container: container,
        }
    }

    #[test]
    fn counts_and_completion_are_attached() {
        let nodes = vec![node("a", None, false), node("b", None, false)];
        let counts = HashMap::from([(NodeId::from("a"), 3)]);
        let completed = HashSet::from([NodeId::from("b")]);

        let flow = build_flow_nodes(&nodes, &counts, &completed);

        assert_eq!(flow[0].data.post_count, 3);
        assert!(!flow[0].data.is_completed);
        assert_eq!(flow[1].data.post_count, 0);
        assert!(flow[1].data.is_completed);
    }

    #[test]
    fn dangling_parent_is_detached() {
        let nodes = vec![node("a", Some("gone"), false)];
        let flow = build_flow_nodes(&nodes, &HashMap::new(), &HashSet::new());
        assert_eq!(flow[0].parent_id, None);
        assert_eq!(flow[0].extent, None);
    }

    #[test]
    fn custom_handle_applies_to_containers() {
        let builder = FlowBuilder::new(FlowConfig::default().with_drag_handle(".grip"));
        let flow = builder.nodes(&[node("box", None, true)], &HashMap::new(), &HashSet::new());
        assert_eq!(flow[0].drag_handle.as_deref(), Some(".grip"));
    }
}
