//! Render ordering
//!
//! Canvas renderers need every container before the nodes inside it. Nodes
//! are stable-sorted by `(depth, containers first, orderIndex, input position)`
//! where depth comes from the containment graph, so any nesting depth works.
//! Parent loops in malformed data only affect their own members.

use roadmap_model::{ContainmentGraph, Node};

/// Nodes in an order where every parent precedes its children
///
/// Parent links that loop are logged; the loop members are layered as roots
/// and the rest of the graph keeps its nesting order.
#[must_use]
pub fn order_for_render(nodes: &[Node]) -> Vec<Node> {
    let graph = ContainmentGraph::from_nodes(nodes);
    if let Err(e) = graph.depths() {
        tracing::warn!("containment loop rendered as top level: {}", e);
    }
    let depths = graph.layered_depths();

    let mut keyed: Vec<(usize, bool, i32, usize)> = nodes
        .iter()
        .enumerate()
        .map(|(position, node)| {
            (
                depths.get(&node.id).copied().unwrap_or(0),
                !node.is_container,
                node.order_index,
                position,
            )
        })
        .collect();
    keyed.sort_unstable();

    keyed
        .into_iter()
        .map(|(_, _, _, position)| nodes[position].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roadmap_model::{NodeColor, NodeId, NodeType, RoadmapId};

    fn node(id: &str, parent: Option<&str>, container: bool, order_index: i32) -> Node {
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
            order_index,
            is_optional: false,
            is_recommended: false,
            is_container: container,
        }
    }

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn child_listed_before_parent_is_moved_after() {
        let input = vec![node("n1", Some("c1"), false, 0), node("c1", None, true, 1)];
        assert_eq!(ids(&order_for_render(&input)), vec!["c1", "n1"]);
    }

    #[test]
    fn containers_lead_each_depth() {
        let input = vec![
            node("plain", None, false, 0),
            node("box", None, true, 5),
            node("inner-box", Some("box"), true, 3),
            node("leaf", Some("inner-box"), false, 0),
            node("sibling", Some("box"), false, 1),
        ];
        assert_eq!(
            ids(&order_for_render(&input)),
            vec!["box", "plain", "inner-box", "sibling", "leaf"]
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let input = vec![
            node("b", None, false, 0),
            node("a", None, false, 0),
            node("c", None, false, 0),
        ];
        assert_eq!(ids(&order_for_render(&input)), vec!["b", "a", "c"]);
    }

    #[test]
    fn loop_members_render_as_top_level() {
        let input = vec![
            node("x", Some("y"), true, 2),
            node("y", Some("x"), true, 1),
            node("z", None, false, 0),
        ];
        assert_eq!(ids(&order_for_render(&input)), vec!["y", "x", "z"]);
    }

    #[test]
    fn loop_does_not_disturb_well_formed_pairs() {
        let input = vec![
            node("x", Some("y"), false, 0),
            node("y", Some("x"), false, 0),
            node("c", None, true, 5),
            node("n", Some("c"), false, 0),
        ];
        assert_eq!(ids(&order_for_render(&input)), vec!["c", "x", "y", "n"]);
    }
}
