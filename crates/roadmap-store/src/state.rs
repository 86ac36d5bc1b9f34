//! In-memory graph state held by the gateway
//!
//! One roadmap is "current" at a time. Its nodes, connections and post links
//! are kept here so the view layer can read them without touching storage.

use indexmap::IndexMap;
use roadmap_model::{Connection, ConnectionId, ExternalPost, Node, NodeId, NodePost, PostId, Roadmap};
use serde::Serialize;
use std::collections::HashMap;

/// A node-post link with its joined post, if the post still exists
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedPost {
    pub link: NodePost,
    pub post: Option<ExternalPost>,
}

/// Result of loading a roadmap
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapGraph {
    pub roadmap: Roadmap,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub node_posts: IndexMap<NodeId, Vec<ExternalPost>>,
}

/// What a cascading node removal took out of the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovedCascade {
    pub connections: usize,
    pub links: usize,
    pub orphaned_children: usize,
}

/// Gateway-owned view of storage
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    pub roadmaps: Vec<Roadmap>,
    pub current: Option<Roadmap>,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub node_posts: Vec<LinkedPost>,
    pub last_error: Option<String>,
}

impl GraphState {
    /// Loaded node by id
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Loaded connection by id
    #[must_use]
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.id == id)
    }

    /// Order index a new node gets when none is requested
    #[must_use]
    pub fn next_order_index(&self) -> i32 {
        i32::try_from(self.nodes.len()).unwrap_or(i32::MAX)
    }

    /// Order index a new link on `node` gets
    #[must_use]
    pub fn next_link_index(&self, node: &NodeId) -> i32 {
        let count = self.node_posts.iter().filter(|l| &l.link.node_id == node).count();
        i32::try_from(count).unwrap_or(i32::MAX)
    }

    /// Posts linked to `node`, by link order
    #[must_use]
    pub fn posts_for(&self, node: &NodeId) -> Vec<ExternalPost> {
        let mut links: Vec<&LinkedPost> = self
            .node_posts
            .iter()
            .filter(|l| &l.link.node_id == node)
            .collect();
        links.sort_by_key(|l| l.link.order_index);
        links.into_iter().filter_map(|l| l.post.clone()).collect()
    }

    /// Whether `post` is linked to `node`
    #[must_use]
    pub fn is_linked(&self, node: &NodeId, post: &PostId) -> bool {
        self.node_posts
            .iter()
            .any(|l| &l.link.node_id == node && &l.link.post_id == post)
    }

    /// `nodeId → posts` for every node with at least one linked post
    #[must_use]
    pub fn node_post_map(&self) -> IndexMap<NodeId, Vec<ExternalPost>> {
        let mut map: IndexMap<NodeId, Vec<ExternalPost>> = IndexMap::new();
        for node in &self.nodes {
            let posts = self.posts_for(&node.id);
            if !posts.is_empty() {
                map.insert(node.id.clone(), posts);
            }
        }
        map
    }

    /// Linked post count per node
    #[must_use]
    pub fn post_counts(&self) -> HashMap<NodeId, usize> {
        let mut counts = HashMap::new();
        for linked in self.node_posts.iter().filter(|l| l.post.is_some()) {
            *counts.entry(linked.link.node_id.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Replace the current graph
    pub fn load(&mut self, graph: &RoadmapGraph, links: Vec<LinkedPost>) {
        self.current = Some(graph.roadmap.clone());
        self.nodes.clone_from(&graph.nodes);
        self.connections.clone_from(&graph.connections);
        self.node_posts = links;
    }

    /// Forget the current graph
    pub fn clear_graph(&mut self) {
        self.current = None;
        self.nodes.clear();
        self.connections.clear();
        self.node_posts.clear();
    }

    /// Remove a node together with everything that references it
    ///
    /// Connections touching the node and its post links are dropped; children
    /// are kept and detached.
    pub fn remove_node_cascade(&mut self, id: &NodeId) -> RemovedCascade {
        self.nodes.retain(|n| &n.id != id);

        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        let connections = before - self.connections.len();

        let before = self.node_posts.len();
        self.node_posts.retain(|l| &l.link.node_id != id);
        let links = before - self.node_posts.len();

        let mut orphaned_children = 0;
        for child in self.nodes.iter_mut().filter(|n| n.parent_id.as_ref() == Some(id)) {
            child.parent_id = None;
            orphaned_children += 1;
        }

        RemovedCascade {
            connections,
            links,
            orphaned_children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_model::{ConnectionType, NodeColor, NodePostId, NodeType, RoadmapId};

    fn node(id: &str, parent: Option<&str>) -> Node {
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
            is_container: parent.is_none(),
        }
    }

    fn connection(id: &str, from: &str, to: &str) -> Connection {
        Connection {
            id: ConnectionId::from(id),
            from_node_id: NodeId::from(from),
            to_node_id: NodeId::from(to),
            connection_type: ConnectionType::Default,
            label: None,
        }
    }

    fn linked(id: &str, node: &str, post: &str, order_index: i32) -> LinkedPost {
        LinkedPost {
            link: NodePost {
                id: NodePostId::from(id),
                node_id: NodeId::from(node),
                post_id: PostId::from(post),
                order_index,
            },
            post: Some(ExternalPost {
                id: PostId::from(post),
                title: post.to_uppercase(),
                slug: post.into(),
                excerpt: None,
                status: "published".into(),
                read_time: None,
            }),
        }
    }

    fn state() -> GraphState {
        GraphState {
            nodes: vec![node("c", None), node("a", Some("c")), node("b", Some("c"))],
            connections: vec![
                connection("e1", "a", "b"),
                connection("e2", "b", "c"),
                connection("e3", "c", "a"),
            ],
            node_posts: vec![
                linked("l1", "a", "p2", 1),
                linked("l2", "a", "p1", 0),
                linked("l3", "b", "p1", 0),
            ],
            ..GraphState::default()
        }
    }

    #[test]
    fn posts_follow_link_order() {
        let s = state();
        let titles: Vec<_> = s
            .posts_for(&NodeId::from("a"))
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["P1", "P2"]);
        assert_eq!(s.post_counts()[&NodeId::from("a")], 2);
        assert_eq!(s.node_post_map().len(), 2);
        assert_eq!(s.next_link_index(&NodeId::from("a")), 2);
    }

    #[test]
    fn removing_node_drops_everything_that_references_it() {
        let mut s = state();

        let removed = s.remove_node_cascade(&NodeId::from("a"));
        assert_eq!(
            removed,
            RemovedCascade {
                connections: 2,
                links: 2,
                orphaned_children: 0
            }
        );
        assert!(s.connections.iter().all(|c| !c.touches(&NodeId::from("a"))));
        assert!(s.node_posts.iter().all(|l| l.link.node_id != NodeId::from("a")));
    }

    #[test]
    fn removing_container_detaches_children() {
        let mut s = state();

        let removed = s.remove_node_cascade(&NodeId::from("c"));
        assert_eq!(removed.orphaned_children, 2);
        assert!(s.nodes.iter().all(|n| n.parent_id.is_none()));
        assert_eq!(s.connections.len(), 1);
    }
}
