//! Parent/child containment graph
//!
//! Edges run from a container to each node it holds. The graph is rebuilt from
//! a node slice on demand; it answers the two questions the rest of the
//! workspace asks about nesting: "would this re-parent close a loop" and
//! "how deep is every node". Depths stay defined on malformed data: the
//! members of a loop are layered as roots.

use crate::entity::Node;
use crate::error::ValidationError;
use crate::ids::NodeId;
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::{has_path_connecting, tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

/// Containment forest over one roadmap's nodes
#[derive(Debug, Clone, Default)]
pub struct ContainmentGraph {
    ids: IndexSet<NodeId>,
    inner: DiGraphMap<usize, ()>,
}

impl ContainmentGraph {
    /// Build from nodes; parents outside the slice are ignored
    #[must_use]
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut ids = IndexSet::with_capacity(nodes.len());
        let mut inner = DiGraphMap::new();

        for node in nodes {
            let (idx, _) = ids.insert_full(node.id.clone());
            inner.add_node(idx);
        }

        for node in nodes {
            let Some(parent) = node.parent_id.as_ref() else {
                continue;
            };
            if let (Some(p), Some(c)) = (ids.get_index_of(parent), ids.get_index_of(&node.id)) {
                inner.add_edge(p, c, ());
            }
        }

        Self { ids, inner }
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of parent links that resolved inside the slice
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether `id` is part of the graph
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.ids.contains(id)
    }

    /// Direct children of `id`
    #[must_use]
    pub fn children_of(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(idx) = self.ids.get_index_of(id) else {
            return Vec::new();
        };
        self.inner
            .neighbors_directed(idx, Direction::Outgoing)
            .filter_map(|c| self.ids.get_index(c).cloned())
            .collect()
    }

    /// Whether making `parent` the container of `child` would close a loop
    ///
    /// True when `parent` is `child` itself or one of its descendants.
    #[must_use]
    pub fn would_create_cycle(&self, child: &NodeId, parent: &NodeId) -> bool {
        if child == parent {
            return true;
        }
        match (self.ids.get_index_of(child), self.ids.get_index_of(parent)) {
            (Some(c), Some(p)) => has_path_connecting(&self.inner, c, p, None),
            _ => false,
        }
    }

    /// Whether the current parent links already contain a loop
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.inner)
    }

    /// Depth from root for every node, roots at 0
    ///
    /// # Errors
    /// `ValidationError::ContainmentCycle` when parent links loop.
    pub fn depths(&self) -> Result<IndexMap<NodeId, usize>, ValidationError> {
        let order = toposort(&self.inner, None).map_err(|cycle| {
            let at = self
                .ids
                .get_index(cycle.node_id())
                .cloned()
                .unwrap_or_else(|| NodeId::from("?"));
            ValidationError::ContainmentCycle { node: at }
        })?;

        let mut depth = vec![0usize; self.ids.len()];
        for idx in order {
            if let Some(parent) = self
                .inner
                .neighbors_directed(idx, Direction::Incoming)
                .next()
            {
                depth[idx] = depth[parent] + 1;
            }
        }

        Ok(self.with_ids(depth))
    }

    /// Depth from root for every node, treating each parent loop as a root
    ///
    /// Loop members sit at depth 0; nodes below a loop and every well-formed
    /// subtree are layered as in [`depths`](Self::depths).
    #[must_use]
    pub fn layered_depths(&self) -> IndexMap<NodeId, usize> {
        let mut depth = vec![0usize; self.ids.len()];
        // Components come sinks first; walk them parents first.
        for component in tarjan_scc(&self.inner).into_iter().rev() {
            let &[idx] = component.as_slice() else {
                continue;
            };
            if let Some(parent) = self
                .inner
                .neighbors_directed(idx, Direction::Incoming)
                .find(|&p| p != idx)
            {
                depth[idx] = depth[parent] + 1;
            }
        }
        self.with_ids(depth)
    }

    fn with_ids(&self, depth: Vec<usize>) -> IndexMap<NodeId, usize> {
        self.ids.iter().cloned().zip(depth).collect()
    }
}
