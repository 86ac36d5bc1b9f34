//! Stored progress record
//!
//! `{"completedNodes": {"<roadmapId>": ["<nodeId>", ...]}}`

use roadmap_model::{NodeId, RoadmapId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One viewer's completed nodes, grouped by roadmap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub completed_nodes: BTreeMap<RoadmapId, Vec<NodeId>>,
}

impl ProgressRecord {
    /// Every completed node across roadmaps
    #[must_use]
    pub fn flatten(&self) -> HashSet<NodeId> {
        self.completed_nodes.values().flatten().cloned().collect()
    }

    /// Replace one roadmap's entry; an empty list removes it
    pub fn put(&mut self, roadmap: &RoadmapId, nodes: Vec<NodeId>) {
        if nodes.is_empty() {
            self.completed_nodes.remove(roadmap);
        } else {
            self.completed_nodes.insert(roadmap.clone(), nodes);
        }
    }

    /// Remove one roadmap's entry, returning its nodes
    pub fn take(&mut self, roadmap: &RoadmapId) -> Vec<NodeId> {
        self.completed_nodes.remove(roadmap).unwrap_or_default()
    }
}
