//! Per-viewer completion tracking
//!
//! Each viewer's completed nodes are loaded once into a cache and written
//! back to [`KeyValueStore`] after every change. The viewer is passed to
//! every call; the tracker itself has no notion of a current viewer.
//!
//! Storage never fails a call: unreadable or corrupt records load as empty,
//! failed writes are logged and the in-memory state is kept.

use crate::error::ProgressError;
use crate::record::ProgressRecord;
use crate::storage::KeyValueStore;
use crate::viewer::{ProgressConfig, ViewerKey};
use dashmap::DashMap;
use roadmap_model::{Node, NodeId, RoadmapId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Completion summary for one roadmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

impl Progress {
    /// Summary with `percentage = round(completed / total * 100)`, 0 when
    /// there is nothing to complete
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        let completed = completed.min(total);
        let percentage = if total == 0 {
            0
        } else {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let pct = ((completed as f64 / total as f64) * 100.0).round() as u8;
            pct
        };
        Self {
            completed,
            total,
            percentage,
        }
    }
}

/// Tracks completed nodes per viewer
pub struct ProgressTracker {
    storage: Arc<dyn KeyValueStore>,
    config: ProgressConfig,
    loaded: DashMap<ViewerKey, HashSet<NodeId>>,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("config", &self.config)
            .field("viewers", &self.loaded.len())
            .finish_non_exhaustive()
    }
}

impl ProgressTracker {
    /// Tracker over `storage` with default settings
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(storage, ProgressConfig::default())
    }

    /// Tracker over `storage` with `config`
    pub fn with_config(storage: Arc<dyn KeyValueStore>, config: ProgressConfig) -> Self {
        Self {
            storage,
            config,
            loaded: DashMap::new(),
        }
    }

    /// Settings in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    fn read_record(&self, key: &str) -> Result<ProgressRecord, ProgressError> {
        match self.storage.get(key)? {
            None => Ok(ProgressRecord::default()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| ProgressError::corrupt(key, e)),
        }
    }

    fn load_record(&self, viewer: &ViewerKey) -> ProgressRecord {
        let key = viewer.storage_key(&self.config);
        self.read_record(&key).unwrap_or_else(|e| {
            tracing::warn!(viewer = %viewer, "failed to load progress, starting empty: {}", e);
            ProgressRecord::default()
        })
    }

    fn write_record(&self, viewer: &ViewerKey, record: &ProgressRecord) {
        let key = viewer.storage_key(&self.config);
        let result = serde_json::to_string(record)
            .map_err(ProgressError::from)
            .and_then(|raw| self.storage.set(&key, &raw));
        if let Err(e) = result {
            tracing::warn!(viewer = %viewer, "failed to save progress: {}", e);
        }
    }

    fn update_record(&self, viewer: &ViewerKey, f: impl FnOnce(&mut ProgressRecord)) {
        let mut record = self.load_record(viewer);
        f(&mut record);
        self.write_record(viewer, &record);
    }

    fn with_set<R>(&self, viewer: &ViewerKey, f: impl FnOnce(&mut HashSet<NodeId>) -> R) -> R {
        let mut entry = self
            .loaded
            .entry(viewer.clone())
            .or_insert_with(|| self.load_record(viewer).flatten());
        f(&mut entry)
    }

    /// Reload `viewer`'s persisted set, replacing anything cached
    pub fn switch_viewer(&self, viewer: &ViewerKey) -> HashSet<NodeId> {
        let completed = self.load_record(viewer).flatten();
        tracing::debug!(viewer = %viewer, completed = completed.len(), "switched viewer");
        self.loaded.insert(viewer.clone(), completed.clone());
        completed
    }

    /// Every node `viewer` has completed, across roadmaps
    pub fn completed(&self, viewer: &ViewerKey) -> HashSet<NodeId> {
        self.with_set(viewer, |set| set.clone())
    }

    /// Check if `viewer` completed `node`
    pub fn is_completed(&self, viewer: &ViewerKey, node: &NodeId) -> bool {
        self.with_set(viewer, |set| set.contains(node))
    }

    /// Flip completion of `node` and persist the roadmap's entry
    ///
    /// Containers and nodes outside `roadmap_nodes` are left alone. Returns
    /// whether the node is completed afterwards.
    pub fn toggle(
        &self,
        viewer: &ViewerKey,
        roadmap: &RoadmapId,
        roadmap_nodes: &[Node],
        node: &NodeId,
    ) -> bool {
        let Some(target) = roadmap_nodes.iter().find(|n| &n.id == node) else {
            tracing::warn!(node_id = %node, roadmap_id = %roadmap, "toggle of node outside roadmap ignored");
            return self.is_completed(viewer, node);
        };
        if !target.is_completable() {
            tracing::debug!(node_id = %node, "containers are not completable");
            return false;
        }

        let (completed, entry) = self.with_set(viewer, |set| {
            let completed = if set.remove(node) {
                false
            } else {
                set.insert(node.clone());
                true
            };
            let entry: Vec<NodeId> = roadmap_nodes
                .iter()
                .filter(|n| set.contains(&n.id))
                .map(|n| n.id.clone())
                .collect();
            (completed, entry)
        });

        self.update_record(viewer, |record| record.put(roadmap, entry));
        tracing::debug!(viewer = %viewer, node_id = %node, completed, "toggled node");
        completed
    }

    /// Completion of `roadmap` for `viewer`; containers are not counted
    pub fn progress(
        &self,
        viewer: &ViewerKey,
        roadmap: &RoadmapId,
        roadmap_nodes: &[Node],
    ) -> Progress {
        self.with_set(viewer, |set| {
            let countable = roadmap_nodes
                .iter()
                .filter(|n| &n.roadmap_id == roadmap && n.is_completable());
            let (total, completed) = countable.fold((0, 0), |(total, done), n| {
                (total + 1, done + usize::from(set.contains(&n.id)))
            });
            Progress::new(completed, total)
        })
    }

    /// Clear `viewer`'s progress on `roadmap` only
    pub fn reset(&self, viewer: &ViewerKey, roadmap: &RoadmapId, roadmap_nodes: &[Node]) {
        self.with_set(viewer, |set| {
            for node in roadmap_nodes {
                set.remove(&node.id);
            }
        });
        self.update_record(viewer, |record| {
            record.take(roadmap);
        });
        tracing::info!(viewer = %viewer, roadmap_id = %roadmap, "reset progress");
    }

    /// Drop the stored entry of a roadmap that no longer exists
    pub fn purge_roadmap(&self, viewer: &ViewerKey, roadmap: &RoadmapId) {
        let mut removed = Vec::new();
        self.update_record(viewer, |record| removed = record.take(roadmap));
        if let Some(mut set) = self.loaded.get_mut(viewer) {
            for node in &removed {
                set.remove(node);
            }
        }
        tracing::info!(viewer = %viewer, roadmap_id = %roadmap, nodes = removed.len(), "purged roadmap progress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use proptest::prelude::*;
    use roadmap_model::{NodeColor, NodeType};

    fn node(id: &str, roadmap: &str, container: bool) -> Node {
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
            parent_id: None,
            roadmap_id: RoadmapId::from(roadmap),
            order_index: 0,
            is_optional: false,
            is_recommended: false,
            is_container: container,
        }
    }

    fn tracker() -> (Arc<MemoryKeyValueStore>, ProgressTracker) {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let tracker = ProgressTracker::new(storage.clone());
        (storage, tracker)
    }

    #[test]
    fn percentage_rounds() {
        assert_eq!(Progress::new(1, 3).percentage, 33);
        assert_eq!(Progress::new(2, 3).percentage, 67);
        assert_eq!(Progress::new(0, 0), Progress::default());
        assert_eq!(Progress::new(5, 4).completed, 4);
    }

    #[test]
    fn toggling_single_node_roadmap() {
        let (storage, tracker) = tracker();
        let viewer = ViewerKey::Anonymous;
        let r1 = RoadmapId::from("r1");
        let nodes = vec![node("n", "r1", false)];

        assert!(tracker.toggle(&viewer, &r1, &nodes, &NodeId::from("n")));
        assert_eq!(tracker.progress(&viewer, &r1, &nodes).percentage, 100);
        assert_eq!(
            storage.get("roadmap-progress-anonymous").unwrap().as_deref(),
            Some(r#"{"completedNodes":{"r1":["n"]}}"#)
        );

        assert!(!tracker.toggle(&viewer, &r1, &nodes, &NodeId::from("n")));
        assert_eq!(tracker.progress(&viewer, &r1, &nodes).percentage, 0);
    }

    #[test]
    fn containers_are_not_completable() {
        let (_, tracker) = tracker();
        let viewer = ViewerKey::Anonymous;
        let r1 = RoadmapId::from("r1");
        let nodes = vec![node("box", "r1", true), node("n", "r1", false)];

        assert!(!tracker.toggle(&viewer, &r1, &nodes, &NodeId::from("box")));
        let progress = tracker.progress(&viewer, &r1, &nodes);
        assert_eq!((progress.completed, progress.total), (0, 1));
    }

    #[test]
    fn corrupt_record_loads_empty() {
        let (storage, tracker) = tracker();
        storage.set("roadmap-progress-u1", "{not json").unwrap();

        let completed = tracker.switch_viewer(&ViewerKey::user("u1"));
        assert!(completed.is_empty());
    }

    #[test]
    fn toggle_preserves_other_roadmaps() {
        let (storage, tracker) = tracker();
        storage
            .set(
                "roadmap-progress-anonymous",
                r#"{"completedNodes":{"r2":["x"]}}"#,
            )
            .unwrap();
        let viewer = ViewerKey::Anonymous;
        let nodes = vec![node("n", "r1", false)];

        tracker.toggle(&viewer, &RoadmapId::from("r1"), &nodes, &NodeId::from("n"));

        let raw = storage.get("roadmap-progress-anonymous").unwrap().unwrap();
        let record: ProgressRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(record.completed_nodes.len(), 2);
        assert!(tracker.is_completed(&viewer, &NodeId::from("x")));
    }

    #[test]
    fn purge_drops_only_that_roadmap() {
        let (storage, tracker) = tracker();
        let viewer = ViewerKey::user("u1");
        let r1_nodes = vec![node("a", "r1", false)];
        let r2_nodes = vec![node("b", "r2", false)];
        tracker.toggle(&viewer, &RoadmapId::from("r1"), &r1_nodes, &NodeId::from("a"));
        tracker.toggle(&viewer, &RoadmapId::from("r2"), &r2_nodes, &NodeId::from("b"));

        tracker.purge_roadmap(&viewer, &RoadmapId::from("r1"));

        assert!(!tracker.is_completed(&viewer, &NodeId::from("a")));
        assert!(tracker.is_completed(&viewer, &NodeId::from("b")));
        assert_eq!(
            storage.get("roadmap-progress-u1").unwrap().as_deref(),
            Some(r#"{"completedNodes":{"r2":["b"]}}"#)
        );
    }

    proptest! {
        #[test]
        fn progress_stays_in_bounds(
            flags in prop::collection::vec(any::<bool>(), 0..24),
            toggles in prop::collection::vec(any::<prop::sample::Index>(), 0..48),
        ) {
            let (_, tracker) = tracker();
            let viewer = ViewerKey::Anonymous;
            let r1 = RoadmapId::from("r1");
            let nodes: Vec<Node> = flags
                .iter()
                .enumerate()
                .map(|(i, container)| node(&format!("n{i}"), "r1", *container))
                .collect();

            if !nodes.is_empty() {
                for pick in toggles {
                    let target = nodes[pick.index(nodes.len())].id.clone();
                    tracker.toggle(&viewer, &r1, &nodes, &target);
                }
            }

            let progress = tracker.progress(&viewer, &r1, &nodes);
            prop_assert!(progress.completed <= progress.total);
            prop_assert!(progress.percentage <= 100);
            prop_assert_eq!(progress.total, flags.iter().filter(|c| !**c).count());
            if progress.total == 0 {
                prop_assert_eq!(progress.percentage, 0);
            }
        }
    }
}
