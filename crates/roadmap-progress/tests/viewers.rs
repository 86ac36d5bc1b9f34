//! Viewer isolation and reset scope over file-backed storage

use pretty_assertions::assert_eq;
use roadmap_model::{Node, NodeColor, NodeId, NodeType, RoadmapId};
use roadmap_progress::{FileKeyValueStore, KeyValueStore, ProgressConfig, ProgressTracker, ViewerKey};
use std::sync::Arc;

fn node(id: &str, roadmap: &str) -> Node {
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
        is_container: false,
    }
}

fn file_tracker(dir: &std::path::Path) -> ProgressTracker {
    let config = ProgressConfig::default().with_storage_dir(dir);
    ProgressTracker::with_config(Arc::new(FileKeyValueStore::new(dir)), config)
}

#[test]
fn viewers_do_not_see_each_other() {
    let tmp = tempfile::tempdir().unwrap();
    let tracker = file_tracker(tmp.path());
    let r1 = RoadmapId::from("r1");
    let nodes = vec![node("a", "r1"), node("b", "r1")];
    let alice = ViewerKey::user("alice");
    let bob = ViewerKey::user("bob");

    tracker.toggle(&alice, &r1, &nodes, &NodeId::from("a"));

    assert!(tracker.switch_viewer(&bob).is_empty());
    assert_eq!(tracker.progress(&bob, &r1, &nodes).completed, 0);
    assert!(tracker.progress(&ViewerKey::Anonymous, &r1, &nodes).completed == 0);

    let reloaded = tracker.switch_viewer(&alice);
    assert!(reloaded.contains(&NodeId::from("a")));
    assert_eq!(tracker.progress(&alice, &r1, &nodes).percentage, 50);
}

#[test]
fn progress_survives_a_new_tracker() {
    let tmp = tempfile::tempdir().unwrap();
    let r1 = RoadmapId::from("r1");
    let nodes = vec![node("a", "r1")];
    let viewer = ViewerKey::Anonymous;

    file_tracker(tmp.path()).toggle(&viewer, &r1, &nodes, &NodeId::from("a"));

    let fresh = file_tracker(tmp.path());
    assert!(fresh.is_completed(&viewer, &NodeId::from("a")));
    assert!(tmp.path().join("roadmap-progress-anonymous.json").exists());
}

#[test]
fn reset_touches_only_one_roadmap() {
    let tmp = tempfile::tempdir().unwrap();
    let tracker = file_tracker(tmp.path());
    let viewer = ViewerKey::user("u1");
    let (r1, r2) = (RoadmapId::from("r1"), RoadmapId::from("r2"));
    let r1_nodes = vec![node("a", "r1"), node("b", "r1")];
    let r2_nodes = vec![node("c", "r2")];

    tracker.toggle(&viewer, &r1, &r1_nodes, &NodeId::from("a"));
    tracker.toggle(&viewer, &r1, &r1_nodes, &NodeId::from("b"));
    tracker.toggle(&viewer, &r2, &r2_nodes, &NodeId::from("c"));

    tracker.reset(&viewer, &r1, &r1_nodes);

    assert_eq!(tracker.progress(&viewer, &r1, &r1_nodes).completed, 0);
    assert_eq!(tracker.progress(&viewer, &r2, &r2_nodes).percentage, 100);

    let storage = FileKeyValueStore::new(tmp.path());
    let raw = storage.get("roadmap-progress-u1").unwrap().unwrap();
    assert_eq!(raw, r#"{"completedNodes":{"r2":["c"]}}"#);
}

#[test]
fn unreadable_storage_falls_back_to_empty() {
    let tmp = tempfile::tempdir().unwrap();
    // A directory where the record file should be makes reads fail.
    std::fs::create_dir_all(tmp.path().join("roadmap-progress-anonymous.json")).unwrap();
    let tracker = file_tracker(tmp.path());
    let nodes = vec![node("a", "r1")];

    assert!(tracker.switch_viewer(&ViewerKey::Anonymous).is_empty());
    assert!(tracker.toggle(&ViewerKey::Anonymous, &RoadmapId::from("r1"), &nodes, &NodeId::from("a")));
}
