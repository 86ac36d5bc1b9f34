//! Gateway behaviour against the in-memory row store

use pretty_assertions::assert_eq;
use roadmap_model::{
    ConnectionPatch, ConnectionType, NewConnection, NewNode, NewRoadmap, NodeColor, NodeId,
    NodePatch, NodeType, PostId, RoadmapPatch, Row, ValidationError,
};
use roadmap_store::{GatewayError, MemoryStore, RoadmapGateway, Table};
use serde_json::json;
use std::sync::Arc;

fn row(value: serde_json::Value) -> Row {
    value.as_object().cloned().unwrap_or_default()
}

fn store_with_posts() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.seed(
        Table::Posts,
        [
            row(json!({"id": "p1", "title": "Borrowing", "slug": "borrowing", "status": "published"})),
            row(json!({"id": "p2", "title": "Async", "slug": "async", "status": "published", "read_time": 7})),
            row(json!({"id": "p3", "title": "Draft", "slug": "draft", "status": "draft"})),
        ],
    );
    Arc::new(store)
}

async fn loaded() -> (Arc<MemoryStore>, RoadmapGateway) {
    let store = store_with_posts();
    let gateway = RoadmapGateway::new(store.clone());
    let roadmap = gateway
        .create_roadmap(NewRoadmap::new("Rust").with_slug("rust").published())
        .await
        .unwrap();
    gateway.fetch_roadmap_by_id(&roadmap.id).await.unwrap();
    (store, gateway)
}

#[tokio::test]
async fn create_applies_node_defaults() {
    let (_, gw) = loaded().await;
    let roadmap = gw.current_roadmap().unwrap();

    let topic = gw.create_node(NewNode::new(roadmap.id.clone(), "Ownership")).await.unwrap();
    let group = gw
        .create_node(NewNode::new(roadmap.id.clone(), "Basics").container())
        .await
        .unwrap();

    assert_eq!(topic.node_type, NodeType::Topic);
    assert_eq!(topic.color, NodeColor::Yellow);
    assert_eq!((topic.width, topic.height), (200.0, 50.0));
    assert_eq!(topic.order_index, 0);
    assert_eq!((group.width, group.height), (300.0, 200.0));
    assert_eq!(group.order_index, 1);
}

#[tokio::test]
async fn fetch_orders_nodes_and_joins_posts() {
    let (_, gw) = loaded().await;
    let rid = gw.current_roadmap().unwrap().id;

    let late = gw.create_node(NewNode::new(rid.clone(), "Late").with_order(5)).await.unwrap();
    let early = gw.create_node(NewNode::new(rid.clone(), "Early").with_order(1)).await.unwrap();
    gw.create_connection(NewConnection::new(early.id.clone(), late.id.clone()))
        .await
        .unwrap();
    gw.link_post_to_node(&early.id, &PostId::from("p2")).await.unwrap();
    gw.link_post_to_node(&early.id, &PostId::from("p1")).await.unwrap();

    let graph = gw.fetch_roadmap_by_slug("rust").await.unwrap();

    let titles: Vec<_> = graph.nodes.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Early", "Late"]);
    assert_eq!(graph.connections.len(), 1);
    let linked: Vec<_> = graph.node_posts[&early.id].iter().map(|p| p.title.as_str()).collect();
    assert_eq!(linked, vec!["Async", "Borrowing"]);
    assert_eq!(graph.node_posts[&early.id][0].read_time, Some(7));
}

#[tokio::test]
async fn successive_position_patches_keep_other_fields() {
    let (_, gw) = loaded().await;
    let rid = gw.current_roadmap().unwrap().id;
    let node = gw
        .create_node(NewNode::new(rid, "Traits").with_color(NodeColor::Blue))
        .await
        .unwrap();

    gw.update_node(&node.id, NodePatch::new().position_x(10.0)).await.unwrap();
    let updated = gw.update_node(&node.id, NodePatch::new().position_y(20.0)).await.unwrap();

    assert_eq!((updated.position_x, updated.position_y), (10.0, 20.0));
    assert_eq!(updated.title, "Traits");
    assert_eq!(updated.color, NodeColor::Blue);

    let reloaded = gw.fetch_roadmap_by_slug("rust").await.unwrap();
    assert_eq!(reloaded.nodes[0], updated);
}

#[tokio::test]
async fn deleting_node_cascades_in_memory_and_storage() {
    let (store, gw) = loaded().await;
    let rid = gw.current_roadmap().unwrap().id;

    let group = gw.create_node(NewNode::new(rid.clone(), "Group").container()).await.unwrap();
    let a = gw.create_node(NewNode::new(rid.clone(), "A").inside(group.id.clone())).await.unwrap();
    let b = gw.create_node(NewNode::new(rid.clone(), "B")).await.unwrap();
    gw.create_connection(NewConnection::new(a.id.clone(), b.id.clone())).await.unwrap();
    gw.create_connection(NewConnection::new(b.id.clone(), group.id.clone())).await.unwrap();
    gw.create_connection(NewConnection::new(b.id.clone(), a.id.clone())).await.unwrap();
    gw.link_post_to_node(&group.id, &PostId::from("p1")).await.unwrap();

    let cascade = gw.delete_node(&group.id).await.unwrap();

    assert_eq!(cascade.connections, 1);
    assert_eq!(cascade.links, 1);
    assert_eq!(cascade.orphaned_children, 1);
    assert!(gw.connections().iter().all(|c| !c.touches(&group.id)));
    assert_eq!(gw.node(&a.id).unwrap().parent_id, None);
    assert!(gw.node_posts(&group.id).is_empty());

    assert_eq!(store.len(Table::Connections), 2);
    assert!(store.is_empty(Table::NodePosts));
}

#[tokio::test]
async fn reparenting_into_descendant_is_rejected() {
    let (_, gw) = loaded().await;
    let rid = gw.current_roadmap().unwrap().id;

    let outer = gw.create_node(NewNode::new(rid.clone(), "Outer").container()).await.unwrap();
    let inner = gw
        .create_node(NewNode::new(rid.clone(), "Inner").container().inside(outer.id.clone()))
        .await
        .unwrap();

    let err = gw
        .update_node(&outer.id, NodePatch::new().parent(Some(inner.id.clone())))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Validation(ValidationError::ContainmentCycle { .. })
    ));
    assert_eq!(gw.node(&outer.id).unwrap().parent_id, None);

    let err = gw
        .update_node(&outer.id, NodePatch::new().container(false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Validation(ValidationError::ContainerNotEmpty { children: 1, .. })
    ));
}

#[tokio::test]
async fn connection_endpoints_must_be_loaded() {
    let (_, gw) = loaded().await;
    let rid = gw.current_roadmap().unwrap().id;
    let a = gw.create_node(NewNode::new(rid, "A")).await.unwrap();

    let err = gw
        .create_connection(NewConnection::new(a.id.clone(), NodeId::from("elsewhere")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Validation(ValidationError::ForeignEndpoint { .. })
    ));
    assert!(gw.connections().is_empty());
}

#[tokio::test]
async fn nodes_are_created_only_in_the_loaded_roadmap() {
    let (store, gw) = loaded().await;
    let other = gw
        .create_roadmap(NewRoadmap::new("Go").with_slug("go"))
        .await
        .unwrap();

    let err = gw
        .create_node(NewNode::new(other.id.clone(), "Goroutines"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Validation(ValidationError::RoadmapNotLoaded { roadmap }) if roadmap == other.id
    ));
    assert!(gw.nodes().is_empty());
    assert_eq!(store.len(Table::Nodes), 0);
    assert!(gw.last_error().is_some());
}

#[tokio::test]
async fn connection_patch_changes_type_and_clears_label() {
    let (_, gw) = loaded().await;
    let rid = gw.current_roadmap().unwrap().id;
    let a = gw.create_node(NewNode::new(rid.clone(), "A")).await.unwrap();
    let b = gw.create_node(NewNode::new(rid, "B")).await.unwrap();
    let edge = gw
        .create_connection(NewConnection::new(a.id, b.id).with_label("then"))
        .await
        .unwrap();

    let updated = gw
        .update_connection(
            &edge.id,
            ConnectionPatch::new()
                .connection_type(ConnectionType::Optional)
                .label(None),
        )
        .await
        .unwrap();

    assert_eq!(updated.connection_type, ConnectionType::Optional);
    assert_eq!(updated.label, None);

    gw.delete_connection(&edge.id).await.unwrap();
    assert!(gw.connections().is_empty());
}

#[tokio::test]
async fn linkable_posts_skip_drafts_and_existing_links() {
    let (_, gw) = loaded().await;
    let rid = gw.current_roadmap().unwrap().id;
    let a = gw.create_node(NewNode::new(rid, "A")).await.unwrap();

    gw.link_post_to_node(&a.id, &PostId::from("p1")).await.unwrap();
    let linkable: Vec<_> = gw
        .linkable_posts(&a.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(linkable, vec![PostId::from("p2")]);

    gw.unlink_post_from_node(&a.id, &PostId::from("p1")).await.unwrap();
    assert!(gw.node_posts(&a.id).is_empty());
    assert_eq!(gw.linkable_posts(&a.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn roadmap_lifecycle() {
    let (store, gw) = loaded().await;
    let rid = gw.current_roadmap().unwrap().id;
    gw.create_node(NewNode::new(rid.clone(), "A")).await.unwrap();

    let draft = gw.create_roadmap(NewRoadmap::new("Go").with_slug("go")).await.unwrap();
    assert_eq!(gw.fetch_roadmaps().await.unwrap().len(), 2);
    let published = gw.fetch_published_roadmaps().await.unwrap();
    assert_eq!(published.len(), 1);

    let renamed = gw
        .update_roadmap(&draft.id, RoadmapPatch::new().title("Golang").published(true))
        .await
        .unwrap();
    assert_eq!(renamed.title, "Golang");
    assert_eq!(renamed.slug, "go");
    assert!(renamed.updated_at >= draft.updated_at);

    let dup = gw.create_roadmap(NewRoadmap::new("Again").with_slug("go")).await;
    assert!(dup.is_err());
    assert!(gw.last_error().is_some());

    gw.delete_roadmap(&rid).await.unwrap();
    assert_eq!(gw.current_roadmap(), None);
    assert!(gw.nodes().is_empty());
    assert!(store.is_empty(Table::Nodes));
    assert!(gw.fetch_roadmap_by_id(&rid).await.unwrap_err().is_not_found());
}
