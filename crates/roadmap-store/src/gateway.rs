//! Roadmap persistence gateway
//!
//! Wraps a [`RowStore`] and owns the in-memory graph of the current roadmap.
//!
//! Rules every operation follows:
//! - `last_error` is cleared when the operation starts and set when it fails
//! - storage is written first; memory changes only after storage succeeded
//! - node and connection writes are validated against the loaded graph and
//!   never reach storage when invalid
//! - nothing is retried

use crate::backend::RowStore;
use crate::error::{GatewayError, StoreError};
use crate::query::{Query, Table};
use crate::state::{GraphState, LinkedPost, RemovedCascade, RoadmapGraph};
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use roadmap_model::{
    audit, from_row, transform_connection, transform_node, transform_node_post, transform_post,
    transform_roadmap, validate_connection_patch, validate_new_connection, validate_new_node,
    validate_node_patch, validate_slug, validate_title, Connection, ConnectionId,
    ConnectionPatch, ConnectionRow, ExternalPost, NewConnection, NewNode, NewRoadmap, Node,
    NodeDefaults, NodeId, NodePatch, NodePost, NodePostRow, NodeRow, PostId, PostRow, Roadmap,
    RoadmapId, RoadmapPatch, RoadmapRow, Row, ValidationError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

type Result<T> = std::result::Result<T, GatewayError>;

fn decode_one<R: DeserializeOwned, T>(row: Row, transform: fn(R) -> T) -> Result<T> {
    let typed = from_row::<R>(row).map_err(StoreError::from)?;
    Ok(transform(typed))
}

fn decode<R: DeserializeOwned, T>(rows: Vec<Row>, transform: fn(R) -> T) -> Result<Vec<T>> {
    rows.into_iter().map(|row| decode_one(row, transform)).collect()
}

fn decode_link(row: Row) -> Result<LinkedPost> {
    let typed: NodePostRow = from_row(row).map_err(StoreError::from)?;
    let post = typed.post.clone().map(transform_post);
    Ok(LinkedPost {
        link: transform_node_post(typed),
        post,
    })
}

fn id_values<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> Vec<Value> {
    ids.into_iter().map(|id| Value::String(id.0.clone())).collect()
}

/// Gateway between the roadmap graph and a row store
pub struct RoadmapGateway {
    store: Arc<dyn RowStore>,
    defaults: NodeDefaults,
    state: RwLock<GraphState>,
}

impl std::fmt::Debug for RoadmapGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadmapGateway")
            .field("defaults", &self.defaults)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl RoadmapGateway {
    /// Gateway over `store` with stock node defaults
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            defaults: NodeDefaults::default(),
            state: RwLock::new(GraphState::default()),
        }
    }

    /// Use custom node defaults for creates
    #[must_use]
    pub fn with_defaults(mut self, defaults: NodeDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Node defaults in effect
    #[inline]
    #[must_use]
    pub fn defaults(&self) -> &NodeDefaults {
        &self.defaults
    }

    // --- accessors -------------------------------------------------------

    /// Copy of the whole in-memory state
    #[must_use]
    pub fn state(&self) -> GraphState {
        self.state.read().clone()
    }

    /// Roadmap list from the last listing fetch
    #[must_use]
    pub fn roadmaps(&self) -> Vec<Roadmap> {
        self.state.read().roadmaps.clone()
    }

    /// Currently loaded roadmap
    #[must_use]
    pub fn current_roadmap(&self) -> Option<Roadmap> {
        self.state.read().current.clone()
    }

    /// Nodes of the current roadmap
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        self.state.read().nodes.clone()
    }

    /// Loaded node by id
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<Node> {
        self.state.read().node(id).cloned()
    }

    /// Connections of the current roadmap
    #[must_use]
    pub fn connections(&self) -> Vec<Connection> {
        self.state.read().connections.clone()
    }

    /// `nodeId → posts` of the current roadmap
    #[must_use]
    pub fn node_post_map(&self) -> IndexMap<NodeId, Vec<ExternalPost>> {
        self.state.read().node_post_map()
    }

    /// Posts linked to `node`, by link order
    #[must_use]
    pub fn node_posts(&self, node: &NodeId) -> Vec<ExternalPost> {
        self.state.read().posts_for(node)
    }

    /// Linked post count per node
    #[must_use]
    pub fn post_counts(&self) -> HashMap<NodeId, usize> {
        self.state.read().post_counts()
    }

    /// Message of the last failed operation, if the latest one failed
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// Invariant violations in the loaded graph
    #[must_use]
    pub fn audit(&self) -> Vec<ValidationError> {
        let state = self.state.read();
        audit(&state.nodes, &state.connections)
    }

    fn begin(&self) {
        self.state.write().last_error = None;
    }

    fn settle<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            match e {
                GatewayError::Validation(_) => tracing::warn!(operation, "rejected write: {}", e),
                _ => tracing::error!(operation, "roadmap operation failed: {}", e),
            }
            self.state.write().last_error = Some(e.to_string());
        }
        result
    }

    // --- roadmaps --------------------------------------------------------

    /// All roadmaps, newest first
    pub async fn fetch_roadmaps(&self) -> Result<Vec<Roadmap>> {
        self.begin();
        let result = self
            .list_roadmaps(Query::new().order("created_at", false))
            .await;
        self.settle("fetch_roadmaps", result)
    }

    /// Published roadmaps, newest first
    pub async fn fetch_published_roadmaps(&self) -> Result<Vec<Roadmap>> {
        self.begin();
        let result = self
            .list_roadmaps(
                Query::new()
                    .eq("is_published", true)
                    .order("created_at", false),
            )
            .await;
        self.settle("fetch_published_roadmaps", result)
    }

    async fn list_roadmaps(&self, query: Query) -> Result<Vec<Roadmap>> {
        let rows = self.store.select(Table::Roadmaps, &query).await?;
        let roadmaps = decode::<RoadmapRow, _>(rows, transform_roadmap)?;
        tracing::debug!(count = roadmaps.len(), "fetched roadmaps");
        self.state.write().roadmaps.clone_from(&roadmaps);
        Ok(roadmaps)
    }

    /// Load a roadmap and its graph by slug
    pub async fn fetch_roadmap_by_slug(&self, slug: &str) -> Result<RoadmapGraph> {
        self.begin();
        let result = self
            .load_by(Query::new().eq("slug", slug).limit(1), slug)
            .await;
        self.settle("fetch_roadmap_by_slug", result)
    }

    /// Load a roadmap and its graph by id
    pub async fn fetch_roadmap_by_id(&self, id: &RoadmapId) -> Result<RoadmapGraph> {
        self.begin();
        let result = self.load_by(Query::by_id(id.as_str()).limit(1), id.as_str()).await;
        self.settle("fetch_roadmap_by_id", result)
    }

    async fn load_by(&self, query: Query, key: &str) -> Result<RoadmapGraph> {
        let row = self
            .store
            .select(Table::Roadmaps, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::not_found("roadmap", key))?;
        let roadmap = decode_one::<RoadmapRow, _>(row, transform_roadmap)?;
        self.load_graph(roadmap).await
    }

    async fn load_graph(&self, roadmap: Roadmap) -> Result<RoadmapGraph> {
        let node_rows = self
            .store
            .select(
                Table::Nodes,
                &Query::new()
                    .eq("roadmap_id", roadmap.id.as_str())
                    .order("order_index", true),
            )
            .await?;
        let nodes = decode::<NodeRow, _>(node_rows, transform_node)?;

        let (connections, links) = if nodes.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let ids = id_values(nodes.iter().map(|n| &n.id));

            let connection_rows = self
                .store
                .select(
                    Table::Connections,
                    &Query::new().is_in("from_node_id", ids.clone()),
                )
                .await?;
            let connections = decode::<ConnectionRow, _>(connection_rows, transform_connection)?;

            let link_rows = self
                .store
                .select(
                    Table::NodePosts,
                    &Query::new()
                        .is_in("node_id", ids)
                        .order("order_index", true)
                        .embed(Table::Posts, "post_id", "post"),
                )
                .await?;
            let links = link_rows
                .into_iter()
                .map(decode_link)
                .collect::<Result<Vec<_>>>()?;

            (connections, links)
        };

        let mut state = self.state.write();
        let mut graph = RoadmapGraph {
            roadmap,
            nodes,
            connections,
            node_posts: IndexMap::new(),
        };
        state.load(&graph, links);
        graph.node_posts = state.node_post_map();

        tracing::debug!(
            roadmap_id = %graph.roadmap.id,
            nodes = graph.nodes.len(),
            connections = graph.connections.len(),
            "loaded roadmap graph"
        );
        Ok(graph)
    }

    /// Create a roadmap; the slug falls back to `roadmap-<unix millis>`
    pub async fn create_roadmap(&self, new: NewRoadmap) -> Result<Roadmap> {
        self.begin();
        let result = self.create_roadmap_inner(new).await;
        self.settle("create_roadmap", result)
    }

    async fn create_roadmap_inner(&self, new: NewRoadmap) -> Result<Roadmap> {
        let now = Utc::now();
        validate_title(&new.title)?;
        validate_slug(&new.resolved_slug(now))?;

        let row = self.store.insert(Table::Roadmaps, new.to_row(now)).await?;
        let roadmap = decode_one::<RoadmapRow, _>(row, transform_roadmap)?;

        tracing::info!(roadmap_id = %roadmap.id, slug = %roadmap.slug, "created roadmap");
        self.state.write().roadmaps.insert(0, roadmap.clone());
        Ok(roadmap)
    }

    /// Apply a partial update to a roadmap
    pub async fn update_roadmap(&self, id: &RoadmapId, patch: RoadmapPatch) -> Result<Roadmap> {
        self.begin();
        let result = self.update_roadmap_inner(id, patch).await;
        self.settle("update_roadmap", result)
    }

    async fn update_roadmap_inner(&self, id: &RoadmapId, patch: RoadmapPatch) -> Result<Roadmap> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(slug) = &patch.slug {
            validate_slug(slug)?;
        }
        let patch = if patch.updated_at.is_none() {
            patch.touched(Utc::now())
        } else {
            patch
        };

        let row = self
            .store
            .update(Table::Roadmaps, &Query::by_id(id.as_str()), patch.to_row())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::not_found("roadmap", id))?;
        let roadmap = decode_one::<RoadmapRow, _>(row, transform_roadmap)?;

        let mut state = self.state.write();
        if let Some(listed) = state.roadmaps.iter_mut().find(|r| &r.id == id) {
            *listed = roadmap.clone();
        }
        if state.current.as_ref().is_some_and(|c| &c.id == id) {
            state.current = Some(roadmap.clone());
        }

        tracing::info!(roadmap_id = %id, "updated roadmap");
        Ok(roadmap)
    }

    /// Delete a roadmap; storage cascades to its graph
    pub async fn delete_roadmap(&self, id: &RoadmapId) -> Result<()> {
        self.begin();
        let result = self.delete_roadmap_inner(id).await;
        self.settle("delete_roadmap", result)
    }

    async fn delete_roadmap_inner(&self, id: &RoadmapId) -> Result<()> {
        let removed = self
            .store
            .delete(Table::Roadmaps, &Query::by_id(id.as_str()))
            .await?;
        if removed == 0 {
            return Err(GatewayError::not_found("roadmap", id));
        }

        let mut state = self.state.write();
        state.roadmaps.retain(|r| &r.id != id);
        if state.current.as_ref().is_some_and(|c| &c.id == id) {
            state.clear_graph();
        }

        tracing::info!(roadmap_id = %id, "deleted roadmap");
        Ok(())
    }

    // --- nodes -----------------------------------------------------------

    /// Create a node in the loaded roadmap; defaults fill missing type, color
    /// and size, and the order index defaults to the loaded node count
    pub async fn create_node(&self, new: NewNode) -> Result<Node> {
        self.begin();
        let result = self.create_node_inner(new).await;
        self.settle("create_node", result)
    }

    async fn create_node_inner(&self, new: NewNode) -> Result<Node> {
        let row = {
            let state = self.state.read();
            if state.current.as_ref().map(|r| &r.id) != Some(&new.roadmap_id) {
                return Err(ValidationError::RoadmapNotLoaded {
                    roadmap: new.roadmap_id.clone(),
                }
                .into());
            }
            validate_new_node(&state.nodes, &new)?;
            new.to_row(&self.defaults, state.next_order_index())
        };

        let row = self.store.insert(Table::Nodes, row).await?;
        let node = decode_one::<NodeRow, _>(row, transform_node)?;

        tracing::info!(node_id = %node.id, roadmap_id = %node.roadmap_id, "created node");
        self.state.write().nodes.push(node.clone());
        Ok(node)
    }

    /// Apply a partial update to a loaded node
    ///
    /// Only fields present in `patch` are sent and changed locally.
    pub async fn update_node(&self, id: &NodeId, patch: NodePatch) -> Result<Node> {
        self.begin();
        let result = self.update_node_inner(id, patch).await;
        self.settle("update_node", result)
    }

    async fn update_node_inner(&self, id: &NodeId, patch: NodePatch) -> Result<Node> {
        {
            let state = self.state.read();
            let node = state
                .node(id)
                .ok_or_else(|| GatewayError::not_found("node", id))?;
            validate_node_patch(&state.nodes, node, &patch)?;
            if patch.is_empty() {
                return Ok(node.clone());
            }
        }

        let updated = self
            .store
            .update(Table::Nodes, &Query::by_id(id.as_str()), patch.to_row())
            .await?;
        if updated.is_empty() {
            return Err(GatewayError::not_found("node", id));
        }

        let mut state = self.state.write();
        let node = state
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| GatewayError::not_found("node", id))?;
        patch.apply_to(node);

        tracing::debug!(node_id = %id, "updated node");
        Ok(node.clone())
    }

    /// Delete a node, its connections and post links; children are detached
    pub async fn delete_node(&self, id: &NodeId) -> Result<RemovedCascade> {
        self.begin();
        let result = self.delete_node_inner(id).await;
        self.settle("delete_node", result)
    }

    async fn delete_node_inner(&self, id: &NodeId) -> Result<RemovedCascade> {
        let removed = self
            .store
            .delete(Table::Nodes, &Query::by_id(id.as_str()))
            .await?;
        if removed == 0 {
            return Err(GatewayError::not_found("node", id));
        }

        let cascade = self.state.write().remove_node_cascade(id);
        tracing::info!(
            node_id = %id,
            connections = cascade.connections,
            links = cascade.links,
            children = cascade.orphaned_children,
            "deleted node"
        );
        Ok(cascade)
    }

    // --- connections -----------------------------------------------------

    /// Create a connection between two loaded nodes of one roadmap
    pub async fn create_connection(&self, new: NewConnection) -> Result<Connection> {
        self.begin();
        let result = self.create_connection_inner(new).await;
        self.settle("create_connection", result)
    }

    async fn create_connection_inner(&self, new: NewConnection) -> Result<Connection> {
        validate_new_connection(&self.state.read().nodes, &new)?;

        let row = self.store.insert(Table::Connections, new.to_row()).await?;
        let connection = decode_one::<ConnectionRow, _>(row, transform_connection)?;

        tracing::info!(
            connection_id = %connection.id,
            from = %connection.from_node_id,
            to = %connection.to_node_id,
            "created connection"
        );
        self.state.write().connections.push(connection.clone());
        Ok(connection)
    }

    /// Apply a partial update to a loaded connection
    pub async fn update_connection(
        &self,
        id: &ConnectionId,
        patch: ConnectionPatch,
    ) -> Result<Connection> {
        self.begin();
        let result = self.update_connection_inner(id, patch).await;
        self.settle("update_connection", result)
    }

    async fn update_connection_inner(
        &self,
        id: &ConnectionId,
        patch: ConnectionPatch,
    ) -> Result<Connection> {
        {
            let state = self.state.read();
            let connection = state
                .connection(id)
                .ok_or_else(|| GatewayError::not_found("connection", id))?;
            validate_connection_patch(&state.nodes, connection, &patch)?;
            if patch.is_empty() {
                return Ok(connection.clone());
            }
        }

        let updated = self
            .store
            .update(Table::Connections, &Query::by_id(id.as_str()), patch.to_row())
            .await?;
        if updated.is_empty() {
            return Err(GatewayError::not_found("connection", id));
        }

        let mut state = self.state.write();
        let connection = state
            .connections
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| GatewayError::not_found("connection", id))?;
        patch.apply_to(connection);

        tracing::debug!(connection_id = %id, "updated connection");
        Ok(connection.clone())
    }

    /// Delete a connection
    pub async fn delete_connection(&self, id: &ConnectionId) -> Result<()> {
        self.begin();
        let result = self.delete_connection_inner(id).await;
        self.settle("delete_connection", result)
    }

    async fn delete_connection_inner(&self, id: &ConnectionId) -> Result<()> {
        let removed = self
            .store
            .delete(Table::Connections, &Query::by_id(id.as_str()))
            .await?;
        if removed == 0 {
            return Err(GatewayError::not_found("connection", id));
        }

        self.state.write().connections.retain(|c| &c.id != id);
        tracing::info!(connection_id = %id, "deleted connection");
        Ok(())
    }

    // --- posts -----------------------------------------------------------

    /// Published posts, by title
    pub async fn published_posts(&self) -> Result<Vec<ExternalPost>> {
        self.begin();
        let result = self.published_posts_inner().await;
        self.settle("published_posts", result)
    }

    async fn published_posts_inner(&self) -> Result<Vec<ExternalPost>> {
        let rows = self
            .store
            .select(
                Table::Posts,
                &Query::new()
                    .eq("status", ExternalPost::PUBLISHED)
                    .order("title", true),
            )
            .await?;
        decode::<PostRow, _>(rows, transform_post)
    }

    /// Published posts not yet linked to `node`
    pub async fn linkable_posts(&self, node: &NodeId) -> Result<Vec<ExternalPost>> {
        self.begin();
        let result = self.published_posts_inner().await.map(|posts| {
            let state = self.state.read();
            posts
                .into_iter()
                .filter(|p| !state.is_linked(node, &p.id))
                .collect()
        });
        self.settle("linkable_posts", result)
    }

    /// Link a post to a loaded node, appended after its existing links
    pub async fn link_post_to_node(&self, node: &NodeId, post: &PostId) -> Result<NodePost> {
        self.begin();
        let result = self.link_post_inner(node, post).await;
        self.settle("link_post_to_node", result)
    }

    async fn link_post_inner(&self, node: &NodeId, post: &PostId) -> Result<NodePost> {
        let order_index = {
            let state = self.state.read();
            if state.node(node).is_none() {
                return Err(GatewayError::not_found("node", node));
            }
            state.next_link_index(node)
        };

        let post_row = self
            .store
            .select(Table::Posts, &Query::by_id(post.as_str()).limit(1))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::not_found("post", post))?;
        let external = decode_one::<PostRow, _>(post_row, transform_post)?;

        let mut row = Row::new();
        row.insert("node_id".into(), Value::String(node.0.clone()));
        row.insert("post_id".into(), Value::String(post.0.clone()));
        row.insert("order_index".into(), Value::from(order_index));

        let row = self.store.insert(Table::NodePosts, row).await?;
        let link = decode_one::<NodePostRow, _>(row, transform_node_post)?;

        tracing::info!(node_id = %node, post_id = %post, "linked post to node");
        self.state.write().node_posts.push(LinkedPost {
            link: link.clone(),
            post: Some(external),
        });
        Ok(link)
    }

    /// Remove every link between `node` and `post`
    pub async fn unlink_post_from_node(&self, node: &NodeId, post: &PostId) -> Result<()> {
        self.begin();
        let result = self.unlink_post_inner(node, post).await;
        self.settle("unlink_post_from_node", result)
    }

    async fn unlink_post_inner(&self, node: &NodeId, post: &PostId) -> Result<()> {
        self.store
            .delete(
                Table::NodePosts,
                &Query::new()
                    .eq("node_id", node.as_str())
                    .eq("post_id", post.as_str()),
            )
            .await?;

        self.state
            .write()
            .node_posts
            .retain(|l| !(&l.link.node_id == node && &l.link.post_id == post));
        tracing::info!(node_id = %node, post_id = %post, "unlinked post from node");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockRowStore;
    use roadmap_model::{NodeColor, NodeType};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap_or_default()
    }

    fn node(id: &str, container: bool) -> Node {
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
            roadmap_id: RoadmapId::from("r1"),
            order_index: 0,
            is_optional: false,
            is_recommended: false,
            is_container: container,
        }
    }

    fn gateway(mock: MockRowStore, nodes: Vec<Node>) -> RoadmapGateway {
        let gateway = RoadmapGateway::new(Arc::new(mock));
        {
            let mut state = gateway.state.write();
            state.current = Some(Roadmap {
                id: RoadmapId::from("r1"),
                title: "Rust".into(),
                slug: "rust".into(),
                description: None,
                icon: None,
                is_published: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
            state.nodes = nodes;
        }
        gateway
    }

    #[tokio::test]
    async fn failed_insert_leaves_state_and_records_error() {
        let mut mock = MockRowStore::new();
        mock.expect_insert()
            .returning(|table, _| Err(StoreError::backend(table, "insert", "offline")));

        let gw = gateway(mock, vec![node("a", false)]);
        let err = gw.create_node(NewNode::new("r1", "b")).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(gw.nodes().len(), 1);
        assert!(gw.last_error().is_some_and(|e| e.contains("offline")));
    }

    #[tokio::test]
    async fn next_operation_clears_last_error() {
        let calls = AtomicUsize::new(0);
        let mut mock = MockRowStore::new();
        mock.expect_select().returning(move |table, _| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(StoreError::backend(table, "select", "timeout"))
            } else {
                Ok(Vec::new())
            }
        });

        let gw = gateway(mock, Vec::new());
        assert!(gw.fetch_roadmaps().await.is_err());
        assert!(gw.last_error().is_some());

        assert!(gw.fetch_roadmaps().await.unwrap().is_empty());
        assert_eq!(gw.last_error(), None);
    }

    #[tokio::test]
    async fn invalid_parent_never_reaches_storage() {
        let mut mock = MockRowStore::new();
        mock.expect_insert().never();

        let gw = gateway(mock, vec![node("plain", false)]);
        let err = gw
            .create_node(NewNode::new("r1", "child").inside("plain"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::Validation(ValidationError::ParentNotContainer { .. })
        ));
        assert!(gw.last_error().is_some());
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let mut mock = MockRowStore::new();
        mock.expect_select().returning(|_, _| Ok(Vec::new()));

        let gw = gateway(mock, Vec::new());
        let err = gw.fetch_roadmap_by_slug("missing").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(gw.current_roadmap(), None);
    }

    #[tokio::test]
    async fn failed_delete_keeps_node_and_connections() {
        let mut mock = MockRowStore::new();
        mock.expect_delete()
            .returning(|table, _| Err(StoreError::backend(table, "delete", "offline")));

        let gw = gateway(mock, vec![node("a", false), node("b", false)]);
        gw.state.write().connections.push(Connection {
            id: ConnectionId::from("e1"),
            from_node_id: NodeId::from("a"),
            to_node_id: NodeId::from("b"),
            connection_type: roadmap_model::ConnectionType::Default,
            label: None,
        });

        assert!(gw.delete_node(&NodeId::from("a")).await.is_err());
        assert_eq!(gw.nodes().len(), 2);
        assert_eq!(gw.connections().len(), 1);
    }

    #[tokio::test]
    async fn update_sends_only_patched_columns() {
        let mut mock = MockRowStore::new();
        mock.expect_update()
            .withf(|table, _, patch| {
                *table == Table::Nodes && patch.len() == 2 && patch.contains_key("position_x")
            })
            .returning(|_, _, patch| Ok(vec![patch]));

        let gw = gateway(mock, vec![node("a", false)]);
        let updated = gw
            .update_node(&NodeId::from("a"), NodePatch::new().position(40.0, 80.0))
            .await
            .unwrap();

        assert_eq!((updated.position_x, updated.position_y), (40.0, 80.0));
        assert_eq!(updated.title, "a");
    }

    #[tokio::test]
    async fn link_rejects_unknown_post() {
        let mut mock = MockRowStore::new();
        mock.expect_select().returning(|_, _| Ok(Vec::new()));
        mock.expect_insert().never();

        let gw = gateway(mock, vec![node("a", false)]);
        let err = gw
            .link_post_to_node(&NodeId::from("a"), &PostId::from("p9"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn create_roadmap_prepends_to_listing() {
        let mut mock = MockRowStore::new();
        mock.expect_insert().returning(|_, mut r| {
            r.insert("id".into(), json!("r9"));
            Ok(r)
        });

        let gw = gateway(mock, Vec::new());
        gw.state.write().roadmaps.push(
            decode_one::<RoadmapRow, _>(
                row(json!({
                    "id": "r1", "title": "Old", "slug": "old",
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z"
                })),
                transform_roadmap,
            )
            .unwrap(),
        );

        let created = gw.create_roadmap(NewRoadmap::new("New")).await.unwrap();
        assert!(created.slug.starts_with("roadmap-"));
        assert_eq!(gw.roadmaps()[0].id, RoadmapId::from("r9"));
    }
}
