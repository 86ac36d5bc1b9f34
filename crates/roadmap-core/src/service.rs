//! Roadmap service facade
//!
//! One entry point for the viewer and the editor:
//! - graph reads and writes go through the gateway
//! - completion goes through the tracker, always for the session's viewer
//! - canvas primitives are built from the gateway's loaded graph

use crate::config::RoadmapConfig;
use crate::editor::EditorState;
use crate::error::RoadmapError;
use crate::session::Session;
use parking_lot::{Mutex, RwLock};
use roadmap_flow::{FlowBuilder, FlowEdge, FlowNode};
use roadmap_model::{
    Connection, ConnectionId, ConnectionPatch, ExternalPost, NewConnection, NewNode, NewRoadmap,
    Node, NodeId, NodePatch, NodePost, PostId, Roadmap, RoadmapId, RoadmapPatch, ValidationError,
};
use roadmap_progress::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, Progress, ProgressTracker, ViewerKey,
};
use roadmap_store::{GraphState, RemovedCascade, RoadmapGateway, RoadmapGraph, RowStore};
use std::collections::HashSet;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, RoadmapError>;

/// Roadmap viewer/editor service
pub struct RoadmapService {
    pub(crate) gateway: RoadmapGateway,
    tracker: ProgressTracker,
    flow: FlowBuilder,
    config: RoadmapConfig,
    session: RwLock<Session>,
    pub(crate) editor: Mutex<EditorState>,
}

impl std::fmt::Debug for RoadmapService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadmapService")
            .field("gateway", &self.gateway)
            .field("tracker", &self.tracker)
            .field("session", &*self.session.read())
            .finish_non_exhaustive()
    }
}

impl RoadmapService {
    /// Service over explicit row and progress storage
    pub fn new(
        store: Arc<dyn RowStore>,
        progress_storage: Arc<dyn KeyValueStore>,
        config: RoadmapConfig,
    ) -> Self {
        let gateway = RoadmapGateway::new(store).with_defaults(config.nodes);
        let tracker = ProgressTracker::with_config(progress_storage, config.progress.clone());
        let flow = FlowBuilder::new(config.flow.clone());

        tracing::info!(
            file_progress = config.progress.storage_dir.is_some(),
            purge_on_delete = config.progress.purge_on_roadmap_delete,
            "roadmap service ready"
        );

        Self {
            gateway,
            tracker,
            flow,
            config,
            session: RwLock::new(Session::default()),
            editor: Mutex::new(EditorState::default()),
        }
    }

    /// Service whose progress storage follows `config.progress.storage_dir`
    pub fn from_config(store: Arc<dyn RowStore>, config: RoadmapConfig) -> Self {
        let storage: Arc<dyn KeyValueStore> = match &config.progress.storage_dir {
            Some(dir) => Arc::new(FileKeyValueStore::new(dir)),
            None => Arc::new(MemoryKeyValueStore::new()),
        };
        Self::new(store, storage, config)
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RoadmapConfig {
        &self.config
    }

    /// Underlying gateway
    #[inline]
    #[must_use]
    pub fn gateway(&self) -> &RoadmapGateway {
        &self.gateway
    }

    // --- reads -----------------------------------------------------------

    /// All roadmaps, newest first
    pub async fn fetch_roadmaps(&self) -> Result<Vec<Roadmap>> {
        Ok(self.gateway.fetch_roadmaps().await?)
    }

    /// Published roadmaps only, newest first
    pub async fn fetch_published_roadmaps(&self) -> Result<Vec<Roadmap>> {
        Ok(self.gateway.fetch_published_roadmaps().await?)
    }

    /// Load a roadmap by slug; clears the editor selection
    pub async fn fetch_roadmap_by_slug(&self, slug: &str) -> Result<RoadmapGraph> {
        let graph = self.gateway.fetch_roadmap_by_slug(slug).await?;
        self.editor.lock().reset();
        Ok(graph)
    }

    /// Load a roadmap by id; clears the editor selection
    pub async fn fetch_roadmap_by_id(&self, id: &RoadmapId) -> Result<RoadmapGraph> {
        let graph = self.gateway.fetch_roadmap_by_id(id).await?;
        self.editor.lock().reset();
        Ok(graph)
    }

    /// Roadmap currently loaded, if any
    #[must_use]
    pub fn current_roadmap(&self) -> Option<Roadmap> {
        self.gateway.current_roadmap()
    }

    /// Nodes of the loaded roadmap
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        self.gateway.nodes()
    }

    /// Connections of the loaded roadmap
    #[must_use]
    pub fn connections(&self) -> Vec<Connection> {
        self.gateway.connections()
    }

    /// Copy of the gateway state
    #[must_use]
    pub fn state(&self) -> GraphState {
        self.gateway.state()
    }

    /// Message of the last failed gateway operation
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.gateway.last_error()
    }

    /// Invariant violations in the loaded graph
    #[must_use]
    pub fn audit(&self) -> Vec<ValidationError> {
        self.gateway.audit()
    }

    /// Posts linked to `node`, by link order
    #[must_use]
    pub fn get_node_posts(&self, node: &NodeId) -> Vec<ExternalPost> {
        self.gateway.node_posts(node)
    }

    /// Every published post
    pub async fn published_posts(&self) -> Result<Vec<ExternalPost>> {
        Ok(self.gateway.published_posts().await?)
    }

    /// Published posts not yet linked to `node`
    pub async fn linkable_posts(&self, node: &NodeId) -> Result<Vec<ExternalPost>> {
        Ok(self.gateway.linkable_posts(node).await?)
    }

    // --- roadmap writes --------------------------------------------------

    /// Create a roadmap; it is listed but not loaded
    pub async fn create_roadmap(&self, new: NewRoadmap) -> Result<Roadmap> {
        Ok(self.gateway.create_roadmap(new).await?)
    }

    /// Apply a partial update to a roadmap
    pub async fn update_roadmap(&self, id: &RoadmapId, patch: RoadmapPatch) -> Result<Roadmap> {
        Ok(self.gateway.update_roadmap(id, patch).await?)
    }

    /// Delete a roadmap; the viewer's stored progress for it is purged when
    /// configured to
    pub async fn delete_roadmap(&self, id: &RoadmapId) -> Result<()> {
        let was_current = self.current_roadmap().is_some_and(|r| &r.id == id);
        self.gateway.delete_roadmap(id).await?;

        if was_current {
            self.editor.lock().reset();
        }
        if self.config.progress.purge_on_roadmap_delete {
            self.tracker.purge_roadmap(&self.viewer(), id);
        }
        Ok(())
    }

    // --- node / connection writes ----------------------------------------

    /// Create a node in the loaded roadmap
    pub async fn create_node(&self, new: NewNode) -> Result<Node> {
        Ok(self.gateway.create_node(new).await?)
    }

    /// Apply a partial update to a loaded node
    pub async fn update_node(&self, id: &NodeId, patch: NodePatch) -> Result<Node> {
        Ok(self.gateway.update_node(id, patch).await?)
    }

    /// Delete a node; a selection pointing at it is cleared
    pub async fn delete_node(&self, id: &NodeId) -> Result<RemovedCascade> {
        let cascade = self.gateway.delete_node(id).await?;
        self.editor.lock().forget_node(id);
        Ok(cascade)
    }

    /// Connect two nodes of the loaded roadmap
    pub async fn create_connection(&self, new: NewConnection) -> Result<Connection> {
        Ok(self.gateway.create_connection(new).await?)
    }

    /// Apply a partial update to a loaded connection
    pub async fn update_connection(
        &self,
        id: &ConnectionId,
        patch: ConnectionPatch,
    ) -> Result<Connection> {
        Ok(self.gateway.update_connection(id, patch).await?)
    }

    /// Delete a connection; a selection pointing at it is cleared
    pub async fn delete_connection(&self, id: &ConnectionId) -> Result<()> {
        self.gateway.delete_connection(id).await?;
        self.editor.lock().forget_edge(id);
        Ok(())
    }

    /// Attach a published post to a node
    pub async fn link_post_to_node(&self, node: &NodeId, post: &PostId) -> Result<NodePost> {
        Ok(self.gateway.link_post_to_node(node, post).await?)
    }

    /// Detach a post from a node
    pub async fn unlink_post_from_node(&self, node: &NodeId, post: &PostId) -> Result<()> {
        Ok(self.gateway.unlink_post_from_node(node, post).await?)
    }

    // --- progress --------------------------------------------------------

    /// Current viewer
    #[must_use]
    pub fn viewer(&self) -> ViewerKey {
        self.session.read().viewer().clone()
    }

    /// Make `viewer` current and load their completed nodes
    pub fn switch_viewer(&self, viewer: ViewerKey) -> HashSet<NodeId> {
        let previous = self.session.write().switch(viewer.clone());
        tracing::info!(from = %previous, to = %viewer, "switched viewer");
        self.tracker.switch_viewer(&viewer)
    }

    /// Nodes the current viewer completed
    #[must_use]
    pub fn completed_nodes(&self) -> HashSet<NodeId> {
        self.tracker.completed(&self.viewer())
    }

    /// Flip completion of a node of the loaded roadmap
    pub fn toggle_node_completed(&self, node: &NodeId) -> Result<bool> {
        let roadmap = self.current_roadmap().ok_or(RoadmapError::NoRoadmapLoaded)?;
        let nodes = self.gateway.nodes();
        if !nodes.iter().any(|n| &n.id == node) {
            return Err(RoadmapError::NodeNotLoaded(node.clone()));
        }
        Ok(self.tracker.toggle(&self.viewer(), &roadmap.id, &nodes, node))
    }

    /// Completion of `roadmap` for the current viewer
    ///
    /// Only the loaded roadmap has nodes to count; any other id reports 0/0.
    #[must_use]
    pub fn get_progress(&self, roadmap: &RoadmapId) -> Progress {
        self.tracker
            .progress(&self.viewer(), roadmap, &self.gateway.nodes())
    }

    /// Clear the current viewer's progress on `roadmap` only
    pub fn reset_progress(&self, roadmap: &RoadmapId) {
        let viewer = self.viewer();
        let nodes: Vec<Node> = self
            .gateway
            .nodes()
            .into_iter()
            .filter(|n| &n.roadmap_id == roadmap)
            .collect();
        let loaded = self.current_roadmap().is_some_and(|r| &r.id == roadmap);

        self.tracker.reset(&viewer, roadmap, &nodes);
        if !loaded {
            // Node ids of an unloaded roadmap are unknown here; resync from storage.
            self.tracker.switch_viewer(&viewer);
        }
    }

    // --- canvas ----------------------------------------------------------

    /// Render-ordered canvas nodes of the loaded roadmap
    #[must_use]
    pub fn get_flow_nodes(&self) -> Vec<FlowNode> {
        let state = self.gateway.state();
        let completed = self.completed_nodes();
        self.flow
            .nodes(&state.nodes, &state.post_counts(), &completed)
    }

    /// Canvas edges of the loaded roadmap
    #[must_use]
    pub fn get_flow_edges(&self) -> Vec<FlowEdge> {
        self.flow.edges(&self.gateway.connections())
    }
}
