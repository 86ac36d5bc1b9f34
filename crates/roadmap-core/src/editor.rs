//! Canvas event handlers
//!
//! Selection changes are checked by the selection state machine. Drag and
//! resize frames are buffered; storage sees a single update when the gesture
//! stops. Children dragged past their container's edge are pulled back in.

use crate::error::RoadmapError;
use crate::service::{Result, RoadmapService};
use roadmap_flow::{
    clamp_to_parent, EditorSelection, GestureBuffer, GestureKind, Rect, SelectionError,
    SelectionEvent,
};
use roadmap_model::{Connection, ConnectionId, NewConnection, Node, NodeId};

/// Selection and in-flight gestures of the editor
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    selection: EditorSelection,
    gestures: GestureBuffer,
}

impl EditorState {
    /// Current selection
    #[inline]
    #[must_use]
    pub fn selection(&self) -> &EditorSelection {
        &self.selection
    }

    fn apply(&mut self, event: SelectionEvent) -> std::result::Result<EditorSelection, SelectionError> {
        self.selection = self.selection.apply(event)?;
        Ok(self.selection.clone())
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn forget_node(&mut self, id: &NodeId) {
        if self.selection.node() == Some(id) {
            self.selection = EditorSelection::None;
        }
        self.gestures.cancel(id);
    }

    pub(crate) fn forget_edge(&mut self, id: &ConnectionId) {
        if self.selection.edge() == Some(id) {
            self.selection = EditorSelection::None;
        }
    }
}

impl RoadmapService {
    fn loaded_node(&self, id: &NodeId) -> Result<Node> {
        self.gateway
            .node(id)
            .ok_or_else(|| RoadmapError::NodeNotLoaded(id.clone()))
    }

    /// Current selection
    #[must_use]
    pub fn selection(&self) -> EditorSelection {
        self.editor.lock().selection().clone()
    }

    /// Select a loaded node
    pub fn on_node_click(&self, id: &NodeId) -> Result<EditorSelection> {
        self.loaded_node(id)?;
        Ok(self.editor.lock().apply(SelectionEvent::NodeClicked(id.clone()))?)
    }

    /// Select a loaded connection
    pub fn on_edge_click(&self, id: &ConnectionId) -> Result<EditorSelection> {
        if !self.gateway.connections().iter().any(|c| &c.id == id) {
            return Err(roadmap_store::GatewayError::not_found("connection", id).into());
        }
        Ok(self.editor.lock().apply(SelectionEvent::EdgeClicked(id.clone()))?)
    }

    /// Clear the selection
    pub fn on_pane_click(&self) -> Result<EditorSelection> {
        Ok(self.editor.lock().apply(SelectionEvent::PaneClicked)?)
    }

    /// Open the selected node in the edit panel
    pub fn begin_edit(&self) -> Result<EditorSelection> {
        Ok(self.editor.lock().apply(SelectionEvent::BeginEdit)?)
    }

    /// Close the edit panel, keeping the node selected
    pub fn finish_edit(&self) -> Result<EditorSelection> {
        Ok(self.editor.lock().apply(SelectionEvent::FinishEdit)?)
    }

    // --- drag ------------------------------------------------------------

    /// Start buffering a drag of `id`
    pub fn on_node_drag_start(&self, id: &NodeId) -> Result<()> {
        let node = self.loaded_node(id)?;
        self.editor.lock().gestures.begin(&node, GestureKind::Drag);
        Ok(())
    }

    /// Buffer a drag frame; returns the position actually applied
    ///
    /// `None` when no drag is running on the node.
    pub fn on_node_drag(&self, id: &NodeId, x: f64, y: f64) -> Option<(f64, f64)> {
        let node = self.gateway.node(id)?;
        let mut rect = Rect::of(&node).at(x, y);
        if let Some(parent) = node.parent_id.as_ref().and_then(|p| self.gateway.node(p)) {
            rect = clamp_to_parent(rect, Rect::of(&parent));
        }

        self.editor
            .lock()
            .gestures
            .moved(id, rect.x, rect.y)
            .then_some((rect.x, rect.y))
    }

    /// End a drag and persist the final position
    ///
    /// `Ok(None)` when the node did not move.
    pub async fn on_node_drag_stop(&self, id: &NodeId) -> Result<Option<Node>> {
        let patch = self.editor.lock().gestures.end(id);
        match patch {
            Some(patch) => Ok(Some(self.update_node(id, patch).await?)),
            None => Ok(None),
        }
    }

    // --- resize ----------------------------------------------------------

    /// Start buffering a resize of `id`
    pub fn on_node_resize_start(&self, id: &NodeId) -> Result<()> {
        let node = self.loaded_node(id)?;
        self.editor.lock().gestures.begin(&node, GestureKind::Resize);
        Ok(())
    }

    /// Buffer a resize frame; false when no resize is running on the node
    pub fn on_node_resize(&self, id: &NodeId, rect: Rect) -> bool {
        self.editor.lock().gestures.resized(id, rect)
    }

    /// End a resize and persist the final geometry
    pub async fn on_node_resize_end(&self, id: &NodeId) -> Result<Option<Node>> {
        let patch = self.editor.lock().gestures.end(id);
        match patch {
            Some(patch) => Ok(Some(self.update_node(id, patch).await?)),
            None => Ok(None),
        }
    }

    // --- structure -------------------------------------------------------

    /// Connect two loaded nodes with a default connection
    pub async fn on_connect(&self, source: &NodeId, target: &NodeId) -> Result<Connection> {
        self.create_connection(NewConnection::new(source.clone(), target.clone()))
            .await
    }

    /// Delete whatever is selected
    pub async fn delete_selection(&self) -> Result<()> {
        let selection = self.selection();
        // Rejects an empty selection before anything is deleted.
        selection.apply(SelectionEvent::Deleted)?;

        match &selection {
            EditorSelection::Selected(id) | EditorSelection::Editing(id) => {
                self.delete_node(id).await?;
            }
            EditorSelection::EdgeSelected(id) => {
                self.delete_connection(id).await?;
            }
            EditorSelection::None => {}
        }
        Ok(())
    }
}
