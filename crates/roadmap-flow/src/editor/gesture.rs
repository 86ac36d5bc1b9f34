use crate::geometry::Rect;
use roadmap_model::{Node, NodeId, NodePatch};
use std::collections::HashMap;

/// Pointer gesture on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Drag,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    kind: GestureKind,
    start: Rect,
    latest: Rect,
    frames: usize,
}

/// Buffers drag and resize frames until the gesture ends
///
/// Intermediate frames never produce writes; `end` yields at most one patch
/// holding only what changed between the first and last frame.
#[derive(Debug, Clone, Default)]
pub struct GestureBuffer {
    active: HashMap<NodeId, Pending>,
}

impl GestureBuffer {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a gesture from the node's stored geometry; restarts any
    /// gesture already running on it
    pub fn begin(&mut self, node: &Node, kind: GestureKind) {
        let start = Rect::of(node);
        self.active.insert(
            node.id.clone(),
            Pending {
                kind,
                start,
                latest: start,
                frames: 0,
            },
        );
    }

    /// Record a move frame; false when no drag is running on `id`
    pub fn moved(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        match self.active.get_mut(id) {
            Some(p) if p.kind == GestureKind::Drag => {
                p.latest = p.latest.at(x, y);
                p.frames += 1;
                true
            }
            _ => false,
        }
    }

    /// Record a resize frame; false when no resize is running on `id`
    ///
    /// Resizing from a top or left handle moves the node as well, so the
    /// frame carries the full rectangle.
    pub fn resized(&mut self, id: &NodeId, rect: Rect) -> bool {
        match self.active.get_mut(id) {
            Some(p) if p.kind == GestureKind::Resize => {
                p.latest = rect;
                p.frames += 1;
                true
            }
            _ => false,
        }
    }

    /// Latest buffered rectangle of a running gesture
    #[must_use]
    pub fn current(&self, id: &NodeId) -> Option<Rect> {
        self.active.get(id).map(|p| p.latest)
    }

    /// Kind of gesture running on `id`
    #[must_use]
    pub fn kind(&self, id: &NodeId) -> Option<GestureKind> {
        self.active.get(id).map(|p| p.kind)
    }

    /// Number of frames buffered for `id`
    #[must_use]
    pub fn frames(&self, id: &NodeId) -> usize {
        self.active.get(id).map_or(0, |p| p.frames)
    }

    /// Check if a gesture is running on `id`
    #[must_use]
    pub fn is_active(&self, id: &NodeId) -> bool {
        self.active.contains_key(id)
    }

    /// Drop a gesture without producing a patch
    pub fn cancel(&mut self, id: &NodeId) {
        self.active.remove(id);
    }

    /// Finish the gesture on `id`
    ///
    /// `None` when nothing was running or the geometry did not change.
    pub fn end(&mut self, id: &NodeId) -> Option<NodePatch> {
        let pending = self.active.remove(id)?;
        let (start, end) = (pending.start, pending.latest);

        let mut patch = NodePatch::new();
        if end.x != start.x {
            patch = patch.position_x(end.x);
        }
        if end.y != start.y {
            patch = patch.position_y(end.y);
        }
        if pending.kind == GestureKind::Resize
            && (end.width != start.width || end.height != start.height)
        {
            patch = patch.size(end.width, end.height);
        }

        if patch.is_empty() {
            None
        } else {
            tracing::debug!(node_id = %id, frames = pending.frames, "gesture committed");
            Some(patch)
        }
    }
}
