//! Canvas rectangles and the soft containment bound

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in canvas units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of a node
    #[inline]
    #[must_use]
    pub fn of(node: &roadmap_model::Node) -> Self {
        Self::new(node.position_x, node.position_y, node.width, node.height)
    }

    /// Same size at another position
    #[inline]
    #[must_use]
    pub fn at(self, x: f64, y: f64) -> Self {
        Self { x, y, ..self }
    }
}

/// Keep a child inside its container
///
/// Child coordinates are relative to the parent's origin, as the canvas
/// stores them. A child larger than its parent is pinned to the parent's
/// top-left corner.
#[must_use]
pub fn clamp_to_parent(child: Rect, parent: Rect) -> Rect {
    let max_x = (parent.width - child.width).max(0.0);
    let max_y = (parent.height - child.height).max(0.0);
    child.at(child.x.clamp(0.0, max_x), child.y.clamp(0.0, max_y))
}
