//! View-model settings

use serde::{Deserialize, Serialize};

/// Settings for the flow view-model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// CSS selector of the element a container is dragged by
    pub container_drag_handle: String,
    /// Stroke of default and optional edges
    pub neutral_stroke: String,
    /// Stroke of recommended edges
    pub highlight_stroke: String,
    /// Dash pattern of optional edges
    pub optional_dash: String,
    /// Stroke width of every edge
    pub stroke_width: u8,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            container_drag_handle: ".container-drag-handle".to_string(),
            neutral_stroke: "#94a3b8".to_string(),
            highlight_stroke: "#22c55e".to_string(),
            optional_dash: "5 5".to_string(),
            stroke_width: 2,
        }
    }
}

impl FlowConfig {
    /// With container drag-handle selector
    #[inline]
    #[must_use]
    pub fn with_drag_handle(mut self, selector: impl Into<String>) -> Self {
        self.container_drag_handle = selector.into();
        self
    }

    /// With edge strokes
    #[inline]
    #[must_use]
    pub fn with_strokes(mut self, neutral: impl Into<String>, highlight: impl Into<String>) -> Self {
        self.neutral_stroke = neutral.into();
        self.highlight_stroke = highlight.into();
        self
    }
}
