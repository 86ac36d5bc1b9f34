//! Service configuration
//!
//! Loaded from TOML; every key is optional and falls back to its default.
//!
//! ```toml
//! [nodes]
//! node_type = "topic"
//! color = "yellow"
//! width = 200.0
//!
//! [progress]
//! storage_dir = "/var/lib/roadmap/progress"
//! purge_on_roadmap_delete = false
//!
//! [flow]
//! container_drag_handle = ".container-drag-handle"
//! ```

use roadmap_flow::FlowConfig;
use roadmap_model::{NodeColor, NodeDefaults, NodeType};
use roadmap_progress::ProgressConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapConfig {
    /// Defaults applied to created nodes
    pub nodes: NodeDefaults,
    /// Local progress tracking
    pub progress: ProgressConfig,
    /// Canvas view-model
    pub flow: FlowConfig,
}

impl RoadmapConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// With default node type and color
    #[inline]
    #[must_use]
    pub fn with_node_style(mut self, node_type: NodeType, color: NodeColor) -> Self {
        self.nodes.node_type = node_type;
        self.nodes.color = color;
        self
    }

    /// With file-backed progress under `dir`
    #[inline]
    #[must_use]
    pub fn with_progress_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.progress = self.progress.with_storage_dir(dir);
        self
    }

    /// With purge of stored progress on roadmap delete
    #[inline]
    #[must_use]
    pub fn with_purge_on_roadmap_delete(mut self, purge: bool) -> Self {
        self.progress = self.progress.with_purge_on_roadmap_delete(purge);
        self
    }

    /// With canvas settings
    #[inline]
    #[must_use]
    pub fn with_flow(mut self, flow: FlowConfig) -> Self {
        self.flow = flow;
        self
    }
}
