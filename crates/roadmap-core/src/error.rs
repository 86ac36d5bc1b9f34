//! Error types for the roadmap service
//!
//! - Gateway failures (storage, not-found, rejected writes)
//! - Illegal editor interactions
//! - Configuration loading
//! - Calls that need a loaded roadmap or node

use crate::config::ConfigError;
use roadmap_flow::SelectionError;
use roadmap_model::NodeId;
use roadmap_store::GatewayError;

/// Main service error type
#[derive(Debug, thiserror::Error)]
pub enum RoadmapError {
    /// Persistence gateway failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Editor interaction not allowed in the current selection
    #[error("editor: {0}")]
    Selection(#[from] SelectionError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Operation needs a loaded roadmap
    #[error("no roadmap loaded")]
    NoRoadmapLoaded,

    /// Node is not part of the loaded roadmap
    #[error("node not loaded: {0}")]
    NodeNotLoaded(NodeId),
}

impl RoadmapError {
    /// Check if error is not-found
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Gateway(e) => e.is_not_found(),
            Self::NodeNotLoaded(_) | Self::NoRoadmapLoaded => true,
            _ => false,
        }
    }

    /// Check if the same call may succeed when retried
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Gateway(e) if e.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_gateway() {
        let missing = RoadmapError::from(GatewayError::not_found("roadmap", "rust"));
        assert!(missing.is_not_found());
        assert!(!missing.is_retryable());
        assert_eq!(missing.to_string(), "roadmap not found: rust");

        assert!(RoadmapError::NoRoadmapLoaded.is_not_found());
        let selection = RoadmapError::from(SelectionError::NothingSelected { action: "delete" });
        assert!(!selection.is_not_found());
    }
}
