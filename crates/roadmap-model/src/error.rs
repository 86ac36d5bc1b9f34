//! Error types for the graph model
//!
//! The model itself cannot fail except through referential checks on a
//! proposed write; those checks report a [`ValidationError`].

use crate::ids::{NodeId, RoadmapId};

/// Referential-integrity violations of a proposed write
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A node named itself as parent
    #[error("node {node} cannot contain itself")]
    SelfParent { node: NodeId },

    /// Parent is not among the roadmap's nodes
    #[error("parent {parent} not found")]
    ParentNotFound { parent: NodeId },

    /// Parent exists but is not a container
    #[error("parent {parent} is not a container")]
    ParentNotContainer { parent: NodeId },

    /// Parent belongs to a different roadmap
    #[error("parent {parent} belongs to roadmap {parent_roadmap}, not {roadmap}")]
    CrossRoadmapParent {
        parent: NodeId,
        parent_roadmap: RoadmapId,
        roadmap: RoadmapId,
    },

    /// Parent links would loop back
    #[error("containment cycle through {node}")]
    ContainmentCycle { node: NodeId },

    /// Container still holds children and cannot stop being one
    #[error("container {node} still holds {children} node(s)")]
    ContainerNotEmpty { node: NodeId, children: usize },

    /// Connection endpoint is not a node of the loaded roadmap
    #[error("connection endpoint {node} is not part of the roadmap")]
    ForeignEndpoint { node: NodeId },

    /// Connection endpoints sit in different roadmaps
    #[error("connection {from} -> {to} crosses roadmaps")]
    CrossRoadmapConnection { from: NodeId, to: NodeId },

    /// Write targets a roadmap other than the loaded one
    #[error("roadmap {roadmap} is not loaded")]
    RoadmapNotLoaded { roadmap: RoadmapId },

    /// Slug contains characters outside `[a-z0-9-]`
    #[error("invalid slug '{0}': use lowercase letters, digits and dashes")]
    InvalidSlug(String),

    /// Title is blank
    #[error("title must not be empty")]
    EmptyTitle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::ParentNotContainer {
            parent: NodeId::from("n2"),
        };
        assert!(err.to_string().contains("not a container"));

        let err = ValidationError::InvalidSlug("Bad Slug".into());
        assert!(err.to_string().contains("Bad Slug"));
    }
}
