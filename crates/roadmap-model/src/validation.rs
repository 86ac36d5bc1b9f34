//! Referential checks for proposed writes
//!
//! Every check runs against the nodes of the roadmap currently loaded, before
//! anything is sent to storage. `audit` runs the same rules over a whole graph
//! and collects every violation instead of stopping at the first.

use crate::containment::ContainmentGraph;
use crate::entity::{Connection, Node};
use crate::error::ValidationError;
use crate::ids::{NodeId, RoadmapId};
use crate::patch::{ConnectionPatch, NewConnection, NewNode, NodePatch};

/// Reject blank titles
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

/// Accept only URL-safe slugs: `[a-z0-9]` runs joined by single dashes
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::InvalidSlug(slug.to_string()))
    }
}

/// Check that `parent` may contain `child` within `roadmap`
///
/// `child` is `None` for a node that does not exist yet.
pub fn validate_parent(
    nodes: &[Node],
    child: Option<&NodeId>,
    roadmap: &RoadmapId,
    parent: &NodeId,
) -> Result<(), ValidationError> {
    if let Some(child) = child {
        if child == parent {
            return Err(ValidationError::SelfParent {
                node: child.clone(),
            });
        }
    }

    let target = nodes
        .iter()
        .find(|n| &n.id == parent)
        .ok_or_else(|| ValidationError::ParentNotFound {
            parent: parent.clone(),
        })?;

    if &target.roadmap_id != roadmap {
        return Err(ValidationError::CrossRoadmapParent {
            parent: parent.clone(),
            parent_roadmap: target.roadmap_id.clone(),
            roadmap: roadmap.clone(),
        });
    }

    if !target.is_container {
        return Err(ValidationError::ParentNotContainer {
            parent: parent.clone(),
        });
    }

    if let Some(child) = child {
        if ContainmentGraph::from_nodes(nodes).would_create_cycle(child, parent) {
            return Err(ValidationError::ContainmentCycle {
                node: child.clone(),
            });
        }
    }

    Ok(())
}

/// Check a create request against the loaded nodes
pub fn validate_new_node(nodes: &[Node], new: &NewNode) -> Result<(), ValidationError> {
    validate_title(&new.title)?;
    if let Some(parent) = &new.parent_id {
        validate_parent(nodes, None, &new.roadmap_id, parent)?;
    }
    Ok(())
}

/// Check a patch against the node it edits
pub fn validate_node_patch(
    nodes: &[Node],
    node: &Node,
    patch: &NodePatch,
) -> Result<(), ValidationError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }

    if let Some(Some(parent)) = &patch.parent_id {
        validate_parent(nodes, Some(&node.id), &node.roadmap_id, parent)?;
    }

    if patch.is_container == Some(false) && node.is_container {
        let children = nodes
            .iter()
            .filter(|n| n.parent_id.as_ref() == Some(&node.id))
            .count();
        if children > 0 {
            return Err(ValidationError::ContainerNotEmpty {
                node: node.id.clone(),
                children,
            });
        }
    }

    Ok(())
}

/// Check that both endpoints are loaded nodes of the same roadmap
pub fn validate_endpoints(
    nodes: &[Node],
    from: &NodeId,
    to: &NodeId,
) -> Result<(), ValidationError> {
    let find = |endpoint: &NodeId| {
        nodes
            .iter()
            .find(|n| &n.id == endpoint)
            .ok_or_else(|| ValidationError::ForeignEndpoint {
                node: endpoint.clone(),
            })
    };
    let (source, target) = (find(from)?, find(to)?);

    if source.roadmap_id != target.roadmap_id {
        return Err(ValidationError::CrossRoadmapConnection {
            from: from.clone(),
            to: to.clone(),
        });
    }
    Ok(())
}

/// Check a connection create request
pub fn validate_new_connection(
    nodes: &[Node],
    new: &NewConnection,
) -> Result<(), ValidationError> {
    validate_endpoints(nodes, &new.from_node_id, &new.to_node_id)
}

/// Check a connection patch against the connection it edits
pub fn validate_connection_patch(
    nodes: &[Node],
    connection: &Connection,
    patch: &ConnectionPatch,
) -> Result<(), ValidationError> {
    let from = patch
        .from_node_id
        .as_ref()
        .unwrap_or(&connection.from_node_id);
    let to = patch.to_node_id.as_ref().unwrap_or(&connection.to_node_id);
    if patch.from_node_id.is_some() || patch.to_node_id.is_some() {
        validate_endpoints(nodes, from, to)?;
    }
    Ok(())
}

/// Every invariant violation in a loaded graph
#[must_use]
pub fn audit(nodes: &[Node], connections: &[Connection]) -> Vec<ValidationError> {
    let mut problems = Vec::new();

    for node in nodes {
        if let Some(parent) = &node.parent_id {
            if parent == &node.id {
                problems.push(ValidationError::SelfParent {
                    node: node.id.clone(),
                });
                continue;
            }
            if let Err(e) = validate_parent(nodes, None, &node.roadmap_id, parent) {
                problems.push(e);
            }
        }
    }

    let graph = ContainmentGraph::from_nodes(nodes);
    if graph.is_cyclic() {
        if let Err(e) = graph.depths() {
            problems.push(e);
        }
    }

    for connection in connections {
        if let Err(e) = validate_endpoints(nodes, &connection.from_node_id, &connection.to_node_id)
        {
            problems.push(e);
        }
    }

    problems
}
