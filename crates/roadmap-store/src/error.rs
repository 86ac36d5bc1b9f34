//! Error types for the persistence layer
//!
//! - `StoreError`: a failed read or write against the row store
//! - `GatewayError`: what gateway callers see (storage, not-found, validation)

use crate::query::Table;
use roadmap_model::ValidationError;

/// Row store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend rejected or failed the request
    #[error("{operation} on {table} failed: {message}")]
    Backend {
        table: Table,
        operation: &'static str,
        message: String,
    },

    /// Unique constraint violated
    #[error("duplicate {table}.{column}: '{value}'")]
    UniqueViolation {
        table: Table,
        column: String,
        value: String,
    },

    /// Row could not be decoded into its typed shape
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Snapshot file I/O
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Backend failure helper
    pub fn backend(table: Table, operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            table,
            operation,
            message: message.into(),
        }
    }
}

/// Gateway operation failures
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Storage read/write failed; in-memory state is unchanged
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Requested entity does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Proposed write breaks a graph invariant; nothing was written
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl GatewayError {
    /// Not-found helper
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Check if error is not-found
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the same call may succeed when retried
    ///
    /// Only transient backend failures qualify; a retried create may
    /// duplicate a row.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Backend { .. } | StoreError::Io(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_model::NodeId;

    #[test]
    fn gateway_error_classification() {
        let backend = GatewayError::from(StoreError::backend(Table::Nodes, "insert", "offline"));
        assert!(backend.is_retryable());
        assert!(!backend.is_not_found());

        let missing = GatewayError::not_found("roadmap", "nope");
        assert!(missing.is_not_found());
        assert!(!missing.is_retryable());
        assert_eq!(missing.to_string(), "roadmap not found: nope");

        let invalid = GatewayError::from(ValidationError::SelfParent {
            node: NodeId::from("n1"),
        });
        assert!(!invalid.is_retryable());
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::UniqueViolation {
            table: Table::Roadmaps,
            column: "slug".into(),
            value: "rust".into(),
        };
        assert_eq!(err.to_string(), "duplicate roadmaps.slug: 'rust'");
    }
}
