//! Row store seam
//!
//! The gateway talks to storage only through [`RowStore`]. Rows are untyped
//! snake_case maps; decoding into typed rows happens in the gateway.

use crate::error::StoreError;
use crate::query::{Query, Table};
use roadmap_model::Row;

/// Row-oriented remote store
///
/// Implementations must be safe to share across tasks. None of these calls is
/// retried by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RowStore: Send + Sync {
    /// Rows matching `query`, sorted and limited as requested
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Insert `row`; the stored row (with generated id) is returned
    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Merge `patch` into every matching row; the updated rows are returned
    async fn update(&self, table: Table, query: &Query, patch: Row)
        -> Result<Vec<Row>, StoreError>;

    /// Delete matching rows; the number removed is returned
    async fn delete(&self, table: Table, query: &Query) -> Result<usize, StoreError>;
}
