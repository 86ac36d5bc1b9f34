//! Row store with injectable failures

use dashmap::DashMap;
use parking_lot::Mutex;
use roadmap_model::Row;
use roadmap_store::{Query, RowStore, StoreError, Table};
use std::collections::HashSet;
use std::sync::Arc;

/// Row store call kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Wraps another store, failing chosen (table, operation) pairs and counting
/// every call
pub struct FlakyStore {
    inner: Arc<dyn RowStore>,
    failing: Mutex<HashSet<(Table, Operation)>>,
    calls: DashMap<(Table, Operation), usize>,
}

impl std::fmt::Debug for FlakyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlakyStore")
            .field("failing", &*self.failing.lock())
            .finish_non_exhaustive()
    }
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn RowStore>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            calls: DashMap::new(),
        }
    }

    /// Fail every later `operation` on `table` until healed
    pub fn fail(&self, table: Table, operation: Operation) {
        self.failing.lock().insert((table, operation));
    }

    /// Stop failing anything
    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    /// Calls seen for `operation` on `table`, failed ones included
    pub fn calls(&self, table: Table, operation: Operation) -> usize {
        self.calls.get(&(table, operation)).map_or(0, |n| *n)
    }

    fn enter(&self, table: Table, operation: Operation) -> Result<(), StoreError> {
        *self.calls.entry((table, operation)).or_insert(0) += 1;
        if self.failing.lock().contains(&(table, operation)) {
            return Err(StoreError::backend(table, operation.name(), "injected failure"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RowStore for FlakyStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.enter(table, Operation::Select)?;
        self.inner.select(table, query).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        self.enter(table, Operation::Insert)?;
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: Table, query: &Query, patch: Row) -> Result<Vec<Row>, StoreError> {
        self.enter(table, Operation::Update)?;
        self.inner.update(table, query, patch).await
    }

    async fn delete(&self, table: Table, query: &Query) -> Result<usize, StoreError> {
        self.enter(table, Operation::Delete)?;
        self.inner.delete(table, query).await
    }
}
