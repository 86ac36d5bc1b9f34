//! In-process row store
//!
//! Behaves like the hosted schema the gateway was written against:
//! - generated UUID ids on insert
//! - unique `id` per table and unique `roadmaps.slug`
//! - foreign keys: deleting a roadmap deletes its nodes; deleting a node
//!   deletes its connections and post links and detaches its children;
//!   deleting a post deletes its links
//!
//! State can be loaded from and saved to a JSON snapshot.

use crate::backend::RowStore;
use crate::error::StoreError;
use crate::query::{Query, Table};
use dashmap::DashMap;
use roadmap_model::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

const UNIQUE_COLUMNS: &[(Table, &str)] = &[(Table::Roadmaps, "slug")];

/// Serialized contents of a [`MemoryStore`], keyed by table name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub roadmaps: Vec<Row>,
    pub roadmap_nodes: Vec<Row>,
    pub roadmap_connections: Vec<Row>,
    pub roadmap_node_posts: Vec<Row>,
    pub posts: Vec<Row>,
}

impl Snapshot {
    fn table(&self, table: Table) -> &Vec<Row> {
        match table {
            Table::Roadmaps => &self.roadmaps,
            Table::Nodes => &self.roadmap_nodes,
            Table::Connections => &self.roadmap_connections,
            Table::NodePosts => &self.roadmap_node_posts,
            Table::Posts => &self.posts,
        }
    }

    fn table_mut(&mut self, table: Table) -> &mut Vec<Row> {
        match table {
            Table::Roadmaps => &mut self.roadmaps,
            Table::Nodes => &mut self.roadmap_nodes,
            Table::Connections => &mut self.roadmap_connections,
            Table::NodePosts => &mut self.roadmap_node_posts,
            Table::Posts => &mut self.posts,
        }
    }
}

/// DashMap-backed [`RowStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<Table, Vec<Row>>,
}

impl MemoryStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `snapshot`
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        for table in Table::ALL {
            store.seed(table, snapshot.table(table).iter().cloned());
        }
        store
    }

    /// Copy of every table
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for table in Table::ALL {
            *snapshot.table_mut(table) = self.rows(table);
        }
        snapshot
    }

    /// Load a JSON snapshot file
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write a JSON snapshot file
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Append rows verbatim (no id generation or constraint checks)
    pub fn seed(&self, table: Table, rows: impl IntoIterator<Item = Row>) {
        self.tables.entry(table).or_default().extend(rows);
    }

    /// Number of rows in `table`
    #[must_use]
    pub fn len(&self, table: Table) -> usize {
        self.tables.get(&table).map_or(0, |rows| rows.len())
    }

    /// Whether `table` has no rows
    #[must_use]
    pub fn is_empty(&self, table: Table) -> bool {
        self.len(table) == 0
    }

    fn rows(&self, table: Table) -> Vec<Row> {
        self.tables
            .get(&table)
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }

    fn check_unique(
        table: Table,
        rows: &[Row],
        candidate: &Row,
        skip: Option<usize>,
    ) -> Result<(), StoreError> {
        let columns = std::iter::once("id").chain(
            UNIQUE_COLUMNS
                .iter()
                .filter(|(t, _)| *t == table)
                .map(|(_, c)| *c),
        );

        for column in columns {
            let Some(value) = candidate.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = rows
                .iter()
                .enumerate()
                .any(|(i, r)| Some(i) != skip && r.get(column) == Some(value));
            if clash {
                return Err(StoreError::UniqueViolation {
                    table,
                    column: column.to_string(),
                    value: value.as_str().map_or_else(|| value.to_string(), str::to_string),
                });
            }
        }
        Ok(())
    }

    fn select_rows(&self, table: Table, query: &Query) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .rows(table)
            .into_iter()
            .filter(|r| query.matches(r))
            .collect();
        rows.sort_by(|a, b| query.compare(a, b));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        if let Some(embed) = &query.embed {
            let joined: HashMap<String, Row> = self
                .rows(embed.table)
                .into_iter()
                .filter_map(|r| {
                    let id = r.get("id")?.as_str()?.to_string();
                    Some((id, r))
                })
                .collect();

            for row in &mut rows {
                let target = row
                    .get(&embed.local_column)
                    .and_then(Value::as_str)
                    .and_then(|key| joined.get(key))
                    .cloned()
                    .map_or(Value::Null, Value::Object);
                row.insert(embed.alias.clone(), target);
            }
        }

        rows
    }

    fn insert_row(&self, table: Table, mut row: Row) -> Result<Row, StoreError> {
        if row.get("id").map_or(true, Value::is_null) {
            row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }

        let mut rows = self.tables.entry(table).or_default();
        Self::check_unique(table, &rows, &row, None)?;
        rows.push(row.clone());
        Ok(row)
    }

    fn update_rows(&self, table: Table, query: &Query, patch: &Row) -> Result<Vec<Row>, StoreError> {
        let mut rows = self.tables.entry(table).or_default();

        let mut staged = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if !query.matches(row) {
                continue;
            }
            let mut merged = row.clone();
            for (key, value) in patch {
                merged.insert(key.clone(), value.clone());
            }
            Self::check_unique(table, &rows, &merged, Some(i))?;
            staged.push((i, merged));
        }

        let mut updated = Vec::with_capacity(staged.len());
        for (i, merged) in staged {
            rows[i] = merged.clone();
            updated.push(merged);
        }
        Ok(updated)
    }

    fn delete_rows(&self, table: Table, query: &Query) -> usize {
        let removed: Vec<Value> = {
            let mut rows = self.tables.entry(table).or_default();
            let (gone, kept): (Vec<Row>, Vec<Row>) =
                rows.drain(..).partition(|r| query.matches(r));
            *rows = kept;
            gone.into_iter()
                .map(|r| r.get("id").cloned().unwrap_or(Value::Null))
                .collect()
        };

        let count = removed.len();
        if count > 0 {
            self.cascade(table, &removed);
        }
        count
    }

    fn cascade(&self, table: Table, ids: &[Value]) {
        match table {
            Table::Roadmaps => {
                self.delete_rows(Table::Nodes, &Query::new().is_in("roadmap_id", ids.to_vec()));
            }
            Table::Nodes => {
                self.delete_rows(
                    Table::Connections,
                    &Query::new().is_in("from_node_id", ids.to_vec()),
                );
                self.delete_rows(
                    Table::Connections,
                    &Query::new().is_in("to_node_id", ids.to_vec()),
                );
                self.delete_rows(Table::NodePosts, &Query::new().is_in("node_id", ids.to_vec()));

                if let Some(mut nodes) = self.tables.get_mut(&Table::Nodes) {
                    for node in nodes.iter_mut() {
                        if node.get("parent_id").is_some_and(|p| ids.contains(p)) {
                            node.insert("parent_id".to_string(), Value::Null);
                        }
                    }
                }
            }
            Table::Posts => {
                self.delete_rows(Table::NodePosts, &Query::new().is_in("post_id", ids.to_vec()));
            }
            Table::Connections | Table::NodePosts => {}
        }
    }
}

#[async_trait::async_trait]
impl RowStore for MemoryStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        let rows = self.select_rows(table, query);
        tracing::trace!(%table, rows = rows.len(), "select");
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        let row = self.insert_row(table, row)?;
        tracing::trace!(%table, "insert");
        Ok(row)
    }

    async fn update(&self, table: Table, query: &Query, patch: Row) -> Result<Vec<Row>, StoreError> {
        let rows = self.update_rows(table, query, &patch)?;
        tracing::trace!(%table, rows = rows.len(), "update");
        Ok(rows)
    }

    async fn delete(&self, table: Table, query: &Query) -> Result<usize, StoreError> {
        let count = self.delete_rows(table, query);
        tracing::trace!(%table, rows = count, "delete");
        Ok(count)
    }
}
