//! Row-store query language
//!
//! A deliberately small subset of what a hosted relational store exposes:
//! equality and membership filters, ordering, a limit, and one embedded
//! to-one join.

use roadmap_model::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Tables the gateway touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Roadmaps,
    Nodes,
    Connections,
    NodePosts,
    Posts,
}

impl Table {
    /// All tables
    pub const ALL: [Table; 5] = [
        Self::Roadmaps,
        Self::Nodes,
        Self::Connections,
        Self::NodePosts,
        Self::Posts,
    ];

    /// Storage table name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Roadmaps => "roadmaps",
            Self::Nodes => "roadmap_nodes",
            Self::Connections => "roadmap_connections",
            Self::NodePosts => "roadmap_node_posts",
            Self::Posts => "posts",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Row predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq(String, Value),
    /// `column IN (values)`
    In(String, Vec<Value>),
}

impl Filter {
    fn matches(&self, row: &Row) -> bool {
        match self {
            Self::Eq(column, value) => row.get(column).unwrap_or(&Value::Null) == value,
            Self::In(column, values) => {
                let actual = row.get(column).unwrap_or(&Value::Null);
                values.iter().any(|v| v == actual)
            }
        }
    }
}

/// Sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// To-one join: attach the `table` row whose `id` equals `row[local_column]`
/// under `alias`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub table: Table,
    pub local_column: String,
    pub alias: String,
}

/// Select/update/delete selector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub limit: Option<usize>,
    pub embed: Option<Embed>,
}

impl Query {
    /// Match every row
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match on `id`
    #[inline]
    #[must_use]
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq("id", id.into())
    }

    /// Add equality filter
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.into(), value.into()));
        self
    }

    /// Add membership filter
    #[must_use]
    pub fn is_in<V: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Filter::In(
            column.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Add sort key (applied in insertion order, stable)
    #[must_use]
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order.push(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Cap result size
    #[inline]
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Embed a joined row
    #[must_use]
    pub fn embed(
        mut self,
        table: Table,
        local_column: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        self.embed = Some(Embed {
            table,
            local_column: local_column.into(),
            alias: alias.into(),
        });
        self
    }

    /// Whether `row` passes every filter
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Comparator implementing the sort keys
    #[must_use]
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        for key in &self.order {
            let left = a.get(&key.column).unwrap_or(&Value::Null);
            let right = b.get(&key.column).unwrap_or(&Value::Null);
            let ord = compare_values(left, right);
            let ord = if key.ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Total order over JSON scalars: null < bool < number < string < other
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
