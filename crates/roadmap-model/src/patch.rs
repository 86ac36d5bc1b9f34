//! Create payloads and partial-update patches
//!
//! Patches carry only the fields an edit touches. Required columns are
//! `Option<T>` (absent = untouched); nullable columns are `Option<Option<T>>`
//! where `Some(None)` clears the column. A patch renders to a storage row
//! holding exactly its present fields and merges into an entity the same way.

use crate::entity::{Connection, ConnectionType, Node, NodeColor, NodeType, Roadmap};
use crate::ids::{NodeId, RoadmapId};
use crate::row::{
    Row, DEFAULT_CONTAINER_HEIGHT, DEFAULT_CONTAINER_WIDTH, DEFAULT_NODE_HEIGHT,
    DEFAULT_NODE_WIDTH,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn put(row: &mut Row, key: &str, value: impl Into<Value>) {
    row.insert(key.to_string(), value.into());
}

fn put_nullable<T: Into<Value>>(row: &mut Row, key: &str, value: Option<T>) {
    row.insert(key.to_string(), value.map_or(Value::Null, Into::into));
}

/// Defaults applied to new nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDefaults {
    pub node_type: NodeType,
    pub color: NodeColor,
    pub width: f64,
    pub height: f64,
    pub container_width: f64,
    pub container_height: f64,
}

impl Default for NodeDefaults {
    fn default() -> Self {
        Self {
            node_type: NodeType::Topic,
            color: NodeColor::Yellow,
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
            container_width: DEFAULT_CONTAINER_WIDTH,
            container_height: DEFAULT_CONTAINER_HEIGHT,
        }
    }
}

/// Input for creating a roadmap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRoadmap {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_published: bool,
}

impl NewRoadmap {
    /// New draft roadmap
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// With explicit slug
    #[inline]
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as published
    #[inline]
    #[must_use]
    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    /// Slug to store: the supplied one, else `roadmap-<unix millis>`
    #[must_use]
    pub fn resolved_slug(&self, now: DateTime<Utc>) -> String {
        match &self.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_string(),
            _ => format!("roadmap-{}", now.timestamp_millis()),
        }
    }

    /// Insert row
    #[must_use]
    pub fn to_row(&self, now: DateTime<Utc>) -> Row {
        let mut row = Row::new();
        put(&mut row, "title", self.title.clone());
        put(&mut row, "slug", self.resolved_slug(now));
        put_nullable(&mut row, "description", self.description.clone());
        put_nullable(&mut row, "icon", self.icon.clone());
        put(&mut row, "is_published", self.is_published);
        put(&mut row, "created_at", now.to_rfc3339());
        put(&mut row, "updated_at", now.to_rfc3339());
        row
    }
}

/// Input for creating a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    pub roadmap_id: RoadmapId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub color: Option<NodeColor>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default)]
    pub is_container: bool,
}

impl NewNode {
    /// New topic node at the origin
    #[must_use]
    pub fn new(roadmap_id: impl Into<RoadmapId>, title: impl Into<String>) -> Self {
        Self {
            roadmap_id: roadmap_id.into(),
            title: title.into(),
            description: None,
            node_type: None,
            color: None,
            icon: None,
            position_x: 0.0,
            position_y: 0.0,
            width: None,
            height: None,
            parent_id: None,
            order_index: None,
            is_optional: false,
            is_recommended: false,
            is_container: false,
        }
    }

    /// At canvas position
    #[inline]
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position_x = x;
        self.position_y = y;
        self
    }

    /// As a container box
    #[inline]
    #[must_use]
    pub fn container(mut self) -> Self {
        self.is_container = true;
        self
    }

    /// Inside a container
    #[inline]
    #[must_use]
    pub fn inside(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// With node type
    #[inline]
    #[must_use]
    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    /// With color
    #[inline]
    #[must_use]
    pub fn with_color(mut self, color: NodeColor) -> Self {
        self.color = Some(color);
        self
    }

    /// With explicit order
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order_index: i32) -> Self {
        self.order_index = Some(order_index);
        self
    }

    /// With explicit size
    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Insert row with defaults applied
    ///
    /// `next_order_index` is used when no explicit order was requested.
    #[must_use]
    pub fn to_row(&self, defaults: &NodeDefaults, next_order_index: i32) -> Row {
        let (width, height) = if self.is_container {
            (defaults.container_width, defaults.container_height)
        } else {
            (defaults.width, defaults.height)
        };

        let mut row = Row::new();
        put(&mut row, "roadmap_id", self.roadmap_id.0.clone());
        put(&mut row, "title", self.title.clone());
        put_nullable(&mut row, "description", self.description.clone());
        put(
            &mut row,
            "node_type",
            self.node_type.unwrap_or(defaults.node_type).as_str(),
        );
        put(&mut row, "color", self.color.unwrap_or(defaults.color).as_str());
        put_nullable(&mut row, "icon", self.icon.clone());
        put(&mut row, "position_x", self.position_x);
        put(&mut row, "position_y", self.position_y);
        put(&mut row, "width", self.width.unwrap_or(width));
        put(&mut row, "height", self.height.unwrap_or(height));
        put_nullable(
            &mut row,
            "parent_id",
            self.parent_id.as_ref().map(|p| p.0.clone()),
        );
        put(
            &mut row,
            "order_index",
            self.order_index.unwrap_or(next_order_index),
        );
        put(&mut row, "is_optional", self.is_optional);
        put(&mut row, "is_recommended", self.is_recommended);
        put(&mut row, "is_container", self.is_container);
        row
    }
}

/// Input for creating a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConnection {
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    #[serde(default)]
    pub connection_type: Option<ConnectionType>,
    #[serde(default)]
    pub label: Option<String>,
}

impl NewConnection {
    /// Default-typed connection
    #[must_use]
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from_node_id: from.into(),
            to_node_id: to.into(),
            connection_type: None,
            label: None,
        }
    }

    /// With connection type
    #[inline]
    #[must_use]
    pub fn with_type(mut self, connection_type: ConnectionType) -> Self {
        self.connection_type = Some(connection_type);
        self
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Insert row
    #[must_use]
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        put(&mut row, "from_node_id", self.from_node_id.0.clone());
        put(&mut row, "to_node_id", self.to_node_id.0.clone());
        put(
            &mut row,
            "connection_type",
            self.connection_type.unwrap_or_default().as_str(),
        );
        put_nullable(&mut row, "label", self.label.clone());
        row
    }
}

/// Partial roadmap update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadmapPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub is_published: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RoadmapPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set title
    #[inline]
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set slug
    #[inline]
    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set or clear description
    #[inline]
    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set or clear icon
    #[inline]
    #[must_use]
    pub fn icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Publish or unpublish
    #[inline]
    #[must_use]
    pub fn published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }

    /// Stamp modification time
    #[inline]
    #[must_use]
    pub fn touched(mut self, now: DateTime<Utc>) -> Self {
        self.updated_at = Some(now);
        self
    }

    /// Whether no field is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.is_published.is_none()
            && self.updated_at.is_none()
    }

    /// Storage row of present fields
    #[must_use]
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        if let Some(title) = &self.title {
            put(&mut row, "title", title.clone());
        }
        if let Some(slug) = &self.slug {
            put(&mut row, "slug", slug.clone());
        }
        if let Some(description) = &self.description {
            put_nullable(&mut row, "description", description.clone());
        }
        if let Some(icon) = &self.icon {
            put_nullable(&mut row, "icon", icon.clone());
        }
        if let Some(is_published) = self.is_published {
            put(&mut row, "is_published", is_published);
        }
        if let Some(updated_at) = self.updated_at {
            put(&mut row, "updated_at", updated_at.to_rfc3339());
        }
        row
    }

    /// Merge present fields into `roadmap`
    pub fn apply_to(&self, roadmap: &mut Roadmap) {
        if let Some(title) = &self.title {
            roadmap.title.clone_from(title);
        }
        if let Some(slug) = &self.slug {
            roadmap.slug.clone_from(slug);
        }
        if let Some(description) = &self.description {
            roadmap.description.clone_from(description);
        }
        if let Some(icon) = &self.icon {
            roadmap.icon.clone_from(icon);
        }
        if let Some(is_published) = self.is_published {
            roadmap.is_published = is_published;
        }
        if let Some(updated_at) = self.updated_at {
            roadmap.updated_at = updated_at;
        }
    }
}

/// Partial node update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub node_type: Option<NodeType>,
    pub color: Option<NodeColor>,
    pub icon: Option<Option<String>>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub parent_id: Option<Option<NodeId>>,
    pub order_index: Option<i32>,
    pub is_optional: Option<bool>,
    pub is_recommended: Option<bool>,
    pub is_container: Option<bool>,
}

impl NodePatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set title
    #[inline]
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set or clear description
    #[inline]
    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set node type
    #[inline]
    #[must_use]
    pub fn node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    /// Set color
    #[inline]
    #[must_use]
    pub fn color(mut self, color: NodeColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Set or clear icon
    #[inline]
    #[must_use]
    pub fn icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Set x coordinate
    #[inline]
    #[must_use]
    pub fn position_x(mut self, x: f64) -> Self {
        self.position_x = Some(x);
        self
    }

    /// Set y coordinate
    #[inline]
    #[must_use]
    pub fn position_y(mut self, y: f64) -> Self {
        self.position_y = Some(y);
        self
    }

    /// Set both coordinates
    #[inline]
    #[must_use]
    pub fn position(self, x: f64, y: f64) -> Self {
        self.position_x(x).position_y(y)
    }

    /// Set both dimensions
    #[inline]
    #[must_use]
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Move into a container, or to the top level with `None`
    #[inline]
    #[must_use]
    pub fn parent(mut self, parent: Option<NodeId>) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Set order
    #[inline]
    #[must_use]
    pub fn order_index(mut self, order_index: i32) -> Self {
        self.order_index = Some(order_index);
        self
    }

    /// Set optional flag
    #[inline]
    #[must_use]
    pub fn optional(mut self, is_optional: bool) -> Self {
        self.is_optional = Some(is_optional);
        self
    }

    /// Set recommended flag
    #[inline]
    #[must_use]
    pub fn recommended(mut self, is_recommended: bool) -> Self {
        self.is_recommended = Some(is_recommended);
        self
    }

    /// Set container flag
    #[inline]
    #[must_use]
    pub fn container(mut self, is_container: bool) -> Self {
        self.is_container = Some(is_container);
        self
    }

    /// Whether no field is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_row().is_empty()
    }

    /// Storage row of present fields
    #[must_use]
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        if let Some(title) = &self.title {
            put(&mut row, "title", title.clone());
        }
        if let Some(description) = &self.description {
            put_nullable(&mut row, "description", description.clone());
        }
        if let Some(node_type) = self.node_type {
            put(&mut row, "node_type", node_type.as_str());
        }
        if let Some(color) = self.color {
            put(&mut row, "color", color.as_str());
        }
        if let Some(icon) = &self.icon {
            put_nullable(&mut row, "icon", icon.clone());
        }
        if let Some(x) = self.position_x {
            put(&mut row, "position_x", x);
        }
        if let Some(y) = self.position_y {
            put(&mut row, "position_y", y);
        }
        if let Some(width) = self.width {
            put(&mut row, "width", width);
        }
        if let Some(height) = self.height {
            put(&mut row, "height", height);
        }
        if let Some(parent_id) = &self.parent_id {
            put_nullable(&mut row, "parent_id", parent_id.as_ref().map(|p| p.0.clone()));
        }
        if let Some(order_index) = self.order_index {
            put(&mut row, "order_index", order_index);
        }
        if let Some(is_optional) = self.is_optional {
            put(&mut row, "is_optional", is_optional);
        }
        if let Some(is_recommended) = self.is_recommended {
            put(&mut row, "is_recommended", is_recommended);
        }
        if let Some(is_container) = self.is_container {
            put(&mut row, "is_container", is_container);
        }
        row
    }

    /// Merge present fields into `node`
    pub fn apply_to(&self, node: &mut Node) {
        if let Some(title) = &self.title {
            node.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            node.description.clone_from(description);
        }
        if let Some(node_type) = self.node_type {
            node.node_type = node_type;
        }
        if let Some(color) = self.color {
            node.color = color;
        }
        if let Some(icon) = &self.icon {
            node.icon.clone_from(icon);
        }
        if let Some(x) = self.position_x {
            node.position_x = x;
        }
        if let Some(y) = self.position_y {
            node.position_y = y;
        }
        if let Some(width) = self.width {
            node.width = width;
        }
        if let Some(height) = self.height {
            node.height = height;
        }
        if let Some(parent_id) = &self.parent_id {
            node.parent_id.clone_from(parent_id);
        }
        if let Some(order_index) = self.order_index {
            node.order_index = order_index;
        }
        if let Some(is_optional) = self.is_optional {
            node.is_optional = is_optional;
        }
        if let Some(is_recommended) = self.is_recommended {
            node.is_recommended = is_recommended;
        }
        if let Some(is_container) = self.is_container {
            node.is_container = is_container;
        }
    }
}

/// Partial connection update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionPatch {
    pub from_node_id: Option<NodeId>,
    pub to_node_id: Option<NodeId>,
    pub connection_type: Option<ConnectionType>,
    pub label: Option<Option<String>>,
}

impl ConnectionPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connection type
    #[inline]
    #[must_use]
    pub fn connection_type(mut self, connection_type: ConnectionType) -> Self {
        self.connection_type = Some(connection_type);
        self
    }

    /// Set or clear label
    #[inline]
    #[must_use]
    pub fn label(mut self, label: Option<String>) -> Self {
        self.label = Some(label);
        self
    }

    /// Reattach endpoints
    #[inline]
    #[must_use]
    pub fn endpoints(mut self, from: NodeId, to: NodeId) -> Self {
        self.from_node_id = Some(from);
        self.to_node_id = Some(to);
        self
    }

    /// Whether no field is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_row().is_empty()
    }

    /// Storage row of present fields
    #[must_use]
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        if let Some(from) = &self.from_node_id {
            put(&mut row, "from_node_id", from.0.clone());
        }
        if let Some(to) = &self.to_node_id {
            put(&mut row, "to_node_id", to.0.clone());
        }
        if let Some(connection_type) = self.connection_type {
            put(&mut row, "connection_type", connection_type.as_str());
        }
        if let Some(label) = &self.label {
            put_nullable(&mut row, "label", label.clone());
        }
        row
    }

    /// Merge present fields into `connection`
    pub fn apply_to(&self, connection: &mut Connection) {
        if let Some(from) = &self.from_node_id {
            connection.from_node_id.clone_from(from);
        }
        if let Some(to) = &self.to_node_id {
            connection.to_node_id.clone_from(to);
        }
        if let Some(connection_type) = self.connection_type {
            connection.connection_type = connection_type;
        }
        if let Some(label) = &self.label {
            connection.label.clone_from(label);
        }
    }
}
