//! Viewer identity and progress settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whose progress is being tracked
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ViewerKey {
    /// No signed-in user; progress belongs to the device
    #[default]
    Anonymous,
    /// Identified user
    User(String),
}

impl ViewerKey {
    /// Identified viewer
    #[inline]
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }

    /// Viewer from an optional user id; blank ids count as anonymous
    #[must_use]
    pub fn from_user_id(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            Some(id) if !id.is_empty() => Self::User(id.to_string()),
            _ => Self::Anonymous,
        }
    }

    /// Check if no user is signed in
    #[inline]
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Storage key holding this viewer's record
    #[must_use]
    pub fn storage_key(&self, config: &ProgressConfig) -> String {
        match self {
            Self::Anonymous => format!("{}{}", config.key_prefix, config.anonymous_key),
            Self::User(id) => format!("{}{}", config.key_prefix, id),
        }
    }
}

impl std::fmt::Display for ViewerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::User(id) => f.write_str(id),
        }
    }
}

/// Progress tracking settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Prefix of every storage key
    pub key_prefix: String,
    /// Key suffix used for anonymous viewers
    pub anonymous_key: String,
    /// Directory for file-backed storage; memory storage when unset
    pub storage_dir: Option<PathBuf>,
    /// Drop a roadmap's stored progress when the roadmap is deleted
    pub purge_on_roadmap_delete: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            key_prefix: "roadmap-progress-".to_string(),
            anonymous_key: "anonymous".to_string(),
            storage_dir: None,
            purge_on_roadmap_delete: false,
        }
    }
}

impl ProgressConfig {
    /// Use file storage under `dir`
    #[inline]
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// Enable or disable purging on roadmap delete
    #[inline]
    #[must_use]
    pub fn with_purge_on_roadmap_delete(mut self, purge: bool) -> Self {
        self.purge_on_roadmap_delete = purge;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys() {
        let config = ProgressConfig::default();
        assert_eq!(
            ViewerKey::Anonymous.storage_key(&config),
            "roadmap-progress-anonymous"
        );
        assert_eq!(
            ViewerKey::user("u-42").storage_key(&config),
            "roadmap-progress-u-42"
        );
    }

    #[test]
    fn blank_user_id_is_anonymous() {
        assert!(ViewerKey::from_user_id(None).is_anonymous());
        assert!(ViewerKey::from_user_id(Some("  ")).is_anonymous());
        assert_eq!(ViewerKey::from_user_id(Some("u1")), ViewerKey::user("u1"));
    }
}
