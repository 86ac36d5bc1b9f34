//! Local progress storage errors
//!
//! The tracker never surfaces these to callers: a failed read becomes an
//! empty set and a failed write is logged.

/// Key/value storage failures
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Underlying file I/O failed
    #[error("progress storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value is not a progress record
    #[error("corrupt progress record under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Record could not be encoded
    #[error("failed to encode progress record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ProgressError {
    /// Corrupt-record helper
    pub fn corrupt(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            key: key.into(),
            source,
        }
    }
}
