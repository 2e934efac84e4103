/// Structured error types for gymtrack-core.
///
/// Store backends (in-memory here, Postgres in gymtrack-server) report every
/// failure through `StoreError`, so callers never depend on a backend's own
/// error type. The binary crate wraps these with `anyhow` where convenient.

use thiserror::Error;

/// Error raised by a `DocumentStore` or while decoding its documents
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend failed (connection, query, permission...)
    #[error("store backend error: {reason}")]
    Backend { reason: String },

    /// Addressed document does not exist
    #[error("{collection} document '{id}' not found")]
    NotFound { collection: String, id: String },

    /// Write rejected by a uniqueness constraint
    #[error("{collection} document conflicts with an existing one: {reason}")]
    Conflict { collection: String, reason: String },

    /// Stored payload is not a field map
    #[error("malformed document '{id}': {reason}")]
    Malformed { id: String, reason: String },

    /// Document could not be decoded into the requested record type
    #[error("failed to decode document '{id}': {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Record could not be encoded into document fields
    #[error("failed to encode fields: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create a backend error from any displayable failure
    pub fn backend(reason: impl ToString) -> Self {
        Self::Backend {
            reason: reason.to_string(),
        }
    }

    /// Create a not-found error
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a uniqueness-conflict error
    pub fn conflict(collection: impl Into<String>, reason: impl ToString) -> Self {
        Self::Conflict {
            collection: collection.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed-document error
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// True when the error means the addressed document is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
