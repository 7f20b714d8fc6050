//! Storage error types

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Document store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Document bytes exist but do not decode
    #[error("Document '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    /// Underlying read/write failed
    #[error("I/O error on '{key}': {reason}")]
    Io { key: String, reason: String },

    /// Document could not be encoded
    #[error("Failed to encode document '{key}': {reason}")]
    Encode { key: String, reason: String },
}

impl StorageError {
    pub fn io(key: impl Into<String>, err: impl ToString) -> Self {
        Self::Io {
            key: key.into(),
            reason: err.to_string(),
        }
    }

    pub fn corrupt(key: impl Into<String>, err: impl ToString) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: err.to_string(),
        }
    }

    /// Key of the document involved.
    pub fn key(&self) -> &str {
        match self {
            Self::Corrupt { key, .. } | Self::Io { key, .. } | Self::Encode { key, .. } => key,
        }
    }
}
