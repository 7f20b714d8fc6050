//! Engine error types
//!
//! Error codes:
//! - TABLEDB_NOT_FOUND
//! - TABLEDB_ALREADY_EXISTS
//! - TABLEDB_VALIDATION
//! - TABLEDB_STORAGE_UNAVAILABLE
//! - TABLEDB_CANCELLED
//! - TABLEDB_INTERNAL
//!
//! A predicate that matches nothing is not an error; mutations report it as
//! an empty list of affected ids.

use thiserror::Error;

use crate::schema::SchemaError;
use crate::storage::StorageError;

/// Broad classification of engine failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Validation,
    StorageUnavailable,
    Cancelled,
    Internal,
}

impl ErrorKind {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "TABLEDB_NOT_FOUND",
            ErrorKind::AlreadyExists => "TABLEDB_ALREADY_EXISTS",
            ErrorKind::Validation => "TABLEDB_VALIDATION",
            ErrorKind::StorageUnavailable => "TABLEDB_STORAGE_UNAVAILABLE",
            ErrorKind::Cancelled => "TABLEDB_CANCELLED",
            ErrorKind::Internal => "TABLEDB_INTERNAL",
        }
    }
}

/// Engine error. The display text is what the shell shows the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbError {
    /// Table or column missing
    #[error("{0}")]
    NotFound(String),

    /// Table name collision
    #[error("{0}")]
    AlreadyExists(String),

    /// Value/type mismatch, wrong argument count, malformed column spec
    #[error("{0}")]
    Validation(String),

    /// Document store read or write failed
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// User declined a confirmation prompt
    #[error("Operation cancelled.")]
    Cancelled,

    /// Anything unexpected caught at the operation boundary
    #[error("Unexpected error occurred: {0}")]
    Internal(String),
}

impl DbError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Validation(_) => ErrorKind::Validation,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

impl From<SchemaError> for DbError {
    fn from(e: SchemaError) -> Self {
        if e.is_not_found() {
            Self::NotFound(e.to_string())
        } else if let SchemaError::TableExists(_) = e {
            Self::AlreadyExists(e.to_string())
        } else {
            Self::Validation(e.to_string())
        }
    }
}

/// Result type for engine operations
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_classified() {
        assert_eq!(
            DbError::from(SchemaError::UnknownTable("t".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DbError::from(SchemaError::UnknownColumn("c".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DbError::from(SchemaError::TableExists("t".into())).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            DbError::from(SchemaError::MalformedColumn("x".into())).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_message_passes_through() {
        let err = DbError::from(SchemaError::UnknownTable("users".into()));
        assert_eq!(err.to_string(), "Table \"users\" does not exist.");
        assert_eq!(err.code(), "TABLEDB_NOT_FOUND");
    }

    #[test]
    fn test_storage_error_wrapped() {
        let err = DbError::from(StorageError::io("data/t.json", "permission denied"));
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
        assert!(err.to_string().contains("data/t.json"));
    }
}
