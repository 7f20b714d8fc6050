//! Schema error types
//!
//! Every variant is a rejection: the catalog is left exactly as it was.

use thiserror::Error;

/// Schema-level failures raised while declaring or dropping tables and while
/// coercing values against column types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Table name collision on create
    #[error("Table \"{0}\" already exists.")]
    TableExists(String),

    /// Table lookup failed
    #[error("Table \"{0}\" does not exist.")]
    UnknownTable(String),

    /// Column lookup failed
    #[error("Column '{0}' does not exist.")]
    UnknownColumn(String),

    /// Table name contains characters that cannot be used as a document key
    #[error("Invalid table name: \"{0}\". Use letters, digits and underscores.")]
    InvalidTableName(String),

    /// Column definition without `:` or with an empty name
    #[error("Invalid value: {0}. Please try again.")]
    MalformedColumn(String),

    /// Column type outside int/str/bool
    #[error("Invalid value: {0}. Allowed types: int, str, bool.")]
    UnsupportedType(String),

    /// Same column declared twice (including the implicit ID)
    #[error("Duplicate column: {0}.")]
    DuplicateColumn(String),

    /// Value cannot be coerced into the declared type
    #[error("Invalid value '{value}' for column '{column}' (expected {expected}).")]
    InvalidValue {
        column: String,
        value: String,
        expected: &'static str,
    },
}

impl SchemaError {
    /// True for lookups that found nothing, as opposed to malformed input.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SchemaError::UnknownTable(_) | SchemaError::UnknownColumn(_))
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
