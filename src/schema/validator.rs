//! Type validation for column values
//!
//! Coercion rules:
//! - int: native integers pass; strings holding a base-10 integer are parsed;
//!   booleans are rejected
//! - str: everything passes, non-strings are rendered as text
//! - bool: native booleans pass; "true"/"false" in any case are parsed
//!
//! Validation has no side effects. A rejected value is `None`, never a
//! falsy `Value`.

use super::errors::{SchemaError, SchemaResult};
use super::types::{Column, ColumnType};
use super::value::Value;

/// Coerces raw values into the representation a column stores.
pub struct TypeValidator;

impl TypeValidator {
    /// Coerces `value` to `expected`, or returns `None` when it cannot.
    pub fn coerce(value: &Value, expected: ColumnType) -> Option<Value> {
        match expected {
            ColumnType::Int => match value {
                Value::Int(i) => Some(Value::Int(*i)),
                Value::Str(s) => parse_int(s).map(Value::Int),
                Value::Bool(_) => None,
            },
            ColumnType::Str => match value {
                Value::Str(s) => Some(Value::Str(s.clone())),
                other => Some(Value::Str(other.to_string())),
            },
            ColumnType::Bool => match value {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::Str(s) => parse_bool(s).map(Value::Bool),
                Value::Int(_) => None,
            },
        }
    }

    /// Coerces a value for a specific column, producing a descriptive error.
    pub fn validate_column(column: &Column, value: &Value) -> SchemaResult<Value> {
        Self::coerce(value, column.column_type).ok_or_else(|| SchemaError::InvalidValue {
            column: column.name.clone(),
            value: value.to_string(),
            expected: column.column_type.type_name(),
        })
    }
}

/// Base-10 integer parse that tolerates surrounding whitespace.
pub(crate) fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
