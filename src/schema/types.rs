//! Schema type definitions
//!
//! Supported column types:
//! - int: 64-bit signed integer
//! - str: UTF-8 string
//! - bool: Boolean

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};

/// Name of the implicit identifier column present in every table.
pub const ID_COLUMN: &str = "ID";

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Str,
    Bool,
}

impl ColumnType {
    /// All declarable types, in the order they are listed to users.
    pub const SUPPORTED: [ColumnType; 3] = [ColumnType::Int, ColumnType::Str, ColumnType::Bool];

    /// Returns the type name as written in column definitions
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Str => "str",
            ColumnType::Bool => "bool",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(s: &str) -> SchemaResult<Self> {
        ColumnType::SUPPORTED
            .into_iter()
            .find(|t| t.type_name() == s)
            .ok_or_else(|| SchemaError::UnsupportedType(s.to_string()))
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// The implicit `ID:int` column.
    pub fn id() -> Self {
        Self::new(ID_COLUMN, ColumnType::Int)
    }

    /// Parses a `name:type` definition.
    ///
    /// Only the first `:` separates name from type, so `a:b:c` is rejected
    /// as an unsupported type `b:c`.
    pub fn parse_definition(def: &str) -> SchemaResult<Self> {
        let (name, type_str) = def
            .split_once(':')
            .ok_or_else(|| SchemaError::MalformedColumn(def.to_string()))?;

        if name.is_empty() {
            return Err(SchemaError::MalformedColumn(def.to_string()));
        }

        let column_type = type_str.parse()?;
        Ok(Self::new(name, column_type))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.column_type)
    }
}

/// Complete definition of one table.
///
/// The table name is the key of the metadata document and is not repeated
/// inside the serialized entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(skip)]
    pub name: String,
    /// Ordered columns, `ID:int` first
    pub columns: Vec<Column>,
    /// Identifier handed to the next inserted record
    pub next_id: i64,
}

impl TableSchema {
    /// Builds a fresh schema from user columns, prepending `ID:int` and
    /// starting the counter at 1.
    pub fn new(name: impl Into<String>, user_columns: Vec<Column>) -> Self {
        let mut columns = Vec::with_capacity(user_columns.len() + 1);
        columns.push(Column::id());
        columns.extend(user_columns);

        Self {
            name: name.into(),
            columns,
            next_id: 1,
        }
    }

    /// Columns the caller supplies values for on insert.
    pub fn user_columns(&self) -> &[Column] {
        &self.columns[1..]
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `ID:int, name:str, ...`
    pub fn columns_summary(&self) -> String {
        self.columns
            .iter()
            .map(Column::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Structural checks applied to entries read back from disk.
    pub fn validate_structure(&self) -> Result<(), String> {
        match self.columns.first() {
            Some(first) if *first == Column::id() => {}
            _ => return Err("first column must be ID:int".into()),
        }

        if self.next_id < 1 {
            return Err(format!("next_id must be >= 1, got {}", self.next_id));
        }

        Ok(())
    }
}
