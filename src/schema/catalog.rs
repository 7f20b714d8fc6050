//! Table schema catalog and its metadata document
//!
//! The catalog is the in-memory view of every table definition. It is read
//! from a single metadata document keyed by table name and written back in
//! full after each schema-changing operation.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::observability::Logger;
use crate::storage::{read_json, write_json, DocumentStore, StorageError, StorageResult};

use super::errors::{SchemaError, SchemaResult};
use super::types::{Column, TableSchema, ID_COLUMN};

/// All table schemas, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    tables: Vec<TableSchema>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TableSchema> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    /// Like `get`, but a missing table is an error.
    pub fn require(&self, name: &str) -> SchemaResult<&TableSchema> {
        self.get(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
    }

    pub fn require_mut(&mut self, name: &str) -> SchemaResult<&mut TableSchema> {
        self.get_mut(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Table names in creation order.
    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Declares a new table from `name:type` definitions.
    ///
    /// Every definition is parsed before the catalog is touched, so the first
    /// bad definition aborts the whole create.
    pub fn create<S: AsRef<str>>(&mut self, name: &str, definitions: &[S]) -> SchemaResult<&TableSchema> {
        if !is_valid_table_name(name) {
            return Err(SchemaError::InvalidTableName(name.to_string()));
        }

        if self.contains(name) {
            return Err(SchemaError::TableExists(name.to_string()));
        }

        let mut columns: Vec<Column> = Vec::with_capacity(definitions.len());
        for def in definitions {
            let column = Column::parse_definition(def.as_ref())?;
            if column.name == ID_COLUMN || columns.iter().any(|c| c.name == column.name) {
                return Err(SchemaError::DuplicateColumn(column.name));
            }
            columns.push(column);
        }

        self.tables.push(TableSchema::new(name, columns));
        Ok(&self.tables[self.tables.len() - 1])
    }

    /// Removes a table definition and returns it.
    pub fn drop(&mut self, name: &str) -> SchemaResult<TableSchema> {
        let pos = self
            .tables
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))?;
        Ok(self.tables.remove(pos))
    }
}

/// Table names double as document keys.
fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl Serialize for SchemaCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for table in &self.tables {
            map.serialize_entry(&table.name, table)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SchemaCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;

        let mut tables = Vec::with_capacity(entries.len());
        for (name, entry) in entries {
            let mut table: TableSchema = serde_json::from_value(entry)
                .map_err(|e| D::Error::custom(format!("table '{}': {}", name, e)))?;
            table
                .validate_structure()
                .map_err(|e| D::Error::custom(format!("table '{}': {}", name, e)))?;
            table.name = name;
            tables.push(table);
        }

        Ok(Self { tables })
    }
}

/// Reads and writes the catalog as one metadata document.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    metadata_key: String,
}

impl SchemaStore {
    pub fn new(metadata_key: impl Into<String>) -> Self {
        Self {
            metadata_key: metadata_key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.metadata_key
    }

    /// Loads the catalog for reading. A missing document is an empty
    /// catalog; so is an unreadable one, which is logged and otherwise
    /// ignored.
    pub fn load(&self, store: &dyn DocumentStore) -> StorageResult<SchemaCatalog> {
        match self.load_for_update(store) {
            Err(StorageError::Corrupt { key, reason }) => {
                Logger::warn(
                    "METADATA_UNREADABLE",
                    &[("key", key.as_str()), ("reason", reason.as_str())],
                );
                Ok(SchemaCatalog::new())
            }
            other => other,
        }
    }

    /// Loads the catalog ahead of a write. An unreadable document is an
    /// error here, so it is never overwritten with an empty catalog.
    pub fn load_for_update(&self, store: &dyn DocumentStore) -> StorageResult<SchemaCatalog> {
        Ok(read_json::<SchemaCatalog>(store, &self.metadata_key)?.unwrap_or_default())
    }

    /// Overwrites the metadata document with the full catalog.
    pub fn save(&self, store: &mut dyn DocumentStore, catalog: &SchemaCatalog) -> StorageResult<()> {
        write_json(store, &self.metadata_key, catalog)
    }
}
