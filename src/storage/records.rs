//! Per-table record collections
//!
//! Each table's records live in one document, `<data_dir>/<table>.json`,
//! holding a JSON array in insertion order.

use crate::observability::Logger;

use super::backend::{read_json, write_json, DocumentStore};
use super::errors::{StorageError, StorageResult};
use super::record::Record;

/// Loads and saves whole record collections.
#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: String,
}

impl RecordStore {
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Document key for a table's records.
    pub fn key(&self, table: &str) -> String {
        if self.data_dir.is_empty() {
            format!("{}.json", table)
        } else {
            format!("{}/{}.json", self.data_dir.trim_end_matches('/'), table)
        }
    }

    /// Loads a table's records in stored order.
    ///
    /// A table without a document has no records. An unreadable document is
    /// logged and also treated as empty.
    pub fn load(&self, store: &dyn DocumentStore, table: &str) -> StorageResult<Vec<Record>> {
        match self.load_for_update(store, table) {
            Err(StorageError::Corrupt { key, reason }) => {
                Logger::warn(
                    "RECORDS_UNREADABLE",
                    &[("key", key.as_str()), ("reason", reason.as_str())],
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Loads a table's records ahead of a rewrite. An unreadable document
    /// is an error, so its bytes are left in place.
    pub fn load_for_update(&self, store: &dyn DocumentStore, table: &str) -> StorageResult<Vec<Record>> {
        Ok(read_json::<Vec<Record>>(store, &self.key(table))?.unwrap_or_default())
    }

    /// Replaces a table's records.
    pub fn save(&self, store: &mut dyn DocumentStore, table: &str, records: &[Record]) -> StorageResult<()> {
        write_json(store, &self.key(table), records)
    }

    /// Removes a table's record document entirely.
    pub fn delete_all(&self, store: &mut dyn DocumentStore, table: &str) -> StorageResult<()> {
        store.delete(&self.key(table))
    }
}
