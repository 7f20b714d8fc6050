//! # Document Store Trait

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

use super::errors::{StorageError, StorageResult};

/// Key/value persistence for whole documents.
///
/// Writes are last-writer-wins; there is no locking.
pub trait DocumentStore: fmt::Debug {
    /// Read the document at `key`, `None` if it was never written or deleted
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the document at `key`
    fn put(&mut self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Remove the document at `key`; removing a missing key is not an error
    fn delete(&mut self, key: &str) -> StorageResult<()>;

    /// Check whether a document exists at `key`
    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Reads and decodes a JSON document.
pub fn read_json<T: DeserializeOwned>(store: &dyn DocumentStore, key: &str) -> StorageResult<Option<T>> {
    match store.get(key)? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::corrupt(key, e)),
        None => Ok(None),
    }
}

/// Encodes a value as pretty-printed JSON and writes it.
pub fn write_json<T: Serialize + ?Sized>(store: &mut dyn DocumentStore, key: &str, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.put(key, &bytes)
}
