//! Select result cache
//!
//! Results are keyed by table name plus the predicate's conditions sorted by
//! column, so condition order never causes a miss. An absent predicate has
//! its own key, distinct from an empty one. Any successful mutation of any
//! table clears the whole cache.

use std::collections::HashMap;

use crate::schema::Value;
use crate::storage::Record;

use super::filters::Predicate;

/// Normalized cache key: table name and sorted conditions.
pub type CacheKey = (String, Option<Vec<(String, Value)>>);

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoized select results, owned by the engine.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<CacheKey, Vec<Record>>,
    stats: CacheStats,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the normalized key for a lookup.
    pub fn key(table: &str, predicate: Option<&Predicate>) -> CacheKey {
        (table.to_string(), predicate.map(Predicate::normalized))
    }

    /// Returns the cached result or computes, stores and returns a new one.
    ///
    /// Errors from `compute` are returned as-is and nothing is cached.
    pub fn get<F, E>(&mut self, table: &str, predicate: Option<&Predicate>, compute: F) -> Result<Vec<Record>, E>
    where
        F: FnOnce() -> Result<Vec<Record>, E>,
    {
        let key = Self::key(table, predicate);

        if let Some(hit) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Ok(hit.clone());
        }

        self.stats.misses += 1;
        let result = compute()?;
        self.entries.insert(key, result.clone());
        Ok(result)
    }

    /// Drops every cached result.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
