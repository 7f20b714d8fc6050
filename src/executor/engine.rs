//! Mutation engine
//!
//! Orchestrates table and record operations over a document store. Each
//! public operation either fully applies and persists, or returns an error
//! with persisted state unchanged.

use crate::observability::Logger;
use crate::schema::{SchemaCatalog, SchemaError, SchemaStore, TableSchema, TypeValidator, Value, ID_COLUMN};
use crate::storage::{DocumentStore, Record, RecordStore};

use super::boundary::guard;
use super::cache::QueryCache;
use super::confirm::{require_confirmation, Confirm};
use super::errors::{DbError, DbResult};
use super::filters::{Predicate, PredicateFilter};
use super::result::TableInfo;

/// Default metadata document key
pub const DEFAULT_METADATA_KEY: &str = "db_meta.json";

/// Default directory for per-table documents
pub const DEFAULT_DATA_DIR: &str = "data";

/// Record engine bound to one document store.
///
/// The schema catalog is re-read from the store at the start of every
/// operation, so edits made between commands are always observed.
#[derive(Debug)]
pub struct Engine<S: DocumentStore> {
    store: S,
    schemas: SchemaStore,
    records: RecordStore,
    cache: QueryCache,
}

impl<S: DocumentStore> Engine<S> {
    pub fn new(store: S, schemas: SchemaStore, records: RecordStore) -> Self {
        Self {
            store,
            schemas,
            records,
            cache: QueryCache::new(),
        }
    }

    /// Engine using `db_meta.json` and the `data/` directory.
    pub fn with_default_layout(store: S) -> Self {
        Self::new(
            store,
            SchemaStore::new(DEFAULT_METADATA_KEY),
            RecordStore::new(DEFAULT_DATA_DIR),
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Current schema catalog.
    pub fn catalog(&self) -> DbResult<SchemaCatalog> {
        Ok(self.schemas.load(&self.store)?)
    }

    /// Catalog for an operation that writes. Unreadable metadata is an
    /// error instead of an empty catalog.
    fn catalog_for_update(&self) -> DbResult<SchemaCatalog> {
        Ok(self.schemas.load_for_update(&self.store)?)
    }

    fn rows_for_update(&self, table: &str) -> DbResult<Vec<Record>> {
        Ok(self.records.load_for_update(&self.store, table)?)
    }

    /// Table names in creation order.
    pub fn list_tables(&self) -> DbResult<Vec<String>> {
        let catalog = self.catalog()?;
        Ok(catalog.names().into_iter().map(String::from).collect())
    }

    /// Schema summary plus record count.
    pub fn info(&self, table: &str) -> DbResult<TableInfo> {
        guard("info", table, || {
            let catalog = self.catalog()?;
            let schema = catalog.require(table)?.clone();
            let record_count = self.records.load(&self.store, table)?.len();
            Ok(TableInfo { schema, record_count })
        })
    }

    /// Declares a table from `name:type` column definitions.
    pub fn create_table<D: AsRef<str>>(&mut self, name: &str, definitions: &[D]) -> DbResult<TableSchema> {
        guard("create_table", name, || {
            let mut catalog = self.catalog_for_update()?;
            let schema = catalog.create(name, definitions)?.clone();
            self.schemas.save(&mut self.store, &catalog)?;

            Logger::info(
                "TABLE_CREATED",
                &[("table", name), ("columns", schema.columns_summary().as_str())],
            );
            Ok(schema)
        })
    }

    /// Removes a table and its records after confirmation.
    pub fn drop_table(&mut self, name: &str, confirm: &mut dyn Confirm) -> DbResult<TableSchema> {
        guard("drop_table", name, || {
            let mut catalog = self.catalog_for_update()?;
            catalog.require(name)?;
            require_confirmation(confirm, "drop table")?;

            let schema = catalog.drop(name)?;
            // Records go first: if the metadata write then fails the table
            // still exists, just empty, with its counter intact.
            self.records.delete_all(&mut self.store, name)?;
            self.schemas.save(&mut self.store, &catalog)?;
            self.cache.invalidate_all();

            Logger::info("TABLE_DROPPED", &[("table", name)]);
            Ok(schema)
        })
    }

    /// Appends a record built from `values` in declared column order and
    /// returns its new ID.
    pub fn insert(&mut self, table: &str, values: &[Value]) -> DbResult<i64> {
        guard("insert", table, || {
            let mut catalog = self.catalog_for_update()?;
            let schema = catalog.require(table)?;

            let expected = schema.user_columns().len();
            if values.len() != expected {
                return Err(DbError::validation(format!(
                    "Expected {} values, got {}.",
                    expected,
                    values.len()
                )));
            }

            let id = schema.next_id;
            let next_id = id
                .checked_add(1)
                .ok_or_else(|| DbError::validation(format!("Table \"{}\" has no IDs left.", table)))?;
            let mut record = Record::with_id(id);
            for (column, raw) in schema.user_columns().iter().zip(values) {
                let value = TypeValidator::validate_column(column, raw)?;
                record.set(column.name.clone(), value);
            }

            let mut rows = self.rows_for_update(table)?;
            rows.push(record);
            catalog.require_mut(table)?.next_id = next_id;

            // Counter first, so a failed record write can never lead to an
            // ID being handed out twice.
            self.schemas.save(&mut self.store, &catalog)?;
            self.records.save(&mut self.store, table, &rows)?;
            self.cache.invalidate_all();

            let id_text = id.to_string();
            Logger::info("RECORD_INSERTED", &[("table", table), ("id", id_text.as_str())]);
            Ok(id)
        })
    }

    /// Records of `table` matching `predicate`, or all records when absent.
    ///
    /// Results are served from the query cache until the next mutation.
    pub fn select(&mut self, table: &str, predicate: Option<&Predicate>) -> DbResult<Vec<Record>> {
        guard("select", table, || {
            let catalog = self.catalog()?;
            let columns = catalog.require(table)?.columns.clone();

            let records = &self.records;
            let store = &self.store;
            self.cache.get(table, predicate, || {
                let rows = records.load(store, table)?;
                Ok::<_, DbError>(PredicateFilter::select(&rows, &columns, predicate))
            })
        })
    }

    /// Sets one column on every record matching `predicate`.
    ///
    /// Only the first assignment in `set` is applied. Returns the affected
    /// IDs; an empty list means nothing matched and nothing was written.
    pub fn update(&mut self, table: &str, set: &[(String, Value)], predicate: &Predicate) -> DbResult<Vec<i64>> {
        guard("update", table, || {
            let (column_name, raw) = set
                .first()
                .ok_or_else(|| DbError::validation("Update requires a column assignment."))?;

            let catalog = self.catalog_for_update()?;
            let schema = catalog.require(table)?;
            let column = schema
                .column(column_name)
                .ok_or_else(|| SchemaError::UnknownColumn(column_name.clone()))?;
            if column.name == ID_COLUMN {
                return Err(DbError::validation(format!(
                    "Column '{}' cannot be updated.",
                    ID_COLUMN
                )));
            }
            let value = TypeValidator::validate_column(column, raw)?;

            let mut rows = self.rows_for_update(table)?;
            let mut updated = Vec::new();
            for record in rows.iter_mut().filter(|r| PredicateFilter::matches(r, predicate)) {
                record.set(column.name.clone(), value.clone());
                updated.extend(record.id());
            }

            if updated.is_empty() {
                Logger::info("NO_MATCH", &[("table", table), ("operation", "update")]);
                return Ok(updated);
            }

            self.records.save(&mut self.store, table, &rows)?;
            self.cache.invalidate_all();
            Ok(updated)
        })
    }

    /// Removes every record matching `predicate` after confirmation.
    ///
    /// Survivors keep their relative order. Returns the removed IDs; an
    /// empty list means nothing matched and nothing was written.
    pub fn delete(&mut self, table: &str, predicate: &Predicate, confirm: &mut dyn Confirm) -> DbResult<Vec<i64>> {
        guard("delete", table, || {
            let catalog = self.catalog_for_update()?;
            catalog.require(table)?;
            require_confirmation(confirm, "delete record")?;

            let rows = self.rows_for_update(table)?;
            let (removed, kept): (Vec<Record>, Vec<Record>) = rows
                .into_iter()
                .partition(|r| PredicateFilter::matches(r, predicate));
            let deleted: Vec<i64> = removed.iter().filter_map(Record::id).collect();

            if deleted.is_empty() {
                Logger::info("NO_MATCH", &[("table", table), ("operation", "delete")]);
                return Ok(deleted);
            }

            self.records.save(&mut self.store, table, &kept)?;
            self.cache.invalidate_all();
            Ok(deleted)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{AutoConfirm, Decline, ErrorKind};
    use crate::storage::MemoryStore;

    fn engine_with_users() -> Engine<MemoryStore> {
        let mut engine = Engine::with_default_layout(MemoryStore::new());
        engine.create_table("users", &["name:str", "age:int"]).unwrap();
        engine
    }

    fn vals(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut engine = engine_with_users();

        assert_eq!(engine.insert("users", &vals(&["Alice", "30"])).unwrap(), 1);
        assert_eq!(engine.insert("users", &vals(&["Bob", "25"])).unwrap(), 2);
        assert_eq!(engine.catalog().unwrap().require("users").unwrap().next_id, 3);
    }

    #[test]
    fn test_insert_coerces_values() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();

        let rows = engine.select("users", None).unwrap();
        assert_eq!(rows[0].get("age"), Some(&Value::Int(30)));
        assert_eq!(rows[0].get("name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn test_insert_wrong_count() {
        let mut engine = engine_with_users();
        let err = engine.insert("users", &vals(&["Alice"])).unwrap_err();
        assert_eq!(err, DbError::Validation("Expected 2 values, got 1.".into()));
    }

    #[test]
    fn test_insert_invalid_value_changes_nothing() {
        let mut engine = engine_with_users();
        let writes = engine.store().write_count();

        let err = engine.insert("users", &vals(&["Bob", "notanumber"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(engine.store().write_count(), writes);
        assert_eq!(engine.catalog().unwrap().require("users").unwrap().next_id, 1);
    }

    #[test]
    fn test_insert_unknown_table() {
        let mut engine = engine_with_users();
        let err = engine.insert("ghosts", &vals(&["x"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_update_only_touches_target_column() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();
        engine.insert("users", &vals(&["Bob", "25"])).unwrap();

        let set = vec![("age".to_string(), Value::from("31"))];
        let updated = engine.update("users", &set, &Predicate::eq("name", "Alice")).unwrap();
        assert_eq!(updated, vec![1]);

        let rows = engine.select("users", None).unwrap();
        assert_eq!(rows[0].get("age"), Some(&Value::Int(31)));
        assert_eq!(rows[1].get("age"), Some(&Value::Int(25)));
        assert_eq!(engine.catalog().unwrap().require("users").unwrap().next_id, 3);
    }

    #[test]
    fn test_update_uses_first_assignment_only() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();

        let set = vec![
            ("age".to_string(), Value::Int(40)),
            ("name".to_string(), Value::from("Zed")),
        ];
        engine.update("users", &set, &Predicate::eq("ID", 1i64)).unwrap();

        let rows = engine.select("users", None).unwrap();
        assert_eq!(rows[0].get("age"), Some(&Value::Int(40)));
        assert_eq!(rows[0].get("name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn test_update_rejections() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();
        let all = Predicate::new();

        let unknown = vec![("email".to_string(), Value::from("x"))];
        assert_eq!(engine.update("users", &unknown, &all).unwrap_err().kind(), ErrorKind::NotFound);

        let bad = vec![("age".to_string(), Value::from("old"))];
        assert_eq!(engine.update("users", &bad, &all).unwrap_err().kind(), ErrorKind::Validation);

        let id = vec![("ID".to_string(), Value::Int(9))];
        assert_eq!(engine.update("users", &id, &all).unwrap_err().kind(), ErrorKind::Validation);

        assert_eq!(engine.update("users", &[], &all).unwrap_err().kind(), ErrorKind::Validation);

        let rows = engine.select("users", None).unwrap();
        assert_eq!(rows[0].get("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_update_no_match_writes_nothing() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();
        let writes = engine.store().write_count();

        let set = vec![("age".to_string(), Value::Int(1))];
        let updated = engine.update("users", &set, &Predicate::eq("name", "Nobody")).unwrap();
        assert!(updated.is_empty());
        assert_eq!(engine.store().write_count(), writes);
    }

    #[test]
    fn test_delete_preserves_survivor_order() {
        let mut engine = engine_with_users();
        for (name, age) in [("a", "1"), ("b", "2"), ("c", "1"), ("d", "3")] {
            engine.insert("users", &vals(&[name, age])).unwrap();
        }

        let deleted = engine.delete("users", &Predicate::eq("age", 1i64), &mut AutoConfirm).unwrap();
        assert_eq!(deleted, vec![1, 3]);

        let ids: Vec<i64> = engine
            .select("users", None)
            .unwrap()
            .iter()
            .filter_map(Record::id)
            .collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_delete_declined() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();

        let err = engine.delete("users", &Predicate::new(), &mut Decline).unwrap_err();
        assert_eq!(err, DbError::Cancelled);
        assert_eq!(engine.select("users", None).unwrap().len(), 1);
    }

    #[test]
    fn test_drop_table() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();

        let dropped = engine.drop_table("users", &mut AutoConfirm).unwrap();
        assert_eq!(dropped.name, "users");
        assert!(engine.list_tables().unwrap().is_empty());
        assert!(!engine.store().exists("data/users.json").unwrap());
    }

    #[test]
    fn test_drop_table_declined_keeps_everything() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();

        assert_eq!(engine.drop_table("users", &mut Decline).unwrap_err(), DbError::Cancelled);
        assert_eq!(engine.info("users").unwrap().record_count, 1);
    }

    #[test]
    fn test_drop_missing_table_does_not_ask() {
        struct Panicky;
        impl Confirm for Panicky {
            fn confirm(&mut self, _action: &str) -> bool {
                panic!("should not be asked");
            }
        }

        let mut engine = engine_with_users();
        let err = engine.drop_table("ghosts", &mut Panicky).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_info() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();

        let info = engine.info("users").unwrap();
        assert_eq!(info.name(), "users");
        assert_eq!(info.columns_summary(), "ID:int, name:str, age:int");
        assert_eq!(info.record_count, 1);
    }

    #[test]
    fn test_create_duplicate_table() {
        let mut engine = engine_with_users();
        let err = engine.create_table("users", &["x:int"]).unwrap_err();
        assert_eq!(err, DbError::AlreadyExists("Table \"users\" already exists.".into()));
    }

    #[test]
    fn test_exhausted_id_counter_rejects_insert() {
        let mut store = MemoryStore::new();
        let meta = format!(
            r#"{{"t": {{"columns": [{{"name": "ID", "type": "int"}}, {{"name": "x", "type": "int"}}], "next_id": {}}}}}"#,
            i64::MAX
        );
        store.put(DEFAULT_METADATA_KEY, meta.as_bytes()).unwrap();
        let mut engine = Engine::with_default_layout(store);
        let writes = engine.store().write_count();

        let err = engine.insert("t", &[Value::Int(1)]).unwrap_err();
        assert_eq!(err, DbError::Validation("Table \"t\" has no IDs left.".into()));
        assert_eq!(engine.store().write_count(), writes);
        assert_eq!(engine.catalog().unwrap().require("t").unwrap().next_id, i64::MAX);
    }

    #[test]
    fn test_corrupt_metadata_blocks_mutations() {
        let mut store = MemoryStore::new();
        store.put(DEFAULT_METADATA_KEY, b"{not json").unwrap();
        let mut engine = Engine::with_default_layout(store);
        let writes = engine.store().write_count();

        let err = engine.create_table("t", &["x:int"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
        assert_eq!(engine.insert("t", &[Value::Int(1)]).unwrap_err().kind(), ErrorKind::StorageUnavailable);
        assert_eq!(
            engine.drop_table("t", &mut AutoConfirm).unwrap_err().kind(),
            ErrorKind::StorageUnavailable
        );
        assert_eq!(engine.store().write_count(), writes);
        assert_eq!(
            engine.store().get(DEFAULT_METADATA_KEY).unwrap().as_deref(),
            Some(&b"{not json"[..])
        );
        assert!(engine.list_tables().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_records_block_mutations() {
        let mut engine = engine_with_users();
        engine.insert("users", &vals(&["Alice", "30"])).unwrap();
        engine.store.put("data/users.json", b"[{\"ID\": 1},").unwrap();
        let writes = engine.store().write_count();

        let set = vec![("age".to_string(), Value::from("31"))];
        let all = Predicate::new();
        assert_eq!(engine.insert("users", &vals(&["Bob", "25"])).unwrap_err().kind(), ErrorKind::StorageUnavailable);
        assert_eq!(engine.update("users", &set, &all).unwrap_err().kind(), ErrorKind::StorageUnavailable);
        assert_eq!(
            engine.delete("users", &all, &mut AutoConfirm).unwrap_err().kind(),
            ErrorKind::StorageUnavailable
        );
        assert_eq!(engine.store().write_count(), writes);
        assert_eq!(
            engine.store().get("data/users.json").unwrap().as_deref(),
            Some(&b"[{\"ID\": 1},"[..])
        );
        assert_eq!(engine.catalog().unwrap().require("users").unwrap().next_id, 2);
        assert!(engine.select("users", None).unwrap().is_empty());
    }
}
