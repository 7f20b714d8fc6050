//! Engine Invariant Tests
//!
//! Test Categories:
//! 1. Identifier assignment
//! 2. Validation atomicity
//! 3. Predicate matching
//! 4. Query cache coherence
//! 5. Storage failure handling

use tabledb::executor::{AutoConfirm, DbError, Decline, Engine, ErrorKind, Predicate};
use tabledb::schema::Value;
use tabledb::storage::{DocumentStore, MemoryStore, Record, StorageError, StorageResult};

fn engine() -> Engine<MemoryStore> {
    Engine::with_default_layout(MemoryStore::new())
}

fn users() -> Engine<MemoryStore> {
    let mut engine = engine();
    engine.create_table("users", &["name:str", "age:int", "active:bool"]).unwrap();
    engine
}

fn row(name: &str, age: i64, active: bool) -> Vec<Value> {
    vec![Value::from(name), Value::Int(age), Value::Bool(active)]
}

fn ids(records: &[Record]) -> Vec<i64> {
    records.iter().filter_map(Record::id).collect()
}

// =============================================================================
// IDENTIFIER ASSIGNMENT
// =============================================================================

/// IDs are strictly increasing and never reused after deletes.
#[test]
fn test_ids_never_reused_after_delete() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();
    engine.insert("users", &row("b", 2, true)).unwrap();
    engine.insert("users", &row("c", 3, true)).unwrap();

    engine.delete("users", &Predicate::eq("ID", 3i64), &mut AutoConfirm).unwrap();
    let id = engine.insert("users", &row("d", 4, true)).unwrap();

    assert_eq!(id, 4);
    assert_eq!(ids(&engine.select("users", None).unwrap()), vec![1, 2, 4]);
}

/// Dropping and recreating a table starts IDs at 1 again.
#[test]
fn test_recreated_table_restarts_ids() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();
    engine.insert("users", &row("b", 2, true)).unwrap();

    engine.drop_table("users", &mut AutoConfirm).unwrap();
    engine.create_table("users", &["name:str"]).unwrap();

    assert_eq!(engine.insert("users", &[Value::from("z")]).unwrap(), 1);
    assert_eq!(engine.select("users", None).unwrap().len(), 1);
}

/// Update never changes a record's ID or the counter.
#[test]
fn test_update_preserves_ids() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();
    engine.insert("users", &row("b", 1, false)).unwrap();

    let set = vec![("active".to_string(), Value::from("TRUE"))];
    let updated = engine.update("users", &set, &Predicate::eq("age", 1i64)).unwrap();

    assert_eq!(updated, vec![1, 2]);
    assert_eq!(engine.catalog().unwrap().require("users").unwrap().next_id, 3);
    let rows = engine.select("users", None).unwrap();
    assert!(rows.iter().all(|r| r.get("active") == Some(&Value::Bool(true))));
}

// =============================================================================
// VALIDATION ATOMICITY
// =============================================================================

/// A rejected insert writes nothing and consumes no ID.
#[test]
fn test_rejected_insert_changes_nothing() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();
    let writes = engine.store().write_count();

    let bad = vec![Value::from("b"), Value::from("old"), Value::Bool(true)];
    let err = engine.insert("users", &bad).unwrap_err();

    assert_eq!(
        err,
        DbError::Validation("Invalid value 'old' for column 'age' (expected int).".into())
    );
    assert_eq!(engine.store().write_count(), writes);
    assert_eq!(engine.insert("users", &row("c", 3, true)).unwrap(), 2);
}

/// Strings coerce to int and bool; ints do not coerce to bool.
#[test]
fn test_insert_coercions() {
    let mut engine = users();
    engine
        .insert("users", &[Value::from("a"), Value::from("42"), Value::from("False")])
        .unwrap();

    let rows = engine.select("users", None).unwrap();
    assert_eq!(rows[0].get("age"), Some(&Value::Int(42)));
    assert_eq!(rows[0].get("active"), Some(&Value::Bool(false)));

    let err = engine
        .insert("users", &[Value::from("b"), Value::Int(1), Value::Int(1)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

/// Non-string values stored in a str column are rendered as text.
#[test]
fn test_str_column_renders_values() {
    let mut engine = users();
    engine.insert("users", &[Value::Int(7), Value::Int(1), Value::Bool(true)]).unwrap();
    engine.insert("users", &[Value::Bool(true), Value::Int(1), Value::Bool(true)]).unwrap();

    let rows = engine.select("users", None).unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::from("7")));
    assert_eq!(rows[1].get("name"), Some(&Value::from("True")));
}

/// A malformed column definition aborts the whole create.
#[test]
fn test_create_table_is_all_or_nothing() {
    let mut engine = engine();

    for defs in [vec!["name:str", "age"], vec!["name:str", "age:float"], vec![":int"]] {
        let err = engine.create_table("t", &defs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    assert!(engine.list_tables().unwrap().is_empty());
    assert_eq!(engine.store().write_count(), 0);
}

/// Declined confirmations leave data untouched.
#[test]
fn test_declined_delete_keeps_records() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();

    let err = engine.delete("users", &Predicate::eq("ID", 1i64), &mut Decline).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.to_string(), "Operation cancelled.");
    assert_eq!(engine.select("users", None).unwrap().len(), 1);
}

// =============================================================================
// PREDICATE MATCHING
// =============================================================================

/// A string condition matches an integer column after parsing.
#[test]
fn test_string_condition_matches_int_column() {
    let mut engine = users();
    engine.insert("users", &row("a", 30, true)).unwrap();

    let rows = engine.select("users", Some(&Predicate::eq("age", "30"))).unwrap();
    assert_eq!(ids(&rows), vec![1]);

    let rows = engine.select("users", Some(&Predicate::eq("age", "thirty"))).unwrap();
    assert!(rows.is_empty());
}

/// The coercion is one-directional: an int never matches a str column.
#[test]
fn test_int_condition_does_not_match_str_column() {
    let mut engine = users();
    engine.insert("users", &[Value::from("30"), Value::Int(1), Value::Bool(true)]).unwrap();

    let rows = engine.select("users", Some(&Predicate::eq("name", 30i64))).unwrap();
    assert!(rows.is_empty());
}

/// Booleans and integers are distinct.
#[test]
fn test_bool_is_not_int() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();

    assert!(engine.select("users", Some(&Predicate::eq("active", 1i64))).unwrap().is_empty());
    assert!(engine.select("users", Some(&Predicate::eq("age", true))).unwrap().is_empty());
}

/// A condition on an unknown column matches nothing and is not an error.
#[test]
fn test_unknown_condition_column_matches_nothing() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();

    assert!(engine.select("users", Some(&Predicate::eq("email", "x"))).unwrap().is_empty());
    let set = vec![("age".to_string(), Value::Int(2))];
    assert!(engine.update("users", &set, &Predicate::eq("email", "x")).unwrap().is_empty());
}

/// All conditions must hold.
#[test]
fn test_conjunction() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();
    engine.insert("users", &row("a", 2, true)).unwrap();

    let predicate = Predicate::eq("name", "a").and("age", 2i64);
    assert_eq!(ids(&engine.select("users", Some(&predicate)).unwrap()), vec![2]);
}

// =============================================================================
// QUERY CACHE COHERENCE
// =============================================================================

/// Repeated selects are served from the cache.
#[test]
fn test_repeated_select_hits_cache() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();

    engine.select("users", None).unwrap();
    engine.select("users", None).unwrap();

    assert_eq!(engine.cache().stats().misses, 1);
    assert_eq!(engine.cache().stats().hits, 1);
}

/// Condition order does not change the cache key.
#[test]
fn test_condition_order_shares_cache_entry() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();

    let first = engine.select("users", Some(&Predicate::eq("name", "a").and("age", 1i64))).unwrap();
    let second = engine.select("users", Some(&Predicate::eq("age", 1i64).and("name", "a"))).unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.cache().stats().hits, 1);
}

/// Every successful mutation makes the next select see current data.
#[test]
fn test_mutations_invalidate_cache() {
    let mut engine = users();
    engine.insert("users", &row("a", 1, true)).unwrap();
    assert_eq!(engine.select("users", None).unwrap().len(), 1);

    engine.insert("users", &row("b", 2, true)).unwrap();
    assert_eq!(engine.select("users", None).unwrap().len(), 2);

    let set = vec![("age".to_string(), Value::Int(9))];
    engine.update("users", &set, &Predicate::eq("ID", 1i64)).unwrap();
    let rows = engine.select("users", None).unwrap();
    assert_eq!(rows[0].get("age"), Some(&Value::Int(9)));

    engine.delete("users", &Predicate::eq("ID", 2i64), &mut AutoConfirm).unwrap();
    assert_eq!(ids(&engine.select("users", None).unwrap()), vec![1]);

    engine.drop_table("users", &mut AutoConfirm).unwrap();
    engine.create_table("users", &["name:str", "age:int", "active:bool"]).unwrap();
    assert!(engine.select("users", None).unwrap().is_empty());
}

/// Mutating one table invalidates cached results of every table.
#[test]
fn test_invalidation_is_global() {
    let mut engine = users();
    engine.create_table("tags", &["label:str"]).unwrap();
    engine.insert("users", &row("a", 1, true)).unwrap();

    engine.select("users", None).unwrap();
    engine.insert("tags", &[Value::from("x")]).unwrap();
    assert!(engine.cache().is_empty());
}

// =============================================================================
// STORAGE FAILURE HANDLING
// =============================================================================

/// Memory store whose record writes can be made to fail.
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_records: bool,
}

impl DocumentStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, data: &[u8]) -> StorageResult<()> {
        if self.fail_records && key.starts_with("data/") {
            return Err(StorageError::io(key, "disk full"));
        }
        self.inner.put(key, data)
    }

    fn delete(&mut self, key: &str) -> StorageResult<()> {
        self.inner.delete(key)
    }
}

/// A failed record write surfaces as StorageUnavailable, and the consumed
/// ID is not handed out again.
#[test]
fn test_failed_record_write_never_reuses_id() {
    let mut engine = Engine::with_default_layout(FlakyStore::default());
    engine.create_table("t", &["x:int"]).unwrap();

    let mut store = engine.into_store();
    store.fail_records = true;
    let mut engine = Engine::with_default_layout(store);

    let err = engine.insert("t", &[Value::Int(1)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    assert_eq!(err.code(), "TABLEDB_STORAGE_UNAVAILABLE");

    let mut store = engine.into_store();
    store.fail_records = false;
    let mut engine = Engine::with_default_layout(store);

    assert_eq!(engine.insert("t", &[Value::Int(2)]).unwrap(), 2);
    assert_eq!(ids(&engine.select("t", None).unwrap()), vec![2]);
}
