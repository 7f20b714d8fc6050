//! Record engine for tabledb
//!
//! The engine consumes structured requests (table name plus typed
//! arguments) and applies them to the schema catalog and record documents.
//!
//! # Execution Flow (mutations)
//!
//! 1. Load the schema catalog
//! 2. Resolve the table and validate every argument
//! 3. Load the table's records
//! 4. Apply the mutation in memory
//! 5. Persist schema (if changed), then records
//! 6. Invalidate the query cache
//!
//! Any failure before step 5 leaves persisted state untouched.
//!
//! # Invariants
//!
//! - IDs are assigned from `next_id` and never reused
//! - Predicate matching is identical for select, update and delete
//! - Cached select results never outlive a successful mutation

mod boundary;
mod cache;
mod confirm;
mod engine;
mod errors;
mod filters;
mod result;

pub use boundary::guard;
pub use cache::{CacheKey, CacheStats, QueryCache};
pub use confirm::{require_confirmation, AutoConfirm, Confirm, Decline};
pub use engine::{Engine, DEFAULT_DATA_DIR, DEFAULT_METADATA_KEY};
pub use errors::{DbError, DbResult, ErrorKind};
pub use filters::{Predicate, PredicateFilter};
pub use result::TableInfo;
