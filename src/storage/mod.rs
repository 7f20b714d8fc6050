//! Storage subsystem for tabledb
//!
//! Persistence is a key/value "document store": one metadata document for
//! all schemas plus one document per table holding its records as a JSON
//! array. Every write replaces the whole document.
//!
//! # Read policy
//!
//! - Missing documents read as empty
//! - Unparseable documents are logged and read as empty
//! - Any other I/O failure is surfaced to the caller

mod backend;
mod errors;
mod local;
mod memory;
mod record;
mod records;

pub use backend::{read_json, write_json, DocumentStore};
pub use errors::{StorageError, StorageResult};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use record::Record;
pub use records::RecordStore;
