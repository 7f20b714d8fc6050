//! tabledb - a single-user, file-backed table store
//!
//! Tables are declared with typed columns, rows get auto-incrementing IDs,
//! and every table lives in its own JSON document next to one metadata
//! document. An interactive shell drives the engine.

pub mod cli;
pub mod executor;
pub mod observability;
pub mod schema;
pub mod storage;
