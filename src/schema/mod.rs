//! Schema subsystem for tabledb
//!
//! Tables are declared once with an ordered list of typed columns. The
//! implicit `ID:int` column always comes first and every table carries a
//! monotonically increasing `next_id` counter.
//!
//! # Rules
//!
//! - Columns are immutable once a table exists
//! - `next_id` is never reused, even after deletes
//! - Column definitions are all-or-nothing: one bad definition aborts create
//! - Values are coerced by the declared column type before they are stored

mod catalog;
mod errors;
mod types;
mod validator;
mod value;

pub use catalog::{SchemaCatalog, SchemaStore};
pub use errors::{SchemaError, SchemaResult};
pub use types::{Column, ColumnType, TableSchema, ID_COLUMN};
pub use validator::TypeValidator;
pub use value::Value;
