//! Observability subsystem for tabledb
//!
//! Provides:
//! - Structured logging (JSON lines on stderr)
//! - Operation scopes with elapsed-time reporting
//!
//! Log lines go to stderr so they never mix with shell output on stdout.
//! Events below the process-wide minimum severity (WARN unless configured)
//! are dropped before formatting.
//!
//! ```ignore
//! use tabledb::observability::{Logger, OperationScope};
//!
//! let scope = OperationScope::new("insert");
//! Logger::info("RECORD_INSERTED", &[("table", "users"), ("id", "1")]);
//! scope.complete(&[("table", "users")]);
//! ```

mod logger;
mod scope;

#[cfg(test)]
pub(crate) use logger::capture;
pub use logger::{Logger, Severity};
pub use scope::{OperationScope, Timer};
