//! Confirmation gate for destructive operations
//!
//! The engine asks before it drops a table or deletes records. Declining
//! aborts the operation before any state changes.

use super::errors::{DbError, DbResult};

/// Answers yes/no for a named destructive action.
pub trait Confirm {
    /// `action` is a short description such as `"drop table"`.
    fn confirm(&mut self, action: &str) -> bool;
}

/// Approves everything. Used by `--yes` and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _action: &str) -> bool {
        true
    }
}

/// Declines everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decline;

impl Confirm for Decline {
    fn confirm(&mut self, _action: &str) -> bool {
        false
    }
}

/// Asks `confirm` and fails with `DbError::Cancelled` on a "no".
pub fn require_confirmation(confirm: &mut dyn Confirm, action: &str) -> DbResult<()> {
    if confirm.confirm(action) {
        Ok(())
    } else {
        Err(DbError::Cancelled)
    }
}
