//! Operation boundary
//!
//! Every public engine operation runs inside `guard`, which logs the
//! outcome and turns a panic into `DbError::Internal` instead of letting it
//! unwind into the caller. A panic caught here is reported once, through the
//! returned error and the `_FAILED` log line; the process panic hook stays
//! silent for it.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use crate::observability::OperationScope;

use super::errors::{DbError, DbResult, ErrorKind};

/// Runs one operation with error translation and logging.
pub fn guard<T, F>(operation: &str, table: &str, f: F) -> DbResult<T>
where
    F: FnOnce() -> DbResult<T>,
{
    let scope = OperationScope::new(operation);

    install_panic_hook();
    let was_catching = CATCHING.with(|c| c.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    CATCHING.with(|c| c.set(was_catching));

    match outcome {
        Ok(Ok(value)) => {
            scope.complete(&[("table", table)]);
            Ok(value)
        }
        Ok(Err(DbError::Cancelled)) => {
            scope.complete(&[("table", table), ("outcome", "cancelled")]);
            Err(DbError::Cancelled)
        }
        Ok(Err(e)) => {
            match e.kind() {
                // Rejections are outcomes, not failures
                ErrorKind::NotFound | ErrorKind::AlreadyExists | ErrorKind::Validation => {
                    scope.complete(&[("table", table), ("outcome", "rejected"), ("code", e.code())]);
                }
                _ => scope.fail(&e.to_string()),
            }
            Err(e)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            scope.fail(&message);
            Err(DbError::internal(message))
        }
    }
}

thread_local! {
    static CATCHING: Cell<bool> = const { Cell::new(false) };
}

static HOOK: Once = Once::new();

/// Wraps the current panic hook so it is skipped while this thread is inside
/// `guard`. Panics elsewhere still reach it.
fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !CATCHING.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
