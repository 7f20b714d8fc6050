//! Operation scopes
//!
//! - Logs `{NAME}_BEGIN` on creation (TRACE)
//! - Logs `{NAME}_COMPLETE` with `elapsed_ms` on `complete` (INFO)
//! - Logs `{NAME}_FAILED` on `fail` (ERROR)
//! - Logs `{NAME}_INCOMPLETE` if dropped without either (WARN)

use std::time::{Duration, Instant};

use super::logger::Logger;

/// A scope around one engine operation.
pub struct OperationScope {
    name: String,
    timer: Timer,
    finished: bool,
}

impl OperationScope {
    pub fn new(operation: &str) -> Self {
        let name = operation.to_ascii_uppercase();
        Logger::trace(&format!("{}_BEGIN", name), &[]);

        Self {
            name,
            timer: Timer::new(),
            finished: false,
        }
    }

    /// Marks the operation successful, logging extra fields and elapsed time.
    pub fn complete(mut self, fields: &[(&str, &str)]) {
        self.finished = true;
        let elapsed = self.timer.elapsed_ms();
        let mut all_fields: Vec<(&str, &str)> = fields.to_vec();
        all_fields.push(("elapsed_ms", elapsed.as_str()));
        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    /// Marks the operation failed.
    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        Logger::error(&format!("{}_FAILED", self.name), &[("reason", reason)]);
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }
}

impl Drop for OperationScope {
    fn drop(&mut self) {
        if !self.finished {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// A simple duration timer
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed milliseconds as a string, for log fields
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }

    /// Elapsed seconds with millisecond precision, e.g. `0.003`
    pub fn elapsed_secs(&self) -> String {
        format!("{:.3}", self.start.elapsed().as_secs_f64())
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::logger::capture;

    fn events(output: &str) -> Vec<serde_json::Value> {
        output.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
    }

    #[test]
    fn test_scope_complete() {
        let output = capture(|| {
            let scope = OperationScope::new("insert");
            scope.complete(&[("table", "users")]);
        });

        let events = events(&output);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "INSERT_BEGIN");
        assert_eq!(events[0]["severity"], "TRACE");
        assert_eq!(events[1]["event"], "INSERT_COMPLETE");
        assert_eq!(events[1]["severity"], "INFO");
        assert_eq!(events[1]["table"], "users");
        assert!(events[1]["elapsed_ms"].as_str().unwrap().parse::<u128>().is_ok());
    }

    #[test]
    fn test_scope_fail() {
        let output = capture(|| {
            let scope = OperationScope::new("insert");
            scope.fail("something went wrong");
        });

        let events = events(&output);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["event"], "INSERT_FAILED");
        assert_eq!(events[1]["severity"], "ERROR");
        assert_eq!(events[1]["reason"], "something went wrong");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let output = capture(|| {
            let scope = OperationScope::new("insert");
            drop(scope);
        });

        let events = events(&output);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["event"], "INSERT_INCOMPLETE");
        assert_eq!(events[1]["severity"], "WARN");
        assert_eq!(events[1]["reason"], "scope dropped without completion");
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(Duration::from_millis(10));
        let ms: u64 = timer.elapsed_ms().parse().unwrap();
        assert!(ms >= 10);
        assert!(timer.elapsed_secs().starts_with("0."));
    }
}
