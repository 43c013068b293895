//! Phase scopes for begin/complete logging with timing
//!
//! - Logs `{name}_BEGIN` on creation (DEBUG)
//! - Logs `{name}_COMPLETE` with `elapsed_us` on `complete()` (DEBUG)
//! - Logs `{name}_INCOMPLETE` on drop if never completed (WARN)

use std::time::Instant;

use super::logger::Logger;

/// A scope that logs the start, end and duration of one adviser phase
///
/// ```ignore
/// let scope = PhaseScope::new("SCAN");
/// let candidates = scanner.scan(&query);
/// scope.complete(&[("candidates", &candidates.len().to_string())]);
/// ```
pub struct PhaseScope {
    name: &'static str,
    timer: Timer,
    completed: bool,
}

impl PhaseScope {
    pub fn new(name: &'static str) -> Self {
        Logger::debug(&format!("{}_BEGIN", name), &[]);
        Self {
            name,
            timer: Timer::new(),
            completed: false,
        }
    }

    /// Marks the phase done, logging the elapsed time and extra fields
    pub fn complete(mut self, fields: &[(&str, &str)]) {
        self.completed = true;
        let elapsed = self.timer.elapsed_us();
        let mut all: Vec<(&str, &str)> = Vec::with_capacity(fields.len() + 1);
        all.push(("elapsed_us", &elapsed));
        all.extend_from_slice(fields);
        Logger::debug(&format!("{}_COMPLETE", self.name), &all);
    }

    /// Marks the phase failed
    pub fn fail(mut self, reason: &str) {
        self.completed = true;
        let elapsed = self.timer.elapsed_us();
        Logger::error(
            &format!("{}_FAILED", self.name),
            &[("elapsed_us", &elapsed), ("reason", reason)],
        );
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Drop for PhaseScope {
    fn drop(&mut self) {
        if !self.completed {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Wall-clock timer
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed microseconds as a string, ready for a log field
    pub fn elapsed_us(&self) -> String {
        self.start.elapsed().as_micros().to_string()
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

    #[test]
    fn test_scope_complete() {
        let scope = PhaseScope::new("TEST");
        assert!(!scope.is_completed());
        scope.complete(&[("candidates", "3")]);
    }

    #[test]
    fn test_scope_fail() {
        let scope = PhaseScope::new("TEST");
        scope.fail("oracle unavailable");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope = PhaseScope::new("TEST");
        drop(scope);
    }

    #[test]
    fn test_timer_monotonic() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let us: u128 = timer.elapsed_us().parse().unwrap();
        assert!(us >= 2000);
    }
}
