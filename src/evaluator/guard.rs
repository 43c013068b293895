//! Reentrancy guard
//!
//! Persisting advice may run queries of its own. Those must not be analyzed
//! again by the same session, or the evaluator would recurse without end.

use std::cell::Cell;

/// Evaluation state of one logical session
#[derive(Debug, Default)]
pub struct Session {
    depth: Cell<u32>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the evaluator. Returns `None` if it is already active.
    pub fn enter(&self) -> Option<SessionGuard<'_>> {
        if self.depth.get() > 0 {
            return None;
        }
        self.depth.set(self.depth.get() + 1);
        Some(SessionGuard { session: self })
    }

    pub fn is_active(&self) -> bool {
        self.depth.get() > 0
    }
}

/// Held for the duration of one evaluation; leaving the evaluator by any
/// path drops it
#[derive(Debug)]
pub struct SessionGuard<'s> {
    session: &'s Session,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        let depth = self.session.depth.get();
        self.session.depth.set(depth.saturating_sub(1));
    }
}
