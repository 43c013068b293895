//! Range-table scope stack
//!
//! One frame per query being scanned, innermost on top. A column reference
//! with `levels_up = n` resolves against the frame `n` below the top, which
//! is how correlated references in subqueries reach the outer query.

use super::ast::{ColumnRef, RangeEntry};

#[derive(Debug, Default)]
pub struct ScopeStack<'q> {
    frames: Vec<&'q [RangeEntry]>,
}

impl<'q> ScopeStack<'q> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Enters a query
    pub fn push(&mut self, range_table: &'q [RangeEntry]) {
        self.frames.push(range_table);
    }

    /// Leaves the innermost query
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Finds the range-table entry a column reference points at
    pub fn resolve(&self, column: &ColumnRef) -> Option<&'q RangeEntry> {
        let level = self.frames.len().checked_sub(1 + column.levels_up)?;
        self.frames[level].get(column.range_index)
    }
}
