//! Adviser counters
//!
//! Counters only, monotonic, Relaxed atomics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Running totals for one adviser instance
#[derive(Debug, Default)]
pub struct AdvisorMetrics {
    queries_analyzed: AtomicU64,
    queries_skipped: AtomicU64,
    queries_failed: AtomicU64,
    queries_improved: AtomicU64,
    candidates_generated: AtomicU64,
    candidates_relevant: AtomicU64,
    candidates_recorded: AtomicU64,
}

impl AdvisorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_analyzed(&self) {
        self.queries_analyzed.fetch_add(1, Ordering::Relaxed);
    }

    /// A query that arrived while the evaluator was already active
    pub fn increment_queries_skipped(&self) {
        self.queries_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A query whose hypothetical plan was cheaper than its baseline
    pub fn increment_queries_improved(&self) {
        self.queries_improved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_candidates_generated(&self, n: usize) {
        self.candidates_generated.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn add_candidates_relevant(&self, n: usize) {
        self.candidates_relevant.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn add_candidates_recorded(&self, n: usize) {
        self.candidates_recorded.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_analyzed: self.queries_analyzed.load(Ordering::Relaxed),
            queries_skipped: self.queries_skipped.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
            queries_improved: self.queries_improved.load(Ordering::Relaxed),
            candidates_generated: self.candidates_generated.load(Ordering::Relaxed),
            candidates_relevant: self.candidates_relevant.load(Ordering::Relaxed),
            candidates_recorded: self.candidates_recorded.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`AdvisorMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_analyzed: u64,
    pub queries_skipped: u64,
    pub queries_failed: u64,
    pub queries_improved: u64,
    pub candidates_generated: u64,
    pub candidates_relevant: u64,
    pub candidates_recorded: u64,
}
