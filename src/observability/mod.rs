//! Observability for the adviser
//!
//! - Structured JSON logging to stderr ([`Logger`])
//! - Per-phase begin/complete logging with timings ([`PhaseScope`])
//! - Monotonic counters ([`AdvisorMetrics`])
//!
//! Observability never changes adviser results and never fails a query.

mod logger;
mod metrics;
mod scope;

pub use logger::{Logger, Severity};
pub use metrics::{AdvisorMetrics, MetricsSnapshot};
pub use scope::{PhaseScope, Timer};

use crate::candidate::CandidateSet;

/// Logs a candidate list at DEBUG, e.g. `Generated candidates: |2| {16384_(1), 16384_(1,2)}`
pub fn log_candidates(label: &str, candidates: &CandidateSet) {
    if !Logger::enabled(Severity::Debug) {
        return;
    }
    let count = candidates.len().to_string();
    let listing = candidates.to_string();
    Logger::debug(
        "CANDIDATES",
        &[("label", label), ("count", &count), ("candidates", &listing)],
    );
}
