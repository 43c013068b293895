//! Budget-constrained index selection
//!
//! Advisory records from a whole workload are aggregated into ranked
//! [`Recommendation`]s, then a subset is chosen under a storage budget:
//!
//! - [`select_greedy`]: O(n), takes the ranked prefix that fits
//! - [`select_exact`]: 0/1 knapsack, optimal, O(n x budget) memory
//! - [`select_all`]: no budget

mod aggregate;
mod budget;
mod errors;
mod exact;
mod greedy;
mod render;
mod selection;

pub use aggregate::{aggregate, Recommendation};
pub use budget::parse_budget;
pub use errors::{SelectorError, SelectorErrorCode, SelectorResult, Severity};
pub use exact::{select_exact, MAX_TABLE_CELLS};
pub use greedy::select_greedy;
pub use render::{render_statements, render_summary};
pub use selection::{select_all, Selection};
