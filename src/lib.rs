//! idxadvisor - a deterministic index adviser for query workloads
//!
//! Per query: scan the query tree for indexable columns, combine columns
//! tested under the same AND into composite candidates, drop candidates that
//! already exist, and ask the cost oracle whether hypothetical versions of the
//! rest would make the query cheaper. Across the workload: aggregate what the
//! oracle used and pick the best set of indexes under a storage budget.

pub mod advisor;
pub mod advisory;
pub mod candidate;
pub mod catalog;
pub mod cli;
pub mod evaluator;
pub mod filter;
pub mod observability;
pub mod scanner;
pub mod selector;
