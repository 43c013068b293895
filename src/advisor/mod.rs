//! Adviser entry points
//!
//! [`Advisor`] ties the scanner, relevance filter and hypothetical evaluator
//! together for single queries and whole workloads. [`AdvisorConfig`] holds
//! the knobs they share.

mod advisor;
mod config;

pub use advisor::{Advisor, QueryOutcome, WorkloadReport};
pub use config::{AdvisorConfig, DEFAULT_MIN_ROW_COUNT, DEFAULT_PAGE_SIZE};
