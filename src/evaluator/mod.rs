//! Hypothetical index evaluation
//!
//! The evaluator is the only part of the adviser that touches shared state:
//! it registers hypothetical indexes with the cost oracle and writes advisory
//! records. Both are scoped:
//!
//! - [`HypotheticalScope`] unregisters every index it registered, on every
//!   exit path
//! - [`SessionGuard`] keeps the evaluator from re-entering itself and is
//!   released on every exit path

mod errors;
mod evaluator;
mod guard;
mod hypothetical;
mod oracle;

pub use errors::{EvaluatorError, EvaluatorErrorCode, EvaluatorResult, Severity};
pub use evaluator::{CostComparison, Evaluation, EvaluationStatus, HypotheticalEvaluator};
pub use guard::{Session, SessionGuard};
pub use hypothetical::HypotheticalScope;
pub use oracle::{
    CostOracle, Estimate, HypotheticalIndex, NodeKind, OracleError, OracleResult, Plan, PlanNode,
};
