//! Per-query pipeline and workload driver
//!
//! scan -> filter -> evaluate, each phase wrapped in a [`PhaseScope`] and
//! counted in [`AdvisorMetrics`].

use serde::Serialize;
use uuid::Uuid;

use super::config::AdvisorConfig;
use crate::advisory::AdvisorySink;
use crate::candidate::CandidateSet;
use crate::catalog::Catalog;
use crate::evaluator::{
    CostOracle, Evaluation, EvaluationStatus, EvaluatorResult, HypotheticalEvaluator,
};
use crate::filter::RelevanceFilter;
use crate::observability::{log_candidates, AdvisorMetrics, Logger, MetricsSnapshot, PhaseScope};
use crate::scanner::{QueryTree, TreeScanner};

/// Outcome of one workload query
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// Zero-based position in the workload
    pub position: usize,
    pub evaluation: Option<Evaluation>,
    /// Error code, for failed queries
    pub code: Option<&'static str>,
    pub error: Option<String>,
}

impl QueryOutcome {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of running a whole workload
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    pub run_id: Uuid,
    pub outcomes: Vec<QueryOutcome>,
    pub metrics: MetricsSnapshot,
}

impl WorkloadReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Total advisory records written across the workload
    pub fn recorded(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.evaluation.as_ref())
            .map(|e| e.recorded())
            .sum()
    }
}

/// The index adviser
pub struct Advisor<'a, C: Catalog> {
    catalog: &'a C,
    config: &'a AdvisorConfig,
    evaluator: HypotheticalEvaluator<'a>,
    metrics: AdvisorMetrics,
}

impl<'a, C: Catalog> Advisor<'a, C> {
    pub fn new(catalog: &'a C, config: &'a AdvisorConfig) -> Self {
        Self::with_evaluator(catalog, config, HypotheticalEvaluator::new(config))
    }

    pub fn with_run_id(catalog: &'a C, config: &'a AdvisorConfig, run_id: Uuid) -> Self {
        Self::with_evaluator(catalog, config, HypotheticalEvaluator::with_run_id(config, run_id))
    }

    fn with_evaluator(catalog: &'a C, config: &'a AdvisorConfig, evaluator: HypotheticalEvaluator<'a>) -> Self {
        Self {
            catalog,
            config,
            evaluator,
            metrics: AdvisorMetrics::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.evaluator.run_id()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Scans a query and filters the result; no oracle involved
    pub fn candidates(&self, query: &QueryTree) -> CandidateSet {
        let scope = PhaseScope::new("SCAN");
        let generated = TreeScanner::new(self.catalog, self.config).scan(query);
        scope.complete(&[("candidates", &generated.len().to_string())]);
        log_candidates("Generated candidates", &generated);
        self.metrics.add_candidates_generated(generated.len());

        let scope = PhaseScope::new("FILTER");
        let relevant = RelevanceFilter::new(self.catalog).apply(generated);
        scope.complete(&[("candidates", &relevant.len().to_string())]);
        log_candidates("Relevant candidates", &relevant);
        self.metrics.add_candidates_relevant(relevant.len());

        relevant
    }

    /// Runs the full pipeline for one query
    ///
    /// Called while this adviser is already evaluating (for example from a
    /// sink that issues queries of its own), returns a skipped evaluation
    /// without scanning.
    pub fn analyze<O, S>(&self, query: &QueryTree, oracle: &mut O, sink: &mut S) -> EvaluatorResult<Evaluation>
    where
        O: CostOracle + ?Sized,
        S: AdvisorySink + ?Sized,
    {
        if self.evaluator.is_active() {
            self.metrics.increment_queries_skipped();
            return Ok(Evaluation::skipped());
        }

        self.metrics.increment_queries_analyzed();
        let candidates = self.candidates(query);

        let scope = PhaseScope::new("EVALUATE");
        match self.evaluator.evaluate(query, candidates, oracle, sink) {
            Ok(evaluation) => {
                scope.complete(&[("recorded", &evaluation.recorded().to_string())]);
                match evaluation.status {
                    EvaluationStatus::Skipped => self.metrics.increment_queries_skipped(),
                    EvaluationStatus::Improved => self.metrics.increment_queries_improved(),
                    EvaluationStatus::NoCandidates | EvaluationStatus::NotImproved => {}
                }
                self.metrics.add_candidates_recorded(evaluation.recorded());
                Ok(evaluation)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                self.metrics.increment_queries_failed();
                Err(e)
            }
        }
    }

    /// Analyzes every query in order; a failing query does not stop the rest
    pub fn analyze_workload<O, S>(&self, queries: &[QueryTree], oracle: &mut O, sink: &mut S) -> WorkloadReport
    where
        O: CostOracle + ?Sized,
        S: AdvisorySink + ?Sized,
    {
        let mut outcomes = Vec::with_capacity(queries.len());
        for (position, query) in queries.iter().enumerate() {
            let outcome = match self.analyze(query, oracle, sink) {
                Ok(evaluation) => QueryOutcome {
                    position,
                    evaluation: Some(evaluation),
                    code: None,
                    error: None,
                },
                Err(e) => {
                    Logger::error(
                        "QUERY_FAILED",
                        &[
                            ("position", &position.to_string()),
                            ("code", e.code().as_str()),
                            ("error", &e.to_string()),
                        ],
                    );
                    QueryOutcome {
                        position,
                        evaluation: None,
                        code: Some(e.code().as_str()),
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = WorkloadReport {
            run_id: self.run_id(),
            outcomes,
            metrics: self.metrics(),
        };
        Logger::info(
            "WORKLOAD_COMPLETE",
            &[
                ("queries", &queries.len().to_string()),
                ("failures", &report.failures().to_string()),
                ("recorded", &report.recorded().to_string()),
            ],
        );
        report
    }
}
