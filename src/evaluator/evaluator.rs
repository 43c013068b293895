//! Hypothetical evaluation of a query's candidates
//!
//! Per query:
//! 1. Estimate the query as is (baseline)
//! 2. Register every candidate as a hypothetical index
//! 3. Estimate again with those indexes visible, then unregister them
//! 4. If neither startup nor total cost went down, stop
//! 5. Keep the candidates the new plan actually scans and split the total
//!    cost saved between them by index size
//! 6. Persist one advisory record per kept candidate
//!
//! Hypothetical indexes are gone before step 6 runs, so a failing sink
//! cannot leave them behind.

use serde::Serialize;
use uuid::Uuid;

use super::errors::{EvaluatorError, EvaluatorResult};
use super::guard::Session;
use super::hypothetical::HypotheticalScope;
use super::oracle::{CostOracle, Plan};
use crate::advisor::AdvisorConfig;
use crate::advisory::{AdvisoryRecord, AdvisorySink};
use crate::candidate::CandidateSet;
use crate::observability::{log_candidates, Logger, PhaseScope};
use crate::scanner::QueryTree;

/// How an evaluation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// The evaluator was already active in this session
    Skipped,
    /// Nothing could be registered
    NoCandidates,
    /// The hypothetical plan was not cheaper
    NotImproved,
    /// At least one cost went down
    Improved,
}

/// Baseline and hypothetical costs of one query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostComparison {
    pub baseline_startup: f64,
    pub baseline_total: f64,
    pub hypothetical_startup: f64,
    pub hypothetical_total: f64,
}

impl CostComparison {
    pub fn startup_saved(&self) -> f64 {
        self.baseline_startup - self.hypothetical_startup
    }

    pub fn total_saved(&self) -> f64 {
        self.baseline_total - self.hypothetical_total
    }

    /// True if either cost went down
    pub fn improved(&self) -> bool {
        self.startup_saved() > 0.0 || self.total_saved() > 0.0
    }

    pub fn startup_gain_pct(&self) -> f64 {
        gain_pct(self.baseline_startup, self.hypothetical_startup)
    }

    pub fn total_gain_pct(&self) -> f64 {
        gain_pct(self.baseline_total, self.hypothetical_total)
    }
}

fn gain_pct(baseline: f64, hypothetical: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (baseline - hypothetical) * 100.0 / baseline
    }
}

/// Result of evaluating one query
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub status: EvaluationStatus,
    pub costs: Option<CostComparison>,
    /// Candidates the hypothetical plan used, with pages and benefit set
    pub used: CandidateSet,
    /// Plan with hypothetical indexes, kept when any of them was used
    pub plan: Option<Plan>,
}

impl Evaluation {
    fn ended(status: EvaluationStatus, costs: Option<CostComparison>) -> Self {
        Self {
            status,
            costs,
            used: CandidateSet::new(),
            plan: None,
        }
    }

    pub(crate) fn skipped() -> Self {
        Self::ended(EvaluationStatus::Skipped, None)
    }

    /// Number of advisory records written
    pub fn recorded(&self) -> usize {
        self.used.len()
    }
}

/// Runs candidates past the cost oracle and records the ones that pay off
pub struct HypotheticalEvaluator<'a> {
    config: &'a AdvisorConfig,
    session: Session,
    run_id: Uuid,
}

impl<'a> HypotheticalEvaluator<'a> {
    /// Creates an evaluator with a fresh run id
    pub fn new(config: &'a AdvisorConfig) -> Self {
        Self::with_run_id(config, Uuid::new_v4())
    }

    /// Creates an evaluator stamping records with `run_id`
    pub fn with_run_id(config: &'a AdvisorConfig, run_id: Uuid) -> Self {
        Self {
            config,
            session: Session::new(),
            run_id,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// True while an evaluation is in progress
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Evaluates `candidates` for `query`, persisting advice to `sink`
    ///
    /// A call made while another evaluation on this evaluator is still
    /// running returns [`EvaluationStatus::Skipped`] without touching the
    /// oracle or the sink.
    pub fn evaluate<O, S>(
        &self,
        query: &QueryTree,
        mut candidates: CandidateSet,
        oracle: &mut O,
        sink: &mut S,
    ) -> EvaluatorResult<Evaluation>
    where
        O: CostOracle + ?Sized,
        S: AdvisorySink + ?Sized,
    {
        let _guard = match self.session.enter() {
            Some(guard) => guard,
            None => {
                Logger::debug("EVALUATE_REENTRANT_SKIPPED", &[]);
                return Ok(Evaluation::skipped());
            }
        };

        if candidates.is_empty() {
            return Ok(Evaluation::ended(EvaluationStatus::NoCandidates, None));
        }

        let baseline = oracle
            .estimate(query)
            .map_err(|e| EvaluatorError::oracle_failed("baseline estimate", e))?;

        let mut scope = HypotheticalScope::new(oracle);
        for candidate in candidates.iter_mut() {
            let registered = scope
                .register(candidate.relation, &candidate.columns)
                .map_err(|e| EvaluatorError::oracle_failed("hypothetical registration", e))?;
            match registered {
                Some(index) => {
                    candidate.index_id = Some(index.id);
                    candidate.pages = index.pages;
                }
                None => Logger::warn(
                    "CANDIDATE_NO_OPERATOR_CLASS",
                    &[("candidate", &candidate.to_string())],
                ),
            }
        }
        candidates.retain(|c| c.index_id.is_some());

        if candidates.is_empty() {
            scope
                .close()
                .map_err(|e| EvaluatorError::oracle_failed("hypothetical rollback", e))?;
            return Ok(Evaluation::ended(EvaluationStatus::NoCandidates, None));
        }

        let hypothetical = scope
            .estimate(query)
            .map_err(|e| EvaluatorError::oracle_failed("hypothetical estimate", e))?;
        scope
            .close()
            .map_err(|e| EvaluatorError::oracle_failed("hypothetical rollback", e))?;

        let costs = CostComparison {
            baseline_startup: baseline.startup_cost,
            baseline_total: baseline.total_cost,
            hypothetical_startup: hypothetical.startup_cost,
            hypothetical_total: hypothetical.total_cost,
        };
        Logger::debug(
            "EVALUATE_COSTS",
            &[
                ("baseline_startup", &format!("{:.2}", costs.baseline_startup)),
                ("baseline_total", &format!("{:.2}", costs.baseline_total)),
                ("hypothetical_startup", &format!("{:.2}", costs.hypothetical_startup)),
                ("hypothetical_total", &format!("{:.2}", costs.hypothetical_total)),
                ("startup_gain_pct", &format!("{:.2}", costs.startup_gain_pct())),
                ("total_gain_pct", &format!("{:.2}", costs.total_gain_pct())),
            ],
        );

        if !costs.improved() {
            return Ok(Evaluation::ended(EvaluationStatus::NotImproved, Some(costs)));
        }

        mark_used(&hypothetical.plan, &mut candidates);
        candidates.retain(|c| c.used);
        apportion_benefit(&mut candidates, costs.total_saved());
        log_candidates("Used candidates", &candidates);

        let persist = PhaseScope::new("PERSIST");
        for candidate in &candidates {
            let record = AdvisoryRecord::new(
                self.run_id,
                candidate.relation,
                candidate.column_ids().collect(),
                self.config.pages_to_kb(candidate.pages),
                candidate.benefit,
            );
            sink.record(&record)
                .map_err(|e| EvaluatorError::persistence_failed(sink.describe(), e))?;
        }
        persist.complete(&[
            ("records", &candidates.len().to_string()),
            ("sink", &sink.describe()),
        ]);

        let plan = if candidates.is_empty() {
            None
        } else {
            Some(hypothetical.plan)
        };
        Ok(Evaluation {
            status: EvaluationStatus::Improved,
            costs: Some(costs),
            used: candidates,
            plan,
        })
    }
}

/// Flags every candidate whose hypothetical index the plan scans
fn mark_used(plan: &Plan, candidates: &mut CandidateSet) {
    for index in plan.scanned_indexes() {
        for candidate in candidates.iter_mut() {
            if candidate.index_id == Some(index) {
                candidate.used = true;
            }
        }
    }
}

/// Splits `saved` across candidates in proportion to their pages
///
/// Candidates with no pages at all share it equally.
fn apportion_benefit(candidates: &mut CandidateSet, saved: f64) {
    let total_pages: u64 = candidates.iter().map(|c| c.pages).sum();
    let count = candidates.len();
    for candidate in candidates.iter_mut() {
        candidate.benefit = if total_pages == 0 {
            saved / count as f64
        } else {
            saved * candidate.pages as f64 / total_pages as f64
        };
    }
}
