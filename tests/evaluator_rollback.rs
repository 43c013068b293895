//! Hypothetical evaluation rollback and reentrancy tests
//!
//! Test Categories:
//! 1. Every hypothetical index is gone once evaluation returns, on success
//!    and on every failure path
//! 2. An evaluation started from inside a sink is skipped
//! 3. Index usage is found in subplans as well as the main plan

use serde_json::json;
use tempfile::tempdir;

use idxadvisor::advisor::{Advisor, AdvisorConfig};
use idxadvisor::advisory::{read_records, AdvisoryRecord, AdvisorySink, JsonLinesSink, MemorySink, SinkResult};
use idxadvisor::candidate::{Candidate, CandidateSet, IndexId, KeyColumn, RelationId};
use idxadvisor::catalog::{CatalogSnapshot, TableInfo};
use idxadvisor::evaluator::{
    CostOracle, Estimate, EvaluationStatus, EvaluatorErrorCode, HypotheticalEvaluator,
    HypotheticalIndex, HypotheticalScope, NodeKind, OracleError, OracleResult, Plan, PlanNode,
};
use idxadvisor::scanner::{Expr, QueryTree};

const ORDERS: RelationId = 100;

/// Oracle that scans every visible hypothetical index and knocks 10 off the
/// total cost per index
#[derive(Default)]
struct PlannerStub {
    next_id: u64,
    live: Vec<IndexId>,
    fail_estimate_with: bool,
    fail_unregister: Option<IndexId>,
    /// Put the n-th visible index (0-based) in a subplan instead of the root
    subplan_position: Option<usize>,
}

impl CostOracle for PlannerStub {
    fn estimate(&mut self, _query: &QueryTree) -> OracleResult<Estimate> {
        Ok(Estimate::new(Plan::new(PlanNode::new(NodeKind::SeqScan)), 1.0, 100.0))
    }

    fn register_hypothetical(
        &mut self,
        _relation: RelationId,
        columns: &[KeyColumn],
    ) -> OracleResult<Option<HypotheticalIndex>> {
        self.next_id += 1;
        let id = IndexId(self.next_id);
        self.live.push(id);
        Ok(Some(HypotheticalIndex {
            id,
            pages: 10 * columns.len() as u64,
        }))
    }

    fn estimate_with(&mut self, _query: &QueryTree, indexes: &[IndexId]) -> OracleResult<Estimate> {
        if self.fail_estimate_with {
            return Err(OracleError::Estimate("no plan".into()));
        }
        let mut root = PlanNode::new(NodeKind::NestedLoop);
        let mut plan_subplans = Vec::new();
        for (n, id) in indexes.iter().enumerate() {
            if self.subplan_position == Some(n) {
                plan_subplans.push(PlanNode::index_scan(*id));
                root = root.with_subplan(plan_subplans.len() - 1);
            } else {
                root = root.with_child(PlanNode::index_scan(*id));
            }
        }
        let mut plan = Plan::new(root);
        for subplan in plan_subplans {
            plan = plan.with_subplan(subplan);
        }
        Ok(Estimate::new(plan, 1.0, 100.0 - 10.0 * indexes.len() as f64))
    }

    fn unregister_hypothetical(&mut self, index: IndexId) -> OracleResult<()> {
        self.live.retain(|i| *i != index);
        if self.fail_unregister == Some(index) {
            return Err(OracleError::UnknownIndex(index));
        }
        Ok(())
    }
}

fn candidates(cols: &[&[i16]]) -> CandidateSet {
    CandidateSet::from_unsorted(
        cols.iter()
            .map(|c| Candidate::with_columns(ORDERS, c.iter().map(|&id| KeyColumn::new(id, 23)).collect()))
            .collect(),
    )
}

fn orders_query() -> QueryTree {
    QueryTree::new()
        .with_relation(ORDERS)
        .with_filter(Expr::eq(Expr::col(0, 1), Expr::constant(json!(7))))
}

// =============================================================================
// ROLLBACK
// =============================================================================

/// Test: Successful evaluation leaves no hypothetical index behind.
#[test]
fn test_success_leaves_nothing_registered() {
    let config = AdvisorConfig::default();
    let evaluator = HypotheticalEvaluator::new(&config);
    let mut oracle = PlannerStub::default();
    let mut sink = MemorySink::new();

    let eval = evaluator
        .evaluate(&QueryTree::new(), candidates(&[&[1], &[2]]), &mut oracle, &mut sink)
        .unwrap();

    assert_eq!(eval.status, EvaluationStatus::Improved);
    assert_eq!(sink.len(), 2);
    assert!(oracle.live.is_empty());
    assert!(!evaluator.is_active());
}

/// Test: Estimation failure unregisters everything and releases the session.
#[test]
fn test_estimate_failure_rolls_back() {
    let config = AdvisorConfig::default();
    let evaluator = HypotheticalEvaluator::new(&config);
    let mut oracle = PlannerStub {
        fail_estimate_with: true,
        ..Default::default()
    };
    let mut sink = MemorySink::new();

    let err = evaluator
        .evaluate(&QueryTree::new(), candidates(&[&[1], &[2], &[1, 2]]), &mut oracle, &mut sink)
        .unwrap_err();

    assert_eq!(err.code(), EvaluatorErrorCode::AdvOracleFailed);
    assert!(oracle.live.is_empty());
    assert!(sink.is_empty());
    assert!(!evaluator.is_active());

    oracle.fail_estimate_with = false;
    let eval = evaluator
        .evaluate(&QueryTree::new(), candidates(&[&[1]]), &mut oracle, &mut sink)
        .unwrap();
    assert_eq!(eval.status, EvaluationStatus::Improved);
}

/// Test: A sink failure surfaces as a persistence error after rollback.
#[test]
fn test_persistence_failure_after_rollback() {
    let config = AdvisorConfig::default();
    let evaluator = HypotheticalEvaluator::new(&config);
    let mut oracle = PlannerStub::default();
    let mut sink = MemorySink::closed();

    let err = evaluator
        .evaluate(&QueryTree::new(), candidates(&[&[3]]), &mut oracle, &mut sink)
        .unwrap_err();

    assert_eq!(err.code(), EvaluatorErrorCode::AdvPersistenceFailed);
    assert!(err.to_string().contains("memory"));
    assert!(oracle.live.is_empty());
    assert!(!evaluator.is_active());
}

/// Test: Dropping a scope without closing it still unregisters.
#[test]
fn test_dropped_scope_unregisters() {
    let mut oracle = PlannerStub::default();
    {
        let mut scope = HypotheticalScope::new(&mut oracle);
        scope.register(ORDERS, &[KeyColumn::new(1, 23)]).unwrap();
        scope.register(ORDERS, &[KeyColumn::new(2, 23)]).unwrap();
        assert_eq!(scope.registered().len(), 2);
    }
    assert!(oracle.live.is_empty());
}

/// Test: Close tries every index and reports the first failure.
#[test]
fn test_close_reports_first_failure() {
    let mut oracle = PlannerStub {
        fail_unregister: Some(IndexId(2)),
        ..Default::default()
    };
    let mut scope = HypotheticalScope::new(&mut oracle);
    for column in 1..=3 {
        scope.register(ORDERS, &[KeyColumn::new(column, 23)]).unwrap();
    }

    let err = scope.close().unwrap_err();
    assert!(matches!(err, OracleError::UnknownIndex(IndexId(2))));
    assert!(oracle.live.is_empty());
}

// =============================================================================
// PLAN WALK
// =============================================================================

/// Test: An index scanned only inside a subplan still counts as used.
#[test]
fn test_subplan_usage_counts() {
    let config = AdvisorConfig::default();
    let evaluator = HypotheticalEvaluator::new(&config);
    let mut oracle = PlannerStub {
        subplan_position: Some(1),
        ..Default::default()
    };
    let mut sink = MemorySink::new();

    let eval = evaluator
        .evaluate(&QueryTree::new(), candidates(&[&[1], &[2]]), &mut oracle, &mut sink)
        .unwrap();

    assert_eq!(eval.recorded(), 2);
    let plan = eval.plan.unwrap();
    assert_eq!(plan.subplans.len(), 1);
    assert_eq!(plan.scanned_indexes().len(), 2);
}

/// Test: Benefit shares follow index size and sum to the cost saved.
#[test]
fn test_benefit_shares_follow_pages() {
    let config = AdvisorConfig::default();
    let evaluator = HypotheticalEvaluator::new(&config);
    let mut oracle = PlannerStub::default();
    let mut sink = MemorySink::new();

    // [1] has 10 pages, [1,2] has 20; three indexes save 30
    evaluator
        .evaluate(&QueryTree::new(), candidates(&[&[1], &[2], &[1, 2]]), &mut oracle, &mut sink)
        .unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 3);
    let total: f64 = records.iter().map(|r| r.benefit).sum();
    assert!((total - 30.0).abs() < 1e-9);
    let wide = records.iter().find(|r| r.columns == vec![1, 2]).unwrap();
    assert!((wide.benefit - 15.0).abs() < 1e-9);
    assert_eq!(wide.size_kb, 160);
}

// =============================================================================
// REENTRANCY
// =============================================================================

/// Sink that evaluates another query every time it is asked to persist
struct ReentrantSink<'e> {
    evaluator: &'e HypotheticalEvaluator<'e>,
    oracle: PlannerStub,
    inner: MemorySink,
    nested: Vec<EvaluationStatus>,
}

impl AdvisorySink for ReentrantSink<'_> {
    fn record(&mut self, record: &AdvisoryRecord) -> SinkResult<()> {
        let nested = self
            .evaluator
            .evaluate(&QueryTree::new(), candidates(&[&[9]]), &mut self.oracle, &mut self.inner)
            .unwrap();
        self.nested.push(nested.status);
        self.inner.record(record)
    }

    fn describe(&self) -> String {
        "reentrant".to_string()
    }
}

/// Test: Evaluation issued from inside a sink is skipped without side effects.
#[test]
fn test_nested_evaluation_skipped() {
    let config = AdvisorConfig::default();
    let evaluator = HypotheticalEvaluator::new(&config);
    let mut oracle = PlannerStub::default();
    let mut sink = ReentrantSink {
        evaluator: &evaluator,
        oracle: PlannerStub::default(),
        inner: MemorySink::new(),
        nested: Vec::new(),
    };

    let eval = evaluator
        .evaluate(&QueryTree::new(), candidates(&[&[1], &[2]]), &mut oracle, &mut sink)
        .unwrap();

    assert_eq!(eval.status, EvaluationStatus::Improved);
    assert_eq!(sink.nested, vec![EvaluationStatus::Skipped, EvaluationStatus::Skipped]);
    assert_eq!(sink.oracle.next_id, 0);
    assert_eq!(sink.inner.len(), 2);
}

/// Sink that runs the whole adviser pipeline from inside `record`
struct AnalyzingSink<'a> {
    advisor: &'a Advisor<'a, CatalogSnapshot>,
    oracle: PlannerStub,
    inner: MemorySink,
    nested: Vec<EvaluationStatus>,
}

impl AdvisorySink for AnalyzingSink<'_> {
    fn record(&mut self, record: &AdvisoryRecord) -> SinkResult<()> {
        let nested = self
            .advisor
            .analyze(&orders_query(), &mut self.oracle, &mut self.inner)
            .unwrap();
        self.nested.push(nested.status);
        self.inner.record(record)
    }

    fn describe(&self) -> String {
        "analyzing".to_string()
    }
}

/// Test: The adviser refuses to start a query while it is evaluating one.
#[test]
fn test_nested_analyze_skipped() {
    let catalog = CatalogSnapshot::new().with_table(TableInfo::new(ORDERS, "orders").with_rows(5_000));
    let config = AdvisorConfig::default();
    let advisor = Advisor::new(&catalog, &config);
    let mut oracle = PlannerStub::default();
    let mut sink = AnalyzingSink {
        advisor: &advisor,
        oracle: PlannerStub::default(),
        inner: MemorySink::new(),
        nested: Vec::new(),
    };

    let eval = advisor.analyze(&orders_query(), &mut oracle, &mut sink).unwrap();

    assert_eq!(eval.status, EvaluationStatus::Improved);
    assert_eq!(sink.nested, vec![EvaluationStatus::Skipped]);
    let metrics = advisor.metrics();
    assert_eq!(metrics.queries_analyzed, 1);
    assert_eq!(metrics.queries_skipped, 1);
    assert_eq!(metrics.queries_improved, 1);
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Test: Records written through the file sink read back intact.
#[test]
fn test_file_sink_records_read_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("advice.jsonl");
    let config = AdvisorConfig::default();
    let evaluator = HypotheticalEvaluator::new(&config);
    let mut oracle = PlannerStub::default();

    {
        let mut sink = JsonLinesSink::open(&path).unwrap();
        evaluator
            .evaluate(&QueryTree::new(), candidates(&[&[4], &[5]]), &mut oracle, &mut sink)
            .unwrap();
    }

    let records = read_records(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.relation == ORDERS));
    assert!(records.iter().all(|r| r.session == evaluator.run_id()));
    assert_eq!(records[0].columns, vec![4]);
    assert_eq!(records[1].columns, vec![5]);
}
