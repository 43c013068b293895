//! Cost oracle interface and plan tree
//!
//! The oracle is the query optimizer: it estimates a query's cost, and can
//! do so again with hypothetical indexes visible. Hypothetical indexes exist
//! only inside the oracle and never reach storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::candidate::{IndexId, KeyColumn, RelationId};
use crate::scanner::QueryTree;

/// Result type for oracle calls
pub type OracleResult<T> = Result<T, OracleError>;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Cost estimation failed: {0}")]
    Estimate(String),

    #[error("Cannot register hypothetical index on relation {relation}: {reason}")]
    Register { relation: RelationId, reason: String },

    #[error("Hypothetical index {0} is not registered")]
    UnknownIndex(IndexId),
}

/// A registered hypothetical index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HypotheticalIndex {
    pub id: IndexId,
    /// Estimated size of the index in pages
    pub pages: u64,
}

/// Estimated plan and costs for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub plan: Plan,
    pub startup_cost: f64,
    pub total_cost: f64,
}

impl Estimate {
    pub fn new(plan: Plan, startup_cost: f64, total_cost: f64) -> Self {
        Self {
            plan,
            startup_cost,
            total_cost,
        }
    }
}

/// Plan node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    SeqScan,
    IndexScan,
    IndexOnlyScan,
    BitmapIndexScan,
    BitmapHeapScan,
    BitmapAnd,
    BitmapOr,
    NestedLoop,
    HashJoin,
    MergeJoin,
    Hash,
    Sort,
    Aggregate,
    Limit,
    Append,
    SubqueryScan,
    Materialize,
    Result,
    Other,
}

impl NodeKind {
    /// Node kinds that read through an index
    pub fn scans_index(&self) -> bool {
        matches!(
            self,
            NodeKind::IndexScan | NodeKind::IndexOnlyScan | NodeKind::BitmapIndexScan
        )
    }
}

/// One node of an estimated plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    pub kind: NodeKind,
    /// Index read by an index scan node
    #[serde(default)]
    pub index: Option<IndexId>,
    /// Child nodes (outer first for joins, operands for bitmap AND/OR)
    #[serde(default)]
    pub children: Vec<PlanNode>,
    /// Positions in [`Plan::subplans`] of subqueries and init plans run by this node
    #[serde(default)]
    pub subplans: Vec<usize>,
}

impl PlanNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            index: None,
            children: Vec::new(),
            subplans: Vec::new(),
        }
    }

    pub fn index_scan(index: IndexId) -> Self {
        Self::new(NodeKind::IndexScan).with_index(index)
    }

    pub fn with_index(mut self, index: IndexId) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_subplan(mut self, position: usize) -> Self {
        self.subplans.push(position);
        self
    }
}

/// An estimated plan: the main tree plus the subplans its nodes reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub root: PlanNode,
    #[serde(default)]
    pub subplans: Vec<PlanNode>,
}

impl Plan {
    pub fn new(root: PlanNode) -> Self {
        Self {
            root,
            subplans: Vec::new(),
        }
    }

    pub fn with_subplan(mut self, subplan: PlanNode) -> Self {
        self.subplans.push(subplan);
        self
    }

    /// Every index id scanned anywhere in the plan, in walk order
    ///
    /// Each subplan is visited at most once even if several nodes point at it.
    pub fn scanned_indexes(&self) -> Vec<IndexId> {
        let mut found = Vec::new();
        let mut visited = vec![false; self.subplans.len()];
        self.walk(&self.root, &mut visited, &mut found);
        found
    }

    fn walk(&self, node: &PlanNode, visited: &mut [bool], found: &mut Vec<IndexId>) {
        if node.kind.scans_index() {
            if let Some(index) = node.index {
                found.push(index);
            }
        }
        for child in &node.children {
            self.walk(child, visited, found);
        }
        for &position in &node.subplans {
            match visited.get(position) {
                Some(false) => {
                    visited[position] = true;
                    self.walk(&self.subplans[position], visited, found);
                }
                // already walked, or a dangling reference
                _ => {}
            }
        }
    }
}

/// The query optimizer, as seen by the evaluator
pub trait CostOracle {
    /// Estimates the query with only real indexes visible
    fn estimate(&mut self, query: &QueryTree) -> OracleResult<Estimate>;

    /// Registers a hypothetical index over `columns` of `relation`
    ///
    /// Returns `Ok(None)` when a key column's type has no default B-tree
    /// operator class; such a candidate cannot be indexed at all.
    fn register_hypothetical(
        &mut self,
        relation: RelationId,
        columns: &[KeyColumn],
    ) -> OracleResult<Option<HypotheticalIndex>>;

    /// Estimates the query with the given hypothetical indexes visible
    fn estimate_with(&mut self, query: &QueryTree, indexes: &[IndexId]) -> OracleResult<Estimate>;

    /// Removes a hypothetical index
    fn unregister_hypothetical(&mut self, index: IndexId) -> OracleResult<()>;
}

impl<O: CostOracle + ?Sized> CostOracle for &mut O {
    fn estimate(&mut self, query: &QueryTree) -> OracleResult<Estimate> {
        (**self).estimate(query)
    }

    fn register_hypothetical(
        &mut self,
        relation: RelationId,
        columns: &[KeyColumn],
    ) -> OracleResult<Option<HypotheticalIndex>> {
        (**self).register_hypothetical(relation, columns)
    }

    fn estimate_with(&mut self, query: &QueryTree, indexes: &[IndexId]) -> OracleResult<Estimate> {
        (**self).estimate_with(query, indexes)
    }

    fn unregister_hypothetical(&mut self, index: IndexId) -> OracleResult<()> {
        (**self).unregister_hypothetical(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scanned_indexes_through_joins_and_bitmaps() {
        let plan = Plan::new(
            PlanNode::new(NodeKind::HashJoin)
                .with_child(PlanNode::index_scan(IndexId(1)))
                .with_child(
                    PlanNode::new(NodeKind::Hash).with_child(
                        PlanNode::new(NodeKind::BitmapHeapScan).with_child(
                            PlanNode::new(NodeKind::BitmapOr)
                                .with_child(
                                    PlanNode::new(NodeKind::BitmapIndexScan).with_index(IndexId(2)),
                                )
                                .with_child(
                                    PlanNode::new(NodeKind::BitmapIndexScan).with_index(IndexId(3)),
                                ),
                        ),
                    ),
                ),
        );
        assert_eq!(plan.scanned_indexes(), vec![IndexId(1), IndexId(2), IndexId(3)]);
    }

    #[test]
    fn test_scanned_indexes_in_subplans() {
        let plan = Plan::new(
            PlanNode::new(NodeKind::SeqScan)
                .with_subplan(0)
                .with_subplan(0)
                .with_subplan(9),
        )
        .with_subplan(PlanNode::new(NodeKind::Result).with_child(
            PlanNode::new(NodeKind::IndexOnlyScan).with_index(IndexId(4)),
        ));
        assert_eq!(plan.scanned_indexes(), vec![IndexId(4)]);
    }

    #[test]
    fn test_index_on_non_scan_node_ignored() {
        let plan = Plan::new(PlanNode::new(NodeKind::Sort).with_index(IndexId(5)));
        assert!(plan.scanned_indexes().is_empty());
    }

    #[test]
    fn test_plan_from_json() {
        let plan: Plan = serde_json::from_value(json!({
            "root": { "kind": "nested_loop", "children": [
                { "kind": "seq_scan" },
                { "kind": "index_scan", "index": 7 }
            ]}
        }))
        .unwrap();
        assert_eq!(plan.scanned_indexes(), vec![IndexId(7)]);
    }
}
