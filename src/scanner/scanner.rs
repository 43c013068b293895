//! Candidate generation by walking a query tree
//!
//! The scanner never fails. A node it cannot make sense of is logged and
//! contributes nothing; the rest of the query is still scanned.

use super::ast::{ColumnRef, Expr, QueryTree, RangeEntry};
use super::scope::ScopeStack;
use crate::advisor::AdvisorConfig;
use crate::candidate::{build_composites, Candidate, CandidateSet};
use crate::catalog::Catalog;
use crate::observability::Logger;

/// Walks query trees and proposes index candidates
pub struct TreeScanner<'a, C: Catalog> {
    catalog: &'a C,
    config: &'a AdvisorConfig,
}

impl<'a, C: Catalog> TreeScanner<'a, C> {
    pub fn new(catalog: &'a C, config: &'a AdvisorConfig) -> Self {
        Self { catalog, config }
    }

    /// Scans a top-level query
    ///
    /// Returns single-column candidates for every indexable column
    /// reference, plus composite candidates for columns tested in different
    /// conjuncts of the same AND.
    pub fn scan(&self, query: &QueryTree) -> CandidateSet {
        let mut scope = ScopeStack::new();
        self.scan_query(query, &mut scope)
    }

    fn scan_query<'q>(&self, query: &'q QueryTree, scope: &mut ScopeStack<'q>) -> CandidateSet {
        scope.push(&query.range_table);

        let mut candidates = CandidateSet::new();
        for entry in &query.range_table {
            if let RangeEntry::Subquery { query: sub } = entry {
                candidates = candidates.merge(self.scan_query(sub, scope));
            }
        }

        let mut found = self.scan_predicates(query, scope);

        // GROUP BY and ORDER BY only count when the predicates gave nothing
        if found.is_empty() && !query.group_by.is_empty() {
            found = self.scan_clause(&query.group_by, &query.target_list, scope);
        }
        if found.is_empty() && !query.order_by.is_empty() {
            found = self.scan_clause(&query.order_by, &query.target_list, scope);
        }

        scope.pop();

        candidates.merge(found)
    }

    /// Filter and join qualifiers together form one conjunction
    fn scan_predicates<'q>(&self, query: &'q QueryTree, scope: &mut ScopeStack<'q>) -> CandidateSet {
        if query.join_quals.is_empty() {
            return match &query.filter {
                Some(filter) => self.scan_node(filter, scope),
                None => CandidateSet::new(),
            };
        }
        self.scan_conjunction(query.filter.iter().chain(query.join_quals.iter()), scope)
    }

    /// GROUP BY / ORDER BY: each element names a target-list expression
    fn scan_clause<'q>(
        &self,
        clause: &[usize],
        target_list: &'q [Expr],
        scope: &mut ScopeStack<'q>,
    ) -> CandidateSet {
        let mut candidates = CandidateSet::new();
        for &position in clause {
            match target_list.get(position) {
                Some(expr) => candidates = candidates.merge(self.scan_node(expr, scope)),
                None => Logger::warn(
                    "SCAN_BAD_TARGET_REF",
                    &[
                        ("position", &position.to_string()),
                        ("targets", &target_list.len().to_string()),
                    ],
                ),
            }
        }
        candidates
    }

    fn scan_node<'q>(&self, node: &'q Expr, scope: &mut ScopeStack<'q>) -> CandidateSet {
        match node {
            Expr::And { args } => self.scan_conjunction(args.iter(), scope),

            Expr::Or { args } | Expr::List { items: args } => self.scan_all(args, scope),

            Expr::Not { arg } | Expr::Relabel { arg } => self.scan_node(arg, scope),

            Expr::Compare { op, args } => {
                if self.config.operators.contains(*op) {
                    self.scan_all(args, scope)
                } else {
                    CandidateSet::new()
                }
            }

            Expr::Column(column) => self.scan_column(column, scope),

            Expr::SubLink { subquery, test, .. } => {
                let candidates = self.scan_query(subquery, scope);
                match test {
                    Some(test) => candidates.merge(self.scan_node(test, scope)),
                    None => candidates,
                }
            }

            // count(*) has no arguments
            Expr::Aggregate { args, .. } => self.scan_all(args, scope),

            Expr::Function { .. } | Expr::Const { .. } | Expr::Param { .. } => CandidateSet::new(),

            Expr::Unsupported { kind } => {
                Logger::warn("SCAN_UNSUPPORTED_NODE", &[("kind", kind)]);
                CandidateSet::new()
            }
        }
    }

    /// Scans each expression and merges the results, without composites
    fn scan_all<'q>(&self, exprs: &'q [Expr], scope: &mut ScopeStack<'q>) -> CandidateSet {
        exprs.iter().fold(CandidateSet::new(), |acc, expr| {
            acc.merge(self.scan_node(expr, scope))
        })
    }

    /// AND semantics: each conjunct's candidates are combined with those of
    /// the conjuncts before it
    fn scan_conjunction<'q>(
        &self,
        operands: impl Iterator<Item = &'q Expr>,
        scope: &mut ScopeStack<'q>,
    ) -> CandidateSet {
        let mut candidates = CandidateSet::new();
        let mut composites = CandidateSet::new();

        for operand in operands {
            let found = self.scan_node(operand, scope);
            let built = build_composites(&candidates, &found, self.config.max_key_width);
            candidates = candidates.merge(found);
            composites = composites.merge(built);
        }

        candidates.merge(composites)
    }

    fn scan_column(&self, column: &ColumnRef, scope: &ScopeStack<'_>) -> CandidateSet {
        let relation = match scope.resolve(column) {
            Some(RangeEntry::Relation { relation }) => *relation,
            // Subquery, join and function outputs have no indexes of their own
            Some(_) => return CandidateSet::new(),
            None => {
                Logger::warn(
                    "SCAN_UNRESOLVED_COLUMN",
                    &[
                        ("range_index", &column.range_index.to_string()),
                        ("levels_up", &column.levels_up.to_string()),
                        ("depth", &scope.depth().to_string()),
                    ],
                );
                return CandidateSet::new();
            }
        };

        if column.column <= 0
            || !self.catalog.table_eligible(relation)
            || !self
                .catalog
                .row_count_at_least(relation, self.config.min_row_count)
        {
            return CandidateSet::new();
        }

        CandidateSet::single(Candidate::single(relation, column.column, column.type_id))
    }
}
