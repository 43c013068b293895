//! Workload-wide aggregation of advisory records
//!
//! Records for the same (relation, columns) collapse into one
//! recommendation: the largest size seen, the sum of all benefits.
//! Recommendations are ranked by benefit per KB, best first. A group whose
//! summed benefit is not positive never paid off and is left out.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::{SelectorError, SelectorResult};
use crate::advisory::AdvisoryRecord;
use crate::candidate::{ColumnId, RelationId};
use crate::catalog::Catalog;
use crate::observability::Logger;

/// An index worth building, with everything needed to render it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub relation: RelationId,
    pub table: String,
    pub columns: Vec<ColumnId>,
    pub column_names: Vec<String>,
    pub size_kb: u64,
    pub benefit: f64,
}

impl Recommendation {
    /// Benefit per KB
    pub fn ratio(&self) -> f64 {
        self.benefit / self.size_kb as f64
    }

    /// Checks the fields every selector relies on
    pub fn validate(&self) -> SelectorResult<()> {
        if self.size_kb == 0 {
            return Err(SelectorError::record_malformed(format!(
                "{}({}) has size 0 KB",
                self.table,
                self.column_names.join(",")
            )));
        }
        if !self.benefit.is_finite() || self.benefit < 0.0 {
            return Err(SelectorError::record_malformed(format!(
                "{}({}) has benefit {}",
                self.table,
                self.column_names.join(","),
                self.benefit
            )));
        }
        Ok(())
    }
}

/// Groups records and ranks the result by benefit per KB, descending
pub fn aggregate<C: Catalog>(records: &[AdvisoryRecord], catalog: &C) -> SelectorResult<Vec<Recommendation>> {
    let mut groups: BTreeMap<(RelationId, Vec<ColumnId>), (u64, f64)> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        if record.columns.is_empty() {
            return Err(SelectorError::record_malformed(format!(
                "record {} on relation {} has no columns",
                index + 1,
                record.relation
            )));
        }
        if !record.benefit.is_finite() {
            return Err(SelectorError::record_malformed(format!(
                "record {} on relation {} has benefit {}",
                index + 1,
                record.relation,
                record.benefit
            )));
        }
        let entry = groups
            .entry((record.relation, record.columns.clone()))
            .or_insert((0, 0.0));
        entry.0 = entry.0.max(record.size_kb);
        entry.1 += record.benefit;
    }

    let mut recommendations = Vec::with_capacity(groups.len());
    for ((relation, columns), (size_kb, benefit)) in groups {
        let table = catalog
            .relation_name(relation)
            .unwrap_or_else(|| format!("rel{}", relation));
        let column_names = columns
            .iter()
            .map(|&c| {
                catalog
                    .column_name(relation, c)
                    .unwrap_or_else(|| format!("col{}", c))
            })
            .collect();
        let recommendation = Recommendation {
            relation,
            table,
            columns,
            column_names,
            size_kb,
            benefit,
        };
        if recommendation.benefit <= 0.0 {
            Logger::warn(
                "RECOMMENDATION_DROPPED",
                &[
                    ("index", &format!("{}({})", recommendation.table, recommendation.column_names.join(","))),
                    ("benefit", &format!("{:.2}", recommendation.benefit)),
                    ("size_kb", &recommendation.size_kb.to_string()),
                ],
            );
            continue;
        }
        recommendation.validate()?;
        recommendations.push(recommendation);
    }

    recommendations.sort_by(rank);
    Ok(recommendations)
}

/// Benefit per KB descending, then table and columns for a stable order
fn rank(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.ratio()
        .total_cmp(&a.ratio())
        .then_with(|| a.table.cmp(&b.table))
        .then_with(|| a.columns.cmp(&b.columns))
}
