//! Relevance filter
//!
//! Second pass over a query's candidates before any of them reach the cost
//! oracle. Candidates on ineligible tables are dropped, as are candidates
//! whose key columns exactly match an index that already exists.

use std::collections::HashMap;

use crate::candidate::{CandidateSet, RelationId};
use crate::catalog::{Catalog, ExistingIndex};

/// Drops candidates that cannot help
pub struct RelevanceFilter<'a, C: Catalog> {
    catalog: &'a C,
}

impl<'a, C: Catalog> RelevanceFilter<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Returns the candidates worth evaluating, order preserved
    pub fn apply(&self, mut candidates: CandidateSet) -> CandidateSet {
        // One catalog lookup per relation; candidates arrive grouped by relation
        let mut existing: HashMap<RelationId, Option<Vec<ExistingIndex>>> = HashMap::new();

        candidates.retain(|candidate| {
            let indexes = existing.entry(candidate.relation).or_insert_with(|| {
                if self.catalog.table_eligible(candidate.relation) {
                    Some(self.catalog.existing_indexes(candidate.relation))
                } else {
                    None
                }
            });

            match indexes {
                None => false,
                Some(indexes) => !indexes
                    .iter()
                    .filter(|index| index.is_comparable())
                    .any(|index| candidate.matches_columns(&index.columns)),
            }
        });

        candidates
    }
}
