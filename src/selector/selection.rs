//! Selection result and shared input checks

use serde::Serialize;

use super::aggregate::Recommendation;
use super::errors::{SelectorError, SelectorResult};

/// Recommendations chosen under a budget, in ranking order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub chosen: Vec<Recommendation>,
    pub total_size_kb: u64,
    pub total_benefit: f64,
}

impl Selection {
    pub fn from_chosen(chosen: Vec<Recommendation>) -> Self {
        let total_size_kb = chosen.iter().map(|r| r.size_kb).sum();
        let total_benefit = chosen.iter().map(|r| r.benefit).sum();
        Self {
            chosen,
            total_size_kb,
            total_benefit,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }
}

/// Selects everything; used when there is no budget
pub fn select_all(recommendations: &[Recommendation]) -> SelectorResult<Selection> {
    for r in recommendations {
        r.validate()?;
    }
    Ok(Selection::from_chosen(recommendations.to_vec()))
}

/// Rejects a zero budget or malformed records before any work starts.
/// Returns the combined size of all records.
pub(crate) fn validate_inputs(recommendations: &[Recommendation], budget_kb: u64) -> SelectorResult<u64> {
    if budget_kb == 0 {
        return Err(SelectorError::budget_invalid("budget must be positive"));
    }
    let mut total: u64 = 0;
    for r in recommendations {
        r.validate()?;
        total = total.saturating_add(r.size_kb);
    }
    Ok(total)
}
