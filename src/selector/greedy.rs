//! Greedy selection
//!
//! Walks the recommendations in ranking order and takes each one while the
//! running size stays within budget. The first one that does not fit ends
//! the walk; later, smaller recommendations are not considered.

use super::aggregate::Recommendation;
use super::errors::SelectorResult;
use super::selection::{validate_inputs, Selection};

pub fn select_greedy(recommendations: &[Recommendation], budget_kb: u64) -> SelectorResult<Selection> {
    let total = validate_inputs(recommendations, budget_kb)?;
    if total <= budget_kb {
        return Ok(Selection::from_chosen(recommendations.to_vec()));
    }

    let mut chosen = Vec::new();
    let mut used: u64 = 0;
    for r in recommendations {
        if used.saturating_add(r.size_kb) > budget_kb {
            break;
        }
        used += r.size_kb;
        chosen.push(r.clone());
    }
    Ok(Selection::from_chosen(chosen))
}
