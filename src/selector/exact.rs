//! Exact selection: 0/1 knapsack over KB
//!
//! Builds a `(records + 1) x (budget + 1)` table of best achievable benefit,
//! then walks it back to find the chosen records. Memory is
//! O(records x budget), so this is only meant for small record counts and
//! small budgets; tables above [`MAX_TABLE_CELLS`] are refused.

use super::aggregate::Recommendation;
use super::errors::{SelectorError, SelectorResult};
use super::selection::{validate_inputs, Selection};

/// Largest table the exact selector will allocate (128 MiB of f64)
pub const MAX_TABLE_CELLS: u64 = 16 * 1024 * 1024;

pub fn select_exact(recommendations: &[Recommendation], budget_kb: u64) -> SelectorResult<Selection> {
    let total = validate_inputs(recommendations, budget_kb)?;
    if total <= budget_kb {
        return Ok(Selection::from_chosen(recommendations.to_vec()));
    }

    let n = recommendations.len();
    let cells = (n as u64 + 1).saturating_mul(budget_kb.saturating_add(1));
    if cells > MAX_TABLE_CELLS {
        return Err(SelectorError::budget_too_large(n, budget_kb, MAX_TABLE_CELLS));
    }

    // cells fits in usize: it is bounded by MAX_TABLE_CELLS
    let width = budget_kb as usize + 1;
    let mut best = vec![0.0_f64; (n + 1) * width];

    for (i, r) in recommendations.iter().enumerate() {
        let row = (i + 1) * width;
        let prev = i * width;
        for c in 0..width {
            let mut value = best[prev + c];
            if let Ok(size) = usize::try_from(r.size_kb) {
                if size <= c {
                    let with = best[prev + c - size] + r.benefit;
                    if with > value {
                        value = with;
                    }
                }
            }
            best[row + c] = value;
        }
    }

    let mut chosen = Vec::new();
    let mut c = width - 1;
    for i in (1..=n).rev() {
        if best[i * width + c] != best[(i - 1) * width + c] {
            let r = &recommendations[i - 1];
            chosen.push(r.clone());
            c -= r.size_kb as usize;
        }
    }
    chosen.reverse();

    Ok(Selection::from_chosen(chosen))
}
