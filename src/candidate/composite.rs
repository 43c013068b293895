//! Composite (multi-column) candidate construction
//!
//! Given the candidates of two conjuncts, builds every index that could
//! serve both conditions at once. Both inputs are sorted by relation, so
//! matching relations are found with a merge-join walk and only the runs of
//! one relation are cross-multiplied.

use super::candidate::Candidate;
use super::merge::CandidateSet;

/// Builds composite candidates from two candidate sets
///
/// For every pair `(a, b)` with `a` from `left` and `b` from `right` that
/// share a relation, have no column in common, and whose combined width is
/// at most `max_width`, both `a ++ b` and `b ++ a` are produced. The result
/// is sorted and duplicate-free.
pub fn build_composites(left: &CandidateSet, right: &CandidateSet, max_width: usize) -> CandidateSet {
    let l = left.as_slice();
    let r = right.as_slice();
    let mut composites = Vec::new();

    let (mut i, mut j) = (0, 0);
    while i < l.len() && j < r.len() {
        if l[i].relation < r[j].relation {
            i += 1;
            continue;
        }
        if l[i].relation > r[j].relation {
            j += 1;
            continue;
        }

        let left_end = run_end(l, i);
        let right_end = run_end(r, j);

        let mut run = Vec::new();
        for b in &r[j..right_end] {
            for a in &l[i..left_end] {
                if a.width() + b.width() > max_width || a.shares_column(b) {
                    continue;
                }
                let ab = a.concat(b);
                let ba = b.concat(a);
                if ab != ba {
                    run.push(ba);
                }
                run.push(ab);
            }
        }

        // Runs come out in relation order, so sorting each run keeps the
        // whole output sorted.
        run.sort();
        run.dedup();
        composites.extend(run);

        i = left_end;
        j = right_end;
    }

    CandidateSet::from_sorted(composites)
}

/// Index one past the last candidate sharing `items[start]`'s relation
fn run_end(items: &[Candidate], start: usize) -> usize {
    let relation = items[start].relation;
    start
        + items[start..]
            .iter()
            .take_while(|c| c.relation == relation)
            .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{ColumnId, KeyColumn, RelationId, DEFAULT_MAX_KEY_WIDTH};

    fn cand(relation: RelationId, cols: &[ColumnId]) -> Candidate {
        Candidate::with_columns(
            relation,
            cols.iter().map(|c| KeyColumn::new(*c, 23)).collect(),
        )
    }

    fn set(items: Vec<Candidate>) -> CandidateSet {
        CandidateSet::from_unsorted(items)
    }

    fn columns(s: &CandidateSet) -> Vec<(RelationId, Vec<ColumnId>)> {
        s.iter()
            .map(|c| (c.relation, c.column_ids().collect()))
            .collect()
    }

    #[test]
    fn test_two_singles_give_both_orders() {
        let out = build_composites(
            &set(vec![cand(7, &[1])]),
            &set(vec![cand(7, &[2])]),
            DEFAULT_MAX_KEY_WIDTH,
        );
        assert_eq!(columns(&out), vec![(7, vec![1, 2]), (7, vec![2, 1])]);
    }

    #[test]
    fn test_shared_column_gives_nothing() {
        let out = build_composites(
            &set(vec![cand(7, &[1])]),
            &set(vec![cand(7, &[1, 2])]),
            DEFAULT_MAX_KEY_WIDTH,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_different_relations_give_nothing() {
        let out = build_composites(
            &set(vec![cand(1, &[1]), cand(3, &[1])]),
            &set(vec![cand(2, &[2]), cand(4, &[2])]),
            DEFAULT_MAX_KEY_WIDTH,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_only_matching_runs_are_combined() {
        let out = build_composites(
            &set(vec![cand(1, &[1]), cand(2, &[1]), cand(2, &[3])]),
            &set(vec![cand(2, &[2]), cand(5, &[4])]),
            DEFAULT_MAX_KEY_WIDTH,
        );
        assert_eq!(
            columns(&out),
            vec![
                (2, vec![1, 2]),
                (2, vec![2, 1]),
                (2, vec![2, 3]),
                (2, vec![3, 2]),
            ]
        );
    }

    #[test]
    fn test_width_bound_respected() {
        let out = build_composites(
            &set(vec![cand(1, &[1, 2]), cand(1, &[3])]),
            &set(vec![cand(1, &[4, 5])]),
            3,
        );
        assert!(out.iter().all(|c| c.width() <= 3));
        assert_eq!(columns(&out), vec![(1, vec![3, 4, 5]), (1, vec![4, 5, 3])]);
    }

    #[test]
    fn test_width_exactly_at_limit_allowed() {
        let out = build_composites(&set(vec![cand(1, &[1])]), &set(vec![cand(1, &[2])]), 2);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_duplicates_across_pairs_collapse() {
        // [1] ++ [2,3] and [1,2] ++ [3] both give [1,2,3]
        let out = build_composites(
            &set(vec![cand(1, &[1]), cand(1, &[1, 2])]),
            &set(vec![cand(1, &[3]), cand(1, &[2, 3])]),
            DEFAULT_MAX_KEY_WIDTH,
        );
        let cols = columns(&out);
        let count = cols.iter().filter(|(_, c)| c == &vec![1, 2, 3]).count();
        assert_eq!(count, 1);
        assert!(out.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_input() {
        let out = build_composites(&CandidateSet::new(), &set(vec![cand(1, &[1])]), 32);
        assert!(out.is_empty());
    }
}
