//! Sorted, duplicate-free candidate sequences
//!
//! Every candidate list handed between the scanner, the composite builder
//! and the relevance filter is a [`CandidateSet`]. Merging two sets is a
//! linear two-pointer walk; composite construction can blow candidate
//! counts up combinatorially, so the merge never re-sorts.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use super::candidate::Candidate;

/// A sequence of candidates kept sorted by the candidate order, with no two
/// entries comparing equal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandidateSet {
    items: Vec<Candidate>,
}

impl CandidateSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding one candidate
    pub fn single(candidate: Candidate) -> Self {
        Self {
            items: vec![candidate],
        }
    }

    /// Sorts and deduplicates an arbitrary list. The first of several equal
    /// entries wins.
    pub fn from_unsorted(mut items: Vec<Candidate>) -> Self {
        items.sort();
        items.dedup();
        Self { items }
    }

    /// Wraps a list the caller already knows to be sorted and duplicate-free
    pub(crate) fn from_sorted(items: Vec<Candidate>) -> Self {
        debug_assert!(items.windows(2).all(|w| w[0] < w[1]));
        Self { items }
    }

    /// Merges two sets into one
    ///
    /// Runs in `O(self.len() + other.len())`. When a candidate appears in both
    /// inputs the entry from `self` is kept and the one from `other` dropped.
    pub fn merge(self, other: CandidateSet) -> CandidateSet {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }

        let mut merged = Vec::with_capacity(self.len() + other.len());
        let mut left = self.items.into_iter().peekable();
        let mut right = other.items.into_iter().peekable();

        loop {
            let order = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => l.cmp(r),
                _ => break,
            };
            match order {
                Ordering::Less => merged.extend(left.next()),
                Ordering::Greater => merged.extend(right.next()),
                Ordering::Equal => {
                    merged.extend(left.next());
                    right.next();
                }
            }
        }
        merged.extend(left);
        merged.extend(right);

        CandidateSet { items: merged }
    }

    /// Keeps only the candidates for which `keep` returns true
    pub fn retain(&mut self, keep: impl FnMut(&Candidate) -> bool) {
        self.items.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.items
    }

    /// Mutable access for evaluation bookkeeping (`pages`, `used`, `benefit`,
    /// `index_id`). The key columns must not be changed through this.
    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Candidate> {
        self.items.iter_mut()
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.items
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for CandidateSet {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl fmt::Display for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}| {{", self.len())?;
        for (i, candidate) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", candidate)?;
        }
        write!(f, "}}")
    }
}
