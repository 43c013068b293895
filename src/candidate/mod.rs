//! Index candidates
//!
//! # Ordering
//!
//! Candidates are totally ordered by
//!
//! 1. relation id
//! 2. number of key columns
//! 3. column ids, lexicographically in key order
//!
//! Every candidate list passed between components is a [`CandidateSet`]
//! that is sorted under this order and holds no duplicates.

mod candidate;
mod composite;
mod merge;

pub use candidate::{
    Candidate, ColumnId, IndexId, KeyColumn, RelationId, TypeId, DEFAULT_MAX_KEY_WIDTH,
};
pub use composite::build_composites;
pub use merge::CandidateSet;
