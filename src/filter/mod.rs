//! Candidate relevance filtering

mod relevance;

pub use relevance::RelevanceFilter;
