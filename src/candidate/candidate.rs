//! Index candidate value type
//!
//! A candidate is a proposed B-tree index: an ordered list of key columns on
//! one relation. Candidates compare by relation, then width, then column ids
//! in key order. Column types never take part in the comparison.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Relation (table) identifier as assigned by the catalog
pub type RelationId = u32;

/// Column number within a relation. User columns are numbered from 1;
/// zero and negative numbers denote hidden/system columns.
pub type ColumnId = i16;

/// Type identifier of a column, used only to pick an operator class
pub type TypeId = u32;

/// Platform limit on the number of key columns in one index
pub const DEFAULT_MAX_KEY_WIDTH: usize = 32;

/// Identifier handed out by the cost oracle for a hypothetical index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexId(pub u64);

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hypo:{}", self.0)
    }
}

/// One key column of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyColumn {
    pub column: ColumnId,
    pub type_id: TypeId,
}

impl KeyColumn {
    pub fn new(column: ColumnId, type_id: TypeId) -> Self {
        Self { column, type_id }
    }
}

/// A proposed index
///
/// Equality and ordering only look at `(relation, width, column ids)`, so
/// two candidates that differ in `pages`, `used` or `benefit` are still the
/// same candidate for merge and dedup purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Owning relation
    pub relation: RelationId,
    /// Key columns in index order
    pub columns: Vec<KeyColumn>,
    /// Estimated index size in pages (filled in by the oracle)
    pub pages: u64,
    /// Set when the oracle's plan scanned this candidate
    pub used: bool,
    /// Share of the cost saved attributed to this candidate
    pub benefit: f64,
    /// Hypothetical index id while registered with the oracle
    #[serde(skip)]
    pub index_id: Option<IndexId>,
}

impl Candidate {
    /// Creates a single-column candidate
    pub fn single(relation: RelationId, column: ColumnId, type_id: TypeId) -> Self {
        Self::with_columns(relation, vec![KeyColumn::new(column, type_id)])
    }

    /// Creates a candidate over the given key columns
    pub fn with_columns(relation: RelationId, columns: Vec<KeyColumn>) -> Self {
        Self {
            relation,
            columns,
            pages: 0,
            used: false,
            benefit: 0.0,
            index_id: None,
        }
    }

    /// Builds the composite `self ++ other`. Both must be on the same relation.
    pub fn concat(&self, other: &Candidate) -> Candidate {
        debug_assert_eq!(self.relation, other.relation);
        let mut columns = Vec::with_capacity(self.width() + other.width());
        columns.extend_from_slice(&self.columns);
        columns.extend_from_slice(&other.columns);
        Candidate::with_columns(self.relation, columns)
    }

    /// Number of key columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Key column ids in index order
    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.iter().map(|c| c.column)
    }

    /// Returns true if the two candidates have at least one column in common
    pub fn shares_column(&self, other: &Candidate) -> bool {
        self.columns
            .iter()
            .any(|a| other.columns.iter().any(|b| a.column == b.column))
    }

    /// Returns true if the key columns are exactly `columns`, in order
    pub fn matches_columns(&self, columns: &[ColumnId]) -> bool {
        self.width() == columns.len() && self.column_ids().eq(columns.iter().copied())
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.relation
            .cmp(&other.relation)
            .then_with(|| self.width().cmp(&other.width()))
            .then_with(|| self.column_ids().cmp(other.column_ids()))
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_(", self.relation)?;
        for (i, column) in self.column_ids().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", column)?;
        }
        write!(f, ")")
    }
}
