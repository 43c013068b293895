//! Catalog interface
//!
//! The adviser never owns table metadata. Everything it needs to know about
//! relations, columns and indexes that already exist comes through the
//! read-only [`Catalog`] trait. [`CatalogSnapshot`] is a serde-loadable
//! implementation used by the CLI and the tests.

mod snapshot;

pub use snapshot::{CatalogError, CatalogResult, CatalogSnapshot, ColumnInfo, TableInfo, TableKind};

use serde::{Deserialize, Serialize};

use crate::candidate::{ColumnId, RelationId};

/// An index that already exists on a relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingIndex {
    /// Key columns in index order
    pub columns: Vec<ColumnId>,
    /// False while a concurrent build is incomplete
    #[serde(default = "default_true")]
    pub valid: bool,
    /// Index is over an expression rather than plain columns
    #[serde(default)]
    pub expression: bool,
    /// Index carries a WHERE predicate
    #[serde(default)]
    pub partial: bool,
}

fn default_true() -> bool {
    true
}

impl ExistingIndex {
    /// A valid, plain, full index over the given columns
    pub fn plain(columns: impl Into<Vec<ColumnId>>) -> Self {
        Self {
            columns: columns.into(),
            valid: true,
            expression: false,
            partial: false,
        }
    }

    /// Only valid, non-expression, non-partial indexes can make a candidate
    /// redundant
    pub fn is_comparable(&self) -> bool {
        self.valid && !self.expression && !self.partial
    }
}

/// Read-only view of the storage engine's catalog
pub trait Catalog {
    /// False for system/internal and temporary relations
    fn table_eligible(&self, relation: RelationId) -> bool;

    /// Indexes currently defined on the relation
    fn existing_indexes(&self, relation: RelationId) -> Vec<ExistingIndex>;

    /// True if the relation holds at least `rows` rows
    fn row_count_at_least(&self, relation: RelationId, rows: u64) -> bool;

    /// Relation name, if the relation is known
    fn relation_name(&self, relation: RelationId) -> Option<String>;

    /// Column name, if the column is known
    fn column_name(&self, relation: RelationId, column: ColumnId) -> Option<String>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn table_eligible(&self, relation: RelationId) -> bool {
        (**self).table_eligible(relation)
    }

    fn existing_indexes(&self, relation: RelationId) -> Vec<ExistingIndex> {
        (**self).existing_indexes(relation)
    }

    fn row_count_at_least(&self, relation: RelationId, rows: u64) -> bool {
        (**self).row_count_at_least(relation, rows)
    }

    fn relation_name(&self, relation: RelationId) -> Option<String> {
        (**self).relation_name(relation)
    }

    fn column_name(&self, relation: RelationId, column: ColumnId) -> Option<String> {
        (**self).column_name(relation, column)
    }
}
