//! In-memory catalog snapshot
//!
//! A snapshot is a JSON document listing tables with their columns, row
//! counts and existing indexes:
//!
//! ```json
//! { "tables": [
//!     { "id": 16384, "name": "orders", "row_count": 50000,
//!       "columns": [ { "id": 1, "name": "id", "type_id": 23 } ],
//!       "indexes": [ { "columns": [1] } ] }
//! ] }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Catalog, ExistingIndex};
use crate::candidate::{ColumnId, RelationId, TypeId};

/// Result type for catalog loading
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog snapshot loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Relation {0} is defined more than once")]
    DuplicateRelation(RelationId),
}

/// Kind of relation, as far as index eligibility is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    #[default]
    Regular,
    System,
    Temporary,
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub id: ColumnId,
    pub name: String,
    pub type_id: TypeId,
}

/// A table definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub id: RelationId,
    pub name: String,
    #[serde(default)]
    pub kind: TableKind,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub indexes: Vec<ExistingIndex>,
}

impl TableInfo {
    pub fn new(id: RelationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: TableKind::Regular,
            row_count: 0,
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: TableKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_rows(mut self, row_count: u64) -> Self {
        self.row_count = row_count;
        self
    }

    pub fn with_column(mut self, id: ColumnId, name: impl Into<String>, type_id: TypeId) -> Self {
        self.columns.push(ColumnInfo {
            id,
            name: name.into(),
            type_id,
        });
        self
    }

    pub fn with_index(mut self, index: ExistingIndex) -> Self {
        self.indexes.push(index);
        self
    }
}

/// Catalog backed by a fixed list of tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    tables: Vec<TableInfo>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any earlier table with the same id
    pub fn with_table(mut self, table: TableInfo) -> Self {
        self.tables.retain(|t| t.id != table.id);
        self.tables.push(table);
        self
    }

    /// Loads and validates a snapshot from a JSON file
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses and validates a snapshot from JSON text
    pub fn from_json(content: &str) -> CatalogResult<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> CatalogResult<()> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.id) {
                return Err(CatalogError::DuplicateRelation(table.id));
            }
        }
        Ok(())
    }

    /// Looks up a table by id
    pub fn table(&self, relation: RelationId) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.id == relation)
    }

    pub fn tables(&self) -> &[TableInfo] {
        &self.tables
    }
}

impl Catalog for CatalogSnapshot {
    fn table_eligible(&self, relation: RelationId) -> bool {
        self.table(relation)
            .map(|t| t.kind == TableKind::Regular)
            .unwrap_or(false)
    }

    fn existing_indexes(&self, relation: RelationId) -> Vec<ExistingIndex> {
        self.table(relation)
            .map(|t| t.indexes.clone())
            .unwrap_or_default()
    }

    fn row_count_at_least(&self, relation: RelationId, rows: u64) -> bool {
        self.table(relation)
            .map(|t| t.row_count >= rows)
            .unwrap_or(false)
    }

    fn relation_name(&self, relation: RelationId) -> Option<String> {
        self.table(relation).map(|t| t.name.clone())
    }

    fn column_name(&self, relation: RelationId, column: ColumnId) -> Option<String> {
        self.table(relation)?
            .columns
            .iter()
            .find(|c| c.id == column)
            .map(|c| c.name.clone())
    }
}
