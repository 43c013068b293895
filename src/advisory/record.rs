//! Advisory record
//!
//! One record per hypothetical index the oracle actually used for one query.
//! Records are written as the workload runs and aggregated afterwards by the
//! selector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::candidate::{ColumnId, RelationId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    /// Relation the index would be built on
    pub relation: RelationId,
    /// Key column ids in index order
    pub columns: Vec<ColumnId>,
    /// Estimated index size in KB
    pub size_kb: u64,
    /// Share of the query's cost saving credited to this index
    pub benefit: f64,
    /// Adviser run that produced the record
    pub session: Uuid,
    pub recorded_at: DateTime<Utc>,
}

impl AdvisoryRecord {
    /// Creates a record stamped with the current time
    pub fn new(
        session: Uuid,
        relation: RelationId,
        columns: Vec<ColumnId>,
        size_kb: u64,
        benefit: f64,
    ) -> Self {
        Self {
            relation,
            columns,
            size_kb,
            benefit,
            session,
            recorded_at: Utc::now(),
        }
    }

    /// Serialize to a single JSON line (no trailing newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
