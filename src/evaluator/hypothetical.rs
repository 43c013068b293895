//! Reversible hypothetical index registration
//!
//! Every index registered through a [`HypotheticalScope`] is unregistered
//! when the scope is closed or dropped, whichever comes first. Dropping is
//! the error path: failures to unregister are logged there since they
//! cannot be returned.

use super::oracle::{CostOracle, Estimate, HypotheticalIndex, OracleResult};
use crate::candidate::{IndexId, KeyColumn, RelationId};
use crate::observability::Logger;
use crate::scanner::QueryTree;

pub struct HypotheticalScope<'o, O: CostOracle + ?Sized> {
    oracle: &'o mut O,
    registered: Vec<IndexId>,
}

impl<'o, O: CostOracle + ?Sized> HypotheticalScope<'o, O> {
    pub fn new(oracle: &'o mut O) -> Self {
        Self {
            oracle,
            registered: Vec::new(),
        }
    }

    /// Registers a hypothetical index, remembering it for rollback
    pub fn register(
        &mut self,
        relation: RelationId,
        columns: &[KeyColumn],
    ) -> OracleResult<Option<HypotheticalIndex>> {
        let index = self.oracle.register_hypothetical(relation, columns)?;
        if let Some(index) = index {
            self.registered.push(index.id);
        }
        Ok(index)
    }

    /// Estimates the query with every index of this scope visible
    pub fn estimate(&mut self, query: &QueryTree) -> OracleResult<Estimate> {
        self.oracle.estimate_with(query, &self.registered)
    }

    pub fn registered(&self) -> &[IndexId] {
        &self.registered
    }

    /// Unregisters everything, most recent first
    ///
    /// Every index is attempted even if an earlier one fails; the first
    /// failure is returned.
    pub fn close(mut self) -> OracleResult<()> {
        let mut first_error = None;
        for id in self.drain() {
            if let Err(e) = self.oracle.unregister_hypothetical(id) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn drain(&mut self) -> Vec<IndexId> {
        let mut ids = std::mem::take(&mut self.registered);
        ids.reverse();
        ids
    }
}

impl<O: CostOracle + ?Sized> Drop for HypotheticalScope<'_, O> {
    fn drop(&mut self) {
        for id in self.drain() {
            if let Err(e) = self.oracle.unregister_hypothetical(id) {
                Logger::error(
                    "HYPOTHETICAL_ROLLBACK_FAILED",
                    &[("index", &id.to_string()), ("error", &e.to_string())],
                );
            }
        }
    }
}
