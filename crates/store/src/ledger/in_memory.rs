use std::collections::HashMap;
use std::sync::RwLock;

use werkorder_core::{DomainError, DomainResult};
use werkorder_numbering::{OrderNumber, ScopeKey, Series};

use super::r#trait::{NumberFilter, NumberLedger};

/// In-memory number ledger.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryNumberLedger {
    records: RwLock<HashMap<(Series, String), OrderNumber>>,
}

impl InMemoryNumberLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> DomainError {
    DomainError::storage("number ledger lock poisoned")
}

impl NumberLedger for InMemoryNumberLedger {
    fn find(&self, series: Series, number: &str) -> DomainResult<Option<OrderNumber>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(&(series, number.to_string())).cloned())
    }

    fn lowest_free(&self, scope: ScopeKey) -> DomainResult<Option<OrderNumber>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .values()
            .filter(|r| r.scope() == scope && r.status == werkorder_numbering::NumberStatus::Free)
            .min_by_key(|r| r.sequence)
            .cloned())
    }

    fn max_sequence(&self, scope: ScopeKey) -> DomainResult<u32> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .values()
            .filter(|r| r.scope() == scope)
            .map(|r| r.sequence)
            .max()
            .unwrap_or(0))
    }

    fn insert(&self, record: OrderNumber) -> DomainResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let key = (record.series, record.number.clone());
        if records.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "number {} already exists",
                record.number
            )));
        }
        // Same backstop as the partial unique indexes in Postgres: one
        // sequence per scope, across all statuses.
        if records
            .values()
            .any(|r| r.scope() == record.scope() && r.sequence == record.sequence)
        {
            return Err(DomainError::conflict(format!(
                "sequence {} already minted in scope {}",
                record.sequence,
                record.scope()
            )));
        }
        records.insert(key, record);
        Ok(())
    }

    fn update(&self, record: OrderNumber) -> DomainResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let key = (record.series, record.number.clone());
        match records.get_mut(&key) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(DomainError::not_found()),
        }
    }

    fn list(&self, series: Series, filter: &NumberFilter) -> DomainResult<Vec<OrderNumber>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        let mut matching: Vec<OrderNumber> = records
            .values()
            .filter(|r| r.series == series && filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then(b.month.cmp(&a.month))
                .then(b.sequence.cmp(&a.sequence))
        });
        Ok(matching)
    }
}
