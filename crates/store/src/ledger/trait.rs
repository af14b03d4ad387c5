use std::sync::Arc;

use serde::{Deserialize, Serialize};

use werkorder_core::DomainResult;
use werkorder_numbering::{NumberStatus, OrderNumber, ScopeKey, Series};

/// Listing filter. A quarter overrules a month when both are given; an
/// out-of-range quarter matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub quarter: Option<u32>,
    pub status: Option<NumberStatus>,
}

impl NumberFilter {
    pub fn matches(&self, record: &OrderNumber) -> bool {
        if let Some(year) = self.year {
            if record.year != year {
                return false;
            }
        }
        if let Some(quarter) = self.quarter {
            if !(1..=4).contains(&quarter) {
                return false;
            }
            let start = (quarter - 1) * 3 + 1;
            if !(start..start + 3).contains(&record.month) {
                return false;
            }
        } else if let Some(month) = self.month {
            if record.month != month {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        true
    }
}

/// Storage of order-number records, keyed by `(series, number)`.
///
/// The scope queries serve the allocator: the lowest FREE record is the
/// reuse candidate, the highest minted sequence feeds max+1 minting. Both
/// are only meaningful under the per-scope reservation lock.
pub trait NumberLedger: Send + Sync {
    fn find(&self, series: Series, number: &str) -> DomainResult<Option<OrderNumber>>;

    /// Lowest-sequence FREE record in a scope, if any.
    fn lowest_free(&self, scope: ScopeKey) -> DomainResult<Option<OrderNumber>>;

    /// Highest sequence ever minted in a scope, regardless of status.
    /// Zero for an untouched scope.
    fn max_sequence(&self, scope: ScopeKey) -> DomainResult<u32>;

    /// Insert a fresh record. A duplicate number, or a duplicate sequence
    /// within the record's scope, is a conflict.
    fn insert(&self, record: OrderNumber) -> DomainResult<()>;

    /// Overwrite an existing record.
    fn update(&self, record: OrderNumber) -> DomainResult<()>;

    /// Records of a series matching the filter, newest first
    /// (year, month, sequence all descending).
    fn list(&self, series: Series, filter: &NumberFilter) -> DomainResult<Vec<OrderNumber>>;
}

impl<L: NumberLedger + ?Sized> NumberLedger for Arc<L> {
    fn find(&self, series: Series, number: &str) -> DomainResult<Option<OrderNumber>> {
        (**self).find(series, number)
    }

    fn lowest_free(&self, scope: ScopeKey) -> DomainResult<Option<OrderNumber>> {
        (**self).lowest_free(scope)
    }

    fn max_sequence(&self, scope: ScopeKey) -> DomainResult<u32> {
        (**self).max_sequence(scope)
    }

    fn insert(&self, record: OrderNumber) -> DomainResult<()> {
        (**self).insert(record)
    }

    fn update(&self, record: OrderNumber) -> DomainResult<()> {
        (**self).update(record)
    }

    fn list(&self, series: Series, filter: &NumberFilter) -> DomainResult<Vec<OrderNumber>> {
        (**self).list(series, filter)
    }
}
