//! Number reservation service.
//!
//! Serializes reservations per scope with [`ScopeLocks`], so two concurrent
//! callers can never observe the same lowest-FREE record or the same max
//! sequence. Freed numbers are always reused before a new sequence is
//! minted, which keeps a scope gap-free.

use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info, instrument};

use werkorder_auth::{require_min_role, Principal, UserRole};
use werkorder_core::{DomainError, DomainResult};
use werkorder_numbering::{ConfirmFields, OrderNumber, ScopeKey, Series};

use crate::ledger::{NumberFilter, NumberLedger};
use crate::scope_lock::ScopeLocks;

#[derive(Debug, Clone, Copy)]
pub struct NumberingConfig {
    /// Bounded wait for the per-scope reservation lock.
    pub lock_timeout: Duration,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

/// Reservation, confirmation and listing of order numbers over a ledger.
///
/// Reserving only takes an authenticated principal, whose email is stamped
/// into the record as `reserved_by`; confirm and cancel require at least
/// the `user` role.
pub struct NumberingService<L: NumberLedger> {
    ledger: L,
    locks: ScopeLocks,
    config: NumberingConfig,
}

impl<L: NumberLedger> NumberingService<L> {
    pub fn new(ledger: L) -> Self {
        Self::with_config(ledger, NumberingConfig::default())
    }

    pub fn with_config(ledger: L, config: NumberingConfig) -> Self {
        Self {
            ledger,
            locks: ScopeLocks::new(),
            config,
        }
    }

    /// Reserve the next number in the series' current scope: the lowest
    /// FREE record when one exists, otherwise a freshly minted max+1.
    #[instrument(skip(self, principal), fields(series = %series, reserved_by = %principal.email), err)]
    pub fn reserve_next(
        &self,
        series: Series,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<OrderNumber> {
        let scope = series.scope(now.year(), now.month());
        let _guard = self.locks.acquire(scope, self.config.lock_timeout)?;
        self.reserve_locked(series, scope, principal, now)
    }

    /// Reserve `count` numbers under a single lock hold.
    #[instrument(skip(self, principal), fields(series = %series, count, reserved_by = %principal.email), err)]
    pub fn reserve_batch(
        &self,
        series: Series,
        count: usize,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<OrderNumber>> {
        if count == 0 {
            return Err(DomainError::validation("count must be positive"));
        }

        let scope = series.scope(now.year(), now.month());
        let _guard = self.locks.acquire(scope, self.config.lock_timeout)?;

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(self.reserve_locked(series, scope, principal, now)?);
        }
        Ok(records)
    }

    fn reserve_locked(
        &self,
        series: Series,
        scope: ScopeKey,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<OrderNumber> {
        if let Some(mut record) = self.ledger.lowest_free(scope)? {
            record.reserve(principal.email.as_str(), now)?;
            self.ledger.update(record.clone())?;
            debug!(number = %record.number, "reused a freed number");
            return Ok(record);
        }

        let sequence = self.ledger.max_sequence(scope)? + 1;
        let record = OrderNumber::reserved(
            series,
            scope.year,
            now.month(),
            sequence,
            principal.email.as_str(),
            now,
        );
        self.ledger.insert(record.clone())?;
        debug!(number = %record.number, "minted a new number");
        Ok(record)
    }

    /// Finalize a reservation, attaching the descriptive fields.
    #[instrument(skip(self, principal, fields), fields(series = %series, number), err)]
    pub fn confirm(
        &self,
        series: Series,
        number: &str,
        fields: ConfirmFields,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<OrderNumber> {
        require_min_role(principal, UserRole::User)?;

        let mut record = self
            .ledger
            .find(series, number)?
            .ok_or_else(DomainError::not_found)?;
        record.confirm(fields, now)?;
        self.ledger.update(record.clone())?;
        info!(number = %record.number, "reservation confirmed");
        Ok(record)
    }

    /// Return a reservation to the pool for reuse.
    #[instrument(skip(self, principal), fields(series = %series, number), err)]
    pub fn cancel(
        &self,
        series: Series,
        number: &str,
        principal: &Principal,
    ) -> DomainResult<OrderNumber> {
        require_min_role(principal, UserRole::User)?;

        let mut record = self
            .ledger
            .find(series, number)?
            .ok_or_else(DomainError::not_found)?;
        record.cancel()?;
        self.ledger.update(record.clone())?;
        info!(number = %record.number, "reservation cancelled");
        Ok(record)
    }

    pub fn get(&self, series: Series, number: &str) -> DomainResult<OrderNumber> {
        self.ledger
            .find(series, number)?
            .ok_or_else(DomainError::not_found)
    }

    pub fn list(&self, series: Series, filter: &NumberFilter) -> DomainResult<Vec<OrderNumber>> {
        self.ledger.list(series, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use werkorder_numbering::NumberStatus;

    use crate::ledger::InMemoryNumberLedger;

    fn clerk() -> Principal {
        Principal::new("balie@werkplaats", UserRole::User)
    }

    fn february() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).unwrap()
    }

    fn march() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap()
    }

    fn service() -> NumberingService<InMemoryNumberLedger> {
        NumberingService::new(InMemoryNumberLedger::new())
    }

    #[test]
    fn the_first_reservation_of_a_scope_starts_at_one() {
        let service = service();
        let record = service
            .reserve_next(Series::ServiceOrder, &clerk(), february())
            .unwrap();
        assert_eq!(record.sequence, 1);
        assert_eq!(record.number, "26020001");
        assert_eq!(record.status, NumberStatus::Reserved);
        assert_eq!(record.reserved_by.as_deref(), Some("balie@werkplaats"));
    }

    #[test]
    fn service_order_sequences_continue_across_months() {
        let service = service();
        service
            .reserve_next(Series::ServiceOrder, &clerk(), february())
            .unwrap();
        let second = service
            .reserve_next(Series::ServiceOrder, &clerk(), march())
            .unwrap();
        // Year scope: the sequence continues, the number records the month.
        assert_eq!(second.sequence, 2);
        assert_eq!(second.number, "26030002");
    }

    #[test]
    fn purchase_order_sequences_restart_per_month() {
        let service = service();
        service
            .reserve_next(Series::PurchaseOrder, &clerk(), february())
            .unwrap();
        let in_march = service
            .reserve_next(Series::PurchaseOrder, &clerk(), march())
            .unwrap();
        assert_eq!(in_march.sequence, 1);
        assert_eq!(in_march.number, "2603001");
    }

    #[test]
    fn cancelled_numbers_are_reused_before_minting() {
        let service = service();
        let clerk = clerk();
        for _ in 0..3 {
            service
                .reserve_next(Series::ServiceOrder, &clerk, february())
                .unwrap();
        }
        service
            .cancel(Series::ServiceOrder, "26020002", &clerk)
            .unwrap();

        let reused = service
            .reserve_next(Series::ServiceOrder, &clerk, february())
            .unwrap();
        assert_eq!(reused.number, "26020002");
        assert_eq!(reused.sequence, 2);

        // The pool is exhausted again, so the next one is minted.
        let minted = service
            .reserve_next(Series::ServiceOrder, &clerk, february())
            .unwrap();
        assert_eq!(minted.sequence, 4);
    }

    #[test]
    fn a_batch_hands_out_consecutive_sequences() {
        let service = service();
        let records = service
            .reserve_batch(Series::ServiceOrder, 5, &clerk(), february())
            .unwrap();
        let sequences: Vec<u32> = records.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);

        let err = service
            .reserve_batch(Series::ServiceOrder, 0, &clerk(), february())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn confirm_stamps_fields_and_requires_a_reservation() {
        let service = service();
        let clerk = clerk();
        let record = service
            .reserve_next(Series::ServiceOrder, &clerk, february())
            .unwrap();

        let confirmed = service
            .confirm(
                Series::ServiceOrder,
                &record.number,
                ConfirmFields {
                    customer_ref: Some("Jansen BV".to_string()),
                    supplier_ref: None,
                    description: Some("compressor revisie".to_string()),
                },
                &clerk,
                february(),
            )
            .unwrap();
        assert_eq!(confirmed.status, NumberStatus::Confirmed);
        assert_eq!(confirmed.customer_ref.as_deref(), Some("Jansen BV"));

        // A confirmed number can no longer be cancelled.
        let err = service
            .cancel(Series::ServiceOrder, &record.number, &clerk)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn unknown_numbers_are_not_found() {
        let service = service();
        assert_eq!(
            service
                .confirm(
                    Series::ServiceOrder,
                    "26029999",
                    ConfirmFields::default(),
                    &clerk(),
                    february(),
                )
                .unwrap_err(),
            DomainError::NotFound
        );
        assert_eq!(
            service.get(Series::ServiceOrder, "26029999").unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn any_authenticated_principal_can_reserve() {
        let service = service();
        let viewer = Principal::new("kijker@werkplaats", UserRole::Viewer);
        let record = service
            .reserve_next(Series::ServiceOrder, &viewer, february())
            .unwrap();
        assert_eq!(record.reserved_by.as_deref(), Some("kijker@werkplaats"));
    }

    #[test]
    fn a_viewer_cannot_confirm_or_cancel() {
        let service = service();
        let viewer = Principal::new("kijker@werkplaats", UserRole::Viewer);
        service
            .reserve_next(Series::ServiceOrder, &viewer, february())
            .unwrap();
        assert_eq!(
            service
                .confirm(
                    Series::ServiceOrder,
                    "26020001",
                    ConfirmFields::default(),
                    &viewer,
                    february(),
                )
                .unwrap_err(),
            DomainError::Unauthorized
        );
        assert_eq!(
            service
                .cancel(Series::ServiceOrder, "26020001", &viewer)
                .unwrap_err(),
            DomainError::Unauthorized
        );
    }

    #[test]
    fn listing_filters_by_status() {
        let service = service();
        let clerk = clerk();
        for _ in 0..3 {
            service
                .reserve_next(Series::ServiceOrder, &clerk, february())
                .unwrap();
        }
        service
            .cancel(Series::ServiceOrder, "26020001", &clerk)
            .unwrap();

        let free = service
            .list(
                Series::ServiceOrder,
                &NumberFilter {
                    status: Some(NumberStatus::Free),
                    ..NumberFilter::default()
                },
            )
            .unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].number, "26020001");
    }
}
