//! Order-number records and their reservation lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use werkorder_core::{DomainError, DomainResult};

use crate::series::{ScopeKey, Series};

/// Status of an allocated number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberStatus {
    Free,
    Reserved,
    Confirmed,
    /// Representable for legacy data; no core operation produces it.
    /// Cancelling a reservation returns the record to `Free`.
    Cancelled,
}

impl NumberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NumberStatus::Free => "FREE",
            NumberStatus::Reserved => "RESERVED",
            NumberStatus::Confirmed => "CONFIRMED",
            NumberStatus::Cancelled => "CANCELLED",
        }
    }
}

impl core::fmt::Display for NumberStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for NumberStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(NumberStatus::Free),
            "RESERVED" => Ok(NumberStatus::Reserved),
            "CONFIRMED" => Ok(NumberStatus::Confirmed),
            "CANCELLED" => Ok(NumberStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown number status: {other}"
            ))),
        }
    }
}

/// Descriptive fields attached when a reservation is confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmFields {
    pub customer_ref: Option<String>,
    pub supplier_ref: Option<String>,
    pub description: Option<String>,
}

/// One allocated number in a series.
///
/// The formatted `number` string is a pure function of
/// `(series, year, month, sequence)`; the remaining fields track the
/// reservation lifecycle and the eventual linkage to a customer/supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNumber {
    pub number: String,
    pub series: Series,
    pub year: i32,
    pub month: u32,
    pub sequence: u32,
    pub status: NumberStatus,

    pub reserved_by: Option<String>,
    pub reserved_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,

    pub customer_ref: Option<String>,
    pub supplier_ref: Option<String>,
    pub description: Option<String>,
}

impl OrderNumber {
    /// Mint a fresh RESERVED record for a sequence that has never existed
    /// in this scope.
    pub fn reserved(
        series: Series,
        year: i32,
        month: u32,
        sequence: u32,
        reserved_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            number: series.format_number(year, month, sequence),
            series,
            year,
            month,
            sequence,
            status: NumberStatus::Reserved,
            reserved_by: Some(reserved_by.into()),
            reserved_at: Some(now),
            confirmed_at: None,
            customer_ref: None,
            supplier_ref: None,
            description: None,
        }
    }

    pub fn scope(&self) -> ScopeKey {
        self.series.scope(self.year, self.month)
    }

    /// Take a FREE record back into use.
    pub fn reserve(
        &mut self,
        reserved_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status != NumberStatus::Free {
            return Err(DomainError::invalid_state(format!(
                "only FREE numbers can be reserved (number {} is {})",
                self.number, self.status
            )));
        }
        self.status = NumberStatus::Reserved;
        self.reserved_by = Some(reserved_by.into());
        self.reserved_at = Some(now);
        Ok(())
    }

    /// Finalize a reservation, attaching the descriptive fields.
    pub fn confirm(&mut self, fields: ConfirmFields, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != NumberStatus::Reserved {
            return Err(DomainError::invalid_state(format!(
                "only RESERVED numbers can be confirmed (number {} is {})",
                self.number, self.status
            )));
        }
        self.status = NumberStatus::Confirmed;
        self.confirmed_at = Some(now);
        self.customer_ref = fields.customer_ref;
        self.supplier_ref = fields.supplier_ref;
        self.description = fields.description;
        Ok(())
    }

    /// Return a reservation to the pool. The sequence and scope are kept so
    /// the number is recyclable; assignment metadata is cleared.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status != NumberStatus::Reserved {
            return Err(DomainError::invalid_state(format!(
                "only RESERVED numbers can be cancelled (number {} is {})",
                self.number, self.status
            )));
        }
        self.status = NumberStatus::Free;
        self.reserved_by = None;
        self.reserved_at = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn reserved_number() -> OrderNumber {
        OrderNumber::reserved(Series::ServiceOrder, 2026, 2, 5, "monteur@werkplaats", test_time())
    }

    #[test]
    fn minting_formats_the_number_from_its_parts() {
        let rec = reserved_number();
        assert_eq!(rec.number, "26020005");
        assert_eq!(rec.status, NumberStatus::Reserved);
        assert_eq!(rec.reserved_by.as_deref(), Some("monteur@werkplaats"));
        assert!(rec.reserved_at.is_some());
        assert!(rec.confirmed_at.is_none());
    }

    #[test]
    fn confirm_requires_reserved() {
        let mut rec = reserved_number();
        rec.confirm(ConfirmFields::default(), test_time()).unwrap();
        assert_eq!(rec.status, NumberStatus::Confirmed);
        assert!(rec.confirmed_at.is_some());

        let err = rec.confirm(ConfirmFields::default(), test_time()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn confirm_attaches_descriptive_fields() {
        let mut rec = reserved_number();
        rec.confirm(
            ConfirmFields {
                customer_ref: Some("Jansen BV".to_string()),
                supplier_ref: Some("Sullair".to_string()),
                description: Some("compressor revisie".to_string()),
            },
            test_time(),
        )
        .unwrap();
        assert_eq!(rec.customer_ref.as_deref(), Some("Jansen BV"));
        assert_eq!(rec.supplier_ref.as_deref(), Some("Sullair"));
        assert_eq!(rec.description.as_deref(), Some("compressor revisie"));
    }

    #[test]
    fn cancel_returns_to_free_and_clears_assignment_metadata() {
        let mut rec = reserved_number();
        rec.cancel().unwrap();
        assert_eq!(rec.status, NumberStatus::Free);
        assert!(rec.reserved_by.is_none());
        assert!(rec.reserved_at.is_none());
        // Identity is retained for reuse.
        assert_eq!(rec.sequence, 5);
        assert_eq!(rec.number, "26020005");

        let err = rec.cancel().unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn cancel_does_not_apply_to_confirmed_numbers() {
        let mut rec = reserved_number();
        rec.confirm(ConfirmFields::default(), test_time()).unwrap();
        assert!(matches!(rec.cancel(), Err(DomainError::InvalidState(_))));
    }

    #[test]
    fn freed_numbers_can_be_reserved_again() {
        let mut rec = reserved_number();
        rec.cancel().unwrap();
        rec.reserve("balie@werkplaats", test_time()).unwrap();
        assert_eq!(rec.status, NumberStatus::Reserved);
        assert_eq!(rec.reserved_by.as_deref(), Some("balie@werkplaats"));
    }
}
