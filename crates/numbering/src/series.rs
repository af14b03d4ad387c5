//! Numbering series and scope keys.

use serde::{Deserialize, Serialize};

/// A numbering series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Series {
    ServiceOrder,
    PurchaseOrder,
}

impl Series {
    /// Zero-padding width of the sequence part of the formatted number.
    pub fn sequence_width(self) -> usize {
        match self {
            Series::ServiceOrder => 4,
            Series::PurchaseOrder => 3,
        }
    }

    /// Uniqueness scope for a sequence: service orders restart per year,
    /// purchase orders per year+month.
    pub fn scope(self, year: i32, month: u32) -> ScopeKey {
        ScopeKey {
            series: self,
            year,
            month: match self {
                Series::ServiceOrder => None,
                Series::PurchaseOrder => Some(month),
            },
        }
    }

    /// Format a number string: two-digit year, two-digit month, zero-padded
    /// sequence. The month is always printed, also for the year-scoped
    /// service-order series (it records the reservation month).
    pub fn format_number(self, year: i32, month: u32, sequence: u32) -> String {
        let yy = year.rem_euclid(100);
        let width = self.sequence_width();
        format!("{yy:02}{month:02}{sequence:0width$}")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Series::ServiceOrder => "SERVICE_ORDER",
            Series::PurchaseOrder => "PURCHASE_ORDER",
        }
    }
}

impl core::fmt::Display for Series {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Series {
    type Err = werkorder_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SERVICE_ORDER" => Ok(Series::ServiceOrder),
            "PURCHASE_ORDER" => Ok(Series::PurchaseOrder),
            other => Err(werkorder_core::DomainError::validation(format!(
                "unknown series: {other}"
            ))),
        }
    }
}

/// Key of the ledger region a reservation must serialize on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey {
    pub series: Series,
    pub year: i32,
    /// `None` for year-scoped series.
    pub month: Option<u32>,
}

impl core::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.month {
            Some(month) => write!(f, "{}/{}-{:02}", self.series, self.year, month),
            None => write!(f, "{}/{}", self.series, self.year),
        }
    }
}
