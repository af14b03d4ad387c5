//! Append-only audit trail for service orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single audit entry.
///
/// The log is the sole observability interface into status changes: entries
/// are only ever appended (by applying events), never mutated or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOrderLog {
    /// The new status for transitions, or a marker action such as
    /// `DEELONTVANGST` for partial receipts.
    pub action: String,
    pub message: String,
    pub at: DateTime<Utc>,
}
