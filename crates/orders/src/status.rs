//! Service-order status lifecycle.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use werkorder_core::DomainError;

/// Service-order lifecycle status.
///
/// Variant names keep the portal's Dutch workshop vocabulary; the serialized
/// form matches the strings the legacy frontend stores and displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceOrderStatus {
    Open,
    Aangevraagd,
    Offerte,
    WachtOpCombinatie,
    Besteld,
    Ontvangen,
    Afgehandeld,
}

impl ServiceOrderStatus {
    /// Directed edges of the status machine. No self-loops; `Afgehandeld`
    /// is terminal.
    pub fn allowed_transitions(self) -> &'static [ServiceOrderStatus] {
        use ServiceOrderStatus::*;
        match self {
            Open => &[Aangevraagd],
            Aangevraagd => &[Offerte, Besteld],
            Offerte => &[WachtOpCombinatie, Besteld],
            WachtOpCombinatie => &[Besteld],
            Besteld => &[Ontvangen],
            Ontvangen => &[Afgehandeld],
            Afgehandeld => &[],
        }
    }

    pub fn can_transition_to(self, target: ServiceOrderStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceOrderStatus::Open => "OPEN",
            ServiceOrderStatus::Aangevraagd => "AANGEVRAAGD",
            ServiceOrderStatus::Offerte => "OFFERTE",
            ServiceOrderStatus::WachtOpCombinatie => "WACHT_OP_COMBINATIE",
            ServiceOrderStatus::Besteld => "BESTELD",
            ServiceOrderStatus::Ontvangen => "ONTVANGEN",
            ServiceOrderStatus::Afgehandeld => "AFGEHANDELD",
        }
    }

    /// All statuses, in lifecycle order.
    pub fn all() -> &'static [ServiceOrderStatus] {
        use ServiceOrderStatus::*;
        &[
            Open,
            Aangevraagd,
            Offerte,
            WachtOpCombinatie,
            Besteld,
            Ontvangen,
            Afgehandeld,
        ]
    }
}

impl core::fmt::Display for ServiceOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceOrderStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown status: {s}")))
    }
}
