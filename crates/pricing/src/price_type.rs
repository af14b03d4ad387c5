//! Price types: which stored price field applies.

use serde::{Deserialize, Serialize};

/// Price tier label, mapping to one of the five stored price fields on a
/// service-order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceType {
    List,
    Bruto,
    Wvk,
    Edmac,
    Purchase,
}

impl PriceType {
    /// Parse a legacy label. Unrecognized labels yield `None`, which
    /// downstream treats as "no price available".
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "LIST" => Some(PriceType::List),
            "BRUTO" => Some(PriceType::Bruto),
            "WVK" => Some(PriceType::Wvk),
            "EDMAC" => Some(PriceType::Edmac),
            "PURCHASE" => Some(PriceType::Purchase),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriceType::List => "LIST",
            PriceType::Bruto => "BRUTO",
            PriceType::Wvk => "WVK",
            PriceType::Edmac => "EDMAC",
            PriceType::Purchase => "PURCHASE",
        }
    }
}

impl core::fmt::Display for PriceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for t in [
            PriceType::List,
            PriceType::Bruto,
            PriceType::Wvk,
            PriceType::Edmac,
            PriceType::Purchase,
        ] {
            assert_eq!(PriceType::from_label(t.as_str()), Some(t));
        }
    }

    #[test]
    fn unknown_labels_yield_none() {
        assert_eq!(PriceType::from_label("NETTO"), None);
        assert_eq!(PriceType::from_label("bruto"), None);
    }
}
