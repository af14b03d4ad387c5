//! Service-order line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A line item on a service order.
///
/// Carries one stored price per price type; which field applies for a given
/// order is decided by the pricing engine, not by the item itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOrderItem {
    pub line_no: u32,
    pub part_no: String,
    pub description: Option<String>,
    pub qty: i64,

    pub list_price: Option<Decimal>,
    pub price_bruto: Option<Decimal>,
    pub price_wvk: Option<Decimal>,
    pub price_edmac: Option<Decimal>,
    pub price_purchase: Option<Decimal>,

    pub leadtime: Option<String>,

    /// Flagged for ordering at the supplier.
    pub bestellen: bool,
    /// Receipt flag; set through the `ReceiveItem` command only.
    pub ontvangen: bool,
    pub received_at: Option<DateTime<Utc>>,
}

impl ServiceOrderItem {
    /// An ordered item that has not been received yet.
    pub fn awaits_receipt(&self) -> bool {
        self.bestellen && !self.ontvangen
    }
}

/// Item fields as supplied by the caller; the aggregate assigns `line_no`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub part_no: String,
    pub description: Option<String>,
    pub qty: i64,

    pub list_price: Option<Decimal>,
    pub price_bruto: Option<Decimal>,
    pub price_wvk: Option<Decimal>,
    pub price_edmac: Option<Decimal>,
    pub price_purchase: Option<Decimal>,

    pub leadtime: Option<String>,
    pub bestellen: bool,
}

impl ItemDraft {
    pub fn into_item(self, line_no: u32) -> ServiceOrderItem {
        ServiceOrderItem {
            line_no,
            part_no: self.part_no,
            description: self.description,
            qty: self.qty,
            list_price: self.list_price,
            price_bruto: self.price_bruto,
            price_wvk: self.price_wvk,
            price_edmac: self.price_edmac,
            price_purchase: self.price_purchase,
            leadtime: self.leadtime,
            bestellen: self.bestellen,
            ontvangen: false,
            received_at: None,
        }
    }
}
