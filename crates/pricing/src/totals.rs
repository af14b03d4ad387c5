//! Order-total calculation.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use werkorder_orders::ServiceOrderItem;

use crate::price_type::PriceType;

/// One rung of a customer's price ladder: at or above `min_amount`, the
/// customer is entitled to `price_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRule {
    pub min_amount: Decimal,
    pub price_type: PriceType,
}

/// Per-line pricing breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub part_no: String,
    pub description: Option<String>,
    pub qty: i64,
    pub price_each: Decimal,
    pub line_total: Decimal,
}

/// Result of pricing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub price_type: PriceType,
    /// Grand total, rounded half-up to 2 decimals.
    pub total: Decimal,
    pub items: Vec<PricedLine>,
}

/// Resolve the stored price field for a price type. `None` when the item has
/// no price at that tier.
pub fn price_for(item: &ServiceOrderItem, price_type: PriceType) -> Option<Decimal> {
    match price_type {
        PriceType::List => item.list_price,
        PriceType::Bruto => item.price_bruto,
        PriceType::Wvk => item.price_wvk,
        PriceType::Edmac => item.price_edmac,
        PriceType::Purchase => item.price_purchase,
    }
}

/// Select the price type for an order total from the customer's ladder.
///
/// Rules are walked in ascending `min_amount` order; every satisfied rule
/// overwrites the previous selection, so the highest satisfied threshold
/// wins. With no satisfied rule the customer default applies, with BRUTO as
/// the final fallback.
pub fn determine_price_type(
    rules: &[PriceRule],
    order_total: Decimal,
    default_price_type: Option<PriceType>,
) -> PriceType {
    let mut ladder: Vec<&PriceRule> = rules.iter().collect();
    ladder.sort_by_key(|rule| rule.min_amount);

    let mut selected = default_price_type.unwrap_or(PriceType::Bruto);
    for rule in ladder {
        if order_total >= rule.min_amount {
            selected = rule.price_type;
        }
    }
    selected
}

/// Price an order: pick the tier from the ladder, then compute all lines at
/// that tier.
///
/// The tier is selected on a provisional base total priced at the customer
/// default. It is deliberately not re-derived from the recomputed total —
/// the selected tier's own total may sit below the threshold that selected
/// it, and downstream paperwork depends on that long-standing behavior.
pub fn calculate_order_totals(
    items: &[ServiceOrderItem],
    default_price_type: Option<PriceType>,
    rules: &[PriceRule],
) -> OrderTotals {
    let default = default_price_type.unwrap_or(PriceType::Bruto);

    let mut base_total = Decimal::ZERO;
    for item in items {
        if let Some(price) = price_for(item, default) {
            base_total += price * Decimal::from(item.qty);
        }
    }

    let final_price_type = determine_price_type(rules, base_total, default_price_type);

    let mut final_total = Decimal::ZERO;
    let mut priced_items = Vec::with_capacity(items.len());
    for item in items {
        let price_each = price_for(item, final_price_type).unwrap_or(Decimal::ZERO);
        let line_total = price_each * Decimal::from(item.qty);
        final_total += line_total;

        priced_items.push(PricedLine {
            part_no: item.part_no.clone(),
            description: item.description.clone(),
            qty: item.qty,
            price_each,
            line_total,
        });
    }

    OrderTotals {
        price_type: final_price_type,
        total: final_total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        items: priced_items,
    }
}

/// European currency formatting: `€ 1.234,56`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::new();
    let digits = int_part.as_bytes();
    for (i, b) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*b as char);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("€ {sign}{grouped},{frac_part}")
}
