//! `werkorder-pricing` — order totals and the customer price-tier ladder.
//!
//! Each customer has an optional default price type and a ladder of
//! threshold rules. An order's tier is picked from the ladder using a
//! provisional base total priced at the customer default; all lines are then
//! recomputed at the selected tier.

pub mod price_type;
pub mod totals;

pub use price_type::PriceType;
pub use totals::{
    calculate_order_totals, determine_price_type, format_currency, price_for, OrderTotals,
    PriceRule, PricedLine,
};
