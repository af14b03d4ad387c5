//! `werkorder-numbering` — document numbering series and their records.
//!
//! Two numbering series exist: service orders (scoped per year, 4-digit
//! sequence) and purchase orders (scoped per year+month, 3-digit sequence).
//! Records move FREE → RESERVED → CONFIRMED, or back from RESERVED to FREE
//! on cancellation; they are never hard-deleted, so freed numbers stay
//! available for reuse.

pub mod number;
pub mod series;

pub use number::{ConfirmFields, NumberStatus, OrderNumber};
pub use series::{ScopeKey, Series};
