//! Number ledger: storage of order-number records.

mod in_memory;
mod postgres;
mod r#trait;

pub use in_memory::InMemoryNumberLedger;
pub use postgres::PostgresNumberLedger;
pub use r#trait::{NumberFilter, NumberLedger};
