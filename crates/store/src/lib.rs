//! Storage layer and application services.
//!
//! Each storage concern is a trait with an in-memory implementation for
//! tests/dev; the number ledger additionally has a Postgres adapter for
//! deployment. The services on top compose the pure domain crates with
//! storage, per-scope locking and the authorization gate.

pub mod ledger;
pub mod numbering_service;
pub mod order_repo;
pub mod order_service;
pub mod scope_lock;


pub use ledger::{InMemoryNumberLedger, NumberFilter, NumberLedger, PostgresNumberLedger};
pub use numbering_service::{NumberingConfig, NumberingService};
pub use order_repo::{
    CustomerDirectory, InMemoryCustomerDirectory, InMemoryServiceOrderRepository,
    ServiceOrderRepository,
};
pub use order_service::OrderService;
pub use scope_lock::{ScopeGuard, ScopeLocks};
