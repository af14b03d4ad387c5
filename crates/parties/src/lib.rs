//! `werkorder-parties` — customers and suppliers.

pub mod customer;
pub mod supplier;

pub use customer::{ContactInfo, Customer, CustomerContact};
pub use supplier::Supplier;
