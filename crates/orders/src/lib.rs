//! `werkorder-orders` — service-order aggregate.
//!
//! The service order owns its line items and an append-only audit log, and
//! enforces the workshop's status lifecycle. Status mutations and their audit
//! entries are carried by a single event so they can never diverge.

pub mod item;
pub mod log;
pub mod order;
pub mod status;

pub use item::{ItemDraft, ServiceOrderItem};
pub use log::ServiceOrderLog;
pub use order::{
    AddItem, CreateServiceOrder, ReceiveItem, ServiceOrder, ServiceOrderCommand,
    ServiceOrderEvent, ServiceOrderId, TransitionStatus,
};
pub use status::ServiceOrderStatus;
