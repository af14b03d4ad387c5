//! `werkorder-auth` — authorization boundary for the back-office core.
//!
//! Intentionally decoupled from HTTP and storage: the excluded web layer
//! authenticates and constructs a [`Principal`]; the core only checks the
//! minimum-role requirement of each write operation.

pub mod authorize;
pub mod principal;
pub mod roles;

pub use authorize::require_min_role;
pub use principal::Principal;
pub use roles::UserRole;
