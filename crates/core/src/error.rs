//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, state-machine rejections). The only infrastructure-flavored
/// variants are `ConcurrencyTimeout` (bounded lock acquisition expired) and
/// `Storage` (the backing store failed), which callers must be able to tell
/// apart from business-rule rejections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, item not flagged for ordering).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested record (order, number, customer) was not found.
    #[error("not found")]
    NotFound,

    /// The record is not in the status the operation requires
    /// (e.g. confirming a number that is not RESERVED).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The status machine rejected a transition.
    ///
    /// Carries the current status, the requested target, and the full set of
    /// targets that would have been legal from the current status.
    #[error("illegal transition from {current} to {target} (allowed: {})", .allowed.join(", "))]
    IllegalTransition {
        current: String,
        target: String,
        allowed: Vec<String>,
    },

    /// A conflicting write was detected (e.g. duplicate sequence reservation
    /// surfaced by a unique constraint).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The reservation lock could not be acquired within its bounded wait.
    #[error("lock acquisition timed out: {0}")]
    ConcurrencyTimeout(String),

    /// Authorization failure at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,

    /// The backing store failed (connection, serialization, poisoned lock).
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn illegal_transition(
        current: impl Into<String>,
        target: impl Into<String>,
        allowed: Vec<String>,
    ) -> Self {
        Self::IllegalTransition {
            current: current.into(),
            target: target.into(),
            allowed,
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::ConcurrencyTimeout(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
