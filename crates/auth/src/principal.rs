//! Authenticated principal.

use serde::{Deserialize, Serialize};

use crate::roles::UserRole;

/// Identity of an authenticated back-office user.
///
/// The email doubles as the human-readable actor identity stamped into
/// reservation records (`reserved_by`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub email: String,
    pub role: UserRole,
}

impl Principal {
    pub fn new(email: impl Into<String>, role: UserRole) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }
}
