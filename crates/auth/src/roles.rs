//! User roles.

use serde::{Deserialize, Serialize};

/// Role ladder for back-office users.
///
/// Derived `Ord` follows declaration order, so `Viewer < User < Admin`;
/// "minimum role" checks rely on that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Viewer,
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Viewer => "viewer",
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl core::fmt::Display for UserRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_matches_the_ladder() {
        assert!(UserRole::Viewer < UserRole::User);
        assert!(UserRole::User < UserRole::Admin);
    }
}
