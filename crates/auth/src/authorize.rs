//! Minimum-role checks.

use werkorder_core::{DomainError, DomainResult};

use crate::principal::Principal;
use crate::roles::UserRole;

/// Require the principal to hold at least the given role.
///
/// - No IO
/// - No panics
/// - Pure policy check
pub fn require_min_role(principal: &Principal, min: UserRole) -> DomainResult<()> {
    if principal.role >= min {
        Ok(())
    } else {
        Err(DomainError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_cannot_pass_a_user_gate() {
        let viewer = Principal::new("kijker@werkplaats", UserRole::Viewer);
        assert_eq!(
            require_min_role(&viewer, UserRole::User),
            Err(DomainError::Unauthorized)
        );
    }

    #[test]
    fn the_gate_accepts_the_exact_role_and_above() {
        let user = Principal::new("monteur@werkplaats", UserRole::User);
        let admin = Principal::new("chef@werkplaats", UserRole::Admin);
        assert!(require_min_role(&user, UserRole::User).is_ok());
        assert!(require_min_role(&admin, UserRole::User).is_ok());
    }
}
