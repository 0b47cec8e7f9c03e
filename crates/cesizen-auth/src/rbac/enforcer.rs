//! RBAC enforcement over the closed [`AccountRole`] hierarchy.

use cesizen_core::error::AppError;
use cesizen_entity::account::AccountRole;

/// Checks a caller's role against what an operation requires.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    pub fn new() -> Self {
        Self
    }

    /// Allows `actual` when it is at least `minimum` in the hierarchy
    /// Admin > User > Visitor.
    pub fn require_minimum_role(
        &self,
        actual: AccountRole,
        minimum: AccountRole,
    ) -> Result<(), AppError> {
        if actual.has_at_least(&minimum) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{actual}' is insufficient; minimum required: '{minimum}'"
            )))
        }
    }

    /// Allows `actual` only when it is one of `permitted`.
    pub fn require_one_of(
        &self,
        actual: AccountRole,
        permitted: &[AccountRole],
    ) -> Result<(), AppError> {
        if permitted.contains(&actual) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{actual}' is not permitted for this operation"
            )))
        }
    }

    /// Allows admins only.
    pub fn require_admin(&self, actual: AccountRole) -> Result<(), AppError> {
        self.require_minimum_role(actual, AccountRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cesizen_core::ErrorKind;

    #[test]
    fn test_minimum_role() {
        let rbac = RbacEnforcer::new();
        assert!(
            rbac.require_minimum_role(AccountRole::Admin, AccountRole::User)
                .is_ok()
        );
        assert!(
            rbac.require_minimum_role(AccountRole::User, AccountRole::User)
                .is_ok()
        );
        let err = rbac
            .require_minimum_role(AccountRole::Visitor, AccountRole::User)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert!(rbac.require_admin(AccountRole::User).is_err());
    }

    #[test]
    fn test_set_membership() {
        let rbac = RbacEnforcer::new();
        let permitted = [AccountRole::Visitor, AccountRole::Admin];
        assert!(rbac.require_one_of(AccountRole::Visitor, &permitted).is_ok());
        assert!(rbac.require_one_of(AccountRole::User, &permitted).is_err());
    }
}
