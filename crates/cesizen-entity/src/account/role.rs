//! Account role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the RBAC system.
///
/// Roles are totally ordered by privilege level: Admin > User > Visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Anonymous-grade account with read-only access to public content.
    Visitor,
    /// Regular registered account.
    User,
    /// Full administrator.
    Admin,
}

impl AccountRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::User => 2,
            Self::Visitor => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: &AccountRole) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Roles a caller may request for themselves at registration.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Self::Visitor | Self::User)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Visitor => "visitor",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = cesizen_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "visitor" => Ok(Self::Visitor),
            _ => Err(cesizen_core::AppError::validation(format!(
                "Invalid account role: '{s}'. Expected one of: visitor, user, admin"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering() {
        assert!(AccountRole::Admin.has_at_least(&AccountRole::Visitor));
        assert!(AccountRole::Admin.has_at_least(&AccountRole::Admin));
        assert!(AccountRole::User.has_at_least(&AccountRole::Visitor));
        assert!(!AccountRole::Visitor.has_at_least(&AccountRole::User));
        assert!(!AccountRole::User.has_at_least(&AccountRole::Admin));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<AccountRole>().unwrap(), AccountRole::Admin);
        assert_eq!("VISITOR".parse::<AccountRole>().unwrap(), AccountRole::Visitor);
        assert!("administrator".parse::<AccountRole>().is_err());
    }

    #[test]
    fn test_admin_is_never_self_assignable() {
        assert!(AccountRole::User.is_self_assignable());
        assert!(AccountRole::Visitor.is_self_assignable());
        assert!(!AccountRole::Admin.is_self_assignable());
    }
}
