//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use cesizen_entity::account::{AccountRole, AccountStatus};

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Unique identity (username or email).
    #[validate(length(min = 3, max = 254, message = "Identity must be 3 to 254 characters"))]
    pub identity: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Requested role; only `user` and `visitor` are accepted.
    pub role: Option<AccountRole>,
    /// Email.
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Full name.
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Identity is required"))]
    pub identity: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password reset request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(length(min = 1, message = "Identity is required"))]
    pub identity: String,
}

/// Password reset confirmation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    /// Token received out of band.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Update profile request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1))]
    pub new_password: String,
}

/// Change role request (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: AccountRole,
}

/// Change status request (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: AccountStatus,
}

/// Query parameters for the account listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAccountsQuery {
    /// Accounts to skip (default: 0).
    #[serde(default)]
    pub skip: u64,
    /// Page size (default: 25, clamped to 1..=100).
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    25
}
