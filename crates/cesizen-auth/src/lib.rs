//! # cesizen-auth
//!
//! Credential primitives for the CESIZen identity service.
//!
//! ## Modules
//!
//! - `password` — Argon2id hashing and password policy
//! - `jwt` — HS256 session token issuance and verification
//! - `rate_limit` — per-key failed-attempt tracking and lockout
//! - `rbac` — role hierarchy enforcement
//! - `authorizer` — bearer token resolution into a [`Principal`]

pub mod authorizer;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod rbac;

pub use authorizer::{Authorizer, Principal};
pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use rate_limit::RateLimiter;
pub use rbac::RbacEnforcer;
