//! Custom Axum extractors.

pub mod auth;
pub mod source;

pub use auth::AuthUser;
pub use source::ClientSource;
