//! # cesizen-api
//!
//! HTTP API layer for CESIZen built on Axum.
//!
//! Provides the authentication, self-service and administration endpoints,
//! the bearer-token extractor and admin guard, DTOs, and the mapping from
//! [`cesizen_core::AppError`] to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
