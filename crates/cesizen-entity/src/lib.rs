//! # cesizen-entity
//!
//! Domain entity models for the CESIZen identity service. Persisted
//! entities derive `sqlx::FromRow`; value objects are plain structs.

pub mod account;
pub mod attempt;
pub mod reset_token;
