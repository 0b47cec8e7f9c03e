//! # cesizen-core
//!
//! Core crate for the CESIZen identity service. Contains the configuration
//! schemas, the injectable clock, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CESIZen crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod result;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
