//! # cesizen-service
//!
//! The account lifecycle layer. Services orchestrate the credential store,
//! password hasher, token encoder and rate limiter to implement
//! registration, login, password reset, self-service, administration and
//! the startup admin bootstrap.
//!
//! Services follow constructor injection: every dependency is handed in
//! at construction time via `Arc` references.

pub mod account;
pub mod container;
pub mod context;
pub mod housekeeping;
pub mod notify;
pub mod retry;

pub use account::{AccountService, AdminAccountService, BootstrapOutcome, LoginOutcome};
pub use container::Services;
pub use context::RequestContext;
pub use housekeeping::Housekeeper;
pub use notify::{LoggingResetNotifier, OutboxResetNotifier, ResetNotifier};
pub use retry::RetryPolicy;
