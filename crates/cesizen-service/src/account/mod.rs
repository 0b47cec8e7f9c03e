//! Account lifecycle: registration, login, password reset, self-service,
//! administration and the startup admin bootstrap.

pub mod admin;
pub mod bootstrap;
pub mod reset;
pub mod service;

pub use admin::AdminAccountService;
pub use bootstrap::BootstrapOutcome;
pub use service::{AccountService, LoginOutcome, Registration};
