//! # cesizen-database
//!
//! The credential store: account records and password-reset tokens.
//! Two backends implement [`CredentialStore`]: an in-process store for
//! development and tests, and PostgreSQL for production.

pub mod connection;
pub mod migration;
pub mod store;

pub use connection::DatabasePool;
pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore, open_store};
