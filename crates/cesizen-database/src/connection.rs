//! PostgreSQL connection pool management.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use cesizen_core::config::StoreConfig;
use cesizen_core::error::AppError;

use crate::store::postgres::map_sqlx_error;

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool against `config.connection_target`.
    ///
    /// An unreachable server surfaces as `Unavailable` so callers can retry.
    pub async fn connect(config: &StoreConfig) -> Result<Self, AppError> {
        info!(
            target_url = %mask_password(&config.connection_target),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.connection_target)
            .await
            .map_err(|e| map_sqlx_error("Failed to connect to database", e))?;

        info!("Successfully connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Mask the password portion of a database URL for safe logging.
pub(crate) fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_password() {
        assert_eq!(
            mask_password("postgres://cesizen:hunter2@db:5432/cesizen"),
            "postgres://cesizen:****@db:5432/cesizen"
        );
        assert_eq!(
            mask_password("postgres://db:5432/cesizen"),
            "postgres://db:5432/cesizen"
        );
    }
}
