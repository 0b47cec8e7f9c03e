//! Credential store configuration.

use serde::{Deserialize, Serialize};

/// Where and how the credential store is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `memory://` for the in-process store, or a `postgres://` URL.
    #[serde(default)]
    pub connection_target: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection acquire timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Attempts made for an operation failing with a transient error.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Base backoff between attempts in milliseconds; doubles each retry.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl StoreConfig {
    /// Whether the target selects the in-process store.
    pub fn is_memory(&self) -> bool {
        self.connection_target.starts_with("memory://")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connection_target: String::new(),
            max_connections: default_max_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    50
}
