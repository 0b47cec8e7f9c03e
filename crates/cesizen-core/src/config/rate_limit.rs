//! Failed-attempt rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Lockout policy: after `max_failures` consecutive failures within
/// `window_seconds`, the key is locked for `lockout_seconds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Consecutive failures that trigger a lockout (N).
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
    /// Window in which failures are counted (W).
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Lockout duration (L).
    #[serde(default = "default_lockout")]
    pub lockout_seconds: u64,
    /// Interval between sweeps of expired attempt records.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            window_seconds: default_window(),
            lockout_seconds: default_lockout(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_max_failures() -> u32 {
    5
}

fn default_window() -> u64 {
    15 * 60
}

fn default_lockout() -> u64 {
    15 * 60
}

fn default_sweep_interval() -> u64 {
    60
}
