//! Bounded retry with exponential backoff for transient store failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use cesizen_core::config::StoreConfig;
use cesizen_core::result::AppResult;

/// How often and how patiently a store call is retried.
///
/// Only errors whose kind `is_transient()` are retried; everything else is
/// returned on the first attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_backoff,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            config.retry_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Runs `op`, retrying transient failures with doubling backoff.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(e) if e.kind.is_transient() && attempt < self.attempts => {
                    let delay = self.base_backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient store failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use cesizen_core::{AppError, ErrorKind};

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(50));

        let result = policy
            .run("flaky", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(AppError::unavailable("pool timed out"))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_bound() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(50));

        let err = policy
            .run("down", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(AppError::unavailable("connection refused"))
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unavailable);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let err = policy
            .run("dup", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(AppError::duplicate_identity("alice"))
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::DuplicateIdentity);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
