//! Periodic removal of expired rate-limit records and reset tokens.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use cesizen_auth::rate_limit::RateLimiter;
use cesizen_core::Clock;
use cesizen_core::result::AppResult;
use cesizen_database::CredentialStore;

/// Counts removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub attempt_records: usize,
    pub reset_tokens: u64,
}

/// Background sweeper.
#[derive(Debug, Clone)]
pub struct Housekeeper {
    store: Arc<dyn CredentialStore>,
    limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl Housekeeper {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            limiter,
            clock,
            interval,
        }
    }

    /// Runs one sweep.
    pub async fn sweep(&self) -> AppResult<SweepReport> {
        let attempt_records = self.limiter.prune();
        let reset_tokens = self
            .store
            .purge_expired_reset_tokens(self.clock.now())
            .await?;

        let report = SweepReport {
            attempt_records,
            reset_tokens,
        };
        if report != SweepReport::default() {
            info!(
                attempt_records = report.attempt_records,
                reset_tokens = report.reset_tokens,
                "Housekeeping sweep removed expired entries"
            );
        }
        Ok(report)
    }

    /// Sweeps every interval until `shutdown` flips to `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Housekeeper started");
        let mut ticker = tokio::time::interval(self.interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        error!(error = %e, "Housekeeping sweep failed");
                    } else {
                        debug!("Housekeeping sweep completed");
                    }
                }
            }
        }

        info!("Housekeeper stopped");
    }
}
