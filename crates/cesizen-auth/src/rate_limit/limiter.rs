//! Per-key failure counting with lockout.
//!
//! Once `max_failures` failures fall inside the trailing `window_seconds`,
//! the key is locked for `lockout_seconds`. A success clears the record.
//! Each update runs under the DashMap shard lock for its key, so concurrent
//! failures cannot both observe "not yet locked".

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use cesizen_core::Clock;
use cesizen_core::config::RateLimitConfig;
use cesizen_core::error::AppError;
use cesizen_entity::attempt::{AttemptKey, AttemptOutcome, AttemptRecord};

/// In-process failed-attempt tracker.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    records: Arc<DashMap<AttemptKey, AttemptRecord>>,
    max_failures: u32,
    window: Duration,
    lockout: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter from configuration.
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            max_failures: config.max_failures,
            window: Duration::seconds(config.window_seconds as i64),
            lockout: Duration::seconds(config.lockout_seconds as i64),
            clock,
        }
    }

    /// Fails fast with `RateLimited` when `key` is locked.
    pub fn check(&self, key: &AttemptKey) -> Result<(), AppError> {
        let now = self.clock.now();
        match self.records.get(key) {
            Some(record) if record.is_locked(now) => {
                Err(AppError::rate_limited(record.remaining_lock_seconds(now)))
            }
            _ => Ok(()),
        }
    }

    /// Records the outcome of an attempt.
    ///
    /// Fails with `RateLimited` if the key is locked when the outcome
    /// arrives. The failure that reaches the ceiling is itself accepted;
    /// only later attempts are refused.
    pub fn check_and_record(
        &self,
        key: &AttemptKey,
        outcome: AttemptOutcome,
    ) -> Result<(), AppError> {
        let now = self.clock.now();

        match self.records.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if record.is_locked(now) {
                    return Err(AppError::rate_limited(record.remaining_lock_seconds(now)));
                }
                match outcome {
                    AttemptOutcome::Success => {
                        entry.remove();
                    }
                    AttemptOutcome::Failure => {
                        self.record_failure(key, record, now);
                    }
                }
            }
            Entry::Vacant(entry) => {
                if outcome == AttemptOutcome::Failure {
                    let mut record = AttemptRecord::default();
                    self.record_failure(key, &mut record, now);
                    entry.insert(record);
                }
            }
        }
        Ok(())
    }

    fn record_failure(&self, key: &AttemptKey, record: &mut AttemptRecord, now: DateTime<Utc>) {
        let failures = record.record_failure(now, self.window, self.max_failures as usize);
        if failures >= self.max_failures {
            record.lock(now + self.lockout);
            warn!(
                key = %key,
                failures,
                lockout_seconds = self.lockout.num_seconds(),
                "Attempt key locked out"
            );
        } else {
            debug!(key = %key, failures, "Failed attempt recorded");
        }
    }

    /// Forgets all failures for `key`.
    pub fn clear(&self, key: &AttemptKey) {
        self.records.remove(key);
    }

    /// Drops records whose lock has lapsed and whose failures have all left
    /// the window.
    /// Returns the number removed.
    pub fn prune(&self) -> usize {
        let now = self.clock.now();
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_stale(now, self.window));
        before.saturating_sub(self.records.len())
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cesizen_core::ManualClock;

    fn limiter(clock: &ManualClock) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig::default(), Arc::new(clock.clone()))
    }

    #[test]
    fn test_fifth_failure_processed_sixth_refused() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock);
        let key = AttemptKey::login("alice");

        for _ in 0..5 {
            limiter.check(&key).unwrap();
            limiter
                .check_and_record(&key, AttemptOutcome::Failure)
                .unwrap();
        }

        let err = limiter.check(&key).unwrap_err();
        assert_eq!(err.kind, cesizen_core::ErrorKind::RateLimited);
        assert_eq!(err.retry_after_seconds, Some(900));

        // A success arriving while locked is refused too.
        assert!(
            limiter
                .check_and_record(&key, AttemptOutcome::Success)
                .is_err()
        );
    }

    #[test]
    fn test_lock_lapses_after_lockout() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock);
        let key = AttemptKey::login("alice");
        for _ in 0..5 {
            limiter
                .check_and_record(&key, AttemptOutcome::Failure)
                .unwrap();
        }

        clock.advance(Duration::minutes(14));
        let err = limiter.check(&key).unwrap_err();
        assert_eq!(err.retry_after_seconds, Some(60));

        clock.advance(Duration::minutes(1));
        limiter.check(&key).unwrap();
        limiter
            .check_and_record(&key, AttemptOutcome::Success)
            .unwrap();
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_success_resets_count() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock);
        let key = AttemptKey::login("bob");
        for _ in 0..4 {
            limiter
                .check_and_record(&key, AttemptOutcome::Failure)
                .unwrap();
        }
        limiter
            .check_and_record(&key, AttemptOutcome::Success)
            .unwrap();
        for _ in 0..4 {
            limiter
                .check_and_record(&key, AttemptOutcome::Failure)
                .unwrap();
        }
        limiter.check(&key).unwrap();
    }

    #[test]
    fn test_failures_in_trailing_window_lock() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock);
        let key = AttemptKey::login("carol");

        let mut elapsed = Duration::zero();
        for at in [0, 600, 660, 720, 960, 990] {
            let at = Duration::seconds(at);
            clock.advance(at - elapsed);
            elapsed = at;
            limiter.check(&key).unwrap();
            limiter
                .check_and_record(&key, AttemptOutcome::Failure)
                .unwrap();
        }

        // Five failures inside the last fifteen minutes, although the
        // first one has aged out.
        let err = limiter.check(&key).unwrap_err();
        assert_eq!(err.kind, cesizen_core::ErrorKind::RateLimited);
    }

    #[test]
    fn test_failures_outside_window_are_forgotten() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock);
        let key = AttemptKey::login("carol");
        for _ in 0..4 {
            limiter
                .check_and_record(&key, AttemptOutcome::Failure)
                .unwrap();
        }
        clock.advance(Duration::minutes(16));
        limiter
            .check_and_record(&key, AttemptOutcome::Failure)
            .unwrap();
        limiter.check(&key).unwrap();
    }

    #[test]
    fn test_keys_are_independent() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock);
        let locked = AttemptKey::login("dave");
        for _ in 0..5 {
            limiter
                .check_and_record(&locked, AttemptOutcome::Failure)
                .unwrap();
        }
        limiter.check(&AttemptKey::login("erin")).unwrap();
        limiter.check(&AttemptKey::reset_confirm("dave")).unwrap();
    }

    #[test]
    fn test_prune_and_clear() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock);
        limiter
            .check_and_record(&AttemptKey::login("a"), AttemptOutcome::Failure)
            .unwrap();
        limiter
            .check_and_record(&AttemptKey::login("b"), AttemptOutcome::Failure)
            .unwrap();
        limiter.clear(&AttemptKey::login("b"));
        assert_eq!(limiter.tracked_keys(), 1);

        assert_eq!(limiter.prune(), 0);
        clock.advance(Duration::minutes(15));
        assert_eq!(limiter.prune(), 1);
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_failures_lock_exactly_at_ceiling() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock);
        let key = AttemptKey::login("mallory");

        let mut handles = Vec::new();
        for _ in 0..20 {
            let limiter = limiter.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                limiter.check_and_record(&key, AttemptOutcome::Failure)
            }));
        }
        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 5);
    }
}
