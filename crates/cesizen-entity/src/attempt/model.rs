//! Attempt keys and per-key failure records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Operation an attempt is counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOperation {
    /// Login, keyed by normalized identity.
    Login,
    /// Reset confirmation, keyed by source address.
    ResetConfirm,
}

impl AttemptOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::ResetConfirm => "reset_confirm",
        }
    }
}

impl fmt::Display for AttemptOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key under which failures are counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttemptKey {
    pub operation: AttemptOperation,
    pub subject: String,
}

impl AttemptKey {
    pub fn login(identity: impl Into<String>) -> Self {
        Self {
            operation: AttemptOperation::Login,
            subject: identity.into(),
        }
    }

    pub fn reset_confirm(source: impl Into<String>) -> Self {
        Self {
            operation: AttemptOperation::ResetConfirm,
            subject: source.into(),
        }
    }
}

impl fmt::Display for AttemptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation, self.subject)
    }
}

/// Result of an attempt, as reported to the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
}

/// Failure history for one key.
///
/// Holds the timestamps of the most recent failures, oldest first. Only
/// failures inside the trailing window count toward a lockout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Recent failure times, oldest first.
    pub failures: VecDeque<DateTime<Utc>>,
    /// Lockout end, if the ceiling was reached.
    pub locked_until: Option<DateTime<Utc>>,
}

impl AttemptRecord {
    /// Whether the key is locked at `now`.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Whole seconds of lockout left at `now`, rounded up.
    pub fn remaining_lock_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.locked_until {
            Some(until) if now < until => {
                let millis = (until - now).num_milliseconds().max(0) as u64;
                millis.div_ceil(1000)
            }
            _ => 0,
        }
    }

    /// Records a failure at `now` and returns how many failures fall inside
    /// the trailing `window`. At most `keep` timestamps are retained.
    pub fn record_failure(&mut self, now: DateTime<Utc>, window: Duration, keep: usize) -> u32 {
        if !self.is_locked(now) {
            self.locked_until = None;
        }
        self.forget_before(now - window);
        self.failures.push_back(now);
        while self.failures.len() > keep.max(1) {
            self.failures.pop_front();
        }
        self.failures.len() as u32
    }

    /// Locks the key until `until`. The failures that led here are
    /// forgotten, so the next sequence starts from zero once the lock lapses.
    pub fn lock(&mut self, until: DateTime<Utc>) {
        self.locked_until = Some(until);
        self.failures.clear();
    }

    /// Whether the record holds no information worth keeping at `now`:
    /// any lock has lapsed and no failure is inside the trailing window.
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let unlocked = !self.is_locked(now);
        let quiet = self.failures.back().is_none_or(|last| now >= *last + window);
        unlocked && quiet
    }

    fn forget_before(&mut self, cutoff: DateTime<Utc>) {
        while self.failures.front().is_some_and(|first| *first <= cutoff) {
            self.failures.pop_front();
        }
    }
}
