//! Progressive lockout schedule.

use chrono::{DateTime, Duration, Utc};

use crate::config::AccountLockoutConfig;

/// Threshold and per-cycle durations.
///
/// The Nth lockout of an account (N counted from 1 since its last successful
/// login or admin unlock) lasts `schedule[min(N - 1, len - 1)]`.
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    max_failed_attempts: u32,
    schedule: Vec<Duration>,
}

impl LockoutPolicy {
    #[must_use]
    pub fn new(cfg: &AccountLockoutConfig) -> Self {
        let mut schedule: Vec<Duration> = cfg
            .lockout_schedule
            .iter()
            .map(|d| Duration::from_std(*d).unwrap_or_else(|_| Duration::days(1)))
            .collect();
        if schedule.is_empty() {
            schedule.push(Duration::minutes(5));
        }
        Self {
            max_failed_attempts: cfg.max_failed_attempts.max(1),
            schedule,
        }
    }

    #[must_use]
    pub fn max_failed_attempts(&self) -> u32 {
        self.max_failed_attempts
    }

    #[must_use]
    pub fn should_lock(&self, failed_attempts: u32) -> bool {
        failed_attempts >= self.max_failed_attempts
    }

    #[must_use]
    pub fn attempts_remaining(&self, failed_attempts: u32) -> u32 {
        self.max_failed_attempts.saturating_sub(failed_attempts)
    }

    /// Duration of the lockout that starts after `prior_lockouts` earlier ones.
    #[must_use]
    pub fn duration_for(&self, prior_lockouts: u32) -> Duration {
        let idx = usize::try_from(prior_lockouts)
            .unwrap_or(usize::MAX)
            .min(self.schedule.len() - 1);
        self.schedule[idx]
    }

    /// Lock deadline for each schedule slot, from `now`. Slot `i` applies
    /// when the account has `i` prior lockouts; the last slot covers the rest.
    #[must_use]
    pub fn deadlines(&self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        self.schedule.iter().map(|d| now + *d).collect()
    }
}

/// Whole minutes from `now` until `until`, rounded up, at least 1.
#[must_use]
pub fn minutes_remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let secs = u64::try_from((until - now).num_seconds()).unwrap_or(0);
    secs.div_ceil(60).max(1)
}
