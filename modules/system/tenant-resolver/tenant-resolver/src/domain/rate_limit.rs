//! Fixed-window limiter for DNS verification attempts.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tenant_resolver_sdk::OrganizationId;

use crate::config::VerificationRateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Per-organization attempt counter with lazy sweeping of elapsed windows.
#[derive(Debug)]
pub struct VerificationRateLimiter {
    max_attempts: u32,
    window: chrono::Duration,
    sweep_threshold: usize,
    windows: Mutex<HashMap<OrganizationId, Window>>,
}

impl VerificationRateLimiter {
    #[must_use]
    pub fn new(cfg: &VerificationRateLimitConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            window: to_chrono(cfg.window),
            sweep_threshold: cfg.sweep_threshold,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one attempt for `org` at `now`.
    #[must_use]
    pub fn check(&self, org: OrganizationId, now: DateTime<Utc>) -> RateDecision {
        let mut windows = self.windows.lock();

        if windows.len() > self.sweep_threshold {
            windows.retain(|_, w| w.reset_at > now);
        }

        match windows.get_mut(&org) {
            Some(w) if w.reset_at > now => {
                if w.count < self.max_attempts {
                    w.count += 1;
                    RateDecision::Allowed
                } else {
                    RateDecision::Limited {
                        retry_after_secs: retry_after(w.reset_at, now),
                    }
                }
            }
            _ => {
                windows.insert(
                    org,
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                RateDecision::Allowed
            }
        }
    }

    /// Forgets all windows.
    pub fn reset(&self) {
        self.windows.lock().clear();
    }

    #[must_use]
    pub fn tracked(&self) -> usize {
        self.windows.lock().len()
    }
}

/// Whole seconds until `reset_at`, rounded up, at least 1.
fn retry_after(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (reset_at - now).num_milliseconds().max(0);
    let secs = u64::try_from(millis).unwrap_or(0).div_ceil(1000);
    secs.max(1)
}

fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or_else(|_| chrono::Duration::days(36_500))
}
