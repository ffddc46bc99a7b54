//! Outcome models for the account lockout module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user account.
pub type AccountId = Uuid;

/// Result of a lock status check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStatus {
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
    /// Whole minutes until the lock lifts, rounded up. Set only when `locked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_remaining: Option<u64>,
    /// Current failure count. Reported to id-based (trusted) lookups only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_attempts: Option<u32>,
}

impl LockStatus {
    #[must_use]
    pub fn unlocked() -> Self {
        Self::default()
    }
}

/// Result of recording a failed credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedLoginOutcome {
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
    /// Failures left before the account locks. `None` when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts_remaining: Option<u32>,
    /// Configured failure threshold.
    pub max_attempts: u32,
}

/// Result of an administrative unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockOutcome {
    pub success: bool,
    /// Whether the account was locked at the time of the unlock.
    pub was_locked: bool,
}
