use account_lockout_sdk::AccountId;
use chrono::{DateTime, Utc};

/// Lockout fields of an account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLockState {
    pub id: AccountId,
    /// Lowercased.
    pub email: String,
    pub failed_login_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    /// Lockouts since the last successful login or admin unlock.
    pub lockout_count: u32,
}

impl AccountLockState {
    #[must_use]
    pub fn new(id: AccountId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into().trim().to_ascii_lowercase(),
            failed_login_attempts: 0,
            locked_until: None,
            lockout_count: 0,
        }
    }

    #[must_use]
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// A lock that has passed but not yet been cleared.
    #[must_use]
    pub fn has_expired_lock(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until <= now)
    }
}
