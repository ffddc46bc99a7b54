use async_trait::async_trait;
use account_lockout_sdk::AccountId;
use chrono::{DateTime, Utc};

use super::model::AccountLockState;

/// Persistence for account lock state.
///
/// Every mutating method is a single atomic statement against the store;
/// callers never read-modify-write the counters.
#[async_trait]
pub trait AccountLockRepository: Send + Sync {
    async fn find_by_id(&self, id: AccountId) -> anyhow::Result<Option<AccountLockState>>;

    /// `email` is already lowercased.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<AccountLockState>>;

    async fn create(&self, state: AccountLockState) -> anyhow::Result<()>;

    /// `failed_login_attempts += 1`, returning the new value, or `None` if
    /// the account does not exist.
    async fn increment_failed_attempts(&self, id: AccountId) -> anyhow::Result<Option<u32>>;

    /// Starts a lock if the account has reached `max_attempts` and is not
    /// currently locked at `now`.
    ///
    /// `locked_until` becomes `deadlines[min(lockout_count, len - 1)]` and
    /// `lockout_count` is incremented. Returns the updated state, or `None`
    /// when the guard did not match.
    async fn try_lock(
        &self,
        id: AccountId,
        max_attempts: u32,
        now: DateTime<Utc>,
        deadlines: &[DateTime<Utc>],
    ) -> anyhow::Result<Option<AccountLockState>>;

    /// Clears `failed_login_attempts` and `locked_until` if the lock has
    /// passed at `now`. `lockout_count` is kept. Returns whether it did.
    async fn clear_expired_lock(&self, id: AccountId, now: DateTime<Utc>) -> anyhow::Result<bool>;

    /// Zeroes all lockout fields. Returns `false` if the account does not exist.
    async fn reset(&self, id: AccountId) -> anyhow::Result<bool>;
}

/// Revoked impersonation tokens.
#[async_trait]
pub trait RevocationRepository: Send + Sync {
    async fn is_revoked(&self, token_id: &str) -> anyhow::Result<bool>;

    /// Idempotent.
    async fn revoke(&self, token_id: &str, expires_at: DateTime<Utc>) -> anyhow::Result<()>;
}
