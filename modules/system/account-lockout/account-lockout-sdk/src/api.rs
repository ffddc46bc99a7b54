//! Public API trait for the account lockout guard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AccountLockoutError;
use crate::models::{AccountId, FailedLoginOutcome, LockStatus, UnlockOutcome};

/// Brute-force protection for the login flow.
///
/// `account` parameters accept either an account id or an email address.
/// Malformed input and unknown emails produce the same response as a fresh
/// account, so callers cannot test for account existence.
#[async_trait]
pub trait AccountLockoutClient: Send + Sync {
    /// Reports whether the account is locked, lifting an expired lock as a
    /// side effect. Store errors resolve to "not locked".
    async fn is_account_locked(&self, account: &str) -> LockStatus;

    /// Counts one failed credential check and locks the account once the
    /// threshold is reached.
    async fn record_failed_login(&self, account: &str) -> FailedLoginOutcome;

    /// Resets all lockout state after a successful login.
    async fn clear_failed_logins(&self, account_id: AccountId);

    /// Operator unlock. Audited.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account does not exist
    /// - `Internal` if the store cannot be updated
    async fn admin_unlock_account(
        &self,
        account_id: AccountId,
        actor_id: Uuid,
    ) -> Result<UnlockOutcome, AccountLockoutError>;

    /// Whether an impersonation token has been revoked.
    ///
    /// Fails closed: store errors and malformed ids report `true`.
    async fn is_token_revoked(&self, token_id: &str) -> bool;

    /// Marks an impersonation token as revoked until `expires_at`.
    ///
    /// # Errors
    ///
    /// - `InvalidTokenId` if the id is malformed
    /// - `Internal` if the store cannot be updated
    async fn revoke_token(
        &self,
        token_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccountLockoutError>;
}
