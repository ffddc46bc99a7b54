//! Local (in-process) client for the lockout guard.

use std::sync::Arc;

use account_lockout_sdk::{
    AccountId, AccountLockoutClient, AccountLockoutError, FailedLoginOutcome, LockStatus,
    UnlockOutcome,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{DomainError, Service};

pub struct AccountLockoutLocalClient {
    svc: Arc<Service>,
}

impl AccountLockoutLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(operation: &str, e: DomainError) -> AccountLockoutError {
    match &e {
        DomainError::Storage(_) => {
            tracing::error!(operation, error = ?e, "account_lockout call failed");
        }
        _ => tracing::debug!(operation, error = %e, "account_lockout call rejected"),
    }
    e.into()
}

#[async_trait]
impl AccountLockoutClient for AccountLockoutLocalClient {
    async fn is_account_locked(&self, account: &str) -> LockStatus {
        self.svc.is_account_locked(account).await
    }

    async fn record_failed_login(&self, account: &str) -> FailedLoginOutcome {
        self.svc.record_failed_login(account).await
    }

    async fn clear_failed_logins(&self, account_id: AccountId) {
        self.svc.clear_failed_logins(account_id).await;
    }

    async fn admin_unlock_account(
        &self,
        account_id: AccountId,
        actor_id: Uuid,
    ) -> Result<UnlockOutcome, AccountLockoutError> {
        self.svc
            .admin_unlock_account(account_id, actor_id)
            .await
            .map_err(|e| log_and_convert("admin_unlock_account", e))
    }

    async fn is_token_revoked(&self, token_id: &str) -> bool {
        self.svc.is_token_revoked(token_id).await
    }

    async fn revoke_token(
        &self,
        token_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccountLockoutError> {
        self.svc
            .revoke_token(token_id, expires_at)
            .await
            .map_err(|e| log_and_convert("revoke_token", e))
    }
}
