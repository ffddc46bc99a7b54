//! In-memory stores for tests and mock mode.

use std::collections::HashMap;

use account_lockout_sdk::AccountId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::AccountLockState;
use crate::domain::repo::{AccountLockRepository, RevocationRepository};

/// Account lock state held in a single mutex-guarded map. Each method holds
/// the lock for its whole update, matching the single-statement semantics
/// of the SQL store.
#[derive(Debug, Default)]
pub struct InMemoryAccountLockRepository {
    accounts: Mutex<HashMap<AccountId, AccountLockState>>,
}

impl InMemoryAccountLockRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_accounts(accounts: impl IntoIterator<Item = AccountLockState>) -> Self {
        let repo = Self::default();
        repo.accounts
            .lock()
            .extend(accounts.into_iter().map(|a| (a.id, a)));
        repo
    }
}

#[async_trait]
impl AccountLockRepository for InMemoryAccountLockRepository {
    async fn find_by_id(&self, id: AccountId) -> anyhow::Result<Option<AccountLockState>> {
        Ok(self.accounts.lock().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<AccountLockState>> {
        Ok(self
            .accounts
            .lock()
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create(&self, state: AccountLockState) -> anyhow::Result<()> {
        let mut accounts = self.accounts.lock();
        if accounts.contains_key(&state.id) {
            anyhow::bail!("account {} already exists", state.id);
        }
        if accounts.values().any(|a| a.email == state.email) {
            anyhow::bail!("email {} already registered", state.email);
        }
        accounts.insert(state.id, state);
        Ok(())
    }

    async fn increment_failed_attempts(&self, id: AccountId) -> anyhow::Result<Option<u32>> {
        Ok(self.accounts.lock().get_mut(&id).map(|a| {
            a.failed_login_attempts = a.failed_login_attempts.saturating_add(1);
            a.failed_login_attempts
        }))
    }

    async fn try_lock(
        &self,
        id: AccountId,
        max_attempts: u32,
        now: DateTime<Utc>,
        deadlines: &[DateTime<Utc>],
    ) -> anyhow::Result<Option<AccountLockState>> {
        let mut accounts = self.accounts.lock();
        let Some(account) = accounts.get_mut(&id) else {
            return Ok(None);
        };
        if account.failed_login_attempts < max_attempts || account.is_locked_at(now) {
            return Ok(None);
        }
        let slot = usize::try_from(account.lockout_count).unwrap_or(usize::MAX);
        let Some(until) = deadlines.get(slot).or_else(|| deadlines.last()) else {
            anyhow::bail!("empty lockout schedule");
        };
        account.locked_until = Some(*until);
        account.lockout_count = account.lockout_count.saturating_add(1);
        Ok(Some(account.clone()))
    }

    async fn clear_expired_lock(&self, id: AccountId, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let mut accounts = self.accounts.lock();
        match accounts.get_mut(&id) {
            Some(account) if account.has_expired_lock(now) => {
                account.failed_login_attempts = 0;
                account.locked_until = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reset(&self, id: AccountId) -> anyhow::Result<bool> {
        let mut accounts = self.accounts.lock();
        let Some(account) = accounts.get_mut(&id) else {
            return Ok(false);
        };
        account.failed_login_attempts = 0;
        account.locked_until = None;
        account.lockout_count = 0;
        Ok(true)
    }
}

/// Revoked token ids with their expiry.
#[derive(Debug, Default)]
pub struct InMemoryRevocationRepository {
    revoked: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryRevocationRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationRepository for InMemoryRevocationRepository {
    async fn is_revoked(&self, token_id: &str) -> anyhow::Result<bool> {
        Ok(self.revoked.lock().contains_key(token_id))
    }

    async fn revoke(&self, token_id: &str, expires_at: DateTime<Utc>) -> anyhow::Result<()> {
        self.revoked.lock().insert(token_id.to_owned(), expires_at);
        Ok(())
    }
}
