//! Progressive lockout state machine.
//!
//! Unlocked accounts count failures; reaching the threshold starts a lock
//! whose duration grows with each lockout cycle. A lock is lifted by a
//! successful login, an admin unlock, or lazily by the first read after it
//! has passed. Reads fail open; the token revocation check fails closed.

use std::sync::Arc;

use account_lockout_sdk::{AccountId, FailedLoginOutcome, LockStatus, UnlockOutcome};
use chrono::{DateTime, Utc};
use platform_kit::{AuditAction, AuditDispatcher, Clock, SecurityEvent};
use uuid::Uuid;

use super::error::DomainError;
use super::lookup::{self, AccountLookup};
use super::model::AccountLockState;
use super::policy::{self, LockoutPolicy};
use super::repo::{AccountLockRepository, RevocationRepository};
use crate::config::AccountLockoutConfig;

pub struct Service {
    accounts: Arc<dyn AccountLockRepository>,
    revocations: Arc<dyn RevocationRepository>,
    clock: Arc<dyn Clock>,
    audit: AuditDispatcher,
    policy: LockoutPolicy,
}

impl Service {
    #[must_use]
    pub fn new(
        cfg: &AccountLockoutConfig,
        accounts: Arc<dyn AccountLockRepository>,
        revocations: Arc<dyn RevocationRepository>,
        clock: Arc<dyn Clock>,
        audit: AuditDispatcher,
    ) -> Self {
        Self {
            accounts,
            revocations,
            clock,
            audit,
            policy: LockoutPolicy::new(cfg),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    #[tracing::instrument(skip_all)]
    pub async fn is_account_locked(&self, raw: &str) -> LockStatus {
        let Some(lookup) = AccountLookup::parse(raw) else {
            tracing::debug!("malformed account identifier");
            return LockStatus::unlocked();
        };

        let state = match self.load(&lookup).await {
            Ok(Some(state)) => state,
            Ok(None) => return LockStatus::unlocked(),
            Err(e) => {
                tracing::warn!(error = %e, "lock status lookup failed; treating as unlocked");
                return LockStatus::unlocked();
            }
        };

        let now = self.clock.now();
        let state = match self.expire_if_due(state, now).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear expired lock; treating as unlocked");
                return LockStatus::unlocked();
            }
        };
        let failed_attempts = (!lookup.is_email()).then_some(state.failed_login_attempts);

        match state.locked_until.filter(|until| *until > now) {
            Some(until) => LockStatus {
                locked: true,
                locked_until: Some(until),
                minutes_remaining: Some(policy::minutes_remaining(until, now)),
                failed_attempts,
            },
            None => LockStatus {
                failed_attempts,
                ..LockStatus::unlocked()
            },
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn record_failed_login(&self, raw: &str) -> FailedLoginOutcome {
        let Some(lookup) = AccountLookup::parse(raw) else {
            tracing::debug!("malformed account identifier");
            return self.first_failure();
        };

        let state = match self.load(&lookup).await {
            Ok(Some(state)) => state,
            Ok(None) => return self.first_failure(),
            Err(e) => {
                tracing::warn!(error = %e, "failed login not recorded");
                return self.unknown_outcome();
            }
        };

        match self.register_failure(state).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "failed login not recorded");
                self.unknown_outcome()
            }
        }
    }

    async fn register_failure(
        &self,
        state: AccountLockState,
    ) -> anyhow::Result<FailedLoginOutcome> {
        let now = self.clock.now();
        let state = self.expire_if_due(state, now).await?;

        // Attempts during an active lock neither count nor extend it.
        if let Some(until) = state.locked_until.filter(|until| *until > now) {
            return Ok(self.locked_outcome(until));
        }

        let Some(count) = self.accounts.increment_failed_attempts(state.id).await? else {
            return Ok(self.first_failure());
        };

        if !self.policy.should_lock(count) {
            return Ok(FailedLoginOutcome {
                locked: false,
                locked_until: None,
                attempts_remaining: Some(self.policy.attempts_remaining(count)),
                max_attempts: self.policy.max_failed_attempts(),
            });
        }

        let locked = self
            .accounts
            .try_lock(
                state.id,
                self.policy.max_failed_attempts(),
                now,
                &self.policy.deadlines(now),
            )
            .await?;

        if let Some(until) = locked.and_then(|s| s.locked_until) {
            tracing::warn!(account_id = %state.id, locked_until = %until, "account locked");
            return Ok(self.locked_outcome(until));
        }

        // A concurrent failure won the lock transition.
        let current = self.accounts.find_by_id(state.id).await?;
        Ok(match current.and_then(|s| s.locked_until).filter(|u| *u > now) {
            Some(until) => self.locked_outcome(until),
            None => FailedLoginOutcome {
                locked: false,
                locked_until: None,
                attempts_remaining: Some(0),
                max_attempts: self.policy.max_failed_attempts(),
            },
        })
    }

    #[tracing::instrument(skip_all, fields(account_id = %account_id))]
    pub async fn clear_failed_logins(&self, account_id: AccountId) {
        if let Err(e) = self.accounts.reset(account_id).await {
            tracing::warn!(error = %e, "failed to clear failed login state");
        }
    }

    /// # Errors
    ///
    /// `AccountNotFound` or `Storage`.
    #[tracing::instrument(skip_all, fields(account_id = %account_id, actor_id = %actor_id))]
    pub async fn admin_unlock_account(
        &self,
        account_id: AccountId,
        actor_id: Uuid,
    ) -> Result<UnlockOutcome, DomainError> {
        let state = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(DomainError::AccountNotFound(account_id))?;

        let now = self.clock.now();
        let was_locked = state.is_locked_at(now);

        if !self.accounts.reset(account_id).await? {
            return Err(DomainError::AccountNotFound(account_id));
        }

        self.audit.dispatch(SecurityEvent {
            tenant_id: None,
            actor_id: Some(actor_id),
            action: AuditAction::AccountUnlocked,
            subject_type: "user".to_owned(),
            subject_id: account_id.to_string(),
            payload: serde_json::json!({
                "was_locked": was_locked,
                "failed_attempts": state.failed_login_attempts,
                "lockout_count": state.lockout_count,
            }),
            occurred_at: now,
        });

        tracing::info!(was_locked, "account unlocked by operator");
        Ok(UnlockOutcome {
            success: true,
            was_locked,
        })
    }

    #[tracing::instrument(skip_all)]
    pub async fn is_token_revoked(&self, token_id: &str) -> bool {
        if !lookup::is_valid_token_id(token_id) {
            tracing::warn!("malformed token id; treating as revoked");
            return true;
        }
        match self.revocations.is_revoked(token_id).await {
            Ok(revoked) => revoked,
            Err(e) => {
                tracing::error!(error = %e, "revocation check failed; treating as revoked");
                true
            }
        }
    }

    /// # Errors
    ///
    /// `InvalidTokenId` or `Storage`.
    pub async fn revoke_token(
        &self,
        token_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !lookup::is_valid_token_id(token_id) {
            return Err(DomainError::InvalidTokenId);
        }
        self.revocations.revoke(token_id, expires_at).await?;
        Ok(())
    }

    async fn load(&self, lookup: &AccountLookup) -> anyhow::Result<Option<AccountLockState>> {
        match lookup {
            AccountLookup::Id(id) => self.accounts.find_by_id(*id).await,
            AccountLookup::Email(email) => self.accounts.find_by_email(email).await,
        }
    }

    /// Lifts a lock that has passed. Concurrent readers may both issue the
    /// conditional update; at most one matches.
    async fn expire_if_due(
        &self,
        mut state: AccountLockState,
        now: DateTime<Utc>,
    ) -> anyhow::Result<AccountLockState> {
        if state.has_expired_lock(now) {
            self.accounts.clear_expired_lock(state.id, now).await?;
            state.failed_login_attempts = 0;
            state.locked_until = None;
            tracing::debug!(account_id = %state.id, "expired lock cleared");
        }
        Ok(state)
    }

    fn locked_outcome(&self, until: DateTime<Utc>) -> FailedLoginOutcome {
        FailedLoginOutcome {
            locked: true,
            locked_until: Some(until),
            attempts_remaining: Some(0),
            max_attempts: self.policy.max_failed_attempts(),
        }
    }

    /// What a fresh account reports after one failure.
    fn first_failure(&self) -> FailedLoginOutcome {
        FailedLoginOutcome {
            locked: false,
            locked_until: None,
            attempts_remaining: Some(self.policy.attempts_remaining(1)),
            max_attempts: self.policy.max_failed_attempts(),
        }
    }

    fn unknown_outcome(&self) -> FailedLoginOutcome {
        FailedLoginOutcome {
            locked: false,
            locked_until: None,
            attempts_remaining: None,
            max_attempts: self.policy.max_failed_attempts(),
        }
    }
}
