use account_lockout_sdk::AccountId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{CaseStatement, Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};

use crate::domain::AccountLockState;
use crate::domain::repo::{AccountLockRepository, RevocationRepository};

use super::entity::account::{Column, Entity as AccountEntity};
use super::entity::revoked_token;
use super::mapper::{account_to_active_model, to_millis};

/// Account lock state on the `accounts` table.
///
/// Counter updates are single `UPDATE` statements evaluated by the database.
/// The follow-up read of the updated row shares the statement's transaction.
pub struct SeaOrmAccountLockRepository {
    db: DatabaseConnection,
}

impl SeaOrmAccountLockRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountLockRepository for SeaOrmAccountLockRepository {
    async fn find_by_id(&self, id: AccountId) -> anyhow::Result<Option<AccountLockState>> {
        let model = AccountEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<AccountLockState>> {
        let model = AccountEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, state: AccountLockState) -> anyhow::Result<()> {
        AccountEntity::insert(account_to_active_model(&state))
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn increment_failed_attempts(&self, id: AccountId) -> anyhow::Result<Option<u32>> {
        let txn = self.db.begin().await?;
        let result = AccountEntity::update_many()
            .col_expr(
                Column::FailedLoginAttempts,
                Expr::col(Column::FailedLoginAttempts).add(1),
            )
            .filter(Column::Id.eq(id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }
        let model = AccountEntity::find_by_id(id).one(&txn).await?;
        txn.commit().await?;
        Ok(model.map(|m| AccountLockState::from(m).failed_login_attempts))
    }

    async fn try_lock(
        &self,
        id: AccountId,
        max_attempts: u32,
        now: DateTime<Utc>,
        deadlines: &[DateTime<Utc>],
    ) -> anyhow::Result<Option<AccountLockState>> {
        let Some((last, earlier)) = deadlines.split_last() else {
            anyhow::bail!("empty lockout schedule");
        };

        // Slot i applies at lockout_count = i; anything higher takes the last.
        let mut deadline = CaseStatement::new();
        for (slot, until) in (0_i32..).zip(earlier) {
            deadline = deadline.case(
                Expr::col(Column::LockoutCount).eq(slot),
                Expr::value(to_millis(*until)),
            );
        }
        let deadline = deadline.finally(Expr::value(to_millis(*last)));

        let now_ms = to_millis(now);
        let threshold = i32::try_from(max_attempts).unwrap_or(i32::MAX);

        let txn = self.db.begin().await?;
        let result = AccountEntity::update_many()
            .col_expr(Column::LockedUntil, deadline.into())
            .col_expr(Column::LockoutCount, Expr::col(Column::LockoutCount).add(1))
            .filter(Column::Id.eq(id))
            .filter(Column::FailedLoginAttempts.gte(threshold))
            .filter(
                Condition::any()
                    .add(Column::LockedUntil.is_null())
                    .add(Column::LockedUntil.lte(now_ms)),
            )
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }
        let model = AccountEntity::find_by_id(id).one(&txn).await?;
        txn.commit().await?;
        Ok(model.map(Into::into))
    }

    async fn clear_expired_lock(&self, id: AccountId, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let result = AccountEntity::update_many()
            .col_expr(Column::FailedLoginAttempts, Expr::value(0))
            .col_expr(Column::LockedUntil, Expr::value(Option::<i64>::None))
            .filter(Column::Id.eq(id))
            .filter(Column::LockedUntil.is_not_null())
            .filter(Column::LockedUntil.lte(to_millis(now)))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn reset(&self, id: AccountId) -> anyhow::Result<bool> {
        let result = AccountEntity::update_many()
            .col_expr(Column::FailedLoginAttempts, Expr::value(0))
            .col_expr(Column::LockedUntil, Expr::value(Option::<i64>::None))
            .col_expr(Column::LockoutCount, Expr::value(0))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

/// Revoked impersonation tokens on the `revoked_tokens` table.
pub struct SeaOrmRevocationRepository {
    db: DatabaseConnection,
}

impl SeaOrmRevocationRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RevocationRepository for SeaOrmRevocationRepository {
    async fn is_revoked(&self, token_id: &str) -> anyhow::Result<bool> {
        let model = revoked_token::Entity::find_by_id(token_id.to_owned())
            .one(&self.db)
            .await?;
        Ok(model.is_some())
    }

    async fn revoke(&self, token_id: &str, expires_at: DateTime<Utc>) -> anyhow::Result<()> {
        let active_model = revoked_token::ActiveModel {
            token_id: Set(token_id.to_owned()),
            expires_at: Set(to_millis(expires_at)),
            revoked_at: Set(to_millis(Utc::now())),
        };
        revoked_token::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(revoked_token::Column::TokenId)
                    .update_column(revoked_token::Column::ExpiresAt)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}
