//! Entity to domain model mappers.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;

use super::entity::account;
use crate::domain::AccountLockState;

pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Out-of-range values map to `None`.
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

fn to_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn from_count(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl From<account::Model> for AccountLockState {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            failed_login_attempts: to_count(model.failed_login_attempts),
            locked_until: model.locked_until.and_then(from_millis),
            lockout_count: to_count(model.lockout_count),
        }
    }
}

pub fn account_to_active_model(state: &AccountLockState) -> account::ActiveModel {
    account::ActiveModel {
        id: Set(state.id),
        email: Set(state.email.clone()),
        failed_login_attempts: Set(from_count(state.failed_login_attempts)),
        locked_until: Set(state.locked_until.map(to_millis)),
        lockout_count: Set(from_count(state.lockout_count)),
    }
}
