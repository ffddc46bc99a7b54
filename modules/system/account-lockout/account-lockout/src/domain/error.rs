//! Domain errors for the account lockout module.

use account_lockout_sdk::AccountLockoutError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("invalid token id")]
    InvalidTokenId,

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<DomainError> for AccountLockoutError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::AccountNotFound(account_id) => Self::AccountNotFound { account_id },
            DomainError::InvalidTokenId => Self::InvalidTokenId,
            DomainError::Storage(e) => Self::Internal(e.to_string()),
        }
    }
}
