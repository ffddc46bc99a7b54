//! Error types for the account lockout module.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by administrative lockout operations.
///
/// The login-path operations never return this type.
#[derive(Debug, Error)]
pub enum AccountLockoutError {
    /// The account does not exist.
    #[error("account not found: {account_id}")]
    AccountNotFound {
        /// The account ID that was not found.
        account_id: Uuid,
    },

    /// The token identifier is empty, too long or contains invalid characters.
    #[error("invalid token id")]
    InvalidTokenId,

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
