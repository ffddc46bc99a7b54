//! Account Lockout SDK
//!
//! Public API for the `account_lockout` module:
//!
//! - [`AccountLockoutClient`] - API trait used by the login flow and admin tools
//! - [`LockStatus`], [`FailedLoginOutcome`], [`UnlockOutcome`] - Outcomes
//! - [`AccountLockoutError`] - Error type for the fallible admin operations
//!
//! ## Usage
//!
//! ```ignore
//! use account_lockout_sdk::AccountLockoutClient;
//!
//! if guard.is_account_locked(&email).await.locked {
//!     return Err(LoginError::Locked);
//! }
//! if !credentials_ok {
//!     let outcome = guard.record_failed_login(&email).await;
//! } else {
//!     guard.clear_failed_logins(user_id).await;
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::AccountLockoutClient;
pub use error::AccountLockoutError;
pub use models::{AccountId, FailedLoginOutcome, LockStatus, UnlockOutcome};
