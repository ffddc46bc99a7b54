//! Account Lockout Module
//!
//! Tracks failed credential checks per account and enforces a progressive,
//! time-based lockout. Lock state lives on the account record and expires
//! lazily on the next read. The module also answers the fail-closed
//! impersonation token revocation check.
//!
//! The module exposes [`AccountLockoutLocalClient`], an implementation of
//! [`account_lockout_sdk::AccountLockoutClient`] backed by [`Service`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;

pub use config::AccountLockoutConfig;
pub use domain::{AccountLockoutLocalClient, Service};
