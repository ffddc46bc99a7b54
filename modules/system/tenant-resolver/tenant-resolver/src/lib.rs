//! Tenant Resolver Module
//!
//! Maps inbound hosts to tenant organizations, either by subdomain of the
//! application base domain or by a verified custom domain, and runs the
//! custom-domain claim and DNS TXT verification flow.
//!
//! The module exposes [`TenantResolverLocalClient`], an implementation of
//! [`tenant_resolver_sdk::TenantResolverClient`] backed by [`Service`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;

pub use config::TenantResolverConfig;
pub use domain::{Service, TenantResolverLocalClient};
