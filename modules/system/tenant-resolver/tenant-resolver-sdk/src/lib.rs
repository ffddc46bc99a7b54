//! Tenant Resolver SDK
//!
//! This crate provides the public API for the `tenant_resolver` module:
//!
//! - [`TenantResolverClient`] - API trait for request middleware and admin flows
//! - [`TenantInfo`], [`Organization`] - Domain models
//! - [`DomainRejection`], [`SlugRejection`] - Input validation outcomes
//! - [`VerificationOutcome`] - Result of a DNS ownership check
//! - [`TenantResolverError`] - Error type for the fallible admin operations
//!
//! ## Usage
//!
//! ```ignore
//! use tenant_resolver_sdk::TenantResolverClient;
//!
//! // Resolve the tenant behind the Host header
//! let tenant = resolver.resolve_tenant("acme.app.example.com").await;
//!
//! // Claim and verify a custom domain
//! let claim = resolver.claim_custom_domain(org_id, "portal.acme.com", Some(actor)).await?;
//! let outcome = resolver.verify_organization_domain(org_id, Some(actor)).await?;
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::TenantResolverClient;
pub use error::TenantResolverError;
pub use models::{
    DomainClaim, DomainRejection, Organization, OrganizationId, SlugRejection, SubscriptionTier,
    TenantInfo, VerificationOutcome,
};
