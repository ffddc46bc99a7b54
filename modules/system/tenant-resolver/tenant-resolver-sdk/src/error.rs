//! Error types for the tenant resolver module.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{DomainRejection, SlugRejection};

/// Errors returned by the administrative tenant resolver operations.
///
/// Request-path operations (`resolve_tenant`, `verify_domain_ownership`)
/// never return this type; they resolve failures to a fail-safe value.
#[derive(Debug, Error)]
pub enum TenantResolverError {
    /// The organization does not exist.
    #[error("organization not found: {organization_id}")]
    OrganizationNotFound {
        /// The organization ID that was not found.
        organization_id: Uuid,
    },

    /// The requested slug failed validation.
    #[error("invalid slug: {0}")]
    InvalidSlug(SlugRejection),

    /// Another organization already uses the slug.
    #[error("slug already in use: {slug}")]
    SlugTaken {
        /// The normalized slug.
        slug: String,
    },

    /// The supplied domain failed validation.
    #[error("invalid domain: {0}")]
    InvalidDomain(DomainRejection),

    /// The domain is already claimed by another organization.
    #[error("domain already in use: {domain}")]
    DomainUnavailable {
        /// The normalized domain.
        domain: String,
    },

    /// The organization has no pending custom-domain claim to verify.
    #[error("organization {organization_id} has no custom domain configured")]
    NoDomainClaim {
        /// The organization ID.
        organization_id: Uuid,
    },

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
