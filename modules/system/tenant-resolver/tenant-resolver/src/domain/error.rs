//! Domain errors for the tenant resolver module.

use tenant_resolver_sdk::{DomainRejection, SlugRejection, TenantResolverError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("organization not found: {0}")]
    OrganizationNotFound(Uuid),

    #[error("invalid slug: {0}")]
    InvalidSlug(SlugRejection),

    #[error("slug already in use: {0}")]
    SlugTaken(String),

    #[error("invalid domain: {0}")]
    InvalidDomain(DomainRejection),

    #[error("domain already in use: {0}")]
    DomainUnavailable(String),

    #[error("organization {0} has no custom domain configured")]
    NoDomainClaim(Uuid),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<DomainError> for TenantResolverError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::OrganizationNotFound(organization_id) => {
                Self::OrganizationNotFound { organization_id }
            }
            DomainError::InvalidSlug(reason) => Self::InvalidSlug(reason),
            DomainError::SlugTaken(slug) => Self::SlugTaken { slug },
            DomainError::InvalidDomain(reason) => Self::InvalidDomain(reason),
            DomainError::DomainUnavailable(domain) => Self::DomainUnavailable { domain },
            DomainError::NoDomainClaim(organization_id) => Self::NoDomainClaim { organization_id },
            DomainError::Storage(e) => Self::Internal(e.to_string()),
        }
    }
}
