//! Public API trait for the tenant resolver.
//!
//! Request middleware calls [`TenantResolverClient::resolve_tenant`] with the
//! inbound `Host` header; organization settings pages drive the
//! custom-domain claim and verification flow.

use async_trait::async_trait;

use crate::error::TenantResolverError;
use crate::models::{
    DomainClaim, DomainRejection, Organization, OrganizationId, SlugRejection, SubscriptionTier,
    TenantInfo, VerificationOutcome,
};

/// Public API trait for the tenant resolver.
///
/// ```ignore
/// let resolver: Arc<dyn TenantResolverClient> = ...;
///
/// match resolver.resolve_tenant(host_header).await {
///     Some(tenant) => { /* tenant-scoped request */ }
///     None => { /* marketing site or unknown host */ }
/// }
/// ```
#[async_trait]
pub trait TenantResolverClient: Send + Sync {
    /// Maps a raw `Host` header value to a tenant.
    ///
    /// Never fails: reserved, malformed or unknown hosts and storage
    /// errors all resolve to `None`.
    async fn resolve_tenant(&self, host: &str) -> Option<TenantInfo>;

    /// Extracts the lowercased subdomain label from a `Host` header.
    ///
    /// Returns `None` for the main domain and unrecognized hosts.
    fn resolve_subdomain(&self, host: &str) -> Option<String>;

    /// Validates a slug for use as a tenant subdomain.
    ///
    /// # Errors
    ///
    /// Returns the [`SlugRejection`] describing the first failed rule.
    fn validate_slug(&self, raw: &str) -> Result<String, SlugRejection>;

    /// Whether `label` is on the reserved-subdomain list.
    fn is_reserved_subdomain(&self, label: &str) -> bool;

    /// Normalizes and validates a custom domain.
    ///
    /// # Errors
    ///
    /// Returns the [`DomainRejection`] describing why the domain is unusable.
    fn validate_custom_domain(&self, raw: &str) -> Result<String, DomainRejection>;

    /// Generates a fresh, unguessable TXT verification token.
    fn generate_verification_token(&self, organization_id: OrganizationId) -> String;

    /// Rate-limited, audited DNS ownership check.
    async fn verify_domain_ownership(
        &self,
        domain: &str,
        expected_token: &str,
        organization_id: OrganizationId,
        actor_id: Option<uuid::Uuid>,
    ) -> VerificationOutcome;

    /// Registers a new organization under a validated slug.
    ///
    /// # Errors
    ///
    /// - `InvalidSlug` if the slug fails validation or is reserved
    /// - `SlugTaken` if another organization already uses it
    async fn create_organization(
        &self,
        slug: &str,
        name: &str,
        subscription_tier: SubscriptionTier,
    ) -> Result<Organization, TenantResolverError>;

    /// Whether no organization (other than `exclude`) holds `domain`.
    ///
    /// # Errors
    ///
    /// - `Internal` if the store cannot be queried
    async fn is_domain_available(
        &self,
        domain: &str,
        exclude: Option<OrganizationId>,
    ) -> Result<bool, TenantResolverError>;

    /// Starts a custom-domain claim and returns the TXT record to publish.
    ///
    /// # Errors
    ///
    /// - `InvalidDomain` if the domain fails validation
    /// - `DomainUnavailable` if another organization holds the domain
    /// - `OrganizationNotFound` if the organization does not exist
    async fn claim_custom_domain(
        &self,
        organization_id: OrganizationId,
        raw_domain: &str,
        actor_id: Option<uuid::Uuid>,
    ) -> Result<DomainClaim, TenantResolverError>;

    /// Verifies the organization's pending claim and activates it on success.
    ///
    /// # Errors
    ///
    /// - `OrganizationNotFound` if the organization does not exist
    /// - `NoDomainClaim` if no custom domain or token is stored
    async fn verify_organization_domain(
        &self,
        organization_id: OrganizationId,
        actor_id: Option<uuid::Uuid>,
    ) -> Result<VerificationOutcome, TenantResolverError>;

    /// Removes the organization's custom domain configuration.
    ///
    /// # Errors
    ///
    /// - `OrganizationNotFound` if the organization does not exist
    async fn remove_custom_domain(
        &self,
        organization_id: OrganizationId,
        actor_id: Option<uuid::Uuid>,
    ) -> Result<(), TenantResolverError>;

    /// Drops a cached custom-domain resolution.
    fn invalidate_domain(&self, domain: &str);

    /// Drops every cached custom-domain resolution.
    fn clear_domain_cache(&self);

    /// Builds the canonical URL of a tenant.
    fn tenant_url(&self, slug: &str, path: &str) -> String;
}
