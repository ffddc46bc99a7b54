//! Local (in-process) client for the tenant resolver.

use std::sync::Arc;

use async_trait::async_trait;
use tenant_resolver_sdk::{
    DomainClaim, DomainRejection, Organization, OrganizationId, SlugRejection, SubscriptionTier,
    TenantInfo, TenantResolverClient, TenantResolverError, VerificationOutcome,
};
use uuid::Uuid;

use super::{DomainError, Service};

/// Local client wrapping the tenant resolver service.
pub struct TenantResolverLocalClient {
    svc: Arc<Service>,
}

impl TenantResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(operation: &str, e: DomainError) -> TenantResolverError {
    match &e {
        DomainError::Storage(_) => {
            tracing::error!(operation, error = ?e, "tenant_resolver call failed");
        }
        _ => tracing::debug!(operation, error = %e, "tenant_resolver call rejected"),
    }
    e.into()
}

#[async_trait]
impl TenantResolverClient for TenantResolverLocalClient {
    async fn resolve_tenant(&self, host: &str) -> Option<TenantInfo> {
        self.svc.resolve_tenant(host).await
    }

    fn resolve_subdomain(&self, host: &str) -> Option<String> {
        self.svc.resolve_subdomain(host)
    }

    fn validate_slug(&self, raw: &str) -> Result<String, SlugRejection> {
        self.svc.validate_slug(raw)
    }

    fn is_reserved_subdomain(&self, label: &str) -> bool {
        self.svc.is_reserved_subdomain(label)
    }

    fn validate_custom_domain(&self, raw: &str) -> Result<String, DomainRejection> {
        self.svc.validate_custom_domain(raw)
    }

    fn generate_verification_token(&self, organization_id: OrganizationId) -> String {
        self.svc.generate_verification_token(organization_id)
    }

    async fn verify_domain_ownership(
        &self,
        domain: &str,
        expected_token: &str,
        organization_id: OrganizationId,
        actor_id: Option<Uuid>,
    ) -> VerificationOutcome {
        self.svc
            .verify_domain_ownership(domain, expected_token, organization_id, actor_id)
            .await
    }

    async fn create_organization(
        &self,
        slug: &str,
        name: &str,
        subscription_tier: SubscriptionTier,
    ) -> Result<Organization, TenantResolverError> {
        self.svc
            .create_organization(slug, name, subscription_tier)
            .await
            .map_err(|e| log_and_convert("create_organization", e))
    }

    async fn is_domain_available(
        &self,
        domain: &str,
        exclude: Option<OrganizationId>,
    ) -> Result<bool, TenantResolverError> {
        self.svc
            .is_domain_available(domain, exclude)
            .await
            .map_err(|e| log_and_convert("is_domain_available", e))
    }

    async fn claim_custom_domain(
        &self,
        organization_id: OrganizationId,
        raw_domain: &str,
        actor_id: Option<Uuid>,
    ) -> Result<DomainClaim, TenantResolverError> {
        self.svc
            .claim_custom_domain(organization_id, raw_domain, actor_id)
            .await
            .map_err(|e| log_and_convert("claim_custom_domain", e))
    }

    async fn verify_organization_domain(
        &self,
        organization_id: OrganizationId,
        actor_id: Option<Uuid>,
    ) -> Result<VerificationOutcome, TenantResolverError> {
        self.svc
            .verify_organization_domain(organization_id, actor_id)
            .await
            .map_err(|e| log_and_convert("verify_organization_domain", e))
    }

    async fn remove_custom_domain(
        &self,
        organization_id: OrganizationId,
        actor_id: Option<Uuid>,
    ) -> Result<(), TenantResolverError> {
        self.svc
            .remove_custom_domain(organization_id, actor_id)
            .await
            .map_err(|e| log_and_convert("remove_custom_domain", e))
    }

    fn invalidate_domain(&self, domain: &str) {
        self.svc.invalidate_domain(domain);
    }

    fn clear_domain_cache(&self) {
        self.svc.clear_domain_cache();
    }

    fn tenant_url(&self, slug: &str, path: &str) -> String {
        self.svc.tenant_url(slug, path)
    }
}
