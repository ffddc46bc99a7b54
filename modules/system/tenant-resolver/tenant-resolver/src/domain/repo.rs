use async_trait::async_trait;
use tenant_resolver_sdk::{Organization, OrganizationId};

/// Persistence for organizations and their custom-domain fields.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn find_by_id(&self, id: OrganizationId) -> anyhow::Result<Option<Organization>>;

    async fn find_by_slug(&self, slug: &str) -> anyhow::Result<Option<Organization>>;

    /// Any organization holding `domain`, verified or not.
    async fn find_by_custom_domain(&self, domain: &str) -> anyhow::Result<Option<Organization>>;

    /// The organization serving `domain`: verified or bypassing verification.
    async fn find_serving_domain(&self, domain: &str) -> anyhow::Result<Option<Organization>>;

    async fn create(&self, org: Organization) -> anyhow::Result<Organization>;

    /// Stores a pending claim: domain and token set, both verification flags
    /// cleared. A new claim never inherits an operator bypass.
    ///
    /// Returns `false` if the organization does not exist.
    async fn set_domain_claim(
        &self,
        id: OrganizationId,
        domain: &str,
        txt_value: &str,
    ) -> anyhow::Result<bool>;

    /// Returns `false` if the organization does not exist.
    async fn mark_domain_verified(&self, id: OrganizationId) -> anyhow::Result<bool>;

    /// Clears domain, token and both verification flags.
    ///
    /// Returns `false` if the organization does not exist.
    async fn clear_custom_domain(&self, id: OrganizationId) -> anyhow::Result<bool>;
}
