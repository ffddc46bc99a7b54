//! In-memory organization store for tests and mock mode.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tenant_resolver_sdk::{Organization, OrganizationId};

use crate::domain::repo::OrganizationRepository;

/// Organization store held in a single mutex-guarded map.
///
/// Enforces the slug and custom-domain uniqueness the SQL schema enforces.
#[derive(Debug, Default)]
pub struct InMemoryOrganizationRepository {
    orgs: Mutex<HashMap<OrganizationId, Organization>>,
}

impl InMemoryOrganizationRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces organizations without uniqueness checks.
    #[must_use]
    pub fn with_organizations(orgs: impl IntoIterator<Item = Organization>) -> Self {
        let repo = Self::default();
        repo.orgs.lock().extend(orgs.into_iter().map(|o| (o.id, o)));
        repo
    }

    fn update<F>(&self, id: OrganizationId, f: F) -> bool
    where
        F: FnOnce(&mut Organization),
    {
        let mut orgs = self.orgs.lock();
        match orgs.get_mut(&id) {
            Some(org) => {
                f(org);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn find_by_id(&self, id: OrganizationId) -> anyhow::Result<Option<Organization>> {
        Ok(self.orgs.lock().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> anyhow::Result<Option<Organization>> {
        Ok(self.orgs.lock().values().find(|o| o.slug == slug).cloned())
    }

    async fn find_by_custom_domain(&self, domain: &str) -> anyhow::Result<Option<Organization>> {
        Ok(self
            .orgs
            .lock()
            .values()
            .find(|o| o.custom_domain.as_deref() == Some(domain))
            .cloned())
    }

    async fn find_serving_domain(&self, domain: &str) -> anyhow::Result<Option<Organization>> {
        Ok(self
            .orgs
            .lock()
            .values()
            .find(|o| o.custom_domain.as_deref() == Some(domain) && o.serves_custom_domain())
            .cloned())
    }

    async fn create(&self, org: Organization) -> anyhow::Result<Organization> {
        let mut orgs = self.orgs.lock();
        if orgs.contains_key(&org.id) {
            anyhow::bail!("organization {} already exists", org.id);
        }
        if orgs.values().any(|o| o.slug == org.slug) {
            anyhow::bail!("slug {} already exists", org.slug);
        }
        if let Some(domain) = org.custom_domain.as_deref()
            && orgs
                .values()
                .any(|o| o.custom_domain.as_deref() == Some(domain))
        {
            anyhow::bail!("custom domain {domain} already exists");
        }
        orgs.insert(org.id, org.clone());
        Ok(org)
    }

    async fn set_domain_claim(
        &self,
        id: OrganizationId,
        domain: &str,
        txt_value: &str,
    ) -> anyhow::Result<bool> {
        let mut orgs = self.orgs.lock();
        if orgs
            .values()
            .any(|o| o.id != id && o.custom_domain.as_deref() == Some(domain))
        {
            anyhow::bail!("custom domain {domain} already exists");
        }
        Ok(orgs.get_mut(&id).is_some_and(|org| {
            org.custom_domain = Some(domain.to_owned());
            org.custom_domain_txt_value = Some(txt_value.to_owned());
            org.custom_domain_verified = false;
            org.custom_domain_bypass_verification = false;
            true
        }))
    }

    async fn mark_domain_verified(&self, id: OrganizationId) -> anyhow::Result<bool> {
        Ok(self.update(id, |org| org.custom_domain_verified = true))
    }

    async fn clear_custom_domain(&self, id: OrganizationId) -> anyhow::Result<bool> {
        Ok(self.update(id, |org| {
            org.custom_domain = None;
            org.custom_domain_txt_value = None;
            org.custom_domain_verified = false;
            org.custom_domain_bypass_verification = false;
        }))
    }
}
