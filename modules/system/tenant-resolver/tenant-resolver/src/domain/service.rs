//! Tenant resolution and custom-domain lifecycle.

use std::sync::Arc;

use platform_kit::{AuditAction, AuditDispatcher, Clock, SecurityEvent};
use tenant_resolver_sdk::{
    DomainClaim, DomainRejection, Organization, OrganizationId, SlugRejection, SubscriptionTier,
    TenantInfo, VerificationOutcome,
};
use uuid::Uuid;

use super::cache::{CacheLookup, DomainCache};
use super::custom_domain::{self, BlockedDomains};
use super::error::DomainError;
use super::host::{self, HostMatch};
use super::rate_limit::{RateDecision, VerificationRateLimiter};
use super::repo::OrganizationRepository;
use super::reserved::{self, ReservedSubdomains};
use super::verification::{self, TxtResolver};
use crate::config::TenantResolverConfig;

/// Tenant resolver service.
///
/// Owns the process-local domain cache and verification rate limiter; build
/// one per process and share it behind an `Arc`.
pub struct Service {
    repo: Arc<dyn OrganizationRepository>,
    dns: Arc<dyn TxtResolver>,
    clock: Arc<dyn Clock>,
    audit: AuditDispatcher,
    cfg: TenantResolverConfig,
    reserved: ReservedSubdomains,
    blocked: BlockedDomains,
    cache: DomainCache,
    limiter: VerificationRateLimiter,
}

impl Service {
    #[must_use]
    pub fn new(
        cfg: TenantResolverConfig,
        repo: Arc<dyn OrganizationRepository>,
        dns: Arc<dyn TxtResolver>,
        clock: Arc<dyn Clock>,
        audit: AuditDispatcher,
    ) -> Self {
        let reserved = ReservedSubdomains::new(&cfg.reserved_subdomains);
        let blocked = BlockedDomains::new(&cfg.blocked_domains).with(&cfg.base_domain);
        let cache = DomainCache::new(cfg.cache_ttl, cfg.cache_max_entries);
        let limiter = VerificationRateLimiter::new(&cfg.verification);

        Self {
            repo,
            dns,
            clock,
            audit,
            cfg,
            reserved,
            blocked,
            cache,
            limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TenantResolverConfig {
        &self.cfg
    }

    #[tracing::instrument(skip_all, fields(host = %raw_host))]
    pub async fn resolve_tenant(&self, raw_host: &str) -> Option<TenantInfo> {
        match host::parse_host(raw_host, &self.cfg.base_domain) {
            HostMatch::MainDomain => None,
            HostMatch::Subdomain(label) => self.resolve_by_slug(&label).await,
            HostMatch::Foreign(host) => {
                let domain = custom_domain::validate_custom_domain(&host, &self.blocked).ok()?;
                self.resolve_custom_domain(&domain).await
            }
        }
    }

    #[must_use]
    pub fn resolve_subdomain(&self, raw_host: &str) -> Option<String> {
        host::extract_subdomain(raw_host, &self.cfg.base_domain)
    }

    async fn resolve_by_slug(&self, label: &str) -> Option<TenantInfo> {
        if !reserved::is_valid_slug_format(label) || self.reserved.contains(label) {
            tracing::debug!(label = %label, "subdomain rejected before lookup");
            return None;
        }

        match self.repo.find_by_slug(label).await {
            Ok(org) => org.map(|o| o.tenant_info()),
            Err(e) => {
                tracing::warn!(slug = %label, error = %e, "tenant lookup by slug failed");
                None
            }
        }
    }

    /// Cached lookup of the organization serving `domain`. Negative results
    /// are cached; store failures are not.
    async fn resolve_custom_domain(&self, domain: &str) -> Option<TenantInfo> {
        let now = self.clock.now();
        if let CacheLookup::Hit(tenant) = self.cache.get(domain, now) {
            return tenant;
        }

        match self.repo.find_serving_domain(domain).await {
            Ok(org) => {
                let tenant = org
                    .filter(Organization::serves_custom_domain)
                    .map(|o| o.tenant_info());
                self.cache.insert(domain, tenant.clone(), now);
                tenant
            }
            Err(e) => {
                tracing::warn!(
                    domain = %domain,
                    error = %e,
                    "tenant lookup by custom domain failed"
                );
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns the first failed slug rule.
    pub fn validate_slug(&self, raw: &str) -> Result<String, SlugRejection> {
        reserved::validate_slug(raw, &self.reserved)
    }

    #[must_use]
    pub fn is_reserved_subdomain(&self, label: &str) -> bool {
        self.reserved.contains(label.trim())
    }

    /// # Errors
    ///
    /// Returns why the domain cannot be used.
    pub fn validate_custom_domain(&self, raw: &str) -> Result<String, DomainRejection> {
        custom_domain::validate_custom_domain(raw, &self.blocked)
    }

    #[must_use]
    pub fn generate_verification_token(&self, organization_id: OrganizationId) -> String {
        verification::generate_token(&self.cfg.txt_prefix, organization_id, self.clock.now())
    }

    /// Rate limit, then DNS check, then a fire-and-forget audit record.
    #[tracing::instrument(skip_all, fields(org_id = %organization_id, domain = %raw_domain))]
    pub async fn verify_domain_ownership(
        &self,
        raw_domain: &str,
        expected_token: &str,
        organization_id: OrganizationId,
        actor_id: Option<Uuid>,
    ) -> VerificationOutcome {
        if let RateDecision::Limited { retry_after_secs } =
            self.limiter.check(organization_id, self.clock.now())
        {
            tracing::warn!(retry_after_secs, "domain verification rate limited");
            return VerificationOutcome::rate_limited(retry_after_secs);
        }

        let outcome = match custom_domain::validate_custom_domain(raw_domain, &self.blocked) {
            Ok(domain) => {
                let check = verification::verify_txt(
                    self.dns.as_ref(),
                    &domain,
                    &self.cfg.verification_host(&domain),
                    expected_token,
                    self.cfg.dns_timeout,
                )
                .await;
                VerificationOutcome {
                    verified: check.verified,
                    rate_limited: false,
                    retry_after_seconds: None,
                    error: check.reason,
                    observed_records: check.observed,
                }
            }
            Err(rejection) => VerificationOutcome::failed(rejection.to_string()),
        };

        self.record_event(
            organization_id,
            actor_id,
            AuditAction::DomainVerificationAttempted,
            serde_json::json!({
                "domain": raw_domain,
                "verified": outcome.verified,
                "records_found": outcome.observed_records.len(),
                "error": outcome.error,
            }),
        );

        tracing::info!(verified = outcome.verified, "domain verification attempted");
        outcome
    }

    /// # Errors
    ///
    /// `InvalidSlug`, `SlugTaken` or `Storage`.
    #[tracing::instrument(skip_all, fields(slug = %raw_slug))]
    pub async fn create_organization(
        &self,
        raw_slug: &str,
        name: &str,
        subscription_tier: SubscriptionTier,
    ) -> Result<Organization, DomainError> {
        let slug = self.validate_slug(raw_slug).map_err(DomainError::InvalidSlug)?;

        if self.repo.find_by_slug(&slug).await?.is_some() {
            return Err(DomainError::SlugTaken(slug));
        }

        let mut org = Organization::new(Uuid::new_v4(), slug, name.trim());
        org.subscription_tier = subscription_tier;
        let org = self.repo.create(org).await?;

        tracing::info!(org_id = %org.id, "organization created");
        Ok(org)
    }

    /// # Errors
    ///
    /// `Storage` if the store cannot be queried.
    pub async fn is_domain_available(
        &self,
        raw_domain: &str,
        exclude: Option<OrganizationId>,
    ) -> Result<bool, DomainError> {
        let domain = custom_domain::normalize_domain(raw_domain);
        let holder = self.repo.find_by_custom_domain(&domain).await?;
        Ok(match holder {
            None => true,
            Some(org) => exclude == Some(org.id),
        })
    }

    /// # Errors
    ///
    /// `InvalidDomain`, `OrganizationNotFound`, `DomainUnavailable` or `Storage`.
    #[tracing::instrument(skip_all, fields(org_id = %organization_id, domain = %raw_domain))]
    pub async fn claim_custom_domain(
        &self,
        organization_id: OrganizationId,
        raw_domain: &str,
        actor_id: Option<Uuid>,
    ) -> Result<DomainClaim, DomainError> {
        let domain = self
            .validate_custom_domain(raw_domain)
            .map_err(DomainError::InvalidDomain)?;

        let org = self
            .repo
            .find_by_id(organization_id)
            .await?
            .ok_or(DomainError::OrganizationNotFound(organization_id))?;

        if !self.is_domain_available(&domain, Some(organization_id)).await? {
            return Err(DomainError::DomainUnavailable(domain));
        }

        let token = self.generate_verification_token(organization_id);
        if !self
            .repo
            .set_domain_claim(organization_id, &domain, &token)
            .await?
        {
            return Err(DomainError::OrganizationNotFound(organization_id));
        }

        if let Some(previous) = org.custom_domain.as_deref() {
            self.cache.invalidate(previous);
        }
        self.cache.invalidate(&domain);

        self.record_event(
            organization_id,
            actor_id,
            AuditAction::DomainClaimed,
            serde_json::json!({
                "domain": domain,
                "previous_domain": org.custom_domain,
            }),
        );

        tracing::info!("custom domain claimed");
        Ok(DomainClaim {
            organization_id,
            txt_record_name: self.cfg.verification_host(&domain),
            domain,
            txt_record_value: token,
        })
    }

    /// Verifies the stored claim and flips it to verified on success.
    ///
    /// # Errors
    ///
    /// `OrganizationNotFound`, `NoDomainClaim` or `Storage`.
    #[tracing::instrument(skip_all, fields(org_id = %organization_id))]
    pub async fn verify_organization_domain(
        &self,
        organization_id: OrganizationId,
        actor_id: Option<Uuid>,
    ) -> Result<VerificationOutcome, DomainError> {
        let org = self
            .repo
            .find_by_id(organization_id)
            .await?
            .ok_or(DomainError::OrganizationNotFound(organization_id))?;

        let (Some(domain), Some(token)) = (org.custom_domain, org.custom_domain_txt_value) else {
            return Err(DomainError::NoDomainClaim(organization_id));
        };

        let outcome = self
            .verify_domain_ownership(&domain, &token, organization_id, actor_id)
            .await;

        if outcome.verified {
            if !self.repo.mark_domain_verified(organization_id).await? {
                return Err(DomainError::OrganizationNotFound(organization_id));
            }
            self.cache.invalidate(&domain);
            tracing::info!(domain = %domain, "custom domain activated");
        }

        Ok(outcome)
    }

    /// # Errors
    ///
    /// `OrganizationNotFound` or `Storage`.
    #[tracing::instrument(skip_all, fields(org_id = %organization_id))]
    pub async fn remove_custom_domain(
        &self,
        organization_id: OrganizationId,
        actor_id: Option<Uuid>,
    ) -> Result<(), DomainError> {
        let org = self
            .repo
            .find_by_id(organization_id)
            .await?
            .ok_or(DomainError::OrganizationNotFound(organization_id))?;

        if !self.repo.clear_custom_domain(organization_id).await? {
            return Err(DomainError::OrganizationNotFound(organization_id));
        }

        if let Some(domain) = org.custom_domain.as_deref() {
            self.cache.invalidate(domain);
            self.record_event(
                organization_id,
                actor_id,
                AuditAction::DomainRemoved,
                serde_json::json!({ "domain": domain }),
            );
        }
        Ok(())
    }

    pub fn invalidate_domain(&self, raw_domain: &str) {
        self.cache
            .invalidate(&custom_domain::normalize_domain(raw_domain));
    }

    pub fn clear_domain_cache(&self) {
        self.cache.clear();
    }

    /// `<scheme>://<slug>.<base_domain><path>`; a non-empty `path` gets a
    /// leading slash if missing.
    #[must_use]
    pub fn tenant_url(&self, slug: &str, path: &str) -> String {
        let separator = if path.is_empty() || path.starts_with('/') {
            ""
        } else {
            "/"
        };
        format!(
            "{}://{}.{}{separator}{path}",
            self.cfg.url_scheme,
            slug.trim().to_ascii_lowercase(),
            self.cfg.base_domain
        )
    }

    fn record_event(
        &self,
        organization_id: OrganizationId,
        actor_id: Option<Uuid>,
        action: AuditAction,
        payload: serde_json::Value,
    ) {
        self.audit.dispatch(SecurityEvent {
            tenant_id: Some(organization_id),
            actor_id,
            action,
            subject_type: "organization".to_owned(),
            subject_id: organization_id.to_string(),
            payload,
            occurred_at: self.clock.now(),
        });
    }
}
