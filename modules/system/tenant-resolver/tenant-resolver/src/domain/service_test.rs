#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use platform_kit::{AuditAction, AuditDispatcher, ManualClock, RecordingAuditSink};
    use tenant_resolver_sdk::{DomainRejection, Organization, OrganizationId, SubscriptionTier};
    use uuid::Uuid;

    use super::super::error::DomainError;
    use super::super::repo::OrganizationRepository;
    use super::super::reserved::DEFAULT_RESERVED_SUBDOMAINS;
    use super::super::service::Service;
    use super::super::verification::TxtResolver;
    use crate::config::TenantResolverConfig;
    use crate::infra::storage::InMemoryOrganizationRepository;

    // Mock repository counting the lookups the resolver performs
    #[derive(Default)]
    struct MockRepository {
        orgs: Mutex<HashMap<OrganizationId, Organization>>,
        slug_lookups: AtomicUsize,
        domain_lookups: AtomicUsize,
        failing: AtomicBool,
    }

    impl MockRepository {
        fn with(orgs: Vec<Organization>) -> Arc<Self> {
            let repo = Self::default();
            repo.orgs
                .lock()
                .extend(orgs.into_iter().map(|o| (o.id, o)));
            Arc::new(repo)
        }

        fn check(&self) -> anyhow::Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("connection refused");
            }
            Ok(())
        }

        fn get(&self, id: OrganizationId) -> Organization {
            self.orgs.lock().get(&id).cloned().unwrap()
        }
    }

    #[async_trait]
    impl OrganizationRepository for MockRepository {
        async fn find_by_id(&self, id: OrganizationId) -> anyhow::Result<Option<Organization>> {
            self.check()?;
            Ok(self.orgs.lock().get(&id).cloned())
        }

        async fn find_by_slug(&self, slug: &str) -> anyhow::Result<Option<Organization>> {
            self.slug_lookups.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.orgs.lock().values().find(|o| o.slug == slug).cloned())
        }

        async fn find_by_custom_domain(
            &self,
            domain: &str,
        ) -> anyhow::Result<Option<Organization>> {
            self.check()?;
            Ok(self
                .orgs
                .lock()
                .values()
                .find(|o| o.custom_domain.as_deref() == Some(domain))
                .cloned())
        }

        async fn find_serving_domain(&self, domain: &str) -> anyhow::Result<Option<Organization>> {
            self.domain_lookups.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self
                .orgs
                .lock()
                .values()
                .find(|o| o.custom_domain.as_deref() == Some(domain) && o.serves_custom_domain())
                .cloned())
        }

        async fn create(&self, org: Organization) -> anyhow::Result<Organization> {
            self.check()?;
            self.orgs.lock().insert(org.id, org.clone());
            Ok(org)
        }

        async fn set_domain_claim(
            &self,
            id: OrganizationId,
            domain: &str,
            txt_value: &str,
        ) -> anyhow::Result<bool> {
            self.check()?;
            Ok(self.orgs.lock().get_mut(&id).is_some_and(|o| {
                o.custom_domain = Some(domain.to_owned());
                o.custom_domain_txt_value = Some(txt_value.to_owned());
                o.custom_domain_verified = false;
                o.custom_domain_bypass_verification = false;
                true
            }))
        }

        async fn mark_domain_verified(&self, id: OrganizationId) -> anyhow::Result<bool> {
            self.check()?;
            Ok(self.orgs.lock().get_mut(&id).is_some_and(|o| {
                o.custom_domain_verified = true;
                true
            }))
        }

        async fn clear_custom_domain(&self, id: OrganizationId) -> anyhow::Result<bool> {
            self.check()?;
            Ok(self.orgs.lock().get_mut(&id).is_some_and(|o| {
                o.custom_domain = None;
                o.custom_domain_txt_value = None;
                o.custom_domain_verified = false;
                o.custom_domain_bypass_verification = false;
                true
            }))
        }
    }

    #[derive(Default)]
    struct MockDns {
        records: Mutex<HashMap<String, Vec<String>>>,
        lookups: AtomicUsize,
    }

    impl MockDns {
        fn publish(&self, name: &str, value: &str) {
            self.records
                .lock()
                .entry(name.to_owned())
                .or_default()
                .push(value.to_owned());
        }
    }

    #[async_trait]
    impl TxtResolver for MockDns {
        async fn lookup_txt(&self, name: &str) -> anyhow::Result<Vec<String>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.records
                .lock()
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("NXDOMAIN"))
        }
    }

    struct Harness {
        svc: Service,
        repo: Arc<MockRepository>,
        dns: Arc<MockDns>,
        clock: Arc<ManualClock>,
        audit: Arc<RecordingAuditSink>,
    }

    fn config() -> TenantResolverConfig {
        TenantResolverConfig {
            base_domain: "app.example.com".to_owned(),
            dns_timeout: Duration::from_millis(200),
            ..TenantResolverConfig::default()
        }
    }

    fn harness(orgs: Vec<Organization>) -> Harness {
        harness_with(config(), orgs)
    }

    fn harness_with(cfg: TenantResolverConfig, orgs: Vec<Organization>) -> Harness {
        let repo = MockRepository::with(orgs);
        let dns = Arc::new(MockDns::default());
        let clock = Arc::new(ManualClock::starting_now());
        let audit = Arc::new(RecordingAuditSink::new());
        let svc = Service::new(
            cfg,
            repo.clone(),
            dns.clone(),
            clock.clone(),
            AuditDispatcher::new(audit.clone()),
        );
        Harness {
            svc,
            repo,
            dns,
            clock,
            audit,
        }
    }

    fn org(slug: &str) -> Organization {
        Organization::new(Uuid::new_v4(), slug, format!("{slug} inc"))
    }

    fn org_with_domain(slug: &str, domain: &str, verified: bool) -> Organization {
        let mut o = org(slug);
        o.custom_domain = Some(domain.to_owned());
        o.custom_domain_verified = verified;
        o.custom_domain_txt_value = Some("durj-verify=abc".to_owned());
        o
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_base_domain_is_not_a_tenant() {
        let h = harness(vec![org("acme")]);
        for host in ["app.example.com", "APP.EXAMPLE.COM:8080", "localhost:3000"] {
            assert_eq!(h.svc.resolve_subdomain(host), None);
            assert_eq!(h.svc.resolve_tenant(host).await, None);
        }
        assert_eq!(h.repo.slug_lookups.load(Ordering::SeqCst), 0);
        assert_eq!(h.repo.domain_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_subdomain_resolves_with_one_lookup() {
        let acme = org("acme");
        let h = harness(vec![acme.clone()]);

        assert_eq!(
            h.svc.resolve_subdomain("ACME.app.example.com"),
            Some("acme".to_owned())
        );
        let tenant = h.svc.resolve_tenant("ACME.app.example.com").await.unwrap();
        assert_eq!(tenant.id, acme.id);
        assert_eq!(tenant.slug, "acme");
        assert_eq!(tenant.subscription_tier, SubscriptionTier::Free);
        assert_eq!(h.repo.slug_lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reserved_subdomains_never_reach_store() {
        let h = harness(vec![org("acme")]);
        for label in DEFAULT_RESERVED_SUBDOMAINS {
            let host = format!("{label}.app.example.com");
            assert_eq!(h.svc.resolve_tenant(&host).await, None, "{host}");
        }
        assert_eq!(h.repo.slug_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_subdomain_never_reaches_store() {
        let h = harness(vec![]);
        for host in ["ab.app.example.com", "acme-corp.app.example.com"] {
            assert_eq!(h.svc.resolve_tenant(host).await, None);
        }
        assert_eq!(h.repo.slug_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_subdomain_is_none() {
        let h = harness(vec![org("acme")]);
        assert_eq!(h.svc.resolve_tenant("globex.app.example.com").await, None);
    }

    #[tokio::test]
    async fn test_storage_error_resolves_to_none() {
        let h = harness(vec![org("acme")]);
        h.repo.failing.store(true, Ordering::SeqCst);
        assert_eq!(h.svc.resolve_tenant("acme.app.example.com").await, None);
        assert_eq!(h.svc.resolve_tenant("portal.acme.com").await, None);
    }

    #[tokio::test]
    async fn test_custom_domain_cached_within_ttl() {
        let acme = org_with_domain("acme", "portal.acme.com", true);
        let h = harness(vec![acme.clone()]);

        let first = h.svc.resolve_tenant("portal.acme.com").await;
        let second = h.svc.resolve_tenant("PORTAL.acme.com:443").await;
        assert_eq!(first.as_ref().map(|t| t.id), Some(acme.id));
        assert_eq!(first, second);
        assert_eq!(h.repo.domain_lookups.load(Ordering::SeqCst), 1);

        h.clock.advance(chrono::Duration::seconds(61));
        h.svc.resolve_tenant("portal.acme.com").await;
        assert_eq!(h.repo.domain_lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_negative_custom_domain_result_is_cached() {
        let h = harness(vec![]);
        assert_eq!(h.svc.resolve_tenant("nobody.com").await, None);
        assert_eq!(h.svc.resolve_tenant("nobody.com").await, None);
        assert_eq!(h.repo.domain_lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_storage_errors_are_not_cached() {
        let h = harness(vec![org_with_domain("acme", "portal.acme.com", true)]);
        h.repo.failing.store(true, Ordering::SeqCst);
        assert_eq!(h.svc.resolve_tenant("portal.acme.com").await, None);

        h.repo.failing.store(false, Ordering::SeqCst);
        assert!(h.svc.resolve_tenant("portal.acme.com").await.is_some());
        assert_eq!(h.repo.domain_lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unverified_domain_is_not_served_unless_bypassed() {
        let pending = org_with_domain("acme", "portal.acme.com", false);
        let mut bypassed = org_with_domain("globex", "globex.io", false);
        bypassed.custom_domain_bypass_verification = true;
        let h = harness(vec![pending, bypassed.clone()]);

        assert_eq!(h.svc.resolve_tenant("portal.acme.com").await, None);
        assert_eq!(
            h.svc.resolve_tenant("globex.io").await.map(|t| t.id),
            Some(bypassed.id)
        );
    }

    #[tokio::test]
    async fn test_blocked_or_invalid_hosts_skip_lookup() {
        let h = harness(vec![]);
        for host in ["google.com", "shop.vercel.app", "127.0.0.1:8080", "[::1]"] {
            assert_eq!(h.svc.resolve_tenant(host).await, None, "{host}");
        }
        assert_eq!(h.repo.domain_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validate_custom_domain_blocks_base_domain() {
        let h = harness(vec![]);
        assert_eq!(
            h.svc.validate_custom_domain("HTTPS://WWW.Example.COM/"),
            Ok("example.com".to_owned())
        );
        assert_eq!(
            h.svc.validate_custom_domain("durj.com"),
            Err(DomainRejection::Blocked)
        );
        assert_eq!(
            h.svc.validate_custom_domain("evil.app.example.com"),
            Err(DomainRejection::Blocked)
        );
    }

    #[tokio::test]
    async fn test_verify_domain_ownership_success_is_audited() {
        let acme = org("acme");
        let h = harness(vec![acme.clone()]);
        let token = h.svc.generate_verification_token(acme.id);
        h.dns.publish("_durj-verification.acme.com", &token);
        let actor = Uuid::new_v4();

        let outcome = h
            .svc
            .verify_domain_ownership("acme.com", &token, acme.id, Some(actor))
            .await;
        assert!(outcome.verified, "{outcome:?}");
        assert!(!outcome.rate_limited);
        assert_eq!(outcome.observed_records, vec![token]);

        settle().await;
        let events = h.audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, AuditAction::DomainVerificationAttempted);
        assert_eq!(events[0].actor_id, Some(actor));
        assert_eq!(events[0].tenant_id, Some(acme.id));
        assert_eq!(events[0].payload["records_found"], 1);
    }

    #[tokio::test]
    async fn test_verification_rate_limited_before_dns() {
        let acme = org("acme");
        let h = harness(vec![acme.clone()]);

        for _ in 0..10 {
            let outcome = h
                .svc
                .verify_domain_ownership("acme.com", "durj-verify=x", acme.id, None)
                .await;
            assert!(!outcome.rate_limited);
        }
        let lookups = h.dns.lookups.load(Ordering::SeqCst);

        let limited = h
            .svc
            .verify_domain_ownership("acme.com", "durj-verify=x", acme.id, None)
            .await;
        assert!(limited.rate_limited);
        assert!(!limited.verified);
        assert!(limited.retry_after_seconds.unwrap() > 0);
        assert_eq!(h.dns.lookups.load(Ordering::SeqCst), lookups);

        h.clock.advance(chrono::Duration::hours(1));
        let again = h
            .svc
            .verify_domain_ownership("acme.com", "durj-verify=x", acme.id, None)
            .await;
        assert!(!again.rate_limited);
    }

    #[tokio::test]
    async fn test_create_organization_validates_and_rejects_duplicates() {
        let h = harness(vec![org("acme")]);

        let created = h
            .svc
            .create_organization(" Globex ", "Globex Corp", SubscriptionTier::Starter)
            .await
            .unwrap();
        assert_eq!(created.slug, "globex");
        assert_eq!(created.subscription_tier, SubscriptionTier::Starter);

        assert!(matches!(
            h.svc
                .create_organization("acme", "Acme again", SubscriptionTier::Free)
                .await,
            Err(DomainError::SlugTaken(slug)) if slug == "acme"
        ));
        assert!(matches!(
            h.svc
                .create_organization("admin", "Admin", SubscriptionTier::Free)
                .await,
            Err(DomainError::InvalidSlug(_))
        ));
    }

    #[tokio::test]
    async fn test_domain_availability_excludes_self() {
        let acme = org_with_domain("acme", "portal.acme.com", false);
        let other = org("globex");
        let h = harness(vec![acme.clone(), other.clone()]);

        assert!(h.svc.is_domain_available("free.com", None).await.unwrap());
        assert!(!h.svc.is_domain_available("https://portal.acme.com/", None).await.unwrap());
        assert!(h
            .svc
            .is_domain_available("portal.acme.com", Some(acme.id))
            .await
            .unwrap());
        assert!(!h
            .svc
            .is_domain_available("portal.acme.com", Some(other.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_claim_verify_activate_remove_flow() {
        let acme = org("acme");
        let h = harness(vec![acme.clone()]);
        let actor = Some(Uuid::new_v4());

        let claim = h
            .svc
            .claim_custom_domain(acme.id, "https://www.Portal.Acme.com/", actor)
            .await
            .unwrap();
        assert_eq!(claim.domain, "portal.acme.com");
        assert_eq!(claim.txt_record_name, "_durj-verification.portal.acme.com");
        assert!(claim.txt_record_value.starts_with("durj-verify="));

        // Pending claim is not served, and the miss is cached.
        assert_eq!(h.svc.resolve_tenant("portal.acme.com").await, None);

        let failed = h.svc.verify_organization_domain(acme.id, actor).await.unwrap();
        assert!(!failed.verified);
        assert!(!h.repo.get(acme.id).custom_domain_verified);

        h.dns.publish("portal.acme.com", &claim.txt_record_value);
        let ok = h.svc.verify_organization_domain(acme.id, actor).await.unwrap();
        assert!(ok.verified);
        assert!(h.repo.get(acme.id).custom_domain_verified);

        // Activation invalidated the cached negative result.
        assert_eq!(
            h.svc.resolve_tenant("portal.acme.com").await.map(|t| t.id),
            Some(acme.id)
        );

        h.svc.remove_custom_domain(acme.id, actor).await.unwrap();
        assert_eq!(h.svc.resolve_tenant("portal.acme.com").await, None);
        assert_eq!(h.repo.get(acme.id).custom_domain, None);

        settle().await;
        let actions: Vec<_> = h.audit.events().iter().map(|e| e.action).collect();
        assert!(actions.contains(&AuditAction::DomainClaimed));
        assert!(actions.contains(&AuditAction::DomainRemoved));
        assert_eq!(
            actions
                .iter()
                .filter(|a| **a == AuditAction::DomainVerificationAttempted)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_reclaim_drops_operator_bypass() {
        let mut acme = org_with_domain("acme", "acme.com", false);
        acme.custom_domain_bypass_verification = true;
        let h = harness(vec![acme.clone()]);
        assert!(h.svc.resolve_tenant("acme.com").await.is_some());

        h.svc
            .claim_custom_domain(acme.id, "acme-brand.com", None)
            .await
            .unwrap();

        let stored = h.repo.get(acme.id);
        assert!(!stored.custom_domain_verified);
        assert!(!stored.custom_domain_bypass_verification);
        assert_eq!(h.svc.resolve_tenant("acme-brand.com").await, None);
        assert_eq!(h.svc.resolve_tenant("acme.com").await, None);
    }

    #[tokio::test]
    async fn test_reclaim_on_in_memory_store_requires_proof() {
        let mut acme = org_with_domain("acme", "acme.com", false);
        acme.custom_domain_bypass_verification = true;
        let repo = Arc::new(InMemoryOrganizationRepository::with_organizations([
            acme.clone(),
        ]));
        let svc = Service::new(
            config(),
            repo.clone(),
            Arc::new(MockDns::default()),
            Arc::new(ManualClock::starting_now()),
            AuditDispatcher::new(Arc::new(RecordingAuditSink::new())),
        );

        svc.claim_custom_domain(acme.id, "acme-brand.com", None)
            .await
            .unwrap();

        assert_eq!(svc.resolve_tenant("acme-brand.com").await, None);
        let stored = repo.find_by_id(acme.id).await.unwrap().unwrap();
        assert!(!stored.custom_domain_bypass_verification);
    }

    #[tokio::test]
    async fn test_claim_rejects_taken_and_invalid_domains() {
        let holder = org_with_domain("acme", "portal.acme.com", true);
        let claimant = org("globex");
        let h = harness(vec![holder, claimant.clone()]);

        assert!(matches!(
            h.svc
                .claim_custom_domain(claimant.id, "portal.acme.com", None)
                .await,
            Err(DomainError::DomainUnavailable(d)) if d == "portal.acme.com"
        ));
        assert!(matches!(
            h.svc.claim_custom_domain(claimant.id, "github.io", None).await,
            Err(DomainError::InvalidDomain(DomainRejection::Blocked))
        ));
        assert!(matches!(
            h.svc
                .claim_custom_domain(Uuid::new_v4(), "globex.com", None)
                .await,
            Err(DomainError::OrganizationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_without_claim() {
        let acme = org("acme");
        let h = harness(vec![acme.clone()]);
        assert!(matches!(
            h.svc.verify_organization_domain(acme.id, None).await,
            Err(DomainError::NoDomainClaim(id)) if id == acme.id
        ));
    }

    #[tokio::test]
    async fn test_explicit_invalidation() {
        let acme = org_with_domain("acme", "portal.acme.com", true);
        let h = harness(vec![acme]);

        h.svc.resolve_tenant("portal.acme.com").await;
        h.svc.invalidate_domain("HTTPS://portal.acme.com");
        h.svc.resolve_tenant("portal.acme.com").await;
        h.svc.clear_domain_cache();
        h.svc.resolve_tenant("portal.acme.com").await;
        assert_eq!(h.repo.domain_lookups.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_tenant_url() {
        let h = harness_with(
            TenantResolverConfig {
                url_scheme: "http".to_owned(),
                ..config()
            },
            vec![],
        );
        assert_eq!(h.svc.tenant_url("acme", ""), "http://acme.app.example.com");
        assert_eq!(
            h.svc.tenant_url("acme", "settings"),
            "http://acme.app.example.com/settings"
        );
        assert_eq!(
            h.svc.tenant_url("ACME", "/a?b=1"),
            "http://acme.app.example.com/a?b=1"
        );
    }

    #[tokio::test]
    async fn test_is_reserved_subdomain() {
        let h = harness(vec![]);
        assert!(h.svc.is_reserved_subdomain("Admin"));
        assert!(!h.svc.is_reserved_subdomain("acme"));
    }
}
