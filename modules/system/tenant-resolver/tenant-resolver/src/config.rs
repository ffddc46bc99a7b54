//! Configuration for the tenant resolver module.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::custom_domain::DEFAULT_BLOCKED_DOMAINS;
use crate::domain::reserved::DEFAULT_RESERVED_SUBDOMAINS;

/// Module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TenantResolverConfig {
    /// Application base domain; tenants live at `<slug>.<base_domain>`.
    pub base_domain: String,

    /// Scheme used when building tenant URLs.
    pub url_scheme: String,

    /// Labels that never resolve to a tenant.
    pub reserved_subdomains: Vec<String>,

    /// Domains (and their subdomains) that cannot be claimed as custom domains.
    pub blocked_domains: Vec<String>,

    /// Prefix of every TXT verification token.
    pub txt_prefix: String,

    /// Platform label of the verification host, `_<label>-verification.<domain>`.
    pub verification_label: String,

    /// Lifetime of a cached custom-domain resolution.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// Upper bound on cached custom-domain resolutions.
    pub cache_max_entries: usize,

    /// Per-lookup DNS timeout. Each lookup target gets its own budget.
    #[serde(with = "humantime_serde")]
    pub dns_timeout: Duration,

    /// Verification attempt rate limiting.
    pub verification: VerificationRateLimitConfig,
}

impl Default for TenantResolverConfig {
    fn default() -> Self {
        Self {
            base_domain: "app.durj.com".to_owned(),
            url_scheme: "https".to_owned(),
            reserved_subdomains: DEFAULT_RESERVED_SUBDOMAINS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            blocked_domains: DEFAULT_BLOCKED_DOMAINS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            txt_prefix: "durj-verify=".to_owned(),
            verification_label: "durj".to_owned(),
            cache_ttl: Duration::from_secs(60),
            cache_max_entries: 1000,
            dns_timeout: Duration::from_secs(5),
            verification: VerificationRateLimitConfig::default(),
        }
    }
}

impl TenantResolverConfig {
    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_domain.trim().is_empty() {
            anyhow::bail!("tenant_resolver.base_domain must not be empty");
        }
        if self.cache_max_entries == 0 {
            anyhow::bail!("tenant_resolver.cache_max_entries must be at least 1");
        }
        if self.verification.max_attempts == 0 {
            anyhow::bail!("tenant_resolver.verification.max_attempts must be at least 1");
        }
        if self.verification.window.is_zero() {
            anyhow::bail!("tenant_resolver.verification.window must be positive");
        }
        Ok(())
    }

    /// Host name of the alternative TXT verification record for `domain`.
    #[must_use]
    pub fn verification_host(&self, domain: &str) -> String {
        format!("_{}-verification.{domain}", self.verification_label)
    }
}

/// Fixed-window limit on DNS verification attempts per organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerificationRateLimitConfig {
    /// Attempts allowed per window.
    pub max_attempts: u32,

    #[serde(with = "humantime_serde")]
    pub window: Duration,

    /// Map size above which elapsed windows are swept on write.
    pub sweep_threshold: usize,
}

impl Default for VerificationRateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            window: Duration::from_secs(3600),
            sweep_threshold: 1000,
        }
    }
}
