//! Reserved subdomain gate and slug format rules.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tenant_resolver_sdk::SlugRejection;

/// Minimum slug length.
pub const SLUG_MIN_LEN: usize = 3;
/// Maximum slug length (one DNS label).
pub const SLUG_MAX_LEN: usize = 63;

#[allow(clippy::unwrap_used, reason = "literal pattern")]
static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9]{3,63}$").unwrap());

/// Labels that can never belong to a tenant.
pub const DEFAULT_RESERVED_SUBDOMAINS: &[&str] = &[
    // infrastructure
    "www", "api", "app", "cdn", "static", "assets", "media", "files", "img", "images", "mail",
    "smtp", "imap", "pop", "ftp", "sftp", "ns", "ns1", "ns2", "dns", "mx", "vpn", "proxy",
    "gateway", "status", "health", "metrics", "monitoring", "grafana", "ws", "socket", "webhooks",
    // auth
    "auth", "login", "logout", "signin", "signup", "register", "sso", "oauth", "saml", "account",
    "accounts", "password", "verify", "secure", "security",
    // billing
    "billing", "pay", "payment", "payments", "checkout", "invoice", "invoices", "subscription",
    "pricing", "plans",
    // environments
    "dev", "development", "staging", "stage", "test", "testing", "qa", "uat", "demo", "sandbox",
    "preview", "beta", "alpha", "prod", "production", "local",
    // organization management and platform
    "admin", "administrator", "superadmin", "root", "system", "internal", "platform", "dashboard",
    "console", "portal", "manage", "management", "settings", "org", "orgs", "organization",
    "organizations", "team", "teams", "workspace", "workspaces", "tenant", "tenants", "support",
    "help", "docs", "blog", "about", "contact", "legal", "privacy", "terms", "durj",
];

/// O(1) membership set of reserved labels.
#[derive(Debug, Clone)]
pub struct ReservedSubdomains {
    labels: HashSet<String>,
}

impl ReservedSubdomains {
    #[must_use]
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            labels: labels
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(&label.to_ascii_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for ReservedSubdomains {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_SUBDOMAINS)
    }
}

/// Whether `label` matches `^[a-z0-9]{3,63}$`.
#[must_use]
pub fn is_valid_slug_format(label: &str) -> bool {
    SLUG_RE.is_match(label)
}

/// Validates a proposed slug. Input is trimmed and lowercased first.
///
/// # Errors
///
/// Returns the first rule the slug violates.
pub fn validate_slug(raw: &str, reserved: &ReservedSubdomains) -> Result<String, SlugRejection> {
    let slug = raw.trim().to_ascii_lowercase();

    if slug.len() < SLUG_MIN_LEN {
        return Err(SlugRejection::TooShort);
    }
    if slug.len() > SLUG_MAX_LEN {
        return Err(SlugRejection::TooLong);
    }
    if !is_valid_slug_format(&slug) {
        return Err(SlugRejection::InvalidCharacters);
    }
    if reserved.contains(&slug) {
        return Err(SlugRejection::Reserved);
    }
    Ok(slug)
}
