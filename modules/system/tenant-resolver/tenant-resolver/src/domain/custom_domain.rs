//! Custom domain normalization and validation.

use std::sync::LazyLock;

use regex::Regex;
use tenant_resolver_sdk::DomainRejection;

const MIN_DOMAIN_LEN: usize = 4;
const MAX_DOMAIN_LEN: usize = 253;

#[allow(clippy::unwrap_used, reason = "literal pattern")]
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$").unwrap()
});

#[allow(clippy::unwrap_used, reason = "literal pattern")]
static PROTOCOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9+.-]*://").unwrap());

/// Platform-owned domains, hosting providers, and large tech brands.
pub const DEFAULT_BLOCKED_DOMAINS: &[&str] = &[
    // platform
    "durj.com",
    "durj.app",
    "durj.io",
    // hosting providers
    "vercel.app",
    "vercel.com",
    "netlify.app",
    "netlify.com",
    "herokuapp.com",
    "heroku.com",
    "github.io",
    "gitlab.io",
    "pages.dev",
    "workers.dev",
    "cloudflare.com",
    "azurewebsites.net",
    "cloudapp.net",
    "cloudfront.net",
    "amazonaws.com",
    "appspot.com",
    "firebaseapp.com",
    "web.app",
    "onrender.com",
    "fly.dev",
    "railway.app",
    "ngrok.io",
    "ngrok-free.app",
    // tech companies
    "google.com",
    "microsoft.com",
    "apple.com",
    "amazon.com",
    "facebook.com",
    "meta.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "github.com",
    "gitlab.com",
    "paypal.com",
    "stripe.com",
    "salesforce.com",
    "oracle.com",
    "slack.com",
    "zoom.us",
    "dropbox.com",
    "whatsapp.com",
    "localhost",
];

/// Lowercases and trims, strips a leading protocol, trailing slashes and a
/// leading `www.`.
#[must_use]
pub fn normalize_domain(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    let without_protocol = PROTOCOL_RE.replace(&lowered, "");
    let trimmed = without_protocol.trim_end_matches('/');
    trimmed.strip_prefix("www.").unwrap_or(trimmed).to_owned()
}

/// Blocked-domain list with label-aligned suffix matching.
#[derive(Debug, Clone)]
pub struct BlockedDomains {
    domains: Vec<String>,
}

impl BlockedDomains {
    #[must_use]
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| normalize_domain(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// Adds `domain` unless already present.
    #[must_use]
    pub fn with(mut self, domain: &str) -> Self {
        let domain = normalize_domain(domain);
        if !domain.is_empty() && !self.domains.contains(&domain) {
            self.domains.push(domain);
        }
        self
    }

    /// Whether `domain` equals, or is a subdomain of, any blocked entry.
    #[must_use]
    pub fn is_blocked(&self, domain: &str) -> bool {
        self.domains.iter().any(|blocked| {
            domain == blocked
                || domain
                    .strip_suffix(blocked.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

impl Default for BlockedDomains {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_DOMAINS)
    }
}

/// Normalizes `raw` and checks it is usable as a custom domain.
///
/// # Errors
///
/// Returns the [`DomainRejection`] for the first failed rule.
pub fn validate_custom_domain(
    raw: &str,
    blocked: &BlockedDomains,
) -> Result<String, DomainRejection> {
    let domain = normalize_domain(raw);

    if domain.is_empty() {
        return Err(DomainRejection::Empty);
    }
    if domain.len() < MIN_DOMAIN_LEN {
        return Err(DomainRejection::TooShort);
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(DomainRejection::TooLong);
    }
    if !DOMAIN_RE.is_match(&domain) {
        return Err(DomainRejection::InvalidFormat);
    }
    if blocked.is_blocked(&domain) {
        return Err(DomainRejection::Blocked);
    }
    Ok(domain)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn validate(raw: &str) -> Result<String, DomainRejection> {
        validate_custom_domain(raw, &BlockedDomains::default())
    }

    #[test]
    fn normalizes_protocol_www_case_and_slashes() {
        assert_eq!(validate("HTTPS://WWW.Example.COM/"), Ok("example.com".to_owned()));
        assert_eq!(validate("  http://portal.acme.io//  "), Ok("portal.acme.io".to_owned()));
    }

    #[test]
    fn platform_domains_are_blocked() {
        assert_eq!(validate("durj.com"), Err(DomainRejection::Blocked));
        assert_eq!(validate("acme.durj.com"), Err(DomainRejection::Blocked));
        assert_eq!(validate("myshop.vercel.app"), Err(DomainRejection::Blocked));
        assert_eq!(validate("mail.google.com"), Err(DomainRejection::Blocked));
    }

    #[test]
    fn blocked_match_is_label_aligned() {
        assert_eq!(validate("notgoogle.com"), Ok("notgoogle.com".to_owned()));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(validate(""), Err(DomainRejection::Empty));
        assert_eq!(validate("https://"), Err(DomainRejection::Empty));
        assert_eq!(validate("a.b"), Err(DomainRejection::TooShort));
        assert_eq!(validate("localhost"), Err(DomainRejection::InvalidFormat));
        assert_eq!(validate("-acme.com"), Err(DomainRejection::InvalidFormat));
        assert_eq!(validate("acme-.com"), Err(DomainRejection::InvalidFormat));
        assert_eq!(validate("acme.com/path"), Err(DomainRejection::InvalidFormat));
        assert_eq!(validate("acme..com"), Err(DomainRejection::InvalidFormat));
        assert_eq!(validate("acme.c0m"), Err(DomainRejection::InvalidFormat));
    }

    #[test]
    fn rejects_overlong() {
        let label = "a".repeat(63);
        let domain = format!("{label}.{label}.{label}.{label}.com");
        assert!(domain.len() > 253);
        assert_eq!(validate(&domain), Err(DomainRejection::TooLong));
    }

    #[test]
    fn extra_blocked_entry() {
        let blocked = BlockedDomains::default().with("app.example.com");
        assert_eq!(
            validate_custom_domain("acme.app.example.com", &blocked),
            Err(DomainRejection::Blocked)
        );
        assert!(validate_custom_domain("example.com", &blocked).is_ok());
    }
}
