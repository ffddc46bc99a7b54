//! Domain models for the tenant resolver module.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an organization (tenant).
pub type OrganizationId = Uuid;

/// Subscription tier carried on the tenant for downstream feature gating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl SubscriptionTier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }

    /// Parses the stored representation. Unknown values map to `Free`.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        match value {
            "starter" => Self::Starter,
            "professional" => Self::Professional,
            "enterprise" => Self::Enterprise,
            _ => Self::Free,
        }
    }
}

/// A tenant organization as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    /// Lowercase alphanumeric label, 3-63 chars. Immutable and globally unique.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub subscription_tier: SubscriptionTier,
    /// Fully-qualified custom domain, unique across organizations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub custom_domain_verified: bool,
    /// Operator override that serves the domain without DNS proof.
    #[serde(default)]
    pub custom_domain_bypass_verification: bool,
    /// Token the organization must publish as a TXT record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain_txt_value: Option<String>,
}

impl Organization {
    /// Creates an organization without a custom domain.
    #[must_use]
    pub fn new(id: OrganizationId, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            name: name.into(),
            subscription_tier: SubscriptionTier::Free,
            custom_domain: None,
            custom_domain_verified: false,
            custom_domain_bypass_verification: false,
            custom_domain_txt_value: None,
        }
    }

    /// Whether requests on `custom_domain` should resolve to this organization.
    #[must_use]
    pub fn serves_custom_domain(&self) -> bool {
        self.custom_domain.is_some()
            && (self.custom_domain_verified || self.custom_domain_bypass_verification)
    }

    #[must_use]
    pub fn tenant_info(&self) -> TenantInfo {
        TenantInfo {
            id: self.id,
            slug: self.slug.clone(),
            name: self.name.clone(),
            subscription_tier: self.subscription_tier,
        }
    }
}

/// Tenant identity handed to request handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantInfo {
    pub id: OrganizationId,
    pub slug: String,
    pub name: String,
    pub subscription_tier: SubscriptionTier,
}

impl From<&Organization> for TenantInfo {
    fn from(org: &Organization) -> Self {
        org.tenant_info()
    }
}

/// Why a custom domain was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainRejection {
    /// Nothing left after normalization.
    Empty,
    /// Shorter than 4 characters.
    TooShort,
    /// Longer than 253 characters.
    TooLong,
    /// Not a valid DNS name.
    InvalidFormat,
    /// Platform-owned, hosting provider or otherwise reserved domain.
    Blocked,
}

impl fmt::Display for DomainRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Empty => "Domain is required",
            Self::TooShort => "Domain is too short",
            Self::TooLong => "Domain is too long (max 253 characters)",
            Self::InvalidFormat => "Invalid domain format",
            Self::Blocked => "This domain cannot be used as a custom domain",
        };
        f.write_str(msg)
    }
}

/// Why a slug was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugRejection {
    TooShort,
    TooLong,
    /// Contains anything other than `a-z` and `0-9`.
    InvalidCharacters,
    Reserved,
}

impl fmt::Display for SlugRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::TooShort => "Subdomain must be at least 3 characters",
            Self::TooLong => "Subdomain must be at most 63 characters",
            Self::InvalidCharacters => "Subdomain may only contain lowercase letters and numbers",
            Self::Reserved => "This subdomain is reserved",
        };
        f.write_str(msg)
    }
}

/// Outcome of an audited DNS ownership check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    /// The attempt was rejected before any DNS work.
    pub rate_limited: bool,
    /// Seconds until another attempt is allowed. Set only when `rate_limited`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
    /// Human-readable reason when `verified` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// TXT values observed across both lookup targets, for operator debugging.
    #[serde(default)]
    pub observed_records: Vec<String>,
}

impl VerificationOutcome {
    #[must_use]
    pub fn rate_limited(retry_after_seconds: u64) -> Self {
        Self {
            verified: false,
            rate_limited: true,
            retry_after_seconds: Some(retry_after_seconds),
            error: Some(format!(
                "Too many verification attempts. Try again in {retry_after_seconds} seconds."
            )),
            observed_records: Vec::new(),
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// A pending custom-domain claim with the DNS record to publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainClaim {
    pub organization_id: OrganizationId,
    /// Normalized domain.
    pub domain: String,
    /// Host name where the TXT record may be published (alternative to the bare domain).
    pub txt_record_name: String,
    pub txt_record_value: String,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn bypass_serves_unverified_domain() {
        let mut org = Organization::new(Uuid::new_v4(), "acme", "Acme");
        org.custom_domain = Some("acme.com".to_owned());
        assert!(!org.serves_custom_domain());

        org.custom_domain_bypass_verification = true;
        assert!(org.serves_custom_domain());
    }

    #[test]
    fn flags_without_domain_do_not_serve() {
        let mut org = Organization::new(Uuid::new_v4(), "acme", "Acme");
        org.custom_domain_verified = true;
        assert!(!org.serves_custom_domain());
    }

    #[test]
    fn tier_round_trips_through_storage_form() {
        for tier in [
            SubscriptionTier::Free,
            SubscriptionTier::Starter,
            SubscriptionTier::Professional,
            SubscriptionTier::Enterprise,
        ] {
            assert_eq!(SubscriptionTier::from_stored(tier.as_str()), tier);
        }
        assert_eq!(SubscriptionTier::from_stored("platinum"), SubscriptionTier::Free);
    }

    #[test]
    fn outcome_serializes_without_empty_optionals() {
        let json = serde_json::to_value(VerificationOutcome::failed("nope")).unwrap();
        assert_eq!(json["verified"], false);
        assert!(json.get("retry_after_seconds").is_none());
    }
}
