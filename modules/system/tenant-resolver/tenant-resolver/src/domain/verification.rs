//! TXT-record domain ownership proof.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Number of digest bytes kept in a token (32 hex characters).
const TOKEN_DIGEST_BYTES: usize = 16;

/// DNS TXT lookup capability.
#[async_trait]
pub trait TxtResolver: Send + Sync {
    /// Returns every TXT value published at `name`, with multi-string
    /// records concatenated.
    ///
    /// # Errors
    ///
    /// Returns an error for NXDOMAIN, SERVFAIL and transport failures.
    async fn lookup_txt(&self, name: &str) -> anyhow::Result<Vec<String>>;
}

/// Builds `<prefix><32 hex>` from a SHA-256 over the organization id, the
/// current time and 16 random bytes.
#[must_use]
pub fn generate_token(prefix: &str, organization_id: Uuid, now: DateTime<Utc>) -> String {
    let salt: [u8; 16] = rand::random();

    let mut hasher = Sha256::new();
    hasher.update(organization_id.as_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
    hasher.update(salt);
    let digest = hasher.finalize();

    format!("{prefix}{}", hex::encode(&digest[..TOKEN_DIGEST_BYTES]))
}

/// Result of checking both TXT targets for a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxtVerification {
    pub verified: bool,
    pub reason: Option<String>,
    /// Trimmed TXT values from both targets, bare domain first.
    pub observed: Vec<String>,
}

/// Looks up TXT records at `domain` and `verification_host` concurrently and
/// matches `expected` by exact trimmed comparison.
///
/// Each lookup runs under its own `timeout`. A failed or timed-out target is
/// logged and the other target still counts.
pub async fn verify_txt(
    resolver: &dyn TxtResolver,
    domain: &str,
    verification_host: &str,
    expected: &str,
    timeout: Duration,
) -> TxtVerification {
    let expected = expected.trim();
    if expected.is_empty() {
        return TxtVerification {
            reason: Some("No verification token configured".to_owned()),
            ..TxtVerification::default()
        };
    }

    let (bare, alt) = tokio::join!(
        lookup_with_timeout(resolver, domain, timeout),
        lookup_with_timeout(resolver, verification_host, timeout),
    );

    let lookups_failed = bare.is_none() && alt.is_none();
    let observed: Vec<String> = bare
        .into_iter()
        .chain(alt)
        .flatten()
        .map(|v| v.trim().to_owned())
        .collect();

    if observed.iter().any(|v| v == expected) {
        return TxtVerification {
            verified: true,
            reason: None,
            observed,
        };
    }

    let reason = if lookups_failed {
        format!("DNS lookup failed for {domain} and {verification_host}")
    } else if observed.is_empty() {
        format!("No TXT records found for {domain} or {verification_host}")
    } else {
        "Verification token not found in TXT records".to_owned()
    };

    TxtVerification {
        verified: false,
        reason: Some(reason),
        observed,
    }
}

async fn lookup_with_timeout(
    resolver: &dyn TxtResolver,
    name: &str,
    timeout: Duration,
) -> Option<Vec<String>> {
    match tokio::time::timeout(timeout, resolver.lookup_txt(name)).await {
        Ok(Ok(values)) => Some(values),
        Ok(Err(e)) => {
            tracing::debug!(name = %name, error = %e, "TXT lookup failed");
            None
        }
        Err(_) => {
            tracing::warn!(name = %name, timeout_ms = timeout.as_millis(), "TXT lookup timed out");
            None
        }
    }
}
