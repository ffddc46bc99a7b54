//! Bounded TTL cache of custom-domain resolutions.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tenant_resolver_sdk::TenantInfo;

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A live entry. `None` is a cached negative result.
    Hit(Option<TenantInfo>),
    Miss,
}

#[derive(Debug, Clone)]
struct Entry {
    value: Option<TenantInfo>,
    expires_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

/// Process-local domain -> tenant cache.
///
/// Expired entries are never returned. When an insert pushes the size over
/// `max_entries`, expired entries are dropped first and then the oldest
/// inserted ones until the bound holds.
#[derive(Debug)]
pub struct DomainCache {
    ttl: chrono::Duration,
    max_entries: usize,
    inner: Mutex<Inner>,
}

impl DomainCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(1)),
            max_entries: max_entries.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    #[must_use]
    pub fn get(&self, domain: &str, now: DateTime<Utc>) -> CacheLookup {
        let mut inner = self.inner.lock();
        let live = inner
            .entries
            .get(domain)
            .map(|entry| (entry.expires_at > now).then(|| entry.value.clone()));
        match live {
            Some(Some(value)) => CacheLookup::Hit(value),
            Some(None) => {
                inner.entries.remove(domain);
                CacheLookup::Miss
            }
            None => CacheLookup::Miss,
        }
    }

    pub fn insert(&self, domain: &str, value: Option<TenantInfo>, now: DateTime<Utc>) {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            domain.to_owned(),
            Entry {
                value,
                expires_at: now + self.ttl,
                seq,
            },
        );

        if inner.entries.len() > self.max_entries {
            inner.entries.retain(|_, e| e.expires_at > now);
        }
        if inner.entries.len() > self.max_entries {
            let excess = inner.entries.len() - self.max_entries;
            let mut by_age: Vec<(u64, String)> = inner
                .entries
                .iter()
                .map(|(k, e)| (e.seq, k.clone()))
                .collect();
            by_age.sort_unstable_by_key(|(seq, _)| *seq);
            for (_, key) in by_age.into_iter().take(excess) {
                inner.entries.remove(&key);
            }
        }
    }

    pub fn invalidate(&self, domain: &str) {
        self.inner.lock().entries.remove(domain);
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use tenant_resolver_sdk::SubscriptionTier;
    use uuid::Uuid;

    use super::*;

    fn tenant(slug: &str) -> TenantInfo {
        TenantInfo {
            id: Uuid::new_v4(),
            slug: slug.to_owned(),
            name: slug.to_uppercase(),
            subscription_tier: SubscriptionTier::Free,
        }
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = DomainCache::new(Duration::from_secs(60), 10);
        let t0 = Utc::now();
        cache.insert("acme.com", Some(tenant("acme")), t0);

        assert!(matches!(
            cache.get("acme.com", t0 + chrono::Duration::seconds(59)),
            CacheLookup::Hit(Some(_))
        ));
        assert_eq!(
            cache.get("acme.com", t0 + chrono::Duration::seconds(60)),
            CacheLookup::Miss
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn negative_results_are_cached() {
        let cache = DomainCache::new(Duration::from_secs(60), 10);
        let now = Utc::now();
        cache.insert("unknown.com", None, now);
        assert_eq!(cache.get("unknown.com", now), CacheLookup::Hit(None));
    }

    #[test]
    fn over_bound_drops_expired_then_oldest() {
        let cache = DomainCache::new(Duration::from_secs(60), 2);
        let t0 = Utc::now();
        cache.insert("old.com", None, t0);

        let t1 = t0 + chrono::Duration::seconds(61);
        cache.insert("a.com", None, t1);
        cache.insert("b.com", None, t1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("old.com", t1), CacheLookup::Miss);

        cache.insert("c.com", None, t1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a.com", t1), CacheLookup::Miss);
        assert_eq!(cache.get("b.com", t1), CacheLookup::Hit(None));
        assert_eq!(cache.get("c.com", t1), CacheLookup::Hit(None));
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = DomainCache::new(Duration::from_secs(60), 10);
        let now = Utc::now();
        cache.insert("a.com", None, now);
        cache.insert("b.com", None, now);

        cache.invalidate("a.com");
        assert_eq!(cache.get("a.com", now), CacheLookup::Miss);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
