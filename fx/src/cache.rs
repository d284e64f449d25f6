//! Single-slot rate cache with TTL support.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;
use xrate_common::{Currency, RateSet, Timestamp};

/// One resolved rate table, as served to callers.
///
/// Entries are immutable once built; the cache swaps whole entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub rates: RateSet,
    pub base: Currency,
    /// Source-provided date label, or the capture date.
    pub date: String,
    /// Source URL, `"manual"` or `"fallback"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub fetched_at: Timestamp,
}

/// Check whether `entry` may be served without a fetch.
///
/// A TTL of zero or less is never fresh.
pub fn is_fresh(entry: Option<&CacheEntry>, ttl_seconds: i64, now: Timestamp) -> bool {
    if ttl_seconds <= 0 {
        return false;
    }
    match entry {
        Some(entry) => (now - entry.fetched_at).num_milliseconds() < ttl_seconds.saturating_mul(1000),
        None => false,
    }
}

/// Thread-safe holder of the most recent rate table.
#[derive(Debug, Default)]
pub struct RateCache {
    slot: RwLock<Option<Arc<CacheEntry>>>,
}

impl RateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current entry if it is fresh.
    pub fn fresh(&self, ttl_seconds: i64, now: Timestamp) -> Option<Arc<CacheEntry>> {
        let slot = self.slot.read();
        if is_fresh(slot.as_deref(), ttl_seconds, now) {
            debug!("Cache hit");
            slot.as_ref().map(Arc::clone)
        } else {
            debug!(populated = slot.is_some(), "Cache miss");
            None
        }
    }

    /// Get the current entry regardless of age.
    pub fn snapshot(&self) -> Option<Arc<CacheEntry>> {
        self.slot.read().as_ref().map(Arc::clone)
    }

    /// Check if the cache has never been written.
    pub fn is_empty(&self) -> bool {
        self.slot.read().is_none()
    }

    /// Replace the current entry.
    pub(crate) fn store(&self, entry: CacheEntry) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        *self.slot.write() = Some(Arc::clone(&entry));
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use xrate_common::now;

    fn make_entry(fetched_at: Timestamp) -> CacheEntry {
        CacheEntry {
            rates: RateSet::from_pairs([("EUR", 0.92), ("USD", 1.0)]).unwrap(),
            base: Currency::usd(),
            date: "2026-02-28".to_string(),
            source: Some("https://a.example".to_string()),
            is_fallback: false,
            warning: None,
            fetched_at,
        }
    }

    #[test]
    fn test_empty_cache_is_never_fresh() {
        let cache = RateCache::new();
        assert!(cache.is_empty());
        assert!(cache.fresh(3600, now()).is_none());
        assert!(!is_fresh(None, 3600, now()));
    }

    #[test]
    fn test_fresh_within_ttl() {
        let t0 = now();
        let entry = make_entry(t0);

        assert!(is_fresh(Some(&entry), 60, t0));
        assert!(is_fresh(Some(&entry), 60, t0 + Duration::seconds(59)));
        assert!(!is_fresh(Some(&entry), 60, t0 + Duration::seconds(60)));
        assert!(!is_fresh(Some(&entry), 60, t0 + Duration::minutes(5)));
    }

    #[test]
    fn test_zero_or_negative_ttl_never_fresh() {
        let t0 = now();
        let entry = make_entry(t0);

        assert!(!is_fresh(Some(&entry), 0, t0));
        assert!(!is_fresh(Some(&entry), -10, t0));
    }

    #[test]
    fn test_store_replaces_entry() {
        let cache = RateCache::new();
        let t0 = now();

        cache.store(make_entry(t0));
        let mut second = make_entry(t0);
        second.source = Some("manual".to_string());
        cache.store(second);

        let current = cache.fresh(60, t0).unwrap();
        assert_eq!(current.source.as_deref(), Some("manual"));
    }

    #[test]
    fn test_snapshot_ignores_age() {
        let cache = RateCache::new();
        let t0 = now();
        cache.store(make_entry(t0));

        assert!(cache.fresh(60, t0 + Duration::hours(2)).is_none());
        assert!(cache.snapshot().is_some());
    }

    proptest! {
        #[test]
        fn prop_non_positive_ttl_is_never_fresh(ttl in i64::MIN..=0, age in 0i64..1_000_000) {
            let t0 = now();
            let entry = make_entry(t0);
            prop_assert!(!is_fresh(Some(&entry), ttl, t0 + Duration::seconds(age)));
        }

        #[test]
        fn prop_fresh_iff_age_below_ttl(ttl in 1i64..100_000, age in 0i64..200_000) {
            let t0 = now();
            let entry = make_entry(t0);
            prop_assert_eq!(is_fresh(Some(&entry), ttl, t0 + Duration::seconds(age)), age < ttl);
        }
    }
}
