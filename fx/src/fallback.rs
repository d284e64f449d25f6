//! Static rates served when no upstream source answers.

use xrate_common::{date_label, Currency, RateSet, Timestamp};

use crate::cache::CacheEntry;

/// Warning attached to every fallback entry.
pub const FALLBACK_WARNING: &str = "Using cached fallback rates. Live rates are unavailable.";

/// Source identifier of fallback entries.
pub const FALLBACK_SOURCE: &str = "fallback";

const FALLBACK_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 149.50),
    ("CAD", 1.36),
    ("AUD", 1.53),
    ("CHF", 0.88),
    ("CNY", 7.24),
    ("INR", 83.12),
    ("KRW", 1319.50),
];

/// Fixed USD-based rate table.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDataset {
    rates: RateSet,
}

impl Default for FallbackDataset {
    fn default() -> Self {
        let mut rates = RateSet::new();
        for (code, value) in FALLBACK_RATES {
            if let Ok(currency) = Currency::parse(code) {
                let _ = rates.insert(currency, *value);
            }
        }
        Self { rates }
    }
}

impl FallbackDataset {
    /// Base currency of the dataset.
    pub fn base(&self) -> Currency {
        Currency::usd()
    }

    pub fn rates(&self) -> &RateSet {
        &self.rates
    }

    /// Build the cache entry served when every source failed.
    pub fn entry(&self, now: Timestamp) -> CacheEntry {
        CacheEntry {
            rates: self.rates.clone(),
            base: self.base(),
            date: date_label(now),
            source: Some(FALLBACK_SOURCE.to_string()),
            is_fallback: true,
            warning: Some(FALLBACK_WARNING.to_string()),
            fetched_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_default_dataset_contents() {
        let dataset = FallbackDataset::default();
        let rates = dataset.rates();

        assert_eq!(rates.len(), 10);
        assert_eq!(rates.get(&Currency::usd()), Some(1.0));
        assert_eq!(rates.get(&Currency::eur()), Some(0.92));
        assert_eq!(rates.get(&Currency::jpy()), Some(149.50));
        assert_eq!(rates.get(&Currency::parse("KRW").unwrap()), Some(1319.50));
    }

    #[test]
    fn test_fallback_entry() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let entry = FallbackDataset::default().entry(now);

        assert!(entry.is_fallback);
        assert_eq!(entry.base, Currency::usd());
        assert_eq!(entry.date, "2026-10-18");
        assert_eq!(entry.warning.as_deref(), Some(FALLBACK_WARNING));
        assert_eq!(entry.source.as_deref(), Some("fallback"));
        assert_eq!(entry.fetched_at, now);
    }
}
