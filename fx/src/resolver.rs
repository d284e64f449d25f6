//! Rate resolver: cache policy, sequential source walk and fallback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use xrate_common::{age_seconds, date_label, Clock, Currency, RateSet, SystemClock};

use crate::cache::{is_fresh, CacheEntry, RateCache};
use crate::error::{FxError, FxResult};
use crate::fallback::FallbackDataset;
use crate::fetcher::SourceFetcher;
use crate::normalizer::{normalize, NormalizedRates};
use crate::source::{default_sources, SourceDescriptor};

/// Source identifier of manually installed entries.
pub const MANUAL_SOURCE: &str = "manual";

/// Configuration for the rate resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Cache TTL in seconds; zero or less disables caching.
    pub ttl_seconds: i64,
    /// Upstream sources in priority order.
    pub sources: Vec<SourceDescriptor>,
    /// Rates served when every source fails.
    pub fallback: FallbackDataset,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 3600,
            sources: default_sources(),
            fallback: FallbackDataset::default(),
        }
    }
}

/// Resolution states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveState {
    /// Fresh cached entry returned without network access.
    CacheHit,
    /// Attempting the source at this index.
    Fetching(usize),
    /// Every source failed; fallback entry installed.
    AllSourcesFailed,
    /// A source answered; live entry installed.
    Resolved,
}

/// Outcome of one call to [`RateResolver::resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    pub entry: Arc<CacheEntry>,
    /// Terminal state reached.
    pub state: ResolveState,
    /// Number of source attempts made.
    pub attempts: usize,
}

/// Point-in-time resolver counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverStats {
    pub cache_hits: u64,
    pub fetch_attempts: u64,
    pub fetch_failures: u64,
    pub live_resolutions: u64,
    pub fallbacks: u64,
    pub manual_overrides: u64,
}

#[derive(Debug, Default)]
struct Counters {
    cache_hits: AtomicU64,
    fetch_attempts: AtomicU64,
    fetch_failures: AtomicU64,
    live_resolutions: AtomicU64,
    fallbacks: AtomicU64,
    manual_overrides: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ResolverStats {
        ResolverStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            fetch_attempts: self.fetch_attempts.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            live_resolutions: self.live_resolutions.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            manual_overrides: self.manual_overrides.load(Ordering::Relaxed),
        }
    }
}

/// Cache state as reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub populated: bool,
    pub fresh: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<i64>,
}

/// Owner of the process-wide rate cache.
///
/// The cache is written only by [`Self::resolve`] and
/// [`Self::install_manual`]. No lock is held while a source is being
/// fetched, so concurrent forced refreshes may each fetch; the last write
/// wins and every write swaps a whole entry.
pub struct RateResolver {
    fetcher: Arc<dyn SourceFetcher>,
    cache: RateCache,
    clock: Arc<dyn Clock>,
    config: ResolverConfig,
    counters: Counters,
}

impl RateResolver {
    /// Create a resolver using the system clock.
    pub fn new(fetcher: Arc<dyn SourceFetcher>, config: ResolverConfig) -> Self {
        Self {
            fetcher,
            cache: RateCache::new(),
            clock: Arc::new(SystemClock),
            config,
            counters: Counters::default(),
        }
    }

    /// Use a custom clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the current rate table, fetching when the cache cannot answer.
    ///
    /// Never fails: when every source fails the fallback dataset is
    /// installed and returned with `is_fallback` set.
    #[instrument(skip(self), fields(ttl_seconds = self.config.ttl_seconds))]
    pub async fn resolve(&self, force_refresh: bool) -> Resolution {
        if !force_refresh {
            if let Some(entry) = self.cache.fresh(self.config.ttl_seconds, self.clock.now()) {
                Counters::bump(&self.counters.cache_hits);
                debug!(source = ?entry.source, "Serving cached rates");
                return Resolution {
                    entry,
                    state: ResolveState::CacheHit,
                    attempts: 0,
                };
            }
        }

        for (index, source) in self.config.sources.iter().enumerate() {
            let state = ResolveState::Fetching(index);
            Counters::bump(&self.counters.fetch_attempts);

            match self.attempt(source).await {
                Ok(normalized) => {
                    let entry = self.cache.store(self.live_entry(source, normalized));
                    Counters::bump(&self.counters.live_resolutions);
                    info!(
                        source = %source.url,
                        base = %entry.base,
                        currencies = entry.rates.len(),
                        "Resolved live rates"
                    );
                    return Resolution {
                        entry,
                        state: ResolveState::Resolved,
                        attempts: index + 1,
                    };
                }
                Err(e) => {
                    Counters::bump(&self.counters.fetch_failures);
                    warn!(
                        state = ?state,
                        source = %source.url,
                        error = %e,
                        "Rate source failed"
                    );
                }
            }
        }

        let attempts = self.config.sources.len();
        let exhausted = FxError::AllSourcesExhausted { attempts };
        warn!(error = %exhausted, "Serving fallback rates");

        let entry = self.cache.store(self.config.fallback.entry(self.clock.now()));
        Counters::bump(&self.counters.fallbacks);

        Resolution {
            entry,
            state: ResolveState::AllSourcesFailed,
            attempts,
        }
    }

    /// Install externally supplied USD-based rates, bypassing every source.
    ///
    /// Rates are stored as given; a USD entry, if present, must be 1.0.
    #[instrument(skip(self, rates), fields(currencies = rates.len()))]
    pub fn install_manual(&self, rates: RateSet) -> FxResult<Arc<CacheEntry>> {
        if rates.is_empty() {
            return Err(FxError::InvalidRates("rate set is empty".to_string()));
        }

        let base = Currency::usd();
        if let Some(value) = rates.get(&base).filter(|v| *v != 1.0) {
            return Err(FxError::InvalidRates(format!(
                "base currency {base} must map to 1.0, got {value}"
            )));
        }

        let now = self.clock.now();
        let entry = self.cache.store(CacheEntry {
            rates,
            base,
            date: date_label(now),
            source: Some(MANUAL_SOURCE.to_string()),
            is_fallback: false,
            warning: None,
            fetched_at: now,
        });
        Counters::bump(&self.counters.manual_overrides);

        info!("Installed manual rates");
        Ok(entry)
    }

    /// Get resolver counters.
    pub fn stats(&self) -> ResolverStats {
        self.counters.snapshot()
    }

    /// Describe the cache without touching it.
    pub fn cache_status(&self) -> CacheStatus {
        let now = self.clock.now();
        match self.cache.snapshot() {
            Some(entry) => CacheStatus {
                populated: true,
                fresh: is_fresh(Some(entry.as_ref()), self.config.ttl_seconds, now),
                source: entry.source.clone(),
                age_seconds: Some(age_seconds(entry.fetched_at, now)),
            },
            None => CacheStatus {
                populated: false,
                fresh: false,
                source: None,
                age_seconds: None,
            },
        }
    }

    async fn attempt(&self, source: &SourceDescriptor) -> FxResult<NormalizedRates> {
        let raw = self.fetcher.fetch(&source.url).await?;
        Ok(normalize(source, &raw)?)
    }

    fn live_entry(&self, source: &SourceDescriptor, normalized: NormalizedRates) -> CacheEntry {
        let now = self.clock.now();
        CacheEntry {
            rates: normalized.rates,
            base: normalized.base,
            date: normalized.date.unwrap_or_else(|| date_label(now)),
            source: Some(source.url.clone()),
            is_fallback: false,
            warning: None,
            fetched_at: now,
        }
    }
}
