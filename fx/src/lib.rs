//! xrate FX Engine
//!
//! Exchange-rate acquisition and caching for the currency converter.
//!
//! # Features
//!
//! - Ordered upstream rate sources tried one at a time, each bounded by a timeout
//! - Normalization of heterogeneous upstream response schemas
//! - Single-slot rate cache with a configurable TTL and forced-refresh bypass
//! - Static fallback dataset when every source fails
//! - Ratio conversion between any two currencies in a rate set
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xrate_fx::{HttpFetcher, RateResolver, ResolverConfig};
//!
//! let resolver = RateResolver::new(Arc::new(HttpFetcher::default()), ResolverConfig::default());
//!
//! // Cached when fresh, otherwise walks the source list
//! let resolution = resolver.resolve(false).await;
//! println!("{} rates from {:?}", resolution.entry.rates.len(), resolution.entry.source);
//! ```

pub mod cache;
pub mod conversion;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod normalizer;
pub mod resolver;
pub mod source;

pub use cache::{is_fresh, CacheEntry, RateCache};
pub use conversion::{cross_rate, Conversion};
pub use error::{FetchError, FxError, FxResult, NormalizationError};
pub use fallback::{FallbackDataset, FALLBACK_SOURCE, FALLBACK_WARNING};
pub use fetcher::{HttpFetcher, RawBody, SourceFetcher};
pub use normalizer::{normalize, NormalizedRates, ResponseSchema};
pub use resolver::{
    CacheStatus, RateResolver, Resolution, ResolveState, ResolverConfig, ResolverStats, MANUAL_SOURCE,
};
pub use source::{default_sources, SchemaRule, SourceDescriptor};

#[cfg(any(test, feature = "test-utils"))]
pub use fetcher::MockFetcher;
