//! FX engine error types.

use std::time::Duration;

use thiserror::Error;
use xrate_common::{CommonError, Currency};

/// Failure of one attempt against one upstream source.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// No complete response within the per-attempt bound.
    #[error("Request to {url} timed out after {}ms", .after.as_millis())]
    Timeout { url: String, after: Duration },

    /// Upstream answered with a non-2xx status.
    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Connection, TLS or protocol failure.
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Response body was not JSON.
    #[error("Response from {url} is not valid JSON: {message}")]
    InvalidBody { url: String, message: String },
}

impl FetchError {
    /// URL of the source that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::InvalidBody { url, .. } => url,
        }
    }
}

/// A body that cannot be read as a rate table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizationError {
    /// Top-level JSON value is not an object.
    #[error("Response body is not a JSON object")]
    NotAnObject,

    /// No known schema variant matches the body.
    #[error("Unrecognized response schema")]
    UnrecognizedSchema,

    /// The rates field is present but is not an object.
    #[error("Field `{0}` is not a rate map")]
    RatesNotAnObject(&'static str),

    /// The base field does not hold a currency code.
    #[error("Invalid base currency: {0}")]
    InvalidBase(String),

    /// No usable entries remained after filtering.
    #[error("Response contains no usable rates")]
    EmptyRates,
}

/// Errors that can occur in the FX engine.
#[derive(Debug, Error)]
pub enum FxError {
    /// One source failed to answer.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// One source answered with an unusable body.
    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    /// Every configured source failed.
    #[error("All {attempts} rate sources failed")]
    AllSourcesExhausted { attempts: usize },

    /// Externally supplied rates were rejected.
    #[error("Invalid rates: {0}")]
    InvalidRates(String),

    /// Amount that cannot be converted.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Rate missing for a requested currency.
    #[error("Rate not available for {0}")]
    RateNotAvailable(Currency),

    /// Invalid currency or rate value.
    #[error(transparent)]
    Common(#[from] CommonError),
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages() {
        let timeout = FetchError::Timeout {
            url: "https://a.example/latest".to_string(),
            after: Duration::from_millis(1500),
        };
        assert_eq!(timeout.to_string(), "Request to https://a.example/latest timed out after 1500ms");
        assert_eq!(timeout.url(), "https://a.example/latest");

        let status = FetchError::Status {
            url: "https://b.example".to_string(),
            status: 503,
        };
        assert_eq!(status.to_string(), "Request to https://b.example returned HTTP 503");
    }

    #[test]
    fn test_fx_error_from_conversions() {
        let err: FxError = NormalizationError::EmptyRates.into();
        assert!(matches!(err, FxError::Normalization(NormalizationError::EmptyRates)));

        let err: FxError = CommonError::InvalidCurrency("E1".to_string()).into();
        assert_eq!(err.to_string(), "Invalid currency code: \"E1\"");
    }
}
