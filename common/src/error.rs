//! Error types shared across xrate crates.

use thiserror::Error;

/// Errors raised while constructing shared value types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommonError {
    /// Text that is not a 3-4 letter currency code.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// A rate that is not a positive finite number.
    #[error("Invalid rate for {currency}: {value}")]
    InvalidRate { currency: String, value: f64 },

    /// Two keys naming the same currency once normalized.
    #[error("Duplicate currency code: {0:?}")]
    DuplicateCurrency(String),
}

/// Result type alias for common operations.
pub type Result<T> = std::result::Result<T, CommonError>;
