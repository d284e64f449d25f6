//! Gateway error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use xrate_fx::FxError;

/// Generic message returned when rate resolution fails.
pub const RESOLUTION_FAILED: &str = "Failed to fetch exchange rates";

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed request input.
    #[error("{0}")]
    BadRequest(String),

    /// Rate resolution failed unexpectedly.
    #[error("Failed to fetch exchange rates")]
    Resolution,

    /// Any other server-side failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Resolution | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<FxError> for GatewayError {
    fn from(err: FxError) -> Self {
        match err {
            FxError::InvalidRates(_)
            | FxError::InvalidAmount(_)
            | FxError::RateNotAvailable(_)
            | FxError::Common(_) => GatewayError::BadRequest(err.to_string()),
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrate_common::{CommonError, Currency};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Resolution.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(GatewayError::Resolution.to_string(), RESOLUTION_FAILED);
    }

    #[test]
    fn test_fx_error_conversion() {
        let err: GatewayError = FxError::RateNotAvailable(Currency::eur()).into();
        assert!(matches!(err, GatewayError::BadRequest(ref m) if m == "Rate not available for EUR"));

        let err: GatewayError = FxError::Common(CommonError::DuplicateCurrency("eur".to_string())).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: GatewayError = FxError::AllSourcesExhausted { attempts: 3 }.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
