//! HTTP routes for the rate gateway.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;
use xrate_common::{currency_info, Currency, RateSet, SUPPORTED_CURRENCIES};
use xrate_fx::{CacheEntry, Conversion, Resolution};

use crate::error::GatewayError;
use crate::state::AppState;

const INVALID_RATES: &str = "Invalid rates data";

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rates", get(get_rates).post(post_rates))
        .route("/convert", get(convert))
        .route("/currencies", get(currencies))
        .route("/health", get(health))
        .with_state(state)
}

/// Query of `GET /convert`.
#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuery {
    pub amount: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize)]
struct RatesBody<'a> {
    success: bool,
    #[serde(flatten)]
    entry: &'a CacheEntry,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertBody<'a> {
    success: bool,
    #[serde(flatten)]
    conversion: &'a Conversion,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<&'static str>,
    base: &'a Currency,
    date: &'a str,
    is_fallback: bool,
}

fn rates_response(entry: &CacheEntry) -> Response {
    Json(RatesBody {
        success: true,
        entry,
    })
    .into_response()
}

/// Run one resolution on its own task.
///
/// A client disconnect drops the handler future but not the task, so a
/// cycle that has started fetching still writes the cache.
async fn resolve(state: &AppState, force_refresh: bool) -> Result<Resolution, GatewayError> {
    let resolver = Arc::clone(&state.resolver);
    tokio::spawn(async move { resolver.resolve(force_refresh).await })
        .await
        .map_err(|e| {
            error!(error = %e, "Rate resolution task failed");
            GatewayError::Resolution
        })
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn get_rates(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, GatewayError> {
    // Any `refresh` key forces a refetch, whatever its value or repeat count.
    let Query(pairs) = query.map_err(bad_query)?;
    let force_refresh = pairs.iter().any(|(key, _)| key == "refresh");
    let resolution = resolve(&state, force_refresh).await?;

    debug!(
        force_refresh,
        state = ?resolution.state,
        attempts = resolution.attempts,
        "Rates resolved"
    );
    Ok(rates_response(&resolution.entry))
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn post_rates(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(body) = payload.map_err(|e| {
        warn!(error = %e, "Rejected manual rates body");
        GatewayError::BadRequest(INVALID_RATES.to_string())
    })?;

    let rates = body
        .get("rates")
        .filter(|rates| rates.is_object())
        .ok_or_else(|| GatewayError::BadRequest(INVALID_RATES.to_string()))?;
    let rates = RateSet::deserialize(rates)
        .map_err(|e| GatewayError::BadRequest(format!("{INVALID_RATES}: {e}")))?;

    let entry = state.resolver.install_manual(rates)?;
    Ok(rates_response(&entry))
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn convert(
    State(state): State<AppState>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let Query(query) = query.map_err(bad_query)?;
    let amount: Decimal = required(&query.amount, "amount")?
        .trim()
        .parse()
        .map_err(|_| GatewayError::BadRequest("amount must be a decimal number".to_string()))?;
    let from = currency_param(&query.from, "from")?;
    let to = currency_param(&query.to, "to")?;

    let resolution = resolve(&state, false).await?;
    let entry = &resolution.entry;
    let conversion = Conversion::compute(&entry.rates, amount, from, to)?;

    Ok(Json(ConvertBody {
        success: true,
        conversion: &conversion,
        symbol: currency_info(conversion.to.code()).map(|info| info.symbol),
        base: &entry.base,
        date: &entry.date,
        is_fallback: entry.is_fallback,
    })
    .into_response())
}

async fn currencies() -> Json<Value> {
    Json(json!({
        "success": true,
        "currencies": SUPPORTED_CURRENCIES,
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.resolver.cache_status(),
        "stats": state.resolver.stats(),
    }))
}

fn bad_query(rejection: QueryRejection) -> GatewayError {
    warn!(error = %rejection, "Rejected query string");
    GatewayError::BadRequest(format!("invalid query string: {}", rejection.body_text()))
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, GatewayError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GatewayError::BadRequest(format!("missing query parameter `{name}`")))
}

fn currency_param(value: &Option<String>, name: &str) -> Result<Currency, GatewayError> {
    Currency::parse(required(value, name)?).map_err(|e| GatewayError::BadRequest(e.to_string()))
}
