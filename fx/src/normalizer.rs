//! Normalization of upstream response bodies into rate sets.
//!
//! Upstream providers publish the same information under different field
//! names. Each known layout is one [`ResponseSchema`] variant; a body is read
//! with the first variant (in [`ResponseSchema::PRECEDENCE`] order) that
//! matches it, subject to the source's [`SchemaRule`].

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use xrate_common::{is_valid_rate, Currency, RateSet};

use crate::error::NormalizationError;
use crate::fetcher::RawBody;
use crate::source::{SchemaRule, SourceDescriptor};

/// Known upstream body layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSchema {
    /// `{ "rates": {..}, "base": "USD" }`
    Rates,
    /// `{ "conversion_rates": {..}, "base_code": "USD" }`
    ConversionRates,
    /// `{ "usd": {..} }`, always USD based
    UsdKeyed,
}

impl ResponseSchema {
    /// Order in which variants are tried when a source auto-detects.
    pub const PRECEDENCE: [ResponseSchema; 3] = [
        ResponseSchema::Rates,
        ResponseSchema::ConversionRates,
        ResponseSchema::UsdKeyed,
    ];

    /// Field holding the rate map.
    pub fn rates_field(self) -> &'static str {
        match self {
            ResponseSchema::Rates => "rates",
            ResponseSchema::ConversionRates => "conversion_rates",
            ResponseSchema::UsdKeyed => "usd",
        }
    }

    fn base_field(self) -> Option<&'static str> {
        match self {
            ResponseSchema::Rates => Some("base"),
            ResponseSchema::ConversionRates => Some("base_code"),
            ResponseSchema::UsdKeyed => None,
        }
    }

    /// Whether this variant can read the body.
    pub fn matches(self, body: &Map<String, Value>) -> bool {
        match self {
            ResponseSchema::Rates => {
                has_field(body, "rates")
                    && !has_field(body, "conversion_rates")
                    && !has_field(body, "usd")
            }
            ResponseSchema::ConversionRates => has_field(body, "conversion_rates"),
            ResponseSchema::UsdKeyed => has_field(body, "usd"),
        }
    }

    /// Read the body with this variant. Call only after [`Self::matches`].
    fn extract(self, body: &Map<String, Value>) -> Result<NormalizedRates, NormalizationError> {
        let field = self.rates_field();
        let raw_rates = body
            .get(field)
            .and_then(Value::as_object)
            .ok_or(NormalizationError::RatesNotAnObject(field))?;

        let base = self.base(body)?;

        let mut rates = RateSet::new();
        let mut skipped = 0usize;
        for (code, value) in raw_rates {
            let entry = Currency::parse(code)
                .ok()
                .zip(value.as_f64().filter(|v| is_valid_rate(*v)));
            match entry {
                Some((currency, rate)) => {
                    // Validated above, insert cannot fail.
                    let _ = rates.insert(currency, rate);
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(schema = ?self, skipped, "Skipped unusable rate entries");
        }

        if rates.is_empty() {
            return Err(NormalizationError::EmptyRates);
        }

        rates.ensure_base(&base);

        let date = body
            .get("date")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(NormalizedRates {
            rates,
            base,
            date,
            schema: self,
        })
    }

    fn base(self, body: &Map<String, Value>) -> Result<Currency, NormalizationError> {
        let value = self.base_field().and_then(|field| body.get(field));
        match value {
            None | Some(Value::Null) => Ok(Currency::usd()),
            Some(Value::String(code)) if code.is_empty() => Ok(Currency::usd()),
            Some(Value::String(code)) => {
                Currency::parse(code).map_err(|_| NormalizationError::InvalidBase(code.clone()))
            }
            Some(other) => Err(NormalizationError::InvalidBase(other.to_string())),
        }
    }
}

/// Canonical form of one upstream answer.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRates {
    /// Rates relative to `base`; `base` itself maps to 1.0.
    pub rates: RateSet,
    pub base: Currency,
    /// Date label published by the source, if any.
    pub date: Option<String>,
    /// Variant the body was read with.
    pub schema: ResponseSchema,
}

/// Read a raw upstream body as a rate table.
pub fn normalize(
    source: &SourceDescriptor,
    raw: &RawBody,
) -> Result<NormalizedRates, NormalizationError> {
    let body = raw.as_object().ok_or(NormalizationError::NotAnObject)?;

    let schema = match source.schema {
        SchemaRule::Detect => ResponseSchema::PRECEDENCE
            .into_iter()
            .find(|schema| schema.matches(body)),
        SchemaRule::Only(schema) => Some(schema).filter(|schema| schema.matches(body)),
    }
    .ok_or(NormalizationError::UnrecognizedSchema)?;

    schema.extract(body)
}

fn has_field(body: &Map<String, Value>, field: &str) -> bool {
    body.get(field).is_some_and(|value| !value.is_null())
}
