//! Currency codes and rate sets.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{CommonError, Result};

/// Currency code: 3 or 4 uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parse a currency code. Input is upper-cased before validation.
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim().to_ascii_uppercase();
        let valid = (3..=4).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_uppercase());
        if !valid {
            return Err(CommonError::InvalidCurrency(code));
        }
        Ok(Self(code))
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Get the standard decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "VND" => 0,
            "BHD" | "KWD" | "OMR" => 3,
            _ => 2,
        }
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    pub fn gbp() -> Self {
        Self("GBP".to_string())
    }

    pub fn jpy() -> Self {
        Self("JPY".to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Currency {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CommonError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// Check that a multiplier is usable as a rate.
pub fn is_valid_rate(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Units of each currency per one unit of the base currency.
///
/// Every stored value is a positive finite number. Which currency is the
/// base is tracked by the owner of the set, not by the set itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RateSet(BTreeMap<Currency, f64>);

impl RateSet {
    /// Create an empty rate set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(code, rate)` pairs, rejecting any invalid entry.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut rates = Self::new();
        for (code, value) in pairs {
            rates.insert(Currency::parse(code)?, value)?;
        }
        Ok(rates)
    }

    /// Insert or replace a rate.
    pub fn insert(&mut self, currency: Currency, value: f64) -> Result<()> {
        if !is_valid_rate(value) {
            return Err(CommonError::InvalidRate {
                currency: currency.code().to_string(),
                value,
            });
        }
        self.0.insert(currency, value);
        Ok(())
    }

    /// Get the rate for a currency.
    pub fn get(&self, currency: &Currency) -> Option<f64> {
        self.0.get(currency).copied()
    }

    /// Check whether a currency has a rate.
    pub fn contains(&self, currency: &Currency) -> bool {
        self.0.contains_key(currency)
    }

    /// Force the base currency's own rate to exactly 1.0.
    pub fn ensure_base(&mut self, base: &Currency) {
        self.0.insert(base.clone(), 1.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}

impl<'a> IntoIterator for &'a RateSet {
    type Item = (&'a Currency, &'a f64);
    type IntoIter = btree_map::Iter<'a, Currency, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for RateSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        let mut rates = RateSet::new();
        for (code, value) in raw {
            let currency = Currency::parse(&code).map_err(serde::de::Error::custom)?;
            // "eur" and "EUR" name the same currency.
            if rates.contains(&currency) {
                return Err(serde::de::Error::custom(CommonError::DuplicateCurrency(code)));
            }
            rates.insert(currency, value).map_err(serde::de::Error::custom)?;
        }
        Ok(rates)
    }
}
