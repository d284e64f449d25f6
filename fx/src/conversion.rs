//! Currency conversion over a rate set.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use xrate_common::{Currency, RateSet};

use crate::error::{FxError, FxResult};

/// Decimal places kept on the quoted cross rate.
const RATE_DECIMAL_PLACES: u32 = 6;

/// Cross rate `from -> to`: units of `to` per one unit of `from`.
pub fn cross_rate(rates: &RateSet, from: &Currency, to: &Currency) -> FxResult<f64> {
    if from == to {
        return Ok(1.0);
    }
    let from_rate = rates
        .get(from)
        .ok_or_else(|| FxError::RateNotAvailable(from.clone()))?;
    let to_rate = rates
        .get(to)
        .ok_or_else(|| FxError::RateNotAvailable(to.clone()))?;
    Ok(to_rate / from_rate)
}

/// A completed currency conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    /// Input amount.
    pub amount: Decimal,
    pub from: Currency,
    pub to: Currency,
    /// Quoted cross rate.
    pub rate: Decimal,
    /// Output amount, rounded to the target currency's decimal places.
    pub result: Decimal,
}

impl Conversion {
    /// Convert `amount` of `from` into `to` using the given rate set.
    pub fn compute(
        rates: &RateSet,
        amount: Decimal,
        from: Currency,
        to: Currency,
    ) -> FxResult<Self> {
        if amount.is_sign_negative() {
            return Err(FxError::InvalidAmount(format!("{amount} is negative")));
        }

        let rate = cross_rate(rates, &from, &to)?;
        let rate = Decimal::from_f64(rate)
            .ok_or_else(|| FxError::InvalidRates(format!("rate {rate} is not representable")))?;
        let result = amount
            .checked_mul(rate)
            .ok_or_else(|| FxError::InvalidAmount(format!("{amount} {from} overflows in {to}")))?
            .round_dp(to.decimal_places());

        Ok(Self {
            amount,
            from,
            to,
            rate: rate.round_dp(RATE_DECIMAL_PLACES),
            result,
        })
    }
}
