//! Display metadata for the currencies offered to the converter UI.

use serde::Serialize;

/// Display information for a supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    /// ISO 4217 code
    pub code: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Display symbol
    pub symbol: &'static str,
}

/// Currencies offered by the converter, in display order.
pub const SUPPORTED_CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", name: "US Dollar", symbol: "$" },
    CurrencyInfo { code: "EUR", name: "Euro", symbol: "€" },
    CurrencyInfo { code: "GBP", name: "British Pound", symbol: "£" },
    CurrencyInfo { code: "JPY", name: "Japanese Yen", symbol: "¥" },
    CurrencyInfo { code: "CAD", name: "Canadian Dollar", symbol: "C$" },
    CurrencyInfo { code: "AUD", name: "Australian Dollar", symbol: "A$" },
    CurrencyInfo { code: "CHF", name: "Swiss Franc", symbol: "CHF" },
    CurrencyInfo { code: "CNY", name: "Chinese Yuan", symbol: "¥" },
    CurrencyInfo { code: "INR", name: "Indian Rupee", symbol: "₹" },
    CurrencyInfo { code: "KRW", name: "South Korean Won", symbol: "₩" },
];

/// Look up display information by code (case-insensitive).
pub fn currency_info(code: &str) -> Option<&'static CurrencyInfo> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|info| info.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Currency;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let info = currency_info("gbp").unwrap();
        assert_eq!(info.name, "British Pound");
        assert_eq!(info.symbol, "£");
    }

    #[test]
    fn test_unknown_code() {
        assert!(currency_info("XYZ").is_none());
    }

    #[test]
    fn test_catalogue_codes_are_valid_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for info in SUPPORTED_CURRENCIES {
            assert!(Currency::parse(info.code).is_ok(), "{} should parse", info.code);
            assert!(seen.insert(info.code), "{} listed twice", info.code);
        }
    }
}
