//! # Currency Conversion and Formatting
//!
//! All engine arithmetic happens in the shop's base currency at full
//! precision. This module only deals with presentation:
//!
//! - [`LocalizedBreakdown`] multiplies every money line by an exchange rate
//!   the caller fetched elsewhere. No rate means no local figures; the rate
//!   is never defaulted to 1.0.
//! - [`format_amount`] renders an amount with the configured precision and
//!   code/symbol display. Rounding happens here and nowhere else.
//! - [`parse_rate_response`] decodes an exchange-rate provider payload.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::currency::format_amount;
//! use quote_core::settings::CurrencyDisplay;
//!
//! assert_eq!(format_amount(1234.5, "USD", 2, CurrencyDisplay::Code), "1,234.50 USD");
//! assert_eq!(format_amount(1234.5, "USD", 2, CurrencyDisplay::Symbol), "$1,234.50");
//! // Pesos without minor units ignore the requested precision
//! assert_eq!(format_amount(15999.6, "CLP", 2, CurrencyDisplay::Code), "16,000 CLP");
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{QuoteError, QuoteResult};
use crate::pricing::CostBreakdown;
use crate::settings::CurrencyDisplay;

/// Display metadata for a currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    /// ISO 4217 code
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    /// Digits after the decimal point in everyday use
    pub minor_units: u8,
}

/// Currencies the shop can quote in, base currency first.
pub static CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", symbol: "$", name: "US Dollar", minor_units: 2 },
    CurrencyInfo { code: "EUR", symbol: "€", name: "Euro", minor_units: 2 },
    CurrencyInfo { code: "ARS", symbol: "$", name: "Argentine Peso", minor_units: 2 },
    CurrencyInfo { code: "BOB", symbol: "Bs", name: "Bolivian Boliviano", minor_units: 2 },
    CurrencyInfo { code: "BRL", symbol: "R$", name: "Brazilian Real", minor_units: 2 },
    CurrencyInfo { code: "CLP", symbol: "$", name: "Chilean Peso", minor_units: 0 },
    CurrencyInfo { code: "COP", symbol: "$", name: "Colombian Peso", minor_units: 2 },
    CurrencyInfo { code: "MXN", symbol: "$", name: "Mexican Peso", minor_units: 2 },
    CurrencyInfo { code: "PEN", symbol: "S/", name: "Peruvian Sol", minor_units: 2 },
    CurrencyInfo { code: "PYG", symbol: "₲", name: "Paraguayan Guarani", minor_units: 0 },
    CurrencyInfo { code: "UYU", symbol: "$U", name: "Uruguayan Peso", minor_units: 2 },
];

static CURRENCY_INDEX: Lazy<HashMap<&'static str, &'static CurrencyInfo>> =
    Lazy::new(|| CURRENCIES.iter().map(|c| (c.code, c)).collect());

/// Look up display metadata by ISO code (case-insensitive).
pub fn currency_info(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCY_INDEX.get(code.trim().to_ascii_uppercase().as_str()).copied()
}

/// Decimal places to render for `code` given the shop's preference.
///
/// Currencies without minor units always render with 0 decimals; the
/// preference is capped at 4.
pub fn decimals_for(code: &str, preferred: usize) -> usize {
    match currency_info(code) {
        Some(info) if info.minor_units == 0 => 0,
        _ => preferred.min(4),
    }
}

/// Format an amount for display.
pub fn format_amount(amount: f64, code: &str, decimal_places: usize, display: CurrencyDisplay) -> String {
    let decimals = decimals_for(code, decimal_places);
    let code = code.trim().to_ascii_uppercase();
    let rendered = format!("{:.*}", decimals, amount.abs());
    let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
    let number = group_thousands(&rendered);

    match display {
        CurrencyDisplay::Code => format!("{}{} {}", sign, number, code),
        CurrencyDisplay::Symbol => {
            let symbol = currency_info(&code).map(|c| c.symbol).unwrap_or(code.as_str());
            format!("{}{}{}", sign, symbol, number)
        }
    }
}

/// Insert `,` separators into the integer part of an unsigned decimal string.
fn group_thousands(rendered: &str) -> String {
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 8);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// A breakdown's money lines converted into a local currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedBreakdown {
    /// Local currency code
    pub currency_code: String,

    /// Local units per 1 unit of base currency
    pub rate: f64,

    pub material_cost: f64,
    pub energy_cost: f64,
    pub machine_depreciation_cost: f64,
    pub labor_cost: f64,
    pub design_cost: f64,
    pub production_subtotal: f64,
    pub extra_costs_total: f64,
    pub cost_subtotal: f64,
    pub profit_amount: f64,
    pub total: f64,
}

impl LocalizedBreakdown {
    /// Convert every money line with `rate`.
    ///
    /// Returns `None` when no usable rate is available (absent, zero,
    /// negative or not finite).
    pub fn convert(breakdown: &CostBreakdown, rate: Option<f64>, currency_code: impl Into<String>) -> Option<Self> {
        let rate = rate.filter(|r| r.is_finite() && *r > 0.0)?;
        Some(LocalizedBreakdown {
            currency_code: currency_code.into(),
            rate,
            material_cost: breakdown.material_cost * rate,
            energy_cost: breakdown.energy_cost * rate,
            machine_depreciation_cost: breakdown.machine_depreciation_cost * rate,
            labor_cost: breakdown.labor_cost * rate,
            design_cost: breakdown.design_cost * rate,
            production_subtotal: breakdown.production_subtotal * rate,
            extra_costs_total: breakdown.extra_costs_total * rate,
            cost_subtotal: breakdown.cost_subtotal * rate,
            profit_amount: breakdown.profit_amount * rate,
            total: breakdown.total * rate,
        })
    }
}

/// A decoded exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub base: String,
    pub code: String,
    pub date: Option<NaiveDate>,
    /// Local units per 1 unit of base currency
    pub rate: f64,
}

#[derive(Deserialize)]
struct RateResponse {
    #[serde(default = "one")]
    amount: f64,
    base: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    rates: HashMap<String, f64>,
}

fn one() -> f64 {
    1.0
}

/// Decode a provider payload shaped like
/// `{"amount": 1.0, "base": "USD", "date": "2025-01-31", "rates": {"UYU": 43.7}}`
/// and pull out the rate for `code`.
pub fn parse_rate_response(json: &str, code: &str) -> QuoteResult<ExchangeRate> {
    let response: RateResponse = serde_json::from_str(json)?;
    let code = code.trim().to_ascii_uppercase();
    let quoted = response
        .rates
        .get(&code)
        .copied()
        .ok_or_else(|| QuoteError::invalid_input("rates", &code, "Currency not present in rate response"))?;
    if !(response.amount > 0.0) {
        return Err(QuoteError::invalid_input(
            "amount",
            response.amount.to_string(),
            "Base amount must be positive",
        ));
    }
    Ok(ExchangeRate {
        base: response.base,
        code,
        date: response.date,
        rate: quoted / response.amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_machines, default_materials};
    use crate::job::Job;
    use crate::pricing::calculate;
    use crate::settings::ShopSettings;

    fn sample_breakdown() -> CostBreakdown {
        let job = Job::new("Sample", "ender3_default")
            .with_part("pla_default_black", 100.0)
            .with_print_hours(2.0)
            .with_labor_hours(1.0)
            .with_design_fee(5.0)
            .with_extra_cost("Box", 1.0);
        calculate(&job, &default_materials(), &default_machines(), &ShopSettings::default()).unwrap()
    }

    #[test]
    fn test_convert_scales_every_line() {
        let b = sample_breakdown();
        let local = LocalizedBreakdown::convert(&b, Some(40.0), "UYU").unwrap();
        assert_eq!(local.currency_code, "UYU");
        assert_eq!(local.total, b.total * 40.0);
        assert_eq!(local.material_cost, b.material_cost * 40.0);
        assert_eq!(local.design_cost, b.design_cost * 40.0);
        assert_eq!(local.profit_amount, b.profit_amount * 40.0);
        assert_eq!(local.extra_costs_total, b.extra_costs_total * 40.0);

        let converted = serde_json::to_value(&local).unwrap();
        for (key, amount) in b.money_lines() {
            assert_eq!(converted[key].as_f64(), Some(amount * 40.0), "{}", key);
        }
    }

    #[test]
    fn test_convert_without_rate_is_omitted() {
        let b = sample_breakdown();
        assert!(LocalizedBreakdown::convert(&b, None, "UYU").is_none());
        assert!(LocalizedBreakdown::convert(&b, Some(0.0), "UYU").is_none());
        assert!(LocalizedBreakdown::convert(&b, Some(f64::NAN), "UYU").is_none());
    }

    #[test]
    fn test_format_code_and_symbol() {
        assert_eq!(format_amount(19.56255, "USD", 2, CurrencyDisplay::Code), "19.56 USD");
        assert_eq!(format_amount(0.0417, "USD", 3, CurrencyDisplay::Symbol), "$0.042");
        assert_eq!(format_amount(1234567.891, "uyu", 2, CurrencyDisplay::Symbol), "$U1,234,567.89");
        assert_eq!(format_amount(999.0, "EUR", 0, CurrencyDisplay::Code), "999 EUR");
    }

    #[test]
    fn test_format_negative_amounts() {
        assert_eq!(format_amount(-3.5, "USD", 2, CurrencyDisplay::Symbol), "-$3.50");
        assert_eq!(format_amount(-1500.0, "USD", 2, CurrencyDisplay::Code), "-1,500.00 USD");
        // Negative values that round to zero lose their sign
        assert_eq!(format_amount(-0.001, "USD", 2, CurrencyDisplay::Code), "0.00 USD");
    }

    #[test]
    fn test_zero_decimal_currencies() {
        assert_eq!(decimals_for("CLP", 2), 0);
        assert_eq!(decimals_for("PYG", 4), 0);
        assert_eq!(decimals_for("USD", 3), 3);
        assert_eq!(decimals_for("XYZ", 9), 4);
        assert_eq!(format_amount(250000.4, "PYG", 2, CurrencyDisplay::Symbol), "₲250,000");
    }

    #[test]
    fn test_unknown_currency_symbol_falls_back_to_code() {
        assert_eq!(format_amount(5.0, "XYZ", 2, CurrencyDisplay::Symbol), "XYZ5.00");
    }

    #[test]
    fn test_currency_lookup() {
        assert_eq!(currency_info("brl").unwrap().symbol, "R$");
        assert!(currency_info("GBP").is_none());
        assert_eq!(CURRENCIES[0].code, "USD");
    }

    #[test]
    fn test_parse_rate_response() {
        let json = r#"{"amount":1.0,"base":"USD","date":"2025-01-31","rates":{"UYU":43.7}}"#;
        let rate = parse_rate_response(json, "uyu").unwrap();
        assert_eq!(rate.code, "UYU");
        assert_eq!(rate.base, "USD");
        assert_eq!(rate.rate, 43.7);
        assert_eq!(rate.date, NaiveDate::from_ymd_opt(2025, 1, 31));
    }

    #[test]
    fn test_parse_rate_response_scales_by_amount() {
        let json = r#"{"amount":10.0,"base":"USD","rates":{"ARS":10500.0}}"#;
        let rate = parse_rate_response(json, "ARS").unwrap();
        assert_eq!(rate.rate, 1050.0);
        assert!(rate.date.is_none());
    }

    #[test]
    fn test_parse_rate_response_errors() {
        let json = r#"{"amount":1.0,"base":"USD","rates":{"UYU":43.7}}"#;
        let err = parse_rate_response(json, "BRL").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = parse_rate_response("not json", "UYU").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
