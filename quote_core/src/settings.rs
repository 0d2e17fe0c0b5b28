//! # Shop Settings
//!
//! Shop-wide economic parameters and display preferences. A single
//! `ShopSettings` value is threaded into every engine call; nothing in this
//! crate keeps it in a global.
//!
//! ## Structure
//!
//! ```text
//! ShopSettings
//! ├── labor_rate_per_hour, profit_margin_percent
//! ├── peak_price_per_kwh, off_peak_price_per_kwh
//! ├── peak_window: TariffWindow (display only)
//! ├── currency: CurrencyPreferences
//! └── company: CompanyInfo
//! ```
//!
//! Every field has a default, so a partial settings object loads cleanly:
//!
//! ```rust
//! use quote_core::settings::ShopSettings;
//!
//! let settings: ShopSettings = serde_json::from_str(r#"{ "labor_rate_per_hour": 12.5 }"#).unwrap();
//! assert_eq!(settings.labor_rate_per_hour, 12.5);
//! assert_eq!(settings.profit_margin_percent, 50.0);
//! ```

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Shop-wide pricing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSettings {
    /// Labor rate charged per hour of hands-on work
    pub labor_rate_per_hour: f64,

    /// Profit margin applied over cost, in percent (50.0 = 50 %)
    pub profit_margin_percent: f64,

    /// Energy price per kWh inside the peak window
    pub peak_price_per_kwh: f64,

    /// Energy price per kWh outside the peak window
    pub off_peak_price_per_kwh: f64,

    /// Peak tariff window, shown to the user but not used in arithmetic
    pub peak_window: TariffWindow,

    /// Currency display preferences
    pub currency: CurrencyPreferences,

    /// Company details printed on quotes
    pub company: CompanyInfo,
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            labor_rate_per_hour: 10.0,
            profit_margin_percent: 50.0,
            peak_price_per_kwh: 0.2,
            off_peak_price_per_kwh: 0.1,
            peak_window: TariffWindow::default(),
            currency: CurrencyPreferences::default(),
            company: CompanyInfo::default(),
        }
    }
}

/// Daily peak-tariff window, shown next to the tariff prices.
///
/// Pricing never reads it: a job states its own peak hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for TariffWindow {
    fn default() -> Self {
        TariffWindow {
            start: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl TariffWindow {
    /// "HH:MM - HH:MM"
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Whether amounts render with the ISO code or the currency symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyDisplay {
    #[default]
    Code,
    Symbol,
}

/// Currency display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyPreferences {
    /// ISO code of the base currency all catalog costs are entered in
    pub base_code: String,

    /// ISO code of the local currency quotes are also shown in, if any
    pub local_code: Option<String>,

    /// Decimal places for base-currency amounts (0 to 4)
    pub decimal_places: u8,

    /// Code or symbol
    pub display: CurrencyDisplay,
}

impl Default for CurrencyPreferences {
    fn default() -> Self {
        CurrencyPreferences {
            base_code: "USD".to_string(),
            local_code: None,
            decimal_places: 2,
            display: CurrencyDisplay::Code,
        }
    }
}

impl CurrencyPreferences {
    /// Decimal places clamped to the supported range
    pub fn effective_decimal_places(&self) -> usize {
        usize::from(self.decimal_places.min(4))
    }
}

/// Company details shown on quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    pub name: String,
    pub contact: String,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        CompanyInfo {
            name: "Cotiza3D".to_string(),
            contact: "you@example.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = ShopSettings::default();
        assert_eq!(settings.labor_rate_per_hour, 10.0);
        assert_eq!(settings.profit_margin_percent, 50.0);
        assert_eq!(settings.peak_price_per_kwh, 0.2);
        assert_eq!(settings.off_peak_price_per_kwh, 0.1);
        assert_eq!(settings.currency.base_code, "USD");
        assert_eq!(settings.currency.decimal_places, 2);
    }

    #[test]
    fn test_settings_roundtrip() {
        let mut settings = ShopSettings::default();
        settings.currency.local_code = Some("UYU".to_string());
        settings.currency.display = CurrencyDisplay::Symbol;
        let json = serde_json::to_string_pretty(&settings).unwrap();
        assert!(json.contains("\"symbol\""));
        let roundtrip: ShopSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, settings);
    }

    #[test]
    fn test_window_label() {
        assert_eq!(TariffWindow::default().label(), "18:00 - 22:00");
        let overnight = TariffWindow { start: hm(22, 0), end: hm(6, 30) };
        assert_eq!(overnight.label(), "22:00 - 06:30");
    }

    #[test]
    fn test_window_from_json() {
        let settings: ShopSettings =
            serde_json::from_str(r#"{ "peak_window": { "start": "17:30:00", "end": "21:00:00" } }"#).unwrap();
        assert_eq!(settings.peak_window.label(), "17:30 - 21:00");
    }

    #[test]
    fn test_decimal_places_clamped() {
        let prefs = CurrencyPreferences { decimal_places: 9, ..Default::default() };
        assert_eq!(prefs.effective_decimal_places(), 4);
    }
}
