//! # Tariff Splitting
//!
//! Allocates a job's print time between the peak and off-peak energy tariffs
//! and prices the energy drawn in each band.
//!
//! ## Modes
//!
//! - `peak` - every print hour is billed at the peak price
//! - `off-peak` - every print hour is billed at the off-peak price
//! - `mixed` - the job states how many of its hours fall inside the peak
//!   window; the rest are off-peak
//!
//! ## Example
//!
//! ```rust
//! use quote_core::pricing::tariff::{TariffMode, TariffSplit};
//!
//! // Stale input: 5 peak hours claimed on a 2 hour print
//! let split = TariffSplit::split(TariffMode::Mixed, 2.0, 5.0);
//! assert_eq!(split.peak_hours, 2.0);
//! assert_eq!(split.off_peak_hours, 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::units::{Hours, Watts};

/// Which energy-price schedule applies to a job's print time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TariffMode {
    /// Entire print runs inside the peak window
    Peak,
    /// Entire print runs outside the peak window
    #[default]
    OffPeak,
    /// Part of the print falls inside the peak window
    Mixed,
}

impl TariffMode {
    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            TariffMode::Peak => "Peak",
            TariffMode::OffPeak => "Off-peak",
            TariffMode::Mixed => "Mixed",
        }
    }

    /// Wire code, identical to the serialized form
    pub fn code(&self) -> &'static str {
        match self {
            TariffMode::Peak => "peak",
            TariffMode::OffPeak => "off-peak",
            TariffMode::Mixed => "mixed",
        }
    }

    /// Parse a wire code, accepting the spellings found in older records.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "peak" => Some(TariffMode::Peak),
            "off-peak" | "offpeak" | "off_peak" => Some(TariffMode::OffPeak),
            "mixed" => Some(TariffMode::Mixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TariffMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Print hours allocated to each tariff band.
///
/// Invariant: `peak_hours + off_peak_hours == total print hours` and
/// `0 <= peak_hours <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffSplit {
    /// Mode that produced this split
    pub mode: TariffMode,

    /// Hours billed at the peak price
    pub peak_hours: f64,

    /// Hours billed at the off-peak price
    pub off_peak_hours: f64,
}

impl TariffSplit {
    /// Split `total_hours` according to `mode`.
    ///
    /// `peak_hours_within_total` is only read in mixed mode; it is clamped to
    /// `[0, total_hours]` so a stale value can never bill more peak time than
    /// the print actually takes.
    pub fn split(mode: TariffMode, total_hours: f64, peak_hours_within_total: f64) -> Self {
        let (peak_hours, off_peak_hours) = match mode {
            TariffMode::Peak => (total_hours, 0.0),
            TariffMode::OffPeak => (0.0, total_hours),
            TariffMode::Mixed => {
                // f64::max ignores NaN, so a garbage value collapses to 0
                let peak = peak_hours_within_total.max(0.0).min(total_hours);
                (peak, total_hours - peak)
            }
        };
        TariffSplit {
            mode,
            peak_hours,
            off_peak_hours,
        }
    }

    /// Total hours across both bands
    pub fn total_hours(&self) -> f64 {
        self.peak_hours + self.off_peak_hours
    }

    /// Energy cost for a machine drawing `power` over this split.
    ///
    /// `energy = kW * (peak_h * peak_price + off_peak_h * off_peak_price)`
    pub fn energy_cost(&self, power: Watts, peak_price_per_kwh: f64, off_peak_price_per_kwh: f64) -> f64 {
        let peak_kwh = power.energy_over(Hours(self.peak_hours));
        let off_peak_kwh = power.energy_over(Hours(self.off_peak_hours));
        peak_kwh.value() * peak_price_per_kwh + off_peak_kwh.value() * off_peak_price_per_kwh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_mode_bills_everything_at_peak() {
        let split = TariffSplit::split(TariffMode::Peak, 3.5, 1.0);
        assert_eq!(split.peak_hours, 3.5);
        assert_eq!(split.off_peak_hours, 0.0);
    }

    #[test]
    fn test_off_peak_mode_ignores_peak_hours() {
        let split = TariffSplit::split(TariffMode::OffPeak, 3.5, 2.0);
        assert_eq!(split.peak_hours, 0.0);
        assert_eq!(split.off_peak_hours, 3.5);
    }

    #[test]
    fn test_mixed_mode_split() {
        let split = TariffSplit::split(TariffMode::Mixed, 6.0, 2.0);
        assert_eq!(split.peak_hours, 2.0);
        assert_eq!(split.off_peak_hours, 4.0);
    }

    #[test]
    fn test_mixed_mode_clamps_to_total() {
        let split = TariffSplit::split(TariffMode::Mixed, 2.0, 5.0);
        assert_eq!(split.peak_hours, 2.0);
        assert_eq!(split.off_peak_hours, 0.0);
    }

    #[test]
    fn test_mixed_mode_negative_and_nan_peak_hours() {
        let split = TariffSplit::split(TariffMode::Mixed, 2.0, -1.0);
        assert_eq!(split.peak_hours, 0.0);
        assert_eq!(split.off_peak_hours, 2.0);

        let split = TariffSplit::split(TariffMode::Mixed, 2.0, f64::NAN);
        assert_eq!(split.peak_hours, 0.0);
        assert_eq!(split.off_peak_hours, 2.0);
    }

    #[test]
    fn test_mixed_split_invariant() {
        let totals = [0.1, 0.75, 1.0, 2.0, 7.3, 19.99, 100.0];
        let peaks = [-3.0, 0.0, 0.05, 0.5, 1.0, 2.0, 7.3, 50.0, 1e9];
        for &total in &totals {
            for &peak in &peaks {
                let split = TariffSplit::split(TariffMode::Mixed, total, peak);
                assert!(split.peak_hours >= 0.0);
                assert!(split.peak_hours <= total);
                assert!((split.total_hours() - total).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_energy_cost_off_peak() {
        // 150 W for 2 h at 0.139/kWh
        let split = TariffSplit::split(TariffMode::OffPeak, 2.0, 0.0);
        let cost = split.energy_cost(Watts(150.0), 0.351, 0.139);
        assert!((cost - 0.0417).abs() < 1e-9);
    }

    #[test]
    fn test_energy_cost_mixed() {
        // 200 W: 1 h peak at 0.3, 3 h off-peak at 0.1 -> 0.2 * (0.3 + 0.3)
        let split = TariffSplit::split(TariffMode::Mixed, 4.0, 1.0);
        let cost = split.energy_cost(Watts(200.0), 0.3, 0.1);
        assert!((cost - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(serde_json::to_string(&TariffMode::OffPeak).unwrap(), "\"off-peak\"");
        for mode in [TariffMode::Peak, TariffMode::OffPeak, TariffMode::Mixed] {
            assert_eq!(TariffMode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(TariffMode::from_code("OffPeak"), Some(TariffMode::OffPeak));
        assert_eq!(TariffMode::from_code("night"), None);
    }
}
