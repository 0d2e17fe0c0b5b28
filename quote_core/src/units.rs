//! # Unit Types
//!
//! Type-safe wrappers for the physical quantities that feed a quote. These
//! keep grams from being multiplied by a per-kilogram price and watts from
//! being billed as kilowatts, while serializing as plain numbers.
//!
//! ## Units
//!
//! - Mass: grams (g), kilograms (kg)
//! - Power: watts (W), kilowatts (kW)
//! - Time: hours (h, fractional)
//! - Energy: kilowatt-hours (kWh)
//!
//! Money is deliberately left as bare `f64` in the shop's base currency.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::units::{Grams, Hours, Kilograms, KilowattHours, Watts};
//!
//! let mass: Kilograms = Grams(250.0).into();
//! assert_eq!(mass.0, 0.25);
//!
//! let energy: KilowattHours = Watts(150.0).energy_over(Hours(2.0));
//! assert!((energy.0 - 0.3).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Mass Units
// ============================================================================

/// Mass in grams
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grams(pub f64);

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

impl From<Grams> for Kilograms {
    fn from(g: Grams) -> Self {
        Kilograms(g.0 / 1000.0)
    }
}

impl From<Kilograms> for Grams {
    fn from(kg: Kilograms) -> Self {
        Grams(kg.0 * 1000.0)
    }
}

// ============================================================================
// Power Units
// ============================================================================

/// Average power draw in watts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f64);

/// Average power draw in kilowatts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilowatts(pub f64);

impl From<Watts> for Kilowatts {
    fn from(w: Watts) -> Self {
        Kilowatts(w.0 / 1000.0)
    }
}

impl From<Kilowatts> for Watts {
    fn from(kw: Kilowatts) -> Self {
        Watts(kw.0 * 1000.0)
    }
}

impl Watts {
    /// Energy drawn when running at this power for `hours`
    pub fn energy_over(self, hours: Hours) -> KilowattHours {
        Kilowatts::from(self) * hours
    }
}

// ============================================================================
// Time and Energy
// ============================================================================

/// Duration in fractional hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hours(pub f64);

/// Energy in kilowatt-hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilowattHours(pub f64);

impl Mul<Hours> for Kilowatts {
    type Output = KilowattHours;
    fn mul(self, rhs: Hours) -> Self::Output {
        KilowattHours(self.0 * rhs.0)
    }
}

impl Hours {
    /// Build a fractional duration from whole hours, minutes and seconds,
    /// the way the job form collects print time.
    pub fn from_hms(hours: f64, minutes: f64, seconds: f64) -> Self {
        Hours(hours + minutes / 60.0 + seconds / 3600.0)
    }

    /// Split into whole hours, minutes and rounded seconds for display.
    ///
    /// Seconds that round up to 60 carry into the minutes (and hours).
    pub fn to_hms(self) -> (u32, u32, u32) {
        if !(self.0 > 0.0) {
            return (0, 0, 0);
        }
        let total_seconds = (self.0 * 3600.0).round() as u64;
        let h = total_seconds / 3600;
        let m = (total_seconds % 3600) / 60;
        let s = total_seconds % 60;
        (h as u32, m as u32, s as u32)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Grams);
impl_arithmetic!(Kilograms);
impl_arithmetic!(Watts);
impl_arithmetic!(Kilowatts);
impl_arithmetic!(Hours);
impl_arithmetic!(KilowattHours);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grams_to_kilograms() {
        let kg: Kilograms = Grams(100.0).into();
        assert_eq!(kg.0, 0.1);
        let g: Grams = Kilograms(1.5).into();
        assert_eq!(g.0, 1500.0);
    }

    #[test]
    fn test_energy_over_hours() {
        let kwh = Watts(200.0).energy_over(Hours(3.0));
        assert!((kwh.0 - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_from_hms() {
        let h = Hours::from_hms(1.0, 30.0, 0.0);
        assert_eq!(h.0, 1.5);
        let h = Hours::from_hms(0.0, 0.0, 36.0);
        assert!((h.0 - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_to_hms() {
        assert_eq!(Hours(2.5).to_hms(), (2, 30, 0));
        assert_eq!(Hours::from_hms(3.0, 12.0, 45.0).to_hms(), (3, 12, 45));
        assert_eq!(Hours(0.0).to_hms(), (0, 0, 0));
        assert_eq!(Hours(-1.0).to_hms(), (0, 0, 0));
        // 59.9999 minutes rounds into a full hour
        assert_eq!(Hours(0.9999999).to_hms(), (1, 0, 0));
    }

    #[test]
    fn test_arithmetic() {
        let a = Hours(10.0);
        let b = Hours(4.0);
        assert_eq!((a + b).0, 14.0);
        assert_eq!((a - b).0, 6.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let g = Grams(12.5);
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!(json, "12.5");

        let roundtrip: Grams = serde_json::from_str(&json).unwrap();
        assert_eq!(g, roundtrip);
    }
}
