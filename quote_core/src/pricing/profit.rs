//! Profit / manual-override resolution.
//!
//! A job is priced either by applying the shop's margin over its cost, or
//! by a manual total entered on the job. In manual mode the profit is
//! back-derived and may be negative; it is never clamped.

use serde::{Deserialize, Serialize};

/// How the final price was reached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PricingMode {
    /// Margin percentage applied over the cost subtotal
    Percentage { margin_percent: f64 },
    /// Total supplied by the user; profit is whatever is left over
    Manual { final_price: f64 },
}

impl PricingMode {
    /// Pick the mode from a job's optional override.
    pub fn select(final_price_override: Option<f64>, margin_percent: f64) -> Self {
        match final_price_override {
            Some(final_price) => PricingMode::Manual { final_price },
            None => PricingMode::Percentage { margin_percent },
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, PricingMode::Manual { .. })
    }
}

/// Profit and total derived from a cost subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceResolution {
    pub profit_amount: f64,
    pub total: f64,
}

impl PriceResolution {
    /// Resolve the total for `cost_subtotal` under `mode`.
    ///
    /// In both modes `total == cost_subtotal + profit_amount`; in manual mode
    /// `total` is the override value bit-for-bit.
    pub fn resolve(mode: PricingMode, cost_subtotal: f64) -> Self {
        match mode {
            PricingMode::Percentage { margin_percent } => {
                let profit_amount = cost_subtotal * (margin_percent / 100.0);
                PriceResolution {
                    profit_amount,
                    total: cost_subtotal + profit_amount,
                }
            }
            PricingMode::Manual { final_price } => PriceResolution {
                profit_amount: final_price - cost_subtotal,
                total: final_price,
            },
        }
    }

    /// A manual price below cost
    pub fn is_loss(&self) -> bool {
        self.profit_amount < 0.0
    }
}
