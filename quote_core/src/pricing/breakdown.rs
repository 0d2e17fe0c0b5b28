//! Itemized pricing output.
//!
//! `CostBreakdown` is the sole contract between the engine and its callers.
//! Every partial total is a stored field so presentation code never re-adds
//! lines and can never disagree with the engine.

use serde::{Deserialize, Serialize};

use super::profit::PricingMode;
use super::tariff::TariffSplit;
use crate::errors::QuoteError;

/// Cost contributed by one job part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartCost {
    pub part_id: String,

    pub material_id: String,

    /// Material display name; `None` when the material is no longer in the catalog
    pub material_name: Option<String>,

    pub grams: f64,

    /// Cost in base currency (0.0 for unresolved parts)
    pub cost: f64,
}

impl PartCost {
    /// Whether the part's material was found in the catalog
    pub fn is_resolved(&self) -> bool {
        self.material_name.is_some()
    }
}

/// Itemized cost breakdown and final price of a job, in base currency.
///
/// ## JSON Example
///
/// ```json
/// {
///   "material_cost": 2.0,
///   "energy_cost": 0.0417,
///   "machine_depreciation_cost": 1.0,
///   "labor_cost": 10.0,
///   "design_cost": 0.0,
///   "production_subtotal": 13.0417,
///   "extra_costs_total": 0.0,
///   "cost_subtotal": 13.0417,
///   "profit_amount": 6.52085,
///   "is_manual_price": false,
///   "total": 19.56255,
///   "pricing": { "mode": "percentage", "margin_percent": 50.0 },
///   "tariff": { "mode": "off-peak", "peak_hours": 0.0, "off_peak_hours": 2.0 },
///   "parts": [ ... ],
///   "unresolved_parts": 0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Filament cost across resolved parts
    pub material_cost: f64,

    /// Electricity drawn by the machine over the print
    pub energy_cost: f64,

    /// Machine wear charged per print hour
    pub machine_depreciation_cost: f64,

    /// Hands-on labor
    pub labor_cost: f64,

    /// One-time design fee
    pub design_cost: f64,

    /// material + depreciation + energy + labor
    pub production_subtotal: f64,

    /// Sum of ad-hoc extra costs
    pub extra_costs_total: f64,

    /// production + design + extras
    pub cost_subtotal: f64,

    /// total - cost_subtotal; negative for a loss-making manual price
    pub profit_amount: f64,

    /// Profit was back-derived from a manual total rather than the margin
    pub is_manual_price: bool,

    /// Final price
    pub total: f64,

    /// Pricing branch taken
    pub pricing: PricingMode,

    /// Peak / off-peak allocation of print time
    pub tariff: TariffSplit,

    /// Per-part material costs in job order
    pub parts: Vec<PartCost>,

    /// Parts whose material is missing from the catalog
    pub unresolved_parts: usize,
}

impl CostBreakdown {
    /// Margin percent applied, `None` in manual mode
    pub fn profit_margin_percent(&self) -> Option<f64> {
        match self.pricing {
            PricingMode::Percentage { margin_percent } => Some(margin_percent),
            PricingMode::Manual { .. } => None,
        }
    }

    /// Manual price below cost
    pub fn is_loss(&self) -> bool {
        self.profit_amount < 0.0
    }

    /// The money lines of the breakdown in display order, with stable keys.
    pub fn money_lines(&self) -> [(&'static str, f64); 10] {
        [
            ("material_cost", self.material_cost),
            ("machine_depreciation_cost", self.machine_depreciation_cost),
            ("energy_cost", self.energy_cost),
            ("labor_cost", self.labor_cost),
            ("production_subtotal", self.production_subtotal),
            ("design_cost", self.design_cost),
            ("extra_costs_total", self.extra_costs_total),
            ("cost_subtotal", self.cost_subtotal),
            ("profit_amount", self.profit_amount),
            ("total", self.total),
        ]
    }
}

/// Result of a traced engine run.
///
/// The trace is produced even when the job cannot be priced, so the
/// editing surface can show what is still missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCalculation {
    pub breakdown: Option<CostBreakdown>,

    /// Why there is no breakdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<QuoteError>,

    /// Human-readable log of every intermediate value and branch taken
    pub trace: Vec<String>,
}
