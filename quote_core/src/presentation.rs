//! Display helpers for cost summaries.
//!
//! These turn a [`CostBreakdown`] into labeled rows for a summary card or a
//! terminal table. They never add or round figures; every value comes
//! straight from the breakdown.

use serde::Serialize;

use crate::currency::format_amount;
use crate::pricing::{CostBreakdown, TariffMode};
use crate::settings::ShopSettings;

/// Visual weight of a summary row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Line,
    Subtotal,
    Total,
}

/// One labeled row of a cost summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub amount: f64,
    pub kind: RowKind,
}

impl SummaryRow {
    fn new(label: impl Into<String>, amount: f64, kind: RowKind) -> Self {
        SummaryRow {
            label: label.into(),
            amount,
            kind,
        }
    }

    /// Amount formatted with the shop's currency preferences
    pub fn formatted(&self, settings: &ShopSettings) -> String {
        let prefs = &settings.currency;
        format_amount(
            self.amount,
            &prefs.base_code,
            prefs.effective_decimal_places(),
            prefs.display,
        )
    }
}

/// Rows of a cost summary in display order.
///
/// Design and extra-cost rows only appear when positive; a negative
/// adjustment still counts in the subtotals. The profit row is
/// labeled with the margin in percentage mode and as adjusted when the job
/// carries a manual price.
pub fn summary_rows(breakdown: &CostBreakdown) -> Vec<SummaryRow> {
    let mut rows = vec![
        SummaryRow::new("Material", breakdown.material_cost, RowKind::Line),
        SummaryRow::new("Machine depreciation", breakdown.machine_depreciation_cost, RowKind::Line),
        SummaryRow::new("Energy", breakdown.energy_cost, RowKind::Line),
        SummaryRow::new("Labor", breakdown.labor_cost, RowKind::Line),
        SummaryRow::new("Production subtotal", breakdown.production_subtotal, RowKind::Subtotal),
    ];
    if breakdown.design_cost > 0.0 {
        rows.push(SummaryRow::new("Design", breakdown.design_cost, RowKind::Line));
    }
    if breakdown.extra_costs_total > 0.0 {
        rows.push(SummaryRow::new("Extra costs", breakdown.extra_costs_total, RowKind::Line));
    }
    rows.push(SummaryRow::new("Cost subtotal", breakdown.cost_subtotal, RowKind::Subtotal));
    rows.push(SummaryRow::new(profit_label(breakdown), breakdown.profit_amount, RowKind::Line));
    rows.push(SummaryRow::new("Total", breakdown.total, RowKind::Total));
    rows
}

/// "Profit (50%)" or "Profit (adjusted)"
pub fn profit_label(breakdown: &CostBreakdown) -> String {
    match breakdown.profit_margin_percent() {
        Some(margin) => format!("Profit ({}%)", margin),
        None => "Profit (adjusted)".to_string(),
    }
}

/// Describe the energy prices in force for a tariff mode.
pub fn tariff_description(mode: TariffMode, settings: &ShopSettings) -> String {
    let code = settings.currency.base_code.as_str();
    let display = settings.currency.display;
    let peak = format_amount(settings.peak_price_per_kwh, code, 3, display);
    let off_peak = format_amount(settings.off_peak_price_per_kwh, code, 3, display);
    let window = settings.peak_window.label();
    match mode {
        TariffMode::Peak => format!("Peak ({}): {}/kWh", window, peak),
        TariffMode::OffPeak => format!("Off-peak: {}/kWh", off_peak),
        TariffMode::Mixed => format!("Peak ({}): {}/kWh. Rest: {}/kWh", window, peak, off_peak),
    }
}
