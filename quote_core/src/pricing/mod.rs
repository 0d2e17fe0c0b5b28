//! # Pricing Engine
//!
//! Turns a [`Job`] plus a catalog snapshot and the shop settings into an
//! itemized [`CostBreakdown`]. The calculation is a single synchronous pass:
//!
//! 1. Resolve the job's machine (hard failure if missing) and each part's
//!    material (unresolved parts are skipped and contribute zero)
//! 2. Aggregate material, depreciation, energy, labor and design lines
//! 3. Split print time between peak and off-peak tariffs ([`tariff`])
//! 4. Apply the profit margin, or honour a manual total ([`profit`])
//! 5. Assemble the breakdown and a human-readable trace
//!
//! Nothing here performs I/O or keeps state between calls, so identical
//! inputs always produce identical breakdowns.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::catalog::{default_machines, default_materials};
//! use quote_core::job::Job;
//! use quote_core::pricing::calculate;
//! use quote_core::settings::ShopSettings;
//!
//! let job = Job::new("Bracket", "ender3_default")
//!     .with_part("pla_default_black", 100.0)
//!     .with_print_hours(2.0)
//!     .with_labor_hours(1.0);
//!
//! let breakdown = calculate(&job, &default_materials(), &default_machines(), &ShopSettings::default())
//!     .expect("machine exists and print time is positive");
//!
//! assert_eq!(breakdown.total, breakdown.cost_subtotal + breakdown.profit_amount);
//! ```

pub mod breakdown;
pub mod profit;
pub mod tariff;

pub use breakdown::{CostBreakdown, CostCalculation, PartCost};
pub use profit::{PriceResolution, PricingMode};
pub use tariff::{TariffMode, TariffSplit};

use tracing::{debug, warn};

use crate::catalog::{find_machine, find_material, Machine, Material};
use crate::errors::{QuoteError, QuoteResult};
use crate::job::Job;
use crate::settings::ShopSettings;
use crate::units::{Grams, Kilograms, Watts};

/// Price a job, returning `None` when it cannot be priced yet
/// (unknown machine or non-positive print time).
pub fn calculate(
    job: &Job,
    materials: &[Material],
    machines: &[Machine],
    settings: &ShopSettings,
) -> Option<CostBreakdown> {
    try_calculate(job, materials, machines, settings).ok()
}

/// Price a job, reporting why it cannot be priced.
///
/// # Returns
///
/// * `Ok(CostBreakdown)` - Itemized price
/// * `Err(QuoteError::MissingMachine)` - Machine id absent from `machines`
/// * `Err(QuoteError::InvalidDuration)` - `print_hours <= 0`
pub fn try_calculate(
    job: &Job,
    materials: &[Material],
    machines: &[Machine],
    settings: &ShopSettings,
) -> QuoteResult<CostBreakdown> {
    price_job(job, materials, machines, settings, &mut Trace::disabled())
}

/// Price a job and keep the step-by-step trace for audit display.
pub fn calculate_with_trace(
    job: &Job,
    materials: &[Material],
    machines: &[Machine],
    settings: &ShopSettings,
) -> CostCalculation {
    let mut trace = Trace::enabled();
    let (breakdown, failure) = match price_job(job, materials, machines, settings, &mut trace) {
        Ok(breakdown) => (Some(breakdown), None),
        Err(err) => {
            trace.push(|| format!("No breakdown: {}", err));
            (None, Some(err))
        }
    };
    CostCalculation {
        breakdown,
        failure,
        trace: trace.into_lines(),
    }
}

/// Collects trace lines only when asked to, so untraced calls skip the formatting.
struct Trace {
    lines: Option<Vec<String>>,
}

impl Trace {
    fn enabled() -> Self {
        Trace { lines: Some(Vec::new()) }
    }

    fn disabled() -> Self {
        Trace { lines: None }
    }

    fn push(&mut self, line: impl FnOnce() -> String) {
        if let Some(lines) = self.lines.as_mut() {
            lines.push(line());
        }
    }

    fn into_lines(self) -> Vec<String> {
        self.lines.unwrap_or_default()
    }
}

fn price_job(
    job: &Job,
    materials: &[Material],
    machines: &[Machine],
    settings: &ShopSettings,
    trace: &mut Trace,
) -> QuoteResult<CostBreakdown> {
    // Reference resolution
    let machine = find_machine(machines, &job.machine_id).ok_or_else(|| {
        debug!(job_id = %job.id, machine_id = %job.machine_id, "machine not in catalog");
        QuoteError::missing_machine(&job.machine_id)
    })?;
    trace.push(|| {
        format!(
            "Machine: {} ({}/h depreciation, {} W)",
            machine.name, machine.cost_per_hour, machine.power_watts
        )
    });

    let print_hours = job.print_hours;
    if !(print_hours > 0.0) {
        debug!(job_id = %job.id, print_hours, "non-positive print time");
        return Err(QuoteError::invalid_duration(print_hours));
    }
    trace.push(|| format!("Print time: {} h", print_hours));

    // Material
    let mut parts = Vec::with_capacity(job.parts.len());
    let mut unresolved_parts = 0;
    for part in &job.parts {
        let part_cost = match find_material(materials, &part.material_id) {
            Some(material) => {
                let kg: Kilograms = Grams(part.grams).into();
                let cost = kg.value() * material.cost_per_kg;
                trace.push(|| {
                    format!(
                        "Part {}: {} g of {} at {}/kg = {}",
                        part.id, part.grams, material.name, material.cost_per_kg, cost
                    )
                });
                PartCost {
                    part_id: part.id.clone(),
                    material_id: part.material_id.clone(),
                    material_name: Some(material.name.clone()),
                    grams: part.grams,
                    cost,
                }
            }
            None => {
                unresolved_parts += 1;
                warn!(job_id = %job.id, material_id = %part.material_id, "unresolved material reference, part skipped");
                trace.push(|| {
                    format!(
                        "Part {}: material '{}' not found, skipped (0)",
                        part.id, part.material_id
                    )
                });
                PartCost {
                    part_id: part.id.clone(),
                    material_id: part.material_id.clone(),
                    material_name: None,
                    grams: part.grams,
                    cost: 0.0,
                }
            }
        };
        parts.push(part_cost);
    }
    let material_cost = parts.iter().fold(0.0, |acc, p| acc + p.cost);
    trace.push(|| format!("Material cost: {}", material_cost));

    // Machine depreciation
    let machine_depreciation_cost = machine.cost_per_hour * print_hours;
    trace.push(|| {
        format!(
            "Machine depreciation: {} x {} h = {}",
            machine.cost_per_hour, print_hours, machine_depreciation_cost
        )
    });

    // Energy
    let split = TariffSplit::split(job.tariff, print_hours, job.peak_hours);
    // NaN compares unequal, so a NaN request is reported as clamped too
    if job.tariff == TariffMode::Mixed && split.peak_hours != job.peak_hours {
        trace.push(|| {
            format!(
                "Peak hours clamped from {} to {} (allowed 0 to {} h)",
                job.peak_hours, split.peak_hours, print_hours
            )
        });
    }
    trace.push(|| {
        format!(
            "Tariff {}: {} h peak at {}/kWh, {} h off-peak at {}/kWh",
            split.mode,
            split.peak_hours,
            settings.peak_price_per_kwh,
            split.off_peak_hours,
            settings.off_peak_price_per_kwh
        )
    });
    let energy_cost = split.energy_cost(
        Watts(machine.power_watts),
        settings.peak_price_per_kwh,
        settings.off_peak_price_per_kwh,
    );
    trace.push(|| format!("Energy cost: {} kW -> {}", machine.power_watts / 1000.0, energy_cost));

    // Labor
    let labor_cost = settings.labor_rate_per_hour * job.labor_hours;
    trace.push(|| {
        format!(
            "Labor: {}/h x {} h = {}",
            settings.labor_rate_per_hour, job.labor_hours, labor_cost
        )
    });

    let production_subtotal = material_cost + machine_depreciation_cost + energy_cost + labor_cost;
    trace.push(|| format!("Production subtotal: {}", production_subtotal));

    let design_cost = job.design_fee;
    let extra_costs_total = job.extra_costs.iter().fold(0.0, |acc, c| acc + c.amount);
    let cost_subtotal = production_subtotal + design_cost + extra_costs_total;
    trace.push(|| {
        format!(
            "Design fee: {}, extra costs ({}): {}",
            design_cost,
            job.extra_costs.len(),
            extra_costs_total
        )
    });
    trace.push(|| format!("Cost subtotal: {}", cost_subtotal));

    // Profit / override
    let pricing = PricingMode::select(job.final_price_override, settings.profit_margin_percent);
    let resolution = PriceResolution::resolve(pricing, cost_subtotal);
    match pricing {
        PricingMode::Percentage { margin_percent } => trace.push(|| {
            format!(
                "Profit at {}% margin: {}",
                margin_percent, resolution.profit_amount
            )
        }),
        PricingMode::Manual { final_price } => {
            trace.push(|| {
                format!(
                    "Manual price {}: adjusted profit {}",
                    final_price, resolution.profit_amount
                )
            });
            if resolution.is_loss() {
                warn!(job_id = %job.id, profit = resolution.profit_amount, "manual price below cost");
                trace.push(|| "Manual price is below cost".to_string());
            }
        }
    }
    trace.push(|| format!("Total: {}", resolution.total));

    debug!(
        job_id = %job.id,
        cost_subtotal,
        total = resolution.total,
        manual = pricing.is_manual(),
        "job priced"
    );

    Ok(CostBreakdown {
        material_cost,
        energy_cost,
        machine_depreciation_cost,
        labor_cost,
        design_cost,
        production_subtotal,
        extra_costs_total,
        cost_subtotal,
        profit_amount: resolution.profit_amount,
        is_manual_price: pricing.is_manual(),
        total: resolution.total,
        pricing,
        tariff: split,
        parts,
        unresolved_parts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FilamentType;

    const EPS: f64 = 1e-9;

    fn scenario_machines() -> Vec<Machine> {
        vec![Machine::new("Ender 3", 0.5, 150.0).with_id("ender")]
    }

    fn scenario_materials() -> Vec<Material> {
        vec![
            Material::new("PLA Black", FilamentType::Pla, 20.0).with_id("pla"),
            Material::new("PETG Clear", FilamentType::Petg, 30.0).with_id("petg"),
        ]
    }

    fn scenario_settings() -> ShopSettings {
        ShopSettings {
            labor_rate_per_hour: 10.0,
            profit_margin_percent: 50.0,
            peak_price_per_kwh: 0.351,
            off_peak_price_per_kwh: 0.139,
            ..ShopSettings::default()
        }
    }

    fn scenario_a_job() -> Job {
        Job::new("Scenario A", "ender")
            .with_part("pla", 100.0)
            .with_print_hours(2.0)
            .with_labor_hours(1.0)
            .with_tariff(TariffMode::OffPeak, 0.0)
    }

    fn price(job: &Job) -> Option<CostBreakdown> {
        calculate(job, &scenario_materials(), &scenario_machines(), &scenario_settings())
    }

    #[test]
    fn test_scenario_a_off_peak() {
        let b = price(&scenario_a_job()).unwrap();
        assert!((b.material_cost - 2.0).abs() < EPS);
        assert!((b.machine_depreciation_cost - 1.0).abs() < EPS);
        assert!((b.energy_cost - 0.0417).abs() < EPS);
        assert!((b.labor_cost - 10.0).abs() < EPS);
        assert_eq!(b.design_cost, 0.0);
        assert!((b.production_subtotal - 13.0417).abs() < EPS);
        assert_eq!(b.extra_costs_total, 0.0);
        assert!((b.cost_subtotal - 13.0417).abs() < EPS);
        assert!((b.profit_amount - 6.52085).abs() < EPS);
        assert!((b.total - 19.56255).abs() < EPS);
        assert!(!b.is_manual_price);
        assert_eq!(b.profit_margin_percent(), Some(50.0));
        assert_eq!(b.tariff.peak_hours, 0.0);
        assert_eq!(b.tariff.off_peak_hours, 2.0);
    }

    #[test]
    fn test_scenario_b_mixed_clamps_peak_hours() {
        let job = scenario_a_job().with_tariff(TariffMode::Mixed, 5.0);
        let b = price(&job).unwrap();
        assert_eq!(b.tariff.peak_hours, 2.0);
        assert_eq!(b.tariff.off_peak_hours, 0.0);
        // 0.15 kW * 2 h * 0.351
        assert!((b.energy_cost - 0.1053).abs() < EPS);
    }

    #[test]
    fn test_scenario_c_manual_override() {
        let job = scenario_a_job().with_final_price(15.0);
        let b = price(&job).unwrap();
        assert_eq!(b.total, 15.0);
        assert!((b.profit_amount - (15.0 - 13.0417)).abs() < EPS);
        assert!(b.is_manual_price);
        assert_eq!(b.profit_margin_percent(), None);
        assert_eq!(b.pricing, PricingMode::Manual { final_price: 15.0 });
    }

    #[test]
    fn test_scenario_d_deleted_material_is_skipped() {
        let job = scenario_a_job().with_part("deleted_material", 250.0);
        let b = price(&job).unwrap();
        assert!((b.material_cost - 2.0).abs() < EPS);
        assert_eq!(b.unresolved_parts, 1);
        assert_eq!(b.parts.len(), 2);
        assert!(b.parts[0].is_resolved());
        assert!(!b.parts[1].is_resolved());
        assert_eq!(b.parts[1].cost, 0.0);
    }

    #[test]
    fn test_multiple_materials_are_summed() {
        let job = scenario_a_job().with_part("petg", 50.0);
        let b = price(&job).unwrap();
        // 2.0 + 0.05 kg * 30
        assert!((b.material_cost - 3.5).abs() < EPS);
    }

    #[test]
    fn test_design_fee_and_extras() {
        let job = scenario_a_job()
            .with_design_fee(8.0)
            .with_extra_cost("Packaging", 1.25)
            .with_extra_cost("Shipping", 4.75);
        let b = price(&job).unwrap();
        assert_eq!(b.design_cost, 8.0);
        assert_eq!(b.extra_costs_total, 6.0);
        assert!((b.cost_subtotal - (b.production_subtotal + 14.0)).abs() < EPS);
        assert!((b.total - b.cost_subtotal * 1.5).abs() < EPS);
    }

    #[test]
    fn test_no_parts_still_prices() {
        let job = Job::new("Labor only", "ender").with_print_hours(1.0).with_labor_hours(2.0);
        let b = price(&job).unwrap();
        assert_eq!(b.material_cost, 0.0);
        assert!(b.parts.is_empty());
        assert_eq!(b.labor_cost, 20.0);
    }

    #[test]
    fn test_missing_machine_fails() {
        let job = Job::new("Orphan", "gone").with_part("pla", 10.0).with_print_hours(1.0);
        assert!(price(&job).is_none());
        let err = try_calculate(&job, &scenario_materials(), &scenario_machines(), &scenario_settings())
            .unwrap_err();
        assert_eq!(err, QuoteError::missing_machine("gone"));
    }

    #[test]
    fn test_non_positive_duration_fails() {
        for hours in [0.0, -0.5, -10.0, f64::NAN] {
            let job = scenario_a_job().with_print_hours(hours);
            assert!(price(&job).is_none());
            let err = try_calculate(&job, &scenario_materials(), &scenario_machines(), &scenario_settings())
                .unwrap_err();
            assert_eq!(err.error_code(), "INVALID_DURATION");
        }
    }

    #[test]
    fn test_total_identity_holds_in_both_modes() {
        let overrides = [None, Some(0.0), Some(5.0), Some(13.0417), Some(99.99)];
        let margins = [0.0, 12.5, 50.0, 200.0];
        let hours = [0.25, 2.0, 17.5];
        for &override_price in &overrides {
            for &margin in &margins {
                for &h in &hours {
                    let mut settings = scenario_settings();
                    settings.profit_margin_percent = margin;
                    let mut job = scenario_a_job().with_print_hours(h).with_extra_cost("x", 0.3);
                    job.final_price_override = override_price;
                    let b = calculate(&job, &scenario_materials(), &scenario_machines(), &settings).unwrap();
                    assert!((b.total - (b.cost_subtotal + b.profit_amount)).abs() < EPS);
                    if let Some(price) = override_price {
                        assert_eq!(b.total, price);
                    }
                }
            }
        }
    }

    #[test]
    fn test_subtotals_are_consistent() {
        let job = scenario_a_job().with_design_fee(3.0).with_extra_cost("Magnet", 0.4);
        let b = price(&job).unwrap();
        let production = b.material_cost + b.machine_depreciation_cost + b.energy_cost + b.labor_cost;
        assert!((b.production_subtotal - production).abs() < EPS);
        assert!((b.cost_subtotal - (production + b.design_cost + b.extra_costs_total)).abs() < EPS);
    }

    #[test]
    fn test_idempotent() {
        let job = scenario_a_job()
            .with_tariff(TariffMode::Mixed, 0.7)
            .with_part("missing", 3.0)
            .with_extra_cost("Paint", 2.0);
        let first = serde_json::to_string(&price(&job).unwrap()).unwrap();
        let second = serde_json::to_string(&price(&job).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let job = scenario_a_job().with_tariff(TariffMode::Mixed, 9.0);
        let before = job.clone();
        let _ = price(&job);
        assert_eq!(job, before);
    }

    #[test]
    fn test_trace_records_branches() {
        let job = scenario_a_job()
            .with_tariff(TariffMode::Mixed, 5.0)
            .with_part("deleted", 10.0)
            .with_final_price(1.0);
        let calc = calculate_with_trace(&job, &scenario_materials(), &scenario_machines(), &scenario_settings());
        assert!(calc.breakdown.is_some());
        let trace = calc.trace.join("\n");
        assert!(trace.contains("Machine: Ender 3"));
        assert!(trace.contains("not found, skipped"));
        assert!(trace.contains("Peak hours clamped"));
        assert!(trace.contains("Tariff mixed"));
        assert!(trace.contains("Manual price 1"));
        assert!(trace.contains("below cost"));
        assert!(calc.trace.last().unwrap().starts_with("Total:"));
    }

    #[test]
    fn test_trace_on_failure() {
        let job = scenario_a_job().with_print_hours(0.0);
        let calc = calculate_with_trace(&job, &scenario_materials(), &scenario_machines(), &scenario_settings());
        assert!(calc.breakdown.is_none());
        assert!(calc.trace.last().unwrap().starts_with("No breakdown: Invalid print duration"));
        let failure = calc.failure.unwrap();
        assert_eq!(failure.error_code(), "INVALID_DURATION");
        assert!(failure.is_incomplete_quote());
    }

    #[test]
    fn test_failure_absent_when_priced() {
        let calc = calculate_with_trace(
            &scenario_a_job(),
            &scenario_materials(),
            &scenario_machines(),
            &scenario_settings(),
        );
        assert!(calc.breakdown.is_some());
        assert!(calc.failure.is_none());
    }

    #[test]
    fn test_trace_records_peak_clamped_up_to_zero() {
        for peak in [-2.0, f64::NAN] {
            let job = scenario_a_job().with_tariff(TariffMode::Mixed, peak);
            let calc = calculate_with_trace(&job, &scenario_materials(), &scenario_machines(), &scenario_settings());
            let b = calc.breakdown.unwrap();
            assert_eq!(b.tariff.peak_hours, 0.0);
            assert_eq!(b.tariff.off_peak_hours, 2.0);
            assert!(
                calc.trace.iter().any(|l| l.starts_with("Peak hours clamped") && l.contains("to 0")),
                "peak {} not traced",
                peak
            );
        }

        let job = scenario_a_job().with_tariff(TariffMode::Mixed, 1.0);
        let calc = calculate_with_trace(&job, &scenario_materials(), &scenario_machines(), &scenario_settings());
        assert!(!calc.trace.iter().any(|l| l.starts_with("Peak hours clamped")));
    }

    #[test]
    fn test_traced_and_untraced_agree() {
        let job = scenario_a_job().with_design_fee(2.0);
        let traced = calculate_with_trace(&job, &scenario_materials(), &scenario_machines(), &scenario_settings());
        assert_eq!(traced.breakdown, price(&job));
    }
}
