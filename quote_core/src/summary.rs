//! Portfolio totals across all quotes.
//!
//! Only accepted jobs count toward revenue and cost. Accepted jobs that can
//! no longer be priced (their machine was deleted, for instance) are counted
//! separately instead of being folded in as zero.

use serde::Serialize;
use tracing::warn;

use crate::catalog::{Machine, Material};
use crate::job::{Job, JobStatus};
use crate::pricing::try_calculate;
use crate::settings::ShopSettings;

/// Dashboard figures in base currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    /// Sum of totals over priced accepted jobs
    pub revenue: f64,

    /// Sum of cost subtotals over priced accepted jobs
    pub cost: f64,

    /// `revenue - cost`
    pub profit: f64,

    pub accepted: usize,
    pub draft: usize,
    pub canceled: usize,

    /// Accepted jobs whose breakdown could not be computed
    pub uncomputable: usize,
}

impl PortfolioSummary {
    /// Accepted jobs that contributed to the money figures
    pub fn priced(&self) -> usize {
        self.accepted - self.uncomputable
    }

    /// Profit over revenue, as a percentage. `None` without revenue.
    pub fn margin_on_revenue(&self) -> Option<f64> {
        if self.revenue > 0.0 {
            Some(self.profit / self.revenue * 100.0)
        } else {
            None
        }
    }
}

/// Aggregate revenue, cost and status counts over a set of jobs.
pub fn summarize(
    jobs: &[Job],
    materials: &[Material],
    machines: &[Machine],
    settings: &ShopSettings,
) -> PortfolioSummary {
    let mut summary = PortfolioSummary::default();

    for job in jobs {
        match job.status {
            JobStatus::Draft => summary.draft += 1,
            JobStatus::Canceled => summary.canceled += 1,
            JobStatus::Accepted => {
                summary.accepted += 1;
                match try_calculate(job, materials, machines, settings) {
                    Ok(breakdown) => {
                        summary.revenue += breakdown.total;
                        summary.cost += breakdown.cost_subtotal;
                    }
                    Err(err) => {
                        warn!(job_id = %job.id, error = %err, "accepted job left out of portfolio totals");
                        summary.uncomputable += 1;
                    }
                }
            }
        }
    }

    summary.profit = summary.revenue - summary.cost;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_machines, default_materials};

    fn job(status: JobStatus) -> Job {
        Job::new("J", "ender3_default")
            .with_part("pla_default_black", 100.0)
            .with_print_hours(2.0)
            .with_labor_hours(1.0)
            .with_status(status)
    }

    #[test]
    fn test_only_accepted_jobs_count() {
        let jobs = vec![
            job(JobStatus::Accepted),
            job(JobStatus::Draft),
            job(JobStatus::Canceled),
            job(JobStatus::Accepted).with_final_price(20.0),
        ];
        let s = summarize(&jobs, &default_materials(), &default_machines(), &ShopSettings::default());

        assert_eq!(s.accepted, 2);
        assert_eq!(s.draft, 1);
        assert_eq!(s.canceled, 1);
        assert_eq!(s.uncomputable, 0);
        assert_eq!(s.priced(), 2);

        // 2 + 1 + 0.03 + 10 = 13.03 cost each; totals 19.545 and 20
        assert!((s.cost - 2.0 * 13.03).abs() < 1e-9);
        assert!((s.revenue - (19.545 + 20.0)).abs() < 1e-9);
        assert!((s.profit - (s.revenue - s.cost)).abs() < 1e-12);
        assert!(s.margin_on_revenue().unwrap() > 0.0);
    }

    #[test]
    fn test_uncomputable_accepted_job() {
        let mut broken = job(JobStatus::Accepted);
        broken.machine_id = "deleted".to_string();
        let jobs = vec![broken, job(JobStatus::Accepted).with_print_hours(0.0)];
        let s = summarize(&jobs, &default_materials(), &default_machines(), &ShopSettings::default());

        assert_eq!(s.accepted, 2);
        assert_eq!(s.uncomputable, 2);
        assert_eq!(s.revenue, 0.0);
        assert_eq!(s.cost, 0.0);
        assert!(s.margin_on_revenue().is_none());
    }

    #[test]
    fn test_empty_portfolio() {
        let s = summarize(&[], &[], &[], &ShopSettings::default());
        assert_eq!(s, PortfolioSummary::default());
    }
}
