//! # Job (Quote) Data Structures
//!
//! A `Job` is one print quote: which machine runs it, which materials it
//! consumes, how long it prints and how much hands-on work it needs. Jobs
//! refer to catalog entries by id and never embed catalog data, so editing a
//! material's price reprices every job that uses it.
//!
//! ## Structure
//!
//! ```text
//! Job
//! ├── identity: id, name, client, status, created
//! ├── machine_id
//! ├── parts: Vec<JobPart> (material_id + grams)
//! ├── print_hours, labor_hours
//! ├── tariff, peak_hours
//! ├── design_fee, extra_costs: Vec<ExtraCost>
//! └── final_price_override: Option<f64>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use quote_core::job::Job;
//! use quote_core::pricing::TariffMode;
//!
//! let job = Job::new("Vase", "ender3_default")
//!     .with_part("pla_default_black", 120.0)
//!     .with_print_hours(4.5)
//!     .with_labor_hours(0.5)
//!     .with_tariff(TariffMode::Mixed, 1.0);
//!
//! assert_eq!(job.total_grams(), 120.0);
//! assert!(!job.is_manual_price());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::TariffMode;

/// Lifecycle status of a quote. Has no bearing on its price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Draft,
    Accepted,
    Canceled,
}

impl JobStatus {
    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            JobStatus::Draft => "Draft",
            JobStatus::Accepted => "Accepted",
            JobStatus::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Material consumed by a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPart {
    pub id: String,

    /// Catalog material this part is printed in
    pub material_id: String,

    /// Filament mass consumed, in grams
    pub grams: f64,
}

impl JobPart {
    pub fn new(material_id: impl Into<String>, grams: f64) -> Self {
        JobPart {
            id: Uuid::new_v4().to_string(),
            material_id: material_id.into(),
            grams,
        }
    }
}

/// Flat ad-hoc cost added to a job (packaging, shipping, inserts...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraCost {
    pub id: String,

    pub description: String,

    /// Amount in base currency
    pub amount: f64,
}

impl ExtraCost {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        ExtraCost {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            amount,
        }
    }
}

/// A print quote.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "0b5c8f0e-8d4c-4f1b-9a52-3d5f5b6f3a10",
///   "name": "Bracket x4",
///   "client": "ACME",
///   "status": "draft",
///   "created": "2025-03-01T12:00:00Z",
///   "machine_id": "ender3_default",
///   "parts": [{ "id": "p1", "material_id": "pla_default_black", "grams": 100.0 }],
///   "print_hours": 2.0,
///   "labor_hours": 1.0,
///   "tariff": "off-peak",
///   "peak_hours": 0.0,
///   "design_fee": 0.0,
///   "extra_costs": [],
///   "final_price_override": null,
///   "notes": ""
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,

    /// Display name
    pub name: String,

    /// Client reference (free text)
    #[serde(default)]
    pub client: String,

    #[serde(default)]
    pub status: JobStatus,

    /// Creation timestamp, absent on records that never stored one
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    /// Machine that prints the job
    pub machine_id: String,

    /// Materials consumed, in display order
    #[serde(default)]
    pub parts: Vec<JobPart>,

    /// Total print duration in fractional hours
    pub print_hours: f64,

    /// Total hands-on labor in fractional hours
    #[serde(default)]
    pub labor_hours: f64,

    /// Energy tariff schedule for the print
    #[serde(default)]
    pub tariff: TariffMode,

    /// Print hours inside the peak window; only read in mixed mode
    #[serde(default)]
    pub peak_hours: f64,

    /// One-time design fee in base currency
    #[serde(default)]
    pub design_fee: f64,

    #[serde(default)]
    pub extra_costs: Vec<ExtraCost>,

    /// Manual total price in base currency, replacing the margin-derived total
    #[serde(default)]
    pub final_price_override: Option<f64>,

    #[serde(default)]
    pub notes: String,
}

impl Job {
    /// Create an empty draft job on the given machine.
    pub fn new(name: impl Into<String>, machine_id: impl Into<String>) -> Self {
        Job {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            client: String::new(),
            status: JobStatus::Draft,
            created: Some(Utc::now()),
            machine_id: machine_id.into(),
            parts: Vec::new(),
            print_hours: 0.0,
            labor_hours: 0.0,
            tariff: TariffMode::default(),
            peak_hours: 0.0,
            design_fee: 0.0,
            extra_costs: Vec::new(),
            final_price_override: None,
            notes: String::new(),
        }
    }

    /// Set client and return self (builder pattern)
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    /// Add a part and return self (builder pattern)
    pub fn with_part(mut self, material_id: impl Into<String>, grams: f64) -> Self {
        self.parts.push(JobPart::new(material_id, grams));
        self
    }

    /// Set print duration and return self (builder pattern)
    pub fn with_print_hours(mut self, hours: f64) -> Self {
        self.print_hours = hours;
        self
    }

    /// Set labor duration and return self (builder pattern)
    pub fn with_labor_hours(mut self, hours: f64) -> Self {
        self.labor_hours = hours;
        self
    }

    /// Set tariff mode and peak hours and return self (builder pattern)
    pub fn with_tariff(mut self, tariff: TariffMode, peak_hours: f64) -> Self {
        self.tariff = tariff;
        self.peak_hours = peak_hours;
        self
    }

    /// Set design fee and return self (builder pattern)
    pub fn with_design_fee(mut self, fee: f64) -> Self {
        self.design_fee = fee;
        self
    }

    /// Add an extra cost and return self (builder pattern)
    pub fn with_extra_cost(mut self, description: impl Into<String>, amount: f64) -> Self {
        self.extra_costs.push(ExtraCost::new(description, amount));
        self
    }

    /// Set a manual total price and return self (builder pattern)
    pub fn with_final_price(mut self, price: f64) -> Self {
        self.final_price_override = Some(price);
        self
    }

    /// Set status and return self (builder pattern)
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// Filament mass across all parts, resolved or not
    pub fn total_grams(&self) -> f64 {
        self.parts.iter().fold(0.0, |acc, p| acc + p.grams)
    }

    /// Whether the job carries a manual total price
    pub fn is_manual_price(&self) -> bool {
        self.final_price_override.is_some()
    }
}
