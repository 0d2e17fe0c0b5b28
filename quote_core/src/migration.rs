//! # Record Migration
//!
//! Stored records come in every shape the app has ever written: the first
//! quotes had a single `materialId`/`materialGrams` pair and no labor time,
//! later ones grew `parts`, tariffs, design fees and manual prices, and the
//! current schema uses snake_case keys. This module maps any of them onto
//! the current [`Job`], [`Machine`] and [`Material`] types once, at load
//! time, so the pricing engine only ever sees one shape.
//!
//! Migration is pure: ids for nested parts and extra costs that never had
//! one are derived from the parent id, and no clock is read. Anything
//! defaulted on an ambiguous basis is reported as a [`MigrationNote`].
//!
//! ## Example
//!
//! ```rust
//! use quote_core::migration::{migrate_job, MigrationNote};
//!
//! let legacy = serde_json::json!({
//!     "id": "q1",
//!     "name": "Old quote",
//!     "status": "finalized",
//!     "materialId": "pla_default_black",
//!     "materialGrams": 80,
//!     "machineId": "ender3_default",
//!     "printHours": 3.5
//! });
//!
//! let migrated = migrate_job(&legacy).unwrap();
//! assert_eq!(migrated.value.parts.len(), 1);
//! assert!(migrated.notes.contains(&MigrationNote::LaborHoursAssumedZero));
//! ```

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::{FilamentType, Machine, Material};
use crate::errors::{QuoteError, QuoteResult};
use crate::job::{ExtraCost, Job, JobPart, JobStatus};
use crate::pricing::TariffMode;

/// Something the migration had to assume or rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationNote {
    /// Legacy single-material fields were turned into one part
    SingleMaterialConverted { material_id: String },

    /// No labor time was stored. Older records may have folded labor into
    /// print time, so 0 h is an assumption, not a fact.
    LaborHoursAssumedZero,

    /// No tariff was stored; the off-peak default was used
    TariffDefaulted,

    /// Tariff value not recognized; the off-peak default was used
    UnknownTariff { value: String },

    /// Old status name mapped onto the current lifecycle
    StatusMapped { from: String, to: JobStatus },

    /// Status value not recognized; treated as draft
    UnknownStatus { value: String },

    /// Machine power was stored in kilowatts
    PowerConvertedFromKilowatts { kilowatts: f64 },
}

impl MigrationNote {
    /// Notes that mark a guess about the record's meaning rather than a
    /// mechanical rename. Surfaces should let the user confirm these.
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            MigrationNote::LaborHoursAssumedZero
                | MigrationNote::UnknownTariff { .. }
                | MigrationNote::UnknownStatus { .. }
        )
    }
}

impl std::fmt::Display for MigrationNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationNote::SingleMaterialConverted { material_id } => {
                write!(f, "single material '{}' converted to a part", material_id)
            }
            MigrationNote::LaborHoursAssumedZero => {
                write!(f, "labor hours missing, assumed 0 (print time may include labor)")
            }
            MigrationNote::TariffDefaulted => write!(f, "tariff missing, defaulted to off-peak"),
            MigrationNote::UnknownTariff { value } => {
                write!(f, "unknown tariff '{}', defaulted to off-peak", value)
            }
            MigrationNote::StatusMapped { from, to } => write!(f, "status '{}' mapped to {}", from, to),
            MigrationNote::UnknownStatus { value } => write!(f, "unknown status '{}', treated as draft", value),
            MigrationNote::PowerConvertedFromKilowatts { kilowatts } => {
                write!(f, "power {} kW converted to watts", kilowatts)
            }
        }
    }
}

/// A migrated record plus everything that was assumed on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated<T> {
    pub value: T,
    pub notes: Vec<MigrationNote>,
}

/// Accept a number, a numeric string, an empty string or null.
///
/// Form fields were stored as typed, so `"2.5"` and `""` both show up in
/// old records.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| de::Error::custom(format!("expected a number, found \"{}\"", s)))
            }
        }
        Some(other) => Err(de::Error::custom(format!("expected a number, found {}", other))),
    }
}

/// Canonical field name and the historical spellings it replaces, in
/// priority order.
type KeyTable = &'static [(&'static str, &'static [&'static str])];

const PART_KEYS: KeyTable = &[
    ("material_id", &["materialId"]),
    ("grams", &["materialGrams", "material_grams"]),
];

const JOB_KEYS: KeyTable = &[
    ("client", &["clientName", "client_name"]),
    ("created", &["createdAt", "created_at"]),
    ("machine_id", &["machineId"]),
    ("material_id", &["materialId"]),
    ("material_grams", &["materialGrams"]),
    ("print_hours", &["printHours"]),
    ("labor_hours", &["laborHours"]),
    ("tariff", &["tariffType", "tariff_type"]),
    ("peak_hours", &["peakHours"]),
    ("design_fee", &["designCost", "design_cost", "designFee"]),
    ("extra_costs", &["extraCosts"]),
    (
        "final_price_override",
        &["finalPriceOverride", "finalPrice", "final_price", "manualPrice"],
    ),
];

const MACHINE_KEYS: KeyTable = &[
    ("cost_per_hour", &["costPerHour"]),
    ("power_watts", &["powerWatts", "powerConsumption"]),
    ("power_kilowatts", &["powerConsumptionDay"]),
];

const MATERIAL_KEYS: KeyTable = &[
    ("filament", &["type"]),
    ("cost_per_kg", &["costPerKg", "cost"]),
];

/// Borrow a record as a JSON object. Arrays would otherwise fill the
/// record struct positionally.
fn as_record<'a>(record: &'a Value, kind: &str) -> QuoteResult<&'a Map<String, Value>> {
    record
        .as_object()
        .ok_or_else(|| QuoteError::serialization(format!("{} record must be a JSON object, found {}", kind, json_kind(record))))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Rewrite every known spelling of a field to its canonical key.
///
/// Records written across several app versions can carry more than one
/// spelling of the same field; the first non-null one in priority order
/// wins and the rest are dropped.
fn canonicalize(record: &Map<String, Value>, keys: KeyTable) -> Map<String, Value> {
    let is_known = |key: &str| {
        keys.iter()
            .any(|(canonical, aliases)| key == *canonical || aliases.iter().any(|alias| *alias == key))
    };

    let mut out: Map<String, Value> = record
        .iter()
        .filter(|(key, _)| !is_known(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (canonical, aliases) in keys {
        let value = std::iter::once(*canonical)
            .chain(aliases.iter().copied())
            .filter_map(|key| record.get(key))
            .find(|value| !value.is_null());
        if let Some(value) = value {
            out.insert(canonical.to_string(), value.clone());
        }
    }
    out
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartRecord {
    id: Option<String>,
    material_id: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    grams: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtraCostRecord {
    id: Option<String>,
    description: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    amount: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JobRecord {
    id: Option<String>,
    name: Option<String>,
    client: Option<String>,
    status: Option<String>,
    created: Option<String>,
    machine_id: Option<String>,
    parts: Option<Vec<PartRecord>>,
    material_id: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    material_grams: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    print_hours: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    labor_hours: Option<f64>,
    tariff: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    peak_hours: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    design_fee: Option<f64>,
    extra_costs: Option<Vec<ExtraCostRecord>>,
    #[serde(deserialize_with = "lenient_number")]
    final_price_override: Option<f64>,
    notes: Option<String>,
}

impl JobRecord {
    fn from_value(record: &Value) -> QuoteResult<Self> {
        let mut object = canonicalize(as_record(record, "Job")?, JOB_KEYS);
        for list in ["parts", "extra_costs"] {
            if let Some(Value::Array(items)) = object.get_mut(list) {
                for item in items.iter_mut() {
                    let entry = as_record(item, list)?;
                    let keys: KeyTable = if list == "parts" { PART_KEYS } else { &[] };
                    *item = Value::Object(canonicalize(entry, keys));
                }
            }
        }
        Ok(serde_json::from_value(Value::Object(object))?)
    }
}

fn require_id(id: Option<String>, kind: &str) -> QuoteResult<String> {
    match id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(QuoteError::invalid_input(
            "id",
            "<missing>",
            format!("{} records must carry an id", kind),
        )),
    }
}

fn migrate_status(status: Option<String>, notes: &mut Vec<MigrationNote>) -> JobStatus {
    let Some(raw) = status else {
        return JobStatus::Draft;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "draft" => JobStatus::Draft,
        "accepted" => JobStatus::Accepted,
        "canceled" | "cancelled" => JobStatus::Canceled,
        "finalized" => {
            notes.push(MigrationNote::StatusMapped {
                from: raw.clone(),
                to: JobStatus::Accepted,
            });
            JobStatus::Accepted
        }
        _ => {
            notes.push(MigrationNote::UnknownStatus { value: raw.clone() });
            JobStatus::Draft
        }
    }
}

fn migrate_tariff(tariff: Option<String>, notes: &mut Vec<MigrationNote>) -> TariffMode {
    match tariff {
        None => {
            notes.push(MigrationNote::TariffDefaulted);
            TariffMode::OffPeak
        }
        Some(raw) => TariffMode::from_code(&raw).unwrap_or_else(|| {
            notes.push(MigrationNote::UnknownTariff { value: raw });
            TariffMode::OffPeak
        }),
    }
}

/// Map any historical job record onto the current [`Job`].
///
/// # Returns
///
/// * `Ok(Migrated<Job>)` - The job plus any assumptions made
/// * `Err(QuoteError::InvalidInput)` - The record has no id
/// * `Err(QuoteError::SerializationError)` - The record is not an object or
///   a field has an unusable type
pub fn migrate_job(record: &Value) -> QuoteResult<Migrated<Job>> {
    let record = JobRecord::from_value(record)?;
    let id = require_id(record.id, "Job")?;
    let mut notes = Vec::new();

    let status = migrate_status(record.status, &mut notes);
    let tariff = migrate_tariff(record.tariff, &mut notes);

    let mut parts: Vec<JobPart> = record
        .parts
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, p)| JobPart {
            id: p.id.unwrap_or_else(|| format!("{}-part-{}", id, i)),
            material_id: p.material_id.unwrap_or_default(),
            grams: p.grams.unwrap_or(0.0),
        })
        .collect();

    if parts.is_empty() {
        if let Some(material_id) = record.material_id {
            notes.push(MigrationNote::SingleMaterialConverted {
                material_id: material_id.clone(),
            });
            parts.push(JobPart {
                id: format!("{}-part-0", id),
                material_id,
                grams: record.material_grams.unwrap_or(0.0),
            });
        }
    }

    let labor_hours = match record.labor_hours {
        Some(hours) => hours,
        None => {
            notes.push(MigrationNote::LaborHoursAssumedZero);
            0.0
        }
    };

    let extra_costs = record
        .extra_costs
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, c)| ExtraCost {
            id: c.id.unwrap_or_else(|| format!("{}-extra-{}", id, i)),
            description: c.description.unwrap_or_default(),
            amount: c.amount.unwrap_or(0.0),
        })
        .collect();

    let created = record
        .created
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|d| d.with_timezone(&Utc));

    if !notes.is_empty() {
        debug!(job_id = %id, notes = notes.len(), "job record migrated");
    }

    Ok(Migrated {
        value: Job {
            name: record.name.unwrap_or_default(),
            client: record.client.unwrap_or_default(),
            status,
            created,
            machine_id: record.machine_id.unwrap_or_default(),
            parts,
            print_hours: record.print_hours.unwrap_or(0.0),
            labor_hours,
            tariff,
            peak_hours: record.peak_hours.unwrap_or(0.0),
            design_fee: record.design_fee.unwrap_or(0.0),
            extra_costs,
            final_price_override: record.final_price_override,
            notes: record.notes.unwrap_or_default(),
            id,
        },
        notes,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MachineRecord {
    id: Option<String>,
    name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    cost_per_hour: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    power_watts: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    power_kilowatts: Option<f64>,
}

/// Map any historical machine record onto the current [`Machine`].
///
/// Power stored in watts wins; otherwise a kilowatt figure is converted.
pub fn migrate_machine(record: &Value) -> QuoteResult<Migrated<Machine>> {
    let record: MachineRecord =
        serde_json::from_value(Value::Object(canonicalize(as_record(record, "Machine")?, MACHINE_KEYS)))?;
    let id = require_id(record.id, "Machine")?;
    let mut notes = Vec::new();

    let power_watts = match (record.power_watts, record.power_kilowatts) {
        (Some(watts), _) => watts,
        (None, Some(kilowatts)) => {
            notes.push(MigrationNote::PowerConvertedFromKilowatts { kilowatts });
            kilowatts * 1000.0
        }
        (None, None) => 0.0,
    };

    Ok(Migrated {
        value: Machine {
            name: record.name.unwrap_or_else(|| id.clone()),
            cost_per_hour: record.cost_per_hour.unwrap_or(0.0),
            power_watts,
            id,
        },
        notes,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MaterialRecord {
    id: Option<String>,
    name: Option<String>,
    filament: Option<FilamentType>,
    #[serde(deserialize_with = "lenient_number")]
    cost_per_kg: Option<f64>,
    description: Option<String>,
}

/// Map any historical material record onto the current [`Material`].
pub fn migrate_material(record: &Value) -> QuoteResult<Migrated<Material>> {
    let record: MaterialRecord =
        serde_json::from_value(Value::Object(canonicalize(as_record(record, "Material")?, MATERIAL_KEYS)))?;
    let id = require_id(record.id, "Material")?;
    Ok(Migrated {
        value: Material {
            name: record.name.unwrap_or_else(|| id.clone()),
            filament: record.filament.unwrap_or_default(),
            cost_per_kg: record.cost_per_kg.unwrap_or(0.0),
            description: record.description.filter(|d| !d.trim().is_empty()),
            id,
        },
        notes: Vec::new(),
    })
}
