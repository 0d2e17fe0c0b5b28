//! # Shop Snapshot
//!
//! A snapshot is the whole shop state handed to the engine in one JSON
//! document: settings, the material and machine catalogs, and every job.
//! Loading validates the schema version, then runs every record through
//! [`crate::migration`] so legacy exports price the same as current ones.
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "settings": { "labor_rate_per_hour": 10.0, "profit_margin_percent": 50.0 },
//!   "materials": [{ "id": "pla_default_black", "name": "PLA Black", "cost_per_kg": 20.0 }],
//!   "machines": [{ "id": "ender3_default", "name": "Ender 3", "cost_per_hour": 0.5, "power_watts": 150.0 }],
//!   "jobs": []
//! }
//! ```
//!
//! A missing `version` is read as a pre-versioning export and accepted.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::{Machine, Material};
use crate::errors::{QuoteError, QuoteResult};
use crate::job::Job;
use crate::migration::{migrate_job, migrate_machine, migrate_material, Migrated, MigrationNote};
use crate::pricing::{calculate_with_trace, CostCalculation};
use crate::settings::ShopSettings;
use crate::summary::{summarize, PortfolioSummary};

/// Current snapshot schema version
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Notes raised while migrating one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordNotes {
    pub record_id: String,
    pub notes: Vec<MigrationNote>,
}

/// A record left out of the snapshot because it could not be migrated.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// `"materials"`, `"machines"` or `"jobs"`
    pub collection: &'static str,

    /// Position in the source list
    pub index: usize,

    /// Id, when the record carried a readable one
    pub record_id: Option<String>,

    pub error: QuoteError,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSnapshot {
    version: Option<String>,
    settings: ShopSettings,
    materials: Vec<Value>,
    machines: Vec<Value>,
    #[serde(alias = "quotes")]
    jobs: Vec<Value>,
}

/// Shop state ready for pricing.
#[derive(Debug, Clone)]
pub struct ShopSnapshot {
    pub version: String,
    pub settings: ShopSettings,
    pub materials: Vec<Material>,
    pub machines: Vec<Machine>,
    pub jobs: Vec<Job>,

    /// Records that needed assumptions during migration
    pub migration_notes: Vec<RecordNotes>,

    /// Records that could not be migrated at all
    pub skipped: Vec<SkippedRecord>,
}

impl ShopSnapshot {
    /// Parse and migrate a snapshot document.
    ///
    /// # Returns
    ///
    /// * `Ok(ShopSnapshot)` - Every record migrated
    /// * `Err(QuoteError::SerializationError)` - Not valid JSON or wrong shape
    /// * `Err(QuoteError::VersionMismatch)` - Written by an incompatible schema
    ///
    /// A record that cannot be migrated (no id, wrong shape) does not fail
    /// the load; it is left out and listed in [`ShopSnapshot::skipped`].
    pub fn from_json(json: &str) -> QuoteResult<Self> {
        let raw: RawSnapshot = serde_json::from_str(json).map_err(|e| QuoteError::SerializationError {
            reason: format!("Invalid snapshot JSON: {}", e),
        })?;

        let version = match raw.version {
            Some(version) => {
                validate_version(&version)?;
                version
            }
            None => {
                debug!("snapshot has no version, reading as legacy export");
                SCHEMA_VERSION.to_string()
            }
        };

        let mut migration_notes = Vec::new();
        let mut skipped = Vec::new();
        let materials = migrate_all("materials", &raw.materials, migrate_material, &mut migration_notes, &mut skipped);
        let machines = migrate_all("machines", &raw.machines, migrate_machine, &mut migration_notes, &mut skipped);
        let jobs = migrate_all("jobs", &raw.jobs, migrate_job, &mut migration_notes, &mut skipped);

        let ambiguous = migration_notes
            .iter()
            .flat_map(|r| r.notes.iter())
            .filter(|n| n.is_ambiguous())
            .count();
        if ambiguous > 0 {
            warn!(ambiguous, "snapshot migration made assumptions that need review");
        }

        info!(
            version = %version,
            materials = materials.len(),
            machines = machines.len(),
            jobs = jobs.len(),
            skipped = skipped.len(),
            "snapshot loaded"
        );

        Ok(ShopSnapshot {
            version,
            settings: raw.settings,
            materials,
            machines,
            jobs,
            migration_notes,
            skipped,
        })
    }

    /// Find a job by id
    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Price a job against this snapshot's catalogs and settings.
    pub fn quote(&self, job: &Job) -> CostCalculation {
        calculate_with_trace(job, &self.materials, &self.machines, &self.settings)
    }

    /// Portfolio totals over every job in the snapshot.
    pub fn summary(&self) -> PortfolioSummary {
        summarize(&self.jobs, &self.materials, &self.machines, &self.settings)
    }
}

trait Identified {
    fn record_id(&self) -> &str;
}

impl Identified for Material {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Identified for Machine {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Identified for Job {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Migrate one collection, keeping every record that migrates and setting
/// the rest aside.
fn migrate_all<T: Identified>(
    collection: &'static str,
    records: &[Value],
    migrate: fn(&Value) -> QuoteResult<Migrated<T>>,
    notes: &mut Vec<RecordNotes>,
    skipped: &mut Vec<SkippedRecord>,
) -> Vec<T> {
    let mut migrated_records = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match migrate(record) {
            Ok(migrated) => {
                if !migrated.notes.is_empty() {
                    notes.push(RecordNotes {
                        record_id: migrated.value.record_id().to_string(),
                        notes: migrated.notes,
                    });
                }
                migrated_records.push(migrated.value);
            }
            Err(error) => {
                let record_id = record.get("id").and_then(Value::as_str).map(str::to_string);
                warn!(collection, index, id = ?record_id, error = %error, "record skipped");
                skipped.push(SkippedRecord {
                    collection,
                    index,
                    record_id,
                    error,
                });
            }
        }
    }
    migrated_records
}

/// Parse a dotted version, rejecting any part that is not a number.
/// A leading `v` is tolerated.
fn parse_version(version: &str) -> Option<Vec<u32>> {
    let version = version.trim();
    let version = version.strip_prefix(|c: char| c == 'v' || c == 'V').unwrap_or(version);
    version.split('.').map(|p| p.trim().parse().ok()).collect()
}

/// Validate that a snapshot version is compatible with the current schema.
fn validate_version(file_version: &str) -> QuoteResult<()> {
    let mismatch = || QuoteError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (Some(file_parts), Some(current_parts)) = (parse_version(file_version), parse_version(SCHEMA_VERSION)) else {
        return Err(mismatch());
    };

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // On 0.x a newer minor may carry breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}
