//! # Catalog Reference Data
//!
//! Materials (filament spools) and machines (printers) that jobs refer to by
//! id. The engine treats both as an immutable snapshot; editing them is the
//! catalog screens' business.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::catalog::{default_machines, default_materials, find_machine};
//!
//! let machines = default_machines();
//! let ender = find_machine(&machines, "ender3_default").unwrap();
//! assert_eq!(ender.power_watts, 150.0);
//! assert!(!default_materials().is_empty());
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Filament family used to group materials in the catalog.
///
/// Serialized with the short tags the catalog screens use (e.g. `"TPU/TPE"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilamentType {
    #[default]
    #[serde(rename = "PLA")]
    Pla,
    #[serde(rename = "ABS")]
    Abs,
    #[serde(rename = "PETG")]
    Petg,
    #[serde(rename = "TPU/TPE")]
    TpuTpe,
    Nylon,
    #[serde(rename = "ASA")]
    Asa,
    #[serde(rename = "PC")]
    Pc,
    #[serde(rename = "HIPS")]
    Hips,
    #[serde(rename = "PVA")]
    Pva,
    Wood,
    CarbonFiber,
    Metal,
    #[serde(other)]
    Other,
}

impl FilamentType {
    /// All filament families, in catalog display order
    pub const ALL: [FilamentType; 13] = [
        FilamentType::Pla,
        FilamentType::Abs,
        FilamentType::Petg,
        FilamentType::TpuTpe,
        FilamentType::Nylon,
        FilamentType::Asa,
        FilamentType::Pc,
        FilamentType::Hips,
        FilamentType::Pva,
        FilamentType::Wood,
        FilamentType::CarbonFiber,
        FilamentType::Metal,
        FilamentType::Other,
    ];

    /// Short tag, identical to the serialized form
    pub fn tag(&self) -> &'static str {
        match self {
            FilamentType::Pla => "PLA",
            FilamentType::Abs => "ABS",
            FilamentType::Petg => "PETG",
            FilamentType::TpuTpe => "TPU/TPE",
            FilamentType::Nylon => "Nylon",
            FilamentType::Asa => "ASA",
            FilamentType::Pc => "PC",
            FilamentType::Hips => "HIPS",
            FilamentType::Pva => "PVA",
            FilamentType::Wood => "Wood",
            FilamentType::CarbonFiber => "CarbonFiber",
            FilamentType::Metal => "Metal",
            FilamentType::Other => "Other",
        }
    }

    /// Long human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FilamentType::Pla => "PLA (Polylactic Acid)",
            FilamentType::Abs => "ABS (Acrylonitrile Butadiene Styrene)",
            FilamentType::Petg => "PETG (Polyethylene Terephthalate Glycol)",
            FilamentType::TpuTpe => "TPU/TPE (Flexible)",
            FilamentType::Nylon => "Nylon (Polyamide)",
            FilamentType::Asa => "ASA (Acrylonitrile Styrene Acrylate)",
            FilamentType::Pc => "PC (Polycarbonate)",
            FilamentType::Hips => "HIPS (High Impact Polystyrene)",
            FilamentType::Pva => "PVA (Polyvinyl Alcohol)",
            FilamentType::Wood => "Composite: Wood",
            FilamentType::CarbonFiber => "Composite: Carbon Fiber",
            FilamentType::Metal => "Composite: Metal",
            FilamentType::Other => "Other",
        }
    }
}

/// A filament material priced per kilogram in the shop's base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Catalog identity referenced by job parts
    pub id: String,

    /// Display name (e.g., "PLA Standard Black")
    pub name: String,

    /// Filament family
    #[serde(default)]
    pub filament: FilamentType,

    /// Cost per kilogram in base currency
    pub cost_per_kg: f64,

    /// Optional free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Material {
    /// Create a material with a freshly generated id
    pub fn new(name: impl Into<String>, filament: FilamentType, cost_per_kg: f64) -> Self {
        Material {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            filament,
            cost_per_kg,
            description: None,
        }
    }

    /// Use a fixed id instead of the generated one
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// A printer with its depreciation rate and average power draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Catalog identity referenced by jobs
    pub id: String,

    /// Display name (e.g., "Creality Ender 3")
    pub name: String,

    /// Depreciation charged per print hour, in base currency
    pub cost_per_hour: f64,

    /// Average power draw while printing, in watts
    pub power_watts: f64,
}

impl Machine {
    /// Create a machine with a freshly generated id
    pub fn new(name: impl Into<String>, cost_per_hour: f64, power_watts: f64) -> Self {
        Machine {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            cost_per_hour,
            power_watts,
        }
    }

    /// Use a fixed id instead of the generated one
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Look up a machine by id.
pub fn find_machine<'a>(machines: &'a [Machine], id: &str) -> Option<&'a Machine> {
    machines.iter().find(|m| m.id == id)
}

/// Look up a material by id.
pub fn find_material<'a>(materials: &'a [Material], id: &str) -> Option<&'a Material> {
    materials.iter().find(|m| m.id == id)
}

/// Materials a fresh shop starts with
pub fn default_materials() -> Vec<Material> {
    vec![Material::new("PLA Standard Black", FilamentType::Pla, 20.0).with_id("pla_default_black")]
}

/// Machines a fresh shop starts with
pub fn default_machines() -> Vec<Machine> {
    vec![
        Machine::new("Creality Ender 3", 0.5, 150.0).with_id("ender3_default"),
        Machine::new("Prusa i3 MK3S+", 0.8, 200.0).with_id("prusa_mk3"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let materials = default_materials();
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].id, "pla_default_black");
        assert_eq!(materials[0].cost_per_kg, 20.0);

        let machines = default_machines();
        assert_eq!(machines.len(), 2);
        assert_eq!(find_machine(&machines, "prusa_mk3").unwrap().cost_per_hour, 0.8);
    }

    #[test]
    fn test_lookup_misses() {
        assert!(find_machine(&default_machines(), "nope").is_none());
        assert!(find_material(&default_materials(), "").is_none());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Machine::new("A", 1.0, 100.0);
        let b = Machine::new("A", 1.0, 100.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_filament_serialization() {
        assert_eq!(serde_json::to_string(&FilamentType::TpuTpe).unwrap(), "\"TPU/TPE\"");
        assert_eq!(serde_json::to_string(&FilamentType::CarbonFiber).unwrap(), "\"CarbonFiber\"");
        let parsed: FilamentType = serde_json::from_str("\"PETG\"").unwrap();
        assert_eq!(parsed, FilamentType::Petg);
        // Unknown tags fall back to Other instead of rejecting the material
        let parsed: FilamentType = serde_json::from_str("\"PEEK\"").unwrap();
        assert_eq!(parsed, FilamentType::Other);
    }

    #[test]
    fn test_filament_tags_match_serde() {
        for filament in FilamentType::ALL {
            let json = serde_json::to_string(&filament).unwrap();
            assert_eq!(json, format!("\"{}\"", filament.tag()));
        }
    }

    #[test]
    fn test_material_json_defaults() {
        let json = r#"{ "id": "m1", "name": "Mystery", "cost_per_kg": 25.0 }"#;
        let material: Material = serde_json::from_str(json).unwrap();
        assert_eq!(material.filament, FilamentType::Pla);
        assert!(material.description.is_none());
    }
}
