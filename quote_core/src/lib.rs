//! # quote_core - 3D Print Quote Engine
//!
//! `quote_core` prices 3D print jobs. Given a job, the material and machine
//! catalogs and the shop settings, it produces an itemized cost breakdown
//! (material, machine depreciation, tariff-aware energy, labor, design and
//! extras) with either a percentage profit margin or a manual final price.
//! All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pricing is a pure function of its inputs
//! - **Soft on catalog drift**: A part whose material was deleted is skipped,
//!   a job whose machine was deleted cannot be priced (`None`)
//! - **JSON-First**: Legacy records are migrated once, at load time
//!
//! ## Quick Start
//!
//! ```rust
//! use quote_core::catalog::{default_machines, default_materials};
//! use quote_core::job::Job;
//! use quote_core::pricing::calculate;
//! use quote_core::settings::ShopSettings;
//!
//! let job = Job::new("Phone stand", "ender3_default")
//!     .with_part("pla_default_black", 60.0)
//!     .with_print_hours(3.0)
//!     .with_labor_hours(0.5);
//!
//! let breakdown = calculate(&job, &default_materials(), &default_machines(), &ShopSettings::default());
//! assert!(breakdown.is_some());
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - The cost calculation engine
//! - [`job`] - Quote data structures
//! - [`catalog`] - Materials and machines
//! - [`settings`] - Shop-wide rates, tariffs and currency preferences
//! - [`currency`] - Currency formatting and local-currency conversion
//! - [`presentation`] - Labeled summary rows
//! - [`summary`] - Portfolio totals
//! - [`migration`] - Legacy record migration
//! - [`snapshot`] - Loading a whole shop state from JSON
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod currency;
pub mod errors;
pub mod job;
pub mod migration;
pub mod presentation;
pub mod pricing;
pub mod settings;
pub mod snapshot;
pub mod summary;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use catalog::{Machine, Material};
pub use errors::{QuoteError, QuoteResult};
pub use job::{Job, JobStatus};
pub use pricing::{calculate, calculate_with_trace, try_calculate, CostBreakdown, CostCalculation, TariffMode};
pub use settings::ShopSettings;
pub use snapshot::ShopSnapshot;
