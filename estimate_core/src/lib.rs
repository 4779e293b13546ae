//! # estimate_core - Roofing Estimate Calculation Engine
//!
//! `estimate_core` turns roof measurements, a material catalog and a handful
//! of user choices into a priced roofing estimate: material quantities,
//! package materials, pitch-stratified labor and a margin-on-price total.
//!
//! ## Design Philosophy
//!
//! - **Pure**: every edit re-runs the whole resolution from an immutable input
//! - **Deterministic**: insertion-ordered maps, so identical inputs produce
//!   identical output, field order included
//! - **Lenient at the edges**: malformed numbers decode as zero and unknown
//!   references are logged and skipped; the engine itself never fails
//! - **JSON-First**: all inputs and outputs implement Serialize/Deserialize
//!
//! ## Quick Start
//!
//! ```rust
//! use estimate_core::{resolve_estimate, EstimateInput, MeasurementSet};
//!
//! let input = EstimateInput {
//!     measurements: Some(MeasurementSet::single_pitch("6:12", 2000.0)),
//!     package: Some("GAF 1".to_string()),
//!     profit_margin_percent: 25.0,
//!     ..Default::default()
//! };
//!
//! let resolved = resolve_estimate(&input);
//! println!("Total: ${:.2}", resolved.pricing.total_price);
//! ```
//!
//! ## Modules
//!
//! - [`measurements`] - Roof geometry and slope classification
//! - [`materials`] - Material types and the built-in catalog
//! - [`waste`] - Waste factor rules and per-material overrides
//! - [`quantity`] - Quantity formulas
//! - [`selection`] - The resolved material set and its edit rules
//! - [`packages`] - Package definitions, warranties and package transitions
//! - [`labor`] - Labor rates and add-ons
//! - [`pricing`] - Add-on pricing and margin-on-price totals
//! - [`estimate`] - Engine input, full resolution, editable estimates
//! - [`persistence`] - Storage records with lenient decoding
//! - [`file_io`] - Estimate files with atomic saves and locking
//! - [`units`] - Area and length newtypes
//! - [`errors`] - Structured error types

pub mod errors;
pub mod estimate;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod labor;
pub mod lenient;
pub mod materials;
pub mod measurements;
pub mod packages;
pub mod persistence;
pub mod pricing;
pub mod quantity;
pub mod selection;
pub mod units;
pub mod waste;

pub use errors::{EstimateError, EstimateResult};
pub use estimate::{
    resolve_estimate, resolve_estimate_with, Estimate, EstimateInput, ResolvedEstimate,
};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_estimate, save_estimate, FileLock};
pub use labor::{calculate_labor, LaborBreakdown, LaborConfiguration};
pub use materials::{Material, MaterialCatalog, MaterialCategory};
pub use measurements::{MeasurementSet, PitchArea, RoofType};
pub use packages::{PackageDefinition, PackageRegistry, PackageResolver};
pub use persistence::{EstimateRecord, PersistedTotals};
pub use pricing::{price_with_margin, PricingSummary};
pub use selection::{MaterialSelection, SelectedMaterial};
