//! # Estimate Records
//!
//! The flat shape an estimate takes in storage. Storage layers are known to
//! re-encode nested objects as JSON text and numbers as strings, so every
//! nested field accepts either form and every number is decoded leniently.
//!
//! The `calculated_*` totals are whatever the last resolution produced; they
//! are always re-derivable from the inputs in the same record.
//!
//! ```rust
//! use estimate_core::persistence::EstimateRecord;
//!
//! let json = r#"{
//!     "customer_address": "12 Elm St",
//!     "measurements": "{\"total_area\": 2000, \"predominant_pitch\": \"6:12\"}",
//!     "labor_rates": {"laborRate": "85"},
//!     "total_price": "1904.00"
//! }"#;
//!
//! let record: EstimateRecord = serde_json::from_str(json).unwrap();
//! assert_eq!(record.measurements.as_ref().unwrap().total_area, 2000.0);
//! assert_eq!(record.total_price, 1904.0);
//! assert!(record.validate().is_ok());
//! ```

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::{
    resolve_estimate, Estimate, EstimateInput, EstimateMetadata, ResolvedEstimate, SCHEMA_VERSION,
};
use crate::labor::LaborConfiguration;
use crate::lenient;
use crate::measurements::MeasurementSet;
use crate::packages::resolver::ResolutionContext;
use crate::packages::PackageResolver;
use crate::pricing::AddonOptions;
use crate::selection::MaterialSelection;
use crate::waste::{WasteOverrideTable, WasteSettings};

/// Totals written back to storage; differences under a cent are rounding
pub const TOTALS_TOLERANCE: f64 = 0.005;

/// The persisted subset of a resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedTotals {
    pub calculated_material_cost: f64,
    pub calculated_labor_cost: f64,
    pub calculated_subtotal: f64,
    pub calculated_profit_amount: f64,
    pub total_price: f64,
}

impl PersistedTotals {
    /// Whether every total agrees with `other` to within a cent
    pub fn matches(&self, other: &PersistedTotals) -> bool {
        [
            (self.calculated_material_cost, other.calculated_material_cost),
            (self.calculated_labor_cost, other.calculated_labor_cost),
            (self.calculated_subtotal, other.calculated_subtotal),
            (self.calculated_profit_amount, other.calculated_profit_amount),
            (self.total_price, other.total_price),
        ]
        .iter()
        .all(|(a, b)| (a - b).abs() < TOTALS_TOLERANCE)
    }
}

fn schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// An estimate as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    #[serde(default = "schema_version")]
    pub version: String,

    #[serde(default)]
    pub id: Option<Uuid>,

    #[serde(default, alias = "customerName")]
    pub customer_name: String,

    #[serde(default, alias = "customerAddress")]
    pub customer_address: String,

    #[serde(default, alias = "selectedPackage")]
    pub package: Option<String>,

    /// Id -> material as it was priced when saved.
    ///
    /// Kept as raw JSON: only the ids are read back, and entries written by
    /// other tools need not match the catalog's shape.
    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub materials: IndexMap<String, Value>,

    /// Id -> quantity as it was resolved when saved
    #[serde(default, deserialize_with = "lenient::number_map")]
    pub quantities: IndexMap<String, f64>,

    /// Quantities pinned by hand
    #[serde(default, alias = "manualQuantities", deserialize_with = "lenient::number_map")]
    pub manual_quantities: IndexMap<String, f64>,

    #[serde(default, alias = "laborRates", deserialize_with = "lenient::json_or_string")]
    pub labor_rates: LaborConfiguration,

    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub measurements: Option<MeasurementSet>,

    #[serde(default, alias = "wasteSettings", deserialize_with = "lenient::json_or_string")]
    pub waste_settings: WasteSettings,

    #[serde(default, alias = "wasteOverrides", deserialize_with = "lenient::json_or_string")]
    pub waste_overrides: WasteOverrideTable,

    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub addons: AddonOptions,

    #[serde(default, alias = "profitMargin", deserialize_with = "lenient::number_or_zero")]
    pub profit_margin: f64,

    #[serde(
        default,
        alias = "calculatedMaterialCost",
        deserialize_with = "lenient::number_or_zero"
    )]
    pub calculated_material_cost: f64,

    #[serde(default, alias = "calculatedLaborCost", deserialize_with = "lenient::number_or_zero")]
    pub calculated_labor_cost: f64,

    #[serde(default, alias = "calculatedSubtotal", deserialize_with = "lenient::number_or_zero")]
    pub calculated_subtotal: f64,

    #[serde(
        default,
        alias = "calculatedProfitAmount",
        deserialize_with = "lenient::number_or_zero"
    )]
    pub calculated_profit_amount: f64,

    #[serde(default, alias = "totalPrice", deserialize_with = "lenient::number_or_zero")]
    pub total_price: f64,

    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EstimateRecord {
    /// Build a record from an estimate, resolving it to fill in the totals.
    pub fn from_estimate(estimate: &Estimate) -> Self {
        let resolved = estimate.resolve();
        Self::from_resolved(estimate, &resolved)
    }

    /// Build a record from an estimate and an already computed resolution.
    pub fn from_resolved(estimate: &Estimate, resolved: &ResolvedEstimate) -> Self {
        let input = &estimate.input;
        let totals = resolved.persisted_totals();
        EstimateRecord {
            version: estimate.meta.version.clone(),
            id: Some(estimate.meta.id),
            customer_name: estimate.meta.customer_name.clone(),
            customer_address: estimate.meta.customer_address.clone(),
            package: input.package.clone(),
            materials: resolved
                .selected_materials
                .materials()
                .into_iter()
                .map(|(id, material)| (id, serde_json::to_value(material).unwrap_or(Value::Null)))
                .collect(),
            quantities: resolved.quantities.clone(),
            manual_quantities: input.manual_quantities.clone(),
            labor_rates: input.labor.clone(),
            measurements: input.measurements.clone(),
            waste_settings: input.waste.clone(),
            waste_overrides: input.waste_overrides.clone(),
            addons: input.addons.clone(),
            profit_margin: input.profit_margin_percent,
            calculated_material_cost: totals.calculated_material_cost,
            calculated_labor_cost: totals.calculated_labor_cost,
            calculated_subtotal: totals.calculated_subtotal,
            calculated_profit_amount: totals.calculated_profit_amount,
            total_price: totals.total_price,
            created_at: Some(estimate.meta.created),
            updated_at: Some(estimate.meta.modified),
        }
    }

    /// Check the fields storage requires before a save.
    pub fn validate(&self) -> EstimateResult<()> {
        if self.customer_address.trim().is_empty() {
            return Err(EstimateError::validation(
                "customer_address",
                "Customer address is required",
            ));
        }
        if !self.total_price.is_finite() || self.total_price < 0.0 {
            return Err(EstimateError::validation(
                "total_price",
                format!("Total price must be a non-negative number, got {}", self.total_price),
            ));
        }
        Ok(())
    }

    /// The totals as stored
    pub fn persisted_totals(&self) -> PersistedTotals {
        PersistedTotals {
            calculated_material_cost: self.calculated_material_cost,
            calculated_labor_cost: self.calculated_labor_cost,
            calculated_subtotal: self.calculated_subtotal,
            calculated_profit_amount: self.calculated_profit_amount,
            total_price: self.total_price,
        }
    }

    /// Rebuild the engine input.
    ///
    /// Materials the package and roof would install anyway are left to
    /// resolution; every other stored material becomes a hand-added extra.
    /// Stored prices are not reused: the catalog is the price source.
    pub fn to_input(&self) -> EstimateInput {
        let waste = self.waste_settings.or_global(self.labor_rates.waste_percentage);
        let ctx = ResolutionContext {
            measurements: self.measurements.as_ref(),
            waste: &waste,
            overrides: &self.waste_overrides,
        };
        let resolver = PackageResolver::standard();
        let mandatory =
            resolver.transition(&MaterialSelection::new(), None, self.package.as_deref(), &ctx);

        let extra_materials = self
            .materials
            .keys()
            .chain(self.quantities.keys())
            .filter(|id| !mandatory.contains(id))
            .fold(Vec::<String>::new(), |mut ids, id| {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
                ids
            });

        EstimateInput {
            measurements: self.measurements.clone(),
            package: self.package.clone(),
            extra_materials,
            manual_quantities: self.manual_quantities.clone(),
            waste: self.waste_settings.clone(),
            waste_overrides: self.waste_overrides.clone(),
            labor: self.labor_rates.clone(),
            addons: self.addons.clone(),
            profit_margin_percent: self.profit_margin,
        }
    }

    /// Re-run the engine on the stored inputs
    pub fn recompute(&self) -> ResolvedEstimate {
        resolve_estimate(&self.to_input())
    }

    /// Whether the stored totals still agree with a fresh resolution
    pub fn totals_match(&self) -> bool {
        self.persisted_totals().matches(&self.recompute().persisted_totals())
    }

    /// Convert back into an editable estimate.
    pub fn into_estimate(self) -> Estimate {
        let now = Utc::now();
        let input = self.to_input();
        Estimate {
            meta: EstimateMetadata {
                id: self.id.unwrap_or_else(Uuid::new_v4),
                version: self.version,
                customer_name: self.customer_name,
                customer_address: self.customer_address,
                created: self.created_at.unwrap_or(now),
                modified: self.updated_at.unwrap_or(now),
            },
            input,
        }
    }
}
