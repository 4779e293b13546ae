//! # Estimates
//!
//! [`EstimateInput`] is everything the engine consumes. [`resolve_estimate`]
//! turns it into a fresh [`ResolvedEstimate`] on every call; nothing is
//! patched in place, so the same input always yields the same numbers.
//!
//! [`Estimate`] is the editable session around an input: customer metadata,
//! timestamps, and edit operations that keep the input consistent with the
//! package rules.
//!
//! ## Structure
//!
//! ```text
//! Estimate
//! ├── meta: EstimateMetadata (id, version, customer, timestamps)
//! └── input: EstimateInput
//!     ├── measurements: Option<MeasurementSet>
//!     ├── package, extra_materials, manual_quantities
//!     ├── waste, waste_overrides
//!     ├── labor: LaborConfiguration
//!     ├── addons: AddonOptions
//!     └── profit_margin_percent
//! ```
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::estimate::{resolve_estimate, EstimateInput};
//! use estimate_core::measurements::MeasurementSet;
//!
//! let input = EstimateInput {
//!     measurements: Some(MeasurementSet::single_pitch("6:12", 2000.0)),
//!     package: Some("GAF 1".to_string()),
//!     profit_margin_percent: 25.0,
//!     ..Default::default()
//! };
//!
//! let resolved = resolve_estimate(&input);
//! assert!(resolved.selected_materials.is_mandatory("gaf-timberline-hdz"));
//! assert_eq!(resolved, resolve_estimate(&input));
//! ```

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{EstimateError, EstimateResult};
use crate::labor::{calculate_labor, LaborBreakdown, LaborConfiguration};
use crate::lenient;
use crate::measurements::{MeasurementSet, RoofType};
use crate::packages::resolver::ResolutionContext;
use crate::packages::PackageResolver;
use crate::persistence::PersistedTotals;
use crate::pricing::{aggregate, resolve_addons, AddonLine, AddonOptions, PricingSummary};
use crate::quantity::{interactive_quantity, resolve_quantity};
use crate::selection::{MaterialSelection, SelectedMaterial};
use crate::units::Squares;
use crate::waste::{resolve_waste, WasteOverrideTable, WasteSettings};

/// Current schema version for estimate files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Immutable engine input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateInput {
    /// Roof geometry; `None` before measurements are available
    pub measurements: Option<MeasurementSet>,

    /// Selected package id, e.g. "GAF 2"
    pub package: Option<String>,

    /// Materials the user added on top of the package, in insertion order
    #[serde(alias = "extraMaterials")]
    pub extra_materials: Vec<String>,

    /// Quantities pinned by hand, applied after resolution
    #[serde(alias = "manualQuantities", deserialize_with = "lenient::number_map")]
    pub manual_quantities: IndexMap<String, f64>,

    pub waste: WasteSettings,

    #[serde(alias = "wasteOverrides")]
    pub waste_overrides: WasteOverrideTable,

    pub labor: LaborConfiguration,

    pub addons: AddonOptions,

    #[serde(alias = "profitMargin", deserialize_with = "lenient::number_or_zero")]
    pub profit_margin_percent: f64,
}

impl EstimateInput {
    /// Material waste settings with the labor waste as the global fallback
    pub fn effective_waste(&self) -> WasteSettings {
        self.waste.or_global(self.labor.waste_percentage)
    }
}

/// Output of one full recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEstimate {
    pub roof_type: RoofType,

    /// Package that actually drove resolution; `None` for unknown ids and
    /// flat-only roofs
    pub package: Option<String>,

    pub selected_materials: MaterialSelection,

    /// Id -> whole-unit quantity, same order as `selected_materials`
    pub quantities: IndexMap<String, f64>,

    pub labor: LaborBreakdown,

    pub addons: Vec<AddonLine>,

    pub pricing: PricingSummary,
}

impl ResolvedEstimate {
    /// The totals written back to an estimate record
    pub fn persisted_totals(&self) -> PersistedTotals {
        PersistedTotals {
            calculated_material_cost: self.pricing.total_material_cost(),
            calculated_labor_cost: self.pricing.labor_cost,
            calculated_subtotal: self.pricing.subtotal,
            calculated_profit_amount: self.pricing.profit_amount,
            total_price: self.pricing.total_price,
        }
    }
}

/// Resolve an estimate against the built-in catalog and packages.
pub fn resolve_estimate(input: &EstimateInput) -> ResolvedEstimate {
    resolve_estimate_with(input, &PackageResolver::standard())
}

/// Resolve an estimate against a specific catalog and package registry.
pub fn resolve_estimate_with(
    input: &EstimateInput,
    resolver: &PackageResolver<'_>,
) -> ResolvedEstimate {
    let waste_settings = input.effective_waste();
    let ctx = ResolutionContext {
        measurements: input.measurements.as_ref(),
        waste: &waste_settings,
        overrides: &input.waste_overrides,
    };
    let roof_type = ctx.roof_type();

    let mut selection =
        resolver.transition(&MaterialSelection::new(), None, input.package.as_deref(), &ctx);

    for id in &input.extra_materials {
        let Some(material) = resolver.catalog().get(id) else {
            warn!(material_id = %id, "unknown material on estimate, skipped");
            continue;
        };
        if selection.contains(id) {
            continue;
        }
        let waste = resolve_waste(material, &waste_settings, &input.waste_overrides);
        let computed = resolve_quantity(material, ctx.measurements, waste.fraction());
        selection.add_material(SelectedMaterial::user(
            material.clone(),
            interactive_quantity(material, computed),
            waste.percent,
        ));
    }

    for (id, quantity) in &input.manual_quantities {
        if selection.set_quantity(id, lenient::measure_or_zero(*quantity)).is_err() {
            debug!(material_id = %id, "manual quantity for material not on estimate, ignored");
        }
    }

    let package = match roof_type {
        RoofType::FlatOnly => None,
        _ => input
            .package
            .as_deref()
            .and_then(|id| resolver.registry().get(id)),
    };

    let billable_squares = input
        .measurements
        .as_ref()
        .map(|m| m.total_area().billable_squares())
        .unwrap_or(Squares(0.0));

    let labor = calculate_labor(ctx.measurements, &input.labor);
    let addons = resolve_addons(
        &input.addons,
        resolver.registry(),
        package,
        &selection,
        billable_squares,
    );
    let pricing = aggregate(&selection, &addons, labor.total, input.profit_margin_percent);

    debug!(
        roof_type = ?roof_type,
        materials = selection.len(),
        total = pricing.total_price,
        "estimate resolved"
    );

    ResolvedEstimate {
        roof_type,
        package: package.map(|p| p.id.clone()),
        quantities: selection.quantities(),
        selected_materials: selection,
        labor,
        addons,
        pricing,
    }
}

/// An editable estimate: customer metadata plus the engine input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub meta: EstimateMetadata,
    pub input: EstimateInput,
}

/// Estimate metadata stored alongside the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateMetadata {
    pub id: Uuid,

    /// Schema version (for migration compatibility)
    pub version: String,

    pub customer_name: String,

    /// Job site address; required before saving
    pub customer_address: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

impl Estimate {
    /// Create an empty estimate.
    ///
    /// ```rust
    /// use estimate_core::estimate::Estimate;
    ///
    /// let estimate = Estimate::new("Pat Doe", "12 Elm St");
    /// assert_eq!(estimate.meta.customer_address, "12 Elm St");
    /// assert!(estimate.input.package.is_none());
    /// ```
    pub fn new(customer_name: impl Into<String>, customer_address: impl Into<String>) -> Self {
        let now = Utc::now();
        Estimate {
            meta: EstimateMetadata {
                id: Uuid::new_v4(),
                version: SCHEMA_VERSION.to_string(),
                customer_name: customer_name.into(),
                customer_address: customer_address.into(),
                created: now,
                modified: now,
            },
            input: EstimateInput::default(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Full recomputation against the built-in catalog and packages.
    pub fn resolve(&self) -> ResolvedEstimate {
        resolve_estimate(&self.input)
    }

    pub fn set_measurements(&mut self, measurements: Option<MeasurementSet>) {
        self.input.measurements = measurements;
        self.touch();
    }

    /// Switch packages.
    ///
    /// Leaving a known package drops every package material the user had
    /// added by hand, the same set a package transition strips.
    pub fn select_package(&mut self, package_id: Option<&str>) {
        let registry = crate::packages::standard();
        let leaving = self
            .input
            .package
            .as_deref()
            .is_some_and(|id| registry.get(id).is_some());
        if leaving {
            self.input
                .extra_materials
                .retain(|id| !registry.is_package_material(id));
        }
        self.input.package = package_id.map(str::to_string);
        self.touch();
    }

    /// Add a catalog material by hand.
    pub fn add_material(&mut self, material_id: &str) -> EstimateResult<()> {
        if !crate::materials::catalog::standard().contains(material_id) {
            return Err(EstimateError::material_not_found(material_id));
        }
        if !self.input.extra_materials.iter().any(|id| id == material_id) {
            self.input.extra_materials.push(material_id.to_string());
        }
        self.touch();
        Ok(())
    }

    /// Remove a hand-added material.
    ///
    /// Package and low-slope materials are refused with
    /// [`EstimateError::MandatoryMaterial`].
    pub fn remove_material(&mut self, material_id: &str) -> EstimateResult<()> {
        let resolved = self.resolve();
        if let Some(entry) = resolved.selected_materials.get(material_id) {
            if entry.is_mandatory {
                return Err(EstimateError::mandatory_material(material_id, entry.source.label()));
            }
        }

        let before = self.input.extra_materials.len();
        self.input.extra_materials.retain(|id| id != material_id);
        if self.input.extra_materials.len() == before {
            return Err(EstimateError::material_not_found(material_id));
        }
        self.input.manual_quantities.shift_remove(material_id);
        self.touch();
        Ok(())
    }

    /// Pin the quantity of a material on the estimate.
    pub fn set_material_quantity(
        &mut self,
        material_id: &str,
        quantity: f64,
    ) -> EstimateResult<()> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(EstimateError::invalid_input(
                material_id,
                quantity.to_string(),
                "Quantity must be a non-negative number",
            ));
        }
        if !self.resolve().selected_materials.contains(material_id) {
            return Err(EstimateError::material_not_found(material_id));
        }
        self.input
            .manual_quantities
            .insert(material_id.to_string(), quantity);
        self.touch();
        Ok(())
    }

    /// Drop a pinned quantity, returning to the computed one
    pub fn clear_material_quantity(&mut self, material_id: &str) -> Option<f64> {
        let cleared = self.input.manual_quantities.shift_remove(material_id);
        if cleared.is_some() {
            self.touch();
        }
        cleared
    }

    /// Record a per-material waste override (clamped to 0-100)
    pub fn set_waste_override(&mut self, material_id: &str, percent: f64) {
        self.input.waste_overrides.set(material_id, percent);
        self.touch();
    }
}

impl Default for Estimate {
    fn default() -> Self {
        Estimate::new("", "")
    }
}
