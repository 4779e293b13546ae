//! Package resolution.
//!
//! Turns a package choice and the roof measurements into the mandatory
//! material set, and performs package transitions on a selection:
//!
//! ```text
//! NoPackage ──select──▶ PackageSelected(a) ──switch──▶ PackageSelected(b)
//!     ▲                        │
//!     └──────deselect──────────┘
//! ```
//!
//! Leaving a package strips every id in the registry's all-package set.
//! Roof classification overrides the choice: a flat-only roof gets the flat
//! roof set and no package; a hybrid roof gets the package plus low-slope
//! base and cap sheets.

use tracing::{debug, warn};

use super::{PackageDefinition, PackageRegistry};
use crate::materials::{catalog, LowSlopeScope, MaterialCatalog, QuantityFormula};
use crate::measurements::{MeasurementSet, RoofType};
use crate::quantity::resolve_quantity;
use crate::selection::{MaterialSelection, MaterialSource, SelectedMaterial};
use crate::waste::{resolve_waste, WasteOverrideTable, WasteSettings};

/// Everything quantity resolution needs besides the material itself.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    pub measurements: Option<&'a MeasurementSet>,
    pub waste: &'a WasteSettings,
    pub overrides: &'a WasteOverrideTable,
}

impl ResolutionContext<'_> {
    /// Roof classification; a missing measurement set counts as steep
    pub fn roof_type(&self) -> RoofType {
        self.measurements
            .map(MeasurementSet::roof_type)
            .unwrap_or(RoofType::SteepOnly)
    }

    fn has_zero_pitch_area(&self) -> bool {
        self.measurements
            .is_some_and(|m| m.zero_pitch_area().0 > 0.0)
    }
}

/// Resolves package and low-slope materials against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct PackageResolver<'a> {
    catalog: &'a MaterialCatalog,
    registry: &'a PackageRegistry,
}

impl Default for PackageResolver<'static> {
    fn default() -> Self {
        PackageResolver::standard()
    }
}

impl<'a> PackageResolver<'a> {
    pub fn new(catalog: &'a MaterialCatalog, registry: &'a PackageRegistry) -> Self {
        PackageResolver { catalog, registry }
    }

    /// Resolver over the built-in catalog and registry
    pub fn standard() -> PackageResolver<'static> {
        PackageResolver::new(catalog::standard(), super::standard())
    }

    pub fn catalog(&self) -> &'a MaterialCatalog {
        self.catalog
    }

    pub fn registry(&self) -> &'a PackageRegistry {
        self.registry
    }

    /// Look up a package; unknown ids are logged and treated as no package.
    pub fn package(&self, package_id: Option<&str>) -> Option<&'a PackageDefinition> {
        let id = package_id?;
        let package = self.registry.get(id);
        if package.is_none() {
            warn!(package_id = id, "unknown package id, treating as no package");
        }
        package
    }

    /// The mandatory material set for a package choice on this roof.
    pub fn mandatory_materials(
        &self,
        package_id: Option<&str>,
        ctx: &ResolutionContext<'_>,
    ) -> Vec<SelectedMaterial> {
        let roof_type = ctx.roof_type();

        if roof_type == RoofType::FlatOnly {
            if let Some(id) = package_id {
                debug!(package_id = id, "flat-only roof, package bypassed");
            }
            return self.flat_roof_materials(ctx);
        }

        let Some(package) = self.package(package_id) else {
            return Vec::new();
        };

        let source = MaterialSource::Package {
            package_id: package.id.clone(),
        };
        let mut entries = self.resolve_ids(&package.material_ids, &source, ctx);

        if roof_type == RoofType::Hybrid {
            debug!(package_id = %package.id, "hybrid roof, adding low-slope supplements");
            let supplements = self.resolve_ids(
                self.registry.low_slope_supplement_ids(),
                &MaterialSource::LowSlopeSupplement,
                ctx,
            );
            for entry in supplements {
                if !entries.iter().any(|e| e.material.id == entry.material.id) {
                    entries.push(entry);
                }
            }
        }

        entries
    }

    /// Apply a package transition to a selection.
    ///
    /// Every previously installed mandatory entry is dropped. When a package
    /// was active, every id belonging to any package is dropped as well; user
    /// materials outside that set survive untouched. The mandatory set for
    /// `to` is then installed.
    pub fn transition(
        &self,
        current: &MaterialSelection,
        from: Option<&str>,
        to: Option<&str>,
        ctx: &ResolutionContext<'_>,
    ) -> MaterialSelection {
        let leaving_package = from.is_some_and(|id| self.registry.get(id).is_some());
        let mut next = current.clone();
        next.strip(|id, entry| {
            entry.is_mandatory || (leaving_package && self.registry.is_package_material(id))
        });

        for entry in self.mandatory_materials(to, ctx) {
            next.install(entry);
        }

        debug!(
            from = from.unwrap_or("none"),
            to = to.unwrap_or("none"),
            materials = next.len(),
            "package transition"
        );
        next
    }

    fn flat_roof_materials(&self, ctx: &ResolutionContext<'_>) -> Vec<SelectedMaterial> {
        let has_zero_pitch = ctx.has_zero_pitch_area();
        let ids: Vec<String> = self
            .registry
            .flat_roof_ids()
            .iter()
            .filter(|id| {
                let zero_pitch_only = self.catalog.get(id).is_some_and(|m| {
                    matches!(
                        m.formula,
                        QuantityFormula::LowSlope {
                            scope: LowSlopeScope::ZeroPitchOnly,
                            ..
                        }
                    )
                });
                has_zero_pitch || !zero_pitch_only
            })
            .cloned()
            .collect();
        self.resolve_ids(&ids, &MaterialSource::FlatRoof, ctx)
    }

    fn resolve_ids(
        &self,
        ids: &[String],
        source: &MaterialSource,
        ctx: &ResolutionContext<'_>,
    ) -> Vec<SelectedMaterial> {
        ids.iter()
            .filter_map(|id| {
                let Some(material) = self.catalog.get(id) else {
                    warn!(
                        material_id = %id,
                        source = %source.label(),
                        "unknown material id, skipping"
                    );
                    return None;
                };
                let waste = resolve_waste(material, ctx.waste, ctx.overrides);
                let quantity = resolve_quantity(material, ctx.measurements, waste.fraction());
                Some(SelectedMaterial::mandatory(
                    material.clone(),
                    quantity,
                    source.clone(),
                    waste.percent,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::PRIMARY_SHINGLE_ID;
    use crate::measurements::PitchArea;
    use crate::packages::PackageDefinition;

    fn steep_roof() -> MeasurementSet {
        MeasurementSet {
            eave_length: 120.0,
            rake_length: 80.0,
            ridge_length: 40.0,
            valley_length: 20.0,
            ..MeasurementSet::single_pitch("6:12", 2000.0)
        }
    }

    fn flat_roof() -> MeasurementSet {
        MeasurementSet {
            total_area: 1200.0,
            areas_by_pitch: vec![PitchArea::new("0:12", 400.0), PitchArea::new("2:12", 800.0)],
            valley_length: 12.0,
            ..Default::default()
        }
    }

    fn hybrid_roof() -> MeasurementSet {
        let mut roof = steep_roof();
        roof.total_area = 2600.0;
        roof.areas_by_pitch.push(PitchArea::new("0:12", 600.0));
        roof
    }

    fn with_ctx<R>(roof: &MeasurementSet, f: impl FnOnce(&ResolutionContext<'_>) -> R) -> R {
        let waste = WasteSettings::default();
        let overrides = WasteOverrideTable::default();
        let ctx = ResolutionContext {
            measurements: Some(roof),
            waste: &waste,
            overrides: &overrides,
        };
        f(&ctx)
    }

    fn ids(selection: &MaterialSelection) -> Vec<String> {
        selection.ids().map(str::to_string).collect()
    }

    fn user_entry(id: &str) -> SelectedMaterial {
        SelectedMaterial::user(catalog::standard().get(id).unwrap().clone(), 2.0, 0.0)
    }

    #[test]
    fn test_select_package_installs_definition() {
        let resolver = PackageResolver::standard();
        let roof = steep_roof();
        let selection = with_ctx(&roof, |ctx| {
            resolver.transition(&MaterialSelection::new(), None, Some("GAF 1"), ctx)
        });

        let expected = &resolver.registry().get("GAF 1").unwrap().material_ids;
        assert_eq!(&ids(&selection), expected);
        assert!(selection.iter().all(|e| e.is_mandatory));

        // Primary shingle sized with its own 12% waste: 2000 * 1.12 / 33.3
        assert_eq!(selection.get(PRIMARY_SHINGLE_ID).unwrap().quantity, 68.0);
    }

    #[test]
    fn test_switch_package_removes_every_package_material() {
        let resolver = PackageResolver::standard();
        let roof = steep_roof();
        let selection = with_ctx(&roof, |ctx| {
            let mut s = resolver.transition(&MaterialSelection::new(), None, Some("GAF 2"), ctx);
            s.add_material(user_entry("box-vent"));
            s.add_material(user_entry("pipe-boot"));
            resolver.transition(&s, Some("GAF 2"), Some("3MG Select"), ctx)
        });

        let gaf2_only: Vec<&str> =
            vec![PRIMARY_SHINGLE_ID, "gaf-prostart-starter", "gaf-timbertex"];
        for id in gaf2_only {
            assert!(!selection.contains(id), "{} survived the switch", id);
        }
        assert!(selection.contains("oc-duration"));
        assert_eq!(selection.get("box-vent").unwrap(), &user_entry("box-vent"));
        assert_eq!(selection.get("pipe-boot").unwrap(), &user_entry("pipe-boot"));
    }

    #[test]
    fn test_independent_package_material_is_stripped_on_switch() {
        let resolver = PackageResolver::standard();
        let roof = steep_roof();
        let selection = with_ctx(&roof, |ctx| {
            let mut s = resolver.transition(&MaterialSelection::new(), None, Some("GAF 1"), ctx);
            s.add_material(user_entry("valley-metal"));
            resolver.transition(&s, Some("GAF 1"), Some("3MG Standard"), ctx)
        });
        // valley-metal belongs to GAF 2 / GAF 3 / 3MG Select, so it leaves with GAF 1
        assert!(!selection.contains("valley-metal"));
    }

    #[test]
    fn test_deselect_package() {
        let resolver = PackageResolver::standard();
        let roof = steep_roof();
        let selection = with_ctx(&roof, |ctx| {
            let mut s = resolver.transition(&MaterialSelection::new(), None, Some("GAF 1"), ctx);
            s.add_material(user_entry("turbine-vent"));
            resolver.transition(&s, Some("GAF 1"), None, ctx)
        });
        assert_eq!(ids(&selection), vec!["turbine-vent".to_string()]);
    }

    #[test]
    fn test_no_package_keeps_user_package_materials() {
        let resolver = PackageResolver::standard();
        let roof = steep_roof();
        let mut current = MaterialSelection::new();
        current.add_material(user_entry("drip-edge"));
        let selection = with_ctx(&roof, |ctx| resolver.transition(&current, None, None, ctx));
        assert!(selection.contains("drip-edge"));
    }

    #[test]
    fn test_flat_only_roof_bypasses_package() {
        let resolver = PackageResolver::standard();
        let roof = flat_roof();
        let selection = with_ctx(&roof, |ctx| {
            resolver.transition(&MaterialSelection::new(), None, Some("GAF 1"), ctx)
        });

        for id in resolver.registry().get("GAF 1").unwrap().material_ids.iter() {
            assert!(!selection.contains(id), "{} installed on a flat roof", id);
        }
        assert_eq!(ids(&selection), resolver.registry().flat_roof_ids().to_vec());
        assert!(selection
            .iter()
            .all(|e| e.is_mandatory && e.source == MaterialSource::FlatRoof));
    }

    #[test]
    fn test_flat_roof_without_zero_pitch_skips_iso() {
        let resolver = PackageResolver::standard();
        let roof = MeasurementSet::single_pitch("1:12", 900.0);
        let selection = with_ctx(&roof, |ctx| {
            resolver.transition(&MaterialSelection::new(), None, None, ctx)
        });
        assert!(!selection.contains("low-slope-iso-board"));
        assert!(selection.contains("low-slope-base-sheet"));
        assert!(selection.contains("low-slope-sealant"));
    }

    #[test]
    fn test_adding_steep_area_restores_package_and_supplements() {
        let resolver = PackageResolver::standard();
        let flat = flat_roof();
        let flat_selection = with_ctx(&flat, |ctx| {
            resolver.transition(&MaterialSelection::new(), None, Some("GAF 1"), ctx)
        });

        let mut hybrid = flat.clone();
        hybrid.total_area += 1500.0;
        hybrid.areas_by_pitch.push(PitchArea::new("7:12", 1500.0));
        let selection = with_ctx(&hybrid, |ctx| {
            resolver.transition(&flat_selection, Some("GAF 1"), Some("GAF 1"), ctx)
        });

        assert!(selection.contains(PRIMARY_SHINGLE_ID));
        assert!(selection.contains("low-slope-base-sheet"));
        assert!(selection.contains("low-slope-cap-sheet"));
        assert!(!selection.contains("low-slope-iso-board"));
        assert!(!selection.contains("low-slope-primer"));
    }

    #[test]
    fn test_hybrid_roof_supplements() {
        let resolver = PackageResolver::standard();
        let roof = hybrid_roof();
        let entries = with_ctx(&roof, |ctx| resolver.mandatory_materials(Some("GAF 2"), ctx));

        let base = entries
            .iter()
            .find(|e| e.material.id == "low-slope-base-sheet")
            .unwrap();
        assert_eq!(base.source, MaterialSource::LowSlopeSupplement);
        // 600 * 1.12 / 200 = 3.36
        assert_eq!(base.quantity, 4.0);
        assert!(!entries.iter().any(|e| e.material.id == "low-slope-iso-board"));
    }

    #[test]
    fn test_hybrid_roof_without_package_has_no_supplements() {
        let resolver = PackageResolver::standard();
        let roof = hybrid_roof();
        let entries = with_ctx(&roof, |ctx| resolver.mandatory_materials(None, ctx));
        assert!(entries.is_empty());
    }

    #[test]
    fn test_unknown_package_is_no_package() {
        let resolver = PackageResolver::standard();
        let roof = steep_roof();
        let entries = with_ctx(&roof, |ctx| resolver.mandatory_materials(Some("Platinum 9"), ctx));
        assert!(entries.is_empty());
    }

    #[test]
    fn test_unknown_material_in_definition_is_skipped() {
        let registry = PackageRegistry::new(
            vec![PackageDefinition::new(
                "Custom",
                &["drip-edge", "discontinued-shingle", "valley-metal"],
                &[],
            )],
            vec![],
            &[],
            &[],
        );
        let resolver = PackageResolver::new(catalog::standard(), &registry);
        let roof = steep_roof();
        let entries = with_ctx(&roof, |ctx| resolver.mandatory_materials(Some("Custom"), ctx));
        let ids: Vec<&str> = entries.iter().map(|e| e.material.id.as_str()).collect();
        assert_eq!(ids, vec!["drip-edge", "valley-metal"]);
    }

    #[test]
    fn test_waste_override_applies_to_package_material() {
        let resolver = PackageResolver::standard();
        let roof = steep_roof();
        let waste = WasteSettings::default();
        let mut overrides = WasteOverrideTable::default();
        overrides.set("drip-edge", 0.0);
        let ctx = ResolutionContext {
            measurements: Some(&roof),
            waste: &waste,
            overrides: &overrides,
        };
        let entries = resolver.mandatory_materials(Some("GAF 1"), &ctx);
        let drip = entries.iter().find(|e| e.material.id == "drip-edge").unwrap();
        // (120 + 80) / 10 with no waste
        assert_eq!(drip.quantity, 20.0);
        assert_eq!(drip.waste_percent, 0.0);
    }
}
