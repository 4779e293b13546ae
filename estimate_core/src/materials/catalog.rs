//! Standard roofing material catalog.
//!
//! Static reference data: prices are per purchase unit, coverages follow the
//! manufacturers' published figures.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{LowSlopeScope, Material, MaterialCategory, MaterialUnit, QuantityFormula};
use crate::measurements::LinearMeasure;

/// The primary steep-slope field shingle. Its waste has a dedicated control.
pub const PRIMARY_SHINGLE_ID: &str = "gaf-timberline-hdz";

/// Square feet covered by one bundle of architectural shingles
pub const SHINGLE_BUNDLE_SQFT: f64 = 33.3;

static STANDARD_CATALOG: Lazy<MaterialCatalog> =
    Lazy::new(|| MaterialCatalog::from_materials(standard_materials()));

/// The built-in catalog
pub fn standard() -> &'static MaterialCatalog {
    &STANDARD_CATALOG
}

/// Id-keyed material catalog in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialCatalog {
    materials: IndexMap<String, Material>,
}

impl MaterialCatalog {
    /// Build a catalog. Later entries replace earlier ones with the same id.
    pub fn from_materials(materials: impl IntoIterator<Item = Material>) -> Self {
        MaterialCatalog {
            materials: materials.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.materials.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Materials of one category, in catalog order
    pub fn by_category(&self, category: MaterialCategory) -> impl Iterator<Item = &Material> {
        self.materials.values().filter(move |m| m.category == category)
    }
}

fn linear(measures: &[LinearMeasure], lf_per_unit: f64) -> QuantityFormula {
    QuantityFormula::Linear {
        measures: measures.to_vec(),
        lf_per_unit,
    }
}

fn trim(measures: &[LinearMeasure], lf_per_unit: f64) -> QuantityFormula {
    QuantityFormula::ShingleTrim {
        measures: measures.to_vec(),
        lf_per_unit,
    }
}

fn low_slope(scope: LowSlopeScope, sqft_per_unit: f64) -> QuantityFormula {
    QuantityFormula::LowSlope {
        scope,
        sqft_per_unit,
    }
}

const EAVE_RAKE: &[LinearMeasure] = &[LinearMeasure::Eave, LinearMeasure::Rake];
const RIDGE_HIP: &[LinearMeasure] = &[LinearMeasure::Ridge, LinearMeasure::Hip];

fn standard_materials() -> Vec<Material> {
    use MaterialCategory::*;
    use MaterialUnit::*;

    vec![
        // Shingles
        Material::new(
            PRIMARY_SHINGLE_ID,
            "GAF Timberline HDZ",
            Shingles,
            Bundle,
            42.50,
            "33.3 sq ft per bundle (3 bundles per square)",
            QuantityFormula::FieldShingle { sqft_per_unit: SHINGLE_BUNDLE_SQFT },
        ),
        Material::new(
            "gaf-timberline-uhdz",
            "GAF Timberline UHDZ",
            Shingles,
            Bundle,
            55.00,
            "33.3 sq ft per bundle (3 bundles per square)",
            QuantityFormula::FieldShingle { sqft_per_unit: SHINGLE_BUNDLE_SQFT },
        ),
        Material::new(
            "gaf-prostart-starter",
            "GAF Pro-Start Starter Strip",
            Shingles,
            Bundle,
            58.00,
            "120 LF per bundle along eaves and rakes",
            trim(EAVE_RAKE, 120.0),
        ),
        Material::new(
            "gaf-seal-a-ridge",
            "GAF Seal-A-Ridge",
            Shingles,
            Bundle,
            68.00,
            "25 LF per bundle along ridges and hips",
            trim(RIDGE_HIP, 25.0),
        ),
        Material::new(
            "gaf-timbertex",
            "GAF TimberTex Premium Ridge Cap",
            Shingles,
            Bundle,
            78.00,
            "20 LF per bundle along ridges and hips",
            trim(RIDGE_HIP, 20.0),
        ),
        Material::new(
            "oc-duration",
            "Owens Corning TruDefinition Duration",
            Shingles,
            Bundle,
            41.00,
            "33.3 sq ft per bundle (3 bundles per square)",
            QuantityFormula::FieldShingle { sqft_per_unit: SHINGLE_BUNDLE_SQFT },
        ),
        Material::new(
            "oc-oakridge",
            "Owens Corning Oakridge",
            Shingles,
            Bundle,
            37.00,
            "33.3 sq ft per bundle (3 bundles per square)",
            QuantityFormula::FieldShingle { sqft_per_unit: SHINGLE_BUNDLE_SQFT },
        ),
        Material::new(
            "oc-starter-strip",
            "Owens Corning Starter Strip Plus",
            Shingles,
            Bundle,
            52.00,
            "105 LF per bundle along eaves and rakes",
            trim(EAVE_RAKE, 105.0),
        ),
        Material::new(
            "oc-proedge-hip-ridge",
            "Owens Corning ProEdge Hip & Ridge",
            Shingles,
            Bundle,
            64.00,
            "33 LF per bundle along ridges and hips",
            trim(RIDGE_HIP, 33.0),
        ),
        // Underlayments
        Material::new(
            "gaf-feltbuster",
            "GAF FeltBuster Synthetic Underlayment",
            Underlayments,
            Roll,
            105.00,
            "10 squares per roll",
            QuantityFormula::Underlayment { squares_per_unit: 10.0 },
        ),
        Material::new(
            "gaf-deck-armor",
            "GAF Deck-Armor Breathable Underlayment",
            Underlayments,
            Roll,
            165.00,
            "10 squares per roll",
            QuantityFormula::Underlayment { squares_per_unit: 10.0 },
        ),
        Material::new(
            "oc-deck-defense",
            "Owens Corning Deck Defense",
            Underlayments,
            Roll,
            150.00,
            "10 squares per roll",
            QuantityFormula::Underlayment { squares_per_unit: 10.0 },
        ),
        Material::new(
            "gaf-weatherwatch-peel-stick",
            "GAF WeatherWatch Ice & Water Shield",
            Underlayments,
            Roll,
            120.00,
            "66.7 LF per roll along valleys and eaves",
            QuantityFormula::PeelAndStick { lf_per_unit: 66.7 },
        ),
        Material::new(
            "gaf-stormguard-peel-stick",
            "GAF StormGuard Film-Surfaced Leak Barrier",
            Underlayments,
            Roll,
            145.00,
            "66.7 LF per roll along valleys and eaves",
            QuantityFormula::PeelAndStick { lf_per_unit: 66.7 },
        ),
        Material::new(
            "oc-weatherlock-g-peel-stick",
            "Owens Corning WeatherLock G",
            Underlayments,
            Roll,
            130.00,
            "66.7 LF per roll along valleys and eaves",
            QuantityFormula::PeelAndStick { lf_per_unit: 66.7 },
        ),
        // Low slope
        Material::new(
            "low-slope-base-sheet",
            "GAF Liberty SBS Self-Adhering Base Sheet",
            LowSlope,
            Roll,
            115.00,
            "2 squares per roll on 0-2/12 areas",
            low_slope(LowSlopeScope::AllLowSlope, 200.0),
        ),
        Material::new(
            "low-slope-cap-sheet",
            "GAF Liberty SBS Self-Adhering Cap Sheet",
            LowSlope,
            Roll,
            125.00,
            "1 square per roll on 0-2/12 areas",
            low_slope(LowSlopeScope::AllLowSlope, 100.0),
        ),
        Material::new(
            "low-slope-iso-board",
            "1/2\" Polyiso ISO Board",
            LowSlope,
            Board,
            32.00,
            "32 sq ft per 4x8 board on 0/12 areas only",
            low_slope(LowSlopeScope::ZeroPitchOnly, 32.0),
        ),
        Material::new(
            "low-slope-primer",
            "Asphalt Primer",
            LowSlope,
            Pail,
            65.00,
            "5 squares per 5 gal pail on 0-2/12 areas",
            low_slope(LowSlopeScope::AllLowSlope, 500.0),
        ),
        Material::new(
            "low-slope-sealant",
            "Modified Bitumen Flashing Sealant",
            LowSlope,
            Tube,
            9.50,
            "1 tube per 2.5 squares on 0-2/12 areas",
            low_slope(LowSlopeScope::AllLowSlope, 250.0),
        ),
        // Metal
        Material::new(
            "drip-edge",
            "Aluminum Drip Edge",
            Metal,
            Piece,
            12.50,
            "10 ft piece along eaves and rakes",
            linear(EAVE_RAKE, 10.0),
        ),
        Material::new(
            "valley-metal",
            "W-Valley Metal",
            Metal,
            Piece,
            28.00,
            "10 ft piece along valleys",
            linear(&[LinearMeasure::Valley], 10.0),
        ),
        Material::new(
            "gravel-stop-flashing",
            "Gravel Stop Edge Flashing",
            Metal,
            Piece,
            24.00,
            "10 ft piece along eaves",
            linear(&[LinearMeasure::Eave], 10.0),
        ),
        Material::new(
            "step-flashing",
            "Step Flashing (bundle of 100)",
            Metal,
            Bundle,
            45.00,
            "Counted per wall intersection",
            QuantityFormula::Manual { default_count: 1 },
        ),
        // Ventilation
        Material::new(
            "gaf-cobra-ridge-vent",
            "GAF Cobra Ridge Vent",
            Ventilation,
            Piece,
            22.00,
            "4 ft piece along ridges",
            linear(&[LinearMeasure::Ridge], 4.0),
        ),
        Material::new(
            "box-vent",
            "Static Box Vent",
            Ventilation,
            Each,
            18.00,
            "One per penetration",
            QuantityFormula::Manual { default_count: 1 },
        ),
        Material::new(
            "turbine-vent",
            "12\" Turbine Vent",
            Ventilation,
            Each,
            55.00,
            "One per penetration",
            QuantityFormula::Manual { default_count: 1 },
        ),
        Material::new(
            "power-attic-fan",
            "Power Attic Fan",
            Ventilation,
            Each,
            285.00,
            "One per penetration",
            QuantityFormula::Manual { default_count: 1 },
        ),
        // Accessories
        Material::new(
            "pipe-boot",
            "Pipe Boot 1.5\"-3\"",
            Accessories,
            Each,
            14.00,
            "One per pipe penetration",
            QuantityFormula::Manual { default_count: 1 },
        ),
        Material::new(
            "chimney-flashing-kit",
            "Chimney Flashing Kit",
            Accessories,
            Each,
            125.00,
            "One per chimney",
            QuantityFormula::Manual { default_count: 1 },
        ),
        Material::new(
            "coil-nails",
            "1-1/4\" Coil Roofing Nails",
            Accessories,
            Box,
            48.00,
            "1 box per 15 squares",
            QuantityFormula::AreaCoverage { sqft_per_unit: 1500.0 },
        ),
        Material::new(
            "cap-nails",
            "Plastic Cap Nails",
            Accessories,
            Box,
            32.00,
            "1 box per 20 squares",
            QuantityFormula::AreaCoverage { sqft_per_unit: 2000.0 },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog = standard();
        assert!(catalog.contains(PRIMARY_SHINGLE_ID));
        assert!(catalog.get("not-a-material").is_none());
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let materials = standard_materials();
        assert_eq!(materials.len(), standard().len());
    }

    #[test]
    fn test_every_category_is_stocked() {
        for category in MaterialCategory::ALL {
            assert!(
                standard().by_category(category).next().is_some(),
                "no materials in {}",
                category
            );
        }
    }

    #[test]
    fn test_prices_are_non_negative() {
        for material in standard().iter() {
            assert!(material.price >= 0.0, "{} has a negative price", material.id);
        }
    }

    #[test]
    fn test_iso_board_is_zero_pitch_only() {
        let iso = standard().get("low-slope-iso-board").unwrap();
        assert!(matches!(
            iso.formula,
            QuantityFormula::LowSlope { scope: LowSlopeScope::ZeroPitchOnly, .. }
        ));
    }
}
