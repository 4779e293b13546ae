//! # Materials
//!
//! Material definitions and the roofing material catalog.
//!
//! Each catalog entry carries an explicit [`QuantityFormula`] tag with its
//! parameters, so quantity rules are data on the entry rather than matched
//! against id substrings.
//!
//! ## Categories
//!
//! - **Shingles**: field shingles, starter strips, hip and ridge caps
//! - **Underlayments**: synthetic felt and peel-and-stick ice & water shield
//! - **Low Slope**: base sheet, cap sheet, ISO board, primer, sealant
//! - **Metal**: drip edge, valley metal, flashing
//! - **Ventilation**: ridge vents, box vents, attic fans
//! - **Accessories**: pipe boots, nails, kits
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::materials::{catalog, MaterialCategory};
//!
//! let hdz = catalog::standard().get("gaf-timberline-hdz").unwrap();
//! assert_eq!(hdz.category, MaterialCategory::Shingles);
//! println!("{} - ${:.2} per {}", hdz.name, hdz.price, hdz.unit);
//! ```

pub mod catalog;

pub use catalog::{MaterialCatalog, PRIMARY_SHINGLE_ID};

use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::measurements::LinearMeasure;

/// Material category. Drives waste defaults and the interactive quantity floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialCategory {
    Shingles,
    Underlayments,
    LowSlope,
    Metal,
    Ventilation,
    Accessories,
}

impl MaterialCategory {
    /// All categories in catalog display order
    pub const ALL: [MaterialCategory; 6] = [
        MaterialCategory::Shingles,
        MaterialCategory::Underlayments,
        MaterialCategory::LowSlope,
        MaterialCategory::Metal,
        MaterialCategory::Ventilation,
        MaterialCategory::Accessories,
    ];

    /// Human-readable category name
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialCategory::Shingles => "Shingles",
            MaterialCategory::Underlayments => "Underlayments",
            MaterialCategory::LowSlope => "Low Slope",
            MaterialCategory::Metal => "Metal",
            MaterialCategory::Ventilation => "Ventilation",
            MaterialCategory::Accessories => "Accessories",
        }
    }

    /// Ventilation and accessories are counted per penetration and take no waste by default
    pub fn is_manually_counted(&self) -> bool {
        matches!(self, MaterialCategory::Ventilation | MaterialCategory::Accessories)
    }
}

impl std::fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Purchase unit of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialUnit {
    Bundle,
    Roll,
    Piece,
    Board,
    Box,
    Pail,
    Tube,
    Each,
}

impl MaterialUnit {
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialUnit::Bundle => "bundle",
            MaterialUnit::Roll => "roll",
            MaterialUnit::Piece => "piece",
            MaterialUnit::Board => "board",
            MaterialUnit::Box => "box",
            MaterialUnit::Pail => "pail",
            MaterialUnit::Tube => "tube",
            MaterialUnit::Each => "each",
        }
    }
}

impl std::fmt::Display for MaterialUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which part of the low-slope area a low-slope material covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LowSlopeScope {
    /// Every pitch area with rise 0-2
    AllLowSlope,
    /// Only rise-0 area (ISO board)
    ZeroPitchOnly,
}

/// Quantity formula attached to a catalog entry.
///
/// Every formula rounds up to whole purchase units.
///
/// ## JSON Serialization
///
/// ```json
/// { "kind": "FieldShingle", "sqft_per_unit": 33.3 }
/// { "kind": "ShingleTrim", "measures": ["Eave", "Rake"], "lf_per_unit": 120.0 }
/// { "kind": "Manual", "default_count": 1 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum QuantityFormula {
    /// Steep-slope area with waste divided by bundle coverage
    FieldShingle { sqft_per_unit: f64 },
    /// Starter and hip/ridge caps: linear run divided by per-unit coverage,
    /// no waste
    ShingleTrim {
        measures: Vec<LinearMeasure>,
        lf_per_unit: f64,
    },
    /// Sum of linear measures with waste divided by per-unit coverage
    /// (drip edge, valley metal, flashing, ridge vent)
    Linear {
        measures: Vec<LinearMeasure>,
        lf_per_unit: f64,
    },
    /// Total squares divided by squares per roll, no waste
    Underlayment { squares_per_unit: f64 },
    /// Valley plus eave coverage; at least one roll when any valley exists
    PeelAndStick { lf_per_unit: f64 },
    /// Low-slope area subset divided by coverage
    LowSlope {
        scope: LowSlopeScope,
        sqft_per_unit: f64,
    },
    /// Whole roof area divided by coverage (nails, fasteners)
    AreaCoverage { sqft_per_unit: f64 },
    /// Fixed per-penetration count entered by hand
    Manual { default_count: u32 },
}

impl Default for QuantityFormula {
    fn default() -> Self {
        QuantityFormula::Manual { default_count: 1 }
    }
}

impl QuantityFormula {
    /// Whether the quantity comes from a count instead of measurements
    pub fn is_manual(&self) -> bool {
        matches!(self, QuantityFormula::Manual { .. })
    }
}

/// A catalog material.
///
/// Immutable reference data; shared by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Stable key
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    pub category: MaterialCategory,

    pub unit: MaterialUnit,

    /// Unit price in dollars (>= 0)
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub price: f64,

    /// Human-readable coverage rule, e.g. "33.3 sq ft per bundle"
    #[serde(default)]
    pub coverage: String,

    /// Quantity formula tag
    #[serde(default)]
    pub formula: QuantityFormula,
}

impl Material {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: MaterialCategory,
        unit: MaterialUnit,
        price: f64,
        coverage: impl Into<String>,
        formula: QuantityFormula,
    ) -> Self {
        Material {
            id: id.into(),
            name: name.into(),
            category,
            unit,
            price,
            coverage: coverage.into(),
            formula,
        }
    }

    /// Unit price with non-finite and negative values read as 0
    pub fn unit_price(&self) -> f64 {
        lenient::measure_or_zero(self.price)
    }

    /// Whether this is the primary steep-slope shingle with its own waste control
    pub fn is_primary_shingle(&self) -> bool {
        self.id == PRIMARY_SHINGLE_ID
    }

    /// Display label: name, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&MaterialCategory::LowSlope).unwrap();
        assert_eq!(json, "\"LOW_SLOPE\"");
        let parsed: MaterialCategory = serde_json::from_str("\"VENTILATION\"").unwrap();
        assert_eq!(parsed, MaterialCategory::Ventilation);
    }

    #[test]
    fn test_manually_counted_categories() {
        assert!(MaterialCategory::Ventilation.is_manually_counted());
        assert!(MaterialCategory::Accessories.is_manually_counted());
        assert!(!MaterialCategory::Metal.is_manually_counted());
    }

    #[test]
    fn test_formula_tagging() {
        let formula = QuantityFormula::Linear {
            measures: vec![LinearMeasure::Ridge, LinearMeasure::Hip],
            lf_per_unit: 25.0,
        };
        let json = serde_json::to_string(&formula).unwrap();
        assert!(json.contains("\"kind\":\"Linear\""));
        let parsed: QuantityFormula = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, formula);
    }

    #[test]
    fn test_material_decodes_without_formula() {
        let json =
            r#"{"id": "pipe-boot", "category": "ACCESSORIES", "unit": "Each", "price": "14.00"}"#;
        let material: Material = serde_json::from_str(json).unwrap();
        assert_eq!(material.price, 14.0);
        assert!(material.formula.is_manual());
        assert_eq!(material.display_name(), "pipe-boot");
    }

    #[test]
    fn test_unit_price_sanitized() {
        let mut material = catalog::standard().get("drip-edge").unwrap().clone();
        material.price = f64::NAN;
        assert_eq!(material.unit_price(), 0.0);
    }
}
