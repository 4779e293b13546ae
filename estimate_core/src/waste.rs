//! # Waste Factors
//!
//! Resolves the effective waste fraction applied to a material's raw
//! quantity. Precedence, highest first:
//!
//! 1. A recorded per-material override (0-100 %, clamped)
//! 2. The primary steep-slope shingle's dedicated control (minimum 12 %)
//! 3. Other shingles: 12 %, whatever the global value
//! 4. Ventilation and accessories: 0 %, unless the global value is explicitly applied to them
//! 5. Everything else: the global waste percentage
//!
//! The global percentage is the labor waste percentage unless
//! [`WasteSettings::global_percent`] sets one explicitly.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::materials::catalog;
//! use estimate_core::waste::{resolve_waste, WasteOverrideTable, WasteSettings, WasteSource};
//!
//! let settings = WasteSettings::default().or_global(15.0);
//! let overrides = WasteOverrideTable::default();
//!
//! let drip_edge = catalog::standard().get("drip-edge").unwrap();
//! let waste = resolve_waste(drip_edge, &settings, &overrides);
//! assert_eq!(waste.percent, 15.0);
//! assert_eq!(waste.source, WasteSource::Global);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::materials::{Material, MaterialCategory};

/// Default waste for shingles, and the floor for the primary shingle's control
pub const DEFAULT_SHINGLE_WASTE_PERCENT: f64 = 12.0;

/// Default global waste percentage
pub const DEFAULT_GLOBAL_WASTE_PERCENT: f64 = 12.0;

/// Clamp a percentage into 0-100; non-finite reads as 0.
pub fn clamp_percent(percent: f64) -> f64 {
    lenient::finite_or_zero(percent).clamp(0.0, 100.0)
}

/// Caller-owned waste controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WasteSettings {
    /// Explicit global waste percentage; unset means the labor waste applies
    #[serde(
        alias = "globalWastePercentage",
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub global_percent: Option<f64>,

    /// Dedicated waste control for the primary steep-slope shingle
    #[serde(alias = "shingleWastePercentage", deserialize_with = "lenient::number_or_zero")]
    pub primary_shingle_percent: f64,

    /// Apply the global waste to ventilation and accessories as well
    pub apply_global_to_accessories: bool,
}

impl Default for WasteSettings {
    fn default() -> Self {
        WasteSettings {
            global_percent: None,
            primary_shingle_percent: DEFAULT_SHINGLE_WASTE_PERCENT,
            apply_global_to_accessories: false,
        }
    }
}

impl WasteSettings {
    /// Fill an unset global percentage from `percent` (the labor waste).
    pub fn or_global(&self, percent: f64) -> WasteSettings {
        WasteSettings {
            global_percent: self.global_percent.or(Some(percent)),
            ..self.clone()
        }
    }

    /// Effective global percentage, clamped to 0-100
    pub fn global(&self) -> f64 {
        clamp_percent(self.global_percent.unwrap_or(DEFAULT_GLOBAL_WASTE_PERCENT))
    }
}

/// Persisted per-material waste overrides, set by explicit user action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WasteOverrideTable {
    overrides: IndexMap<String, f64>,
}

impl WasteOverrideTable {
    /// Record an override. The stored value is clamped to 0-100.
    pub fn set(&mut self, material_id: impl Into<String>, percent: f64) {
        self.overrides.insert(material_id.into(), clamp_percent(percent));
    }

    /// Remove an override, returning to the default rules
    pub fn clear(&mut self, material_id: &str) -> Option<f64> {
        self.overrides.shift_remove(material_id)
    }

    pub fn get(&self, material_id: &str) -> Option<f64> {
        self.overrides.get(material_id).copied().map(clamp_percent)
    }

    pub fn is_overridden(&self, material_id: &str) -> bool {
        self.overrides.contains_key(material_id)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl FromIterator<(String, f64)> for WasteOverrideTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut table = WasteOverrideTable::default();
        for (id, percent) in iter {
            table.set(id, percent);
        }
        table
    }
}

/// Which rule produced a waste factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WasteSource {
    Override,
    PrimaryShingle,
    ShingleDefault,
    ManualCount,
    Global,
}

/// Effective waste for one material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WasteFactor {
    /// Waste percentage (0-100)
    pub percent: f64,
    pub source: WasteSource,
}

impl WasteFactor {
    /// Waste as a fraction, e.g. 0.12
    pub fn fraction(&self) -> f64 {
        self.percent / 100.0
    }
}

/// Resolve the effective waste for a material.
pub fn resolve_waste(
    material: &Material,
    settings: &WasteSettings,
    overrides: &WasteOverrideTable,
) -> WasteFactor {
    if let Some(percent) = overrides.get(&material.id) {
        return WasteFactor {
            percent,
            source: WasteSource::Override,
        };
    }

    if material.is_primary_shingle() {
        return WasteFactor {
            percent: clamp_percent(settings.primary_shingle_percent)
                .max(DEFAULT_SHINGLE_WASTE_PERCENT),
            source: WasteSource::PrimaryShingle,
        };
    }

    match material.category {
        MaterialCategory::Shingles => WasteFactor {
            percent: DEFAULT_SHINGLE_WASTE_PERCENT,
            source: WasteSource::ShingleDefault,
        },
        MaterialCategory::Ventilation | MaterialCategory::Accessories
            if !settings.apply_global_to_accessories =>
        {
            WasteFactor {
                percent: 0.0,
                source: WasteSource::ManualCount,
            }
        }
        _ => WasteFactor {
            percent: settings.global(),
            source: WasteSource::Global,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{catalog, PRIMARY_SHINGLE_ID};

    fn material(id: &str) -> &'static Material {
        catalog::standard().get(id).unwrap()
    }

    #[test]
    fn test_override_wins() {
        let mut overrides = WasteOverrideTable::default();
        overrides.set("drip-edge", 5.0);
        overrides.set(PRIMARY_SHINGLE_ID, 3.0);
        let settings = WasteSettings::default();

        let drip = resolve_waste(material("drip-edge"), &settings, &overrides);
        assert_eq!(drip.percent, 5.0);
        assert_eq!(drip.source, WasteSource::Override);

        // An explicit override is used verbatim, even below the slider floor
        let hdz = resolve_waste(material(PRIMARY_SHINGLE_ID), &settings, &overrides);
        assert_eq!(hdz.percent, 3.0);
    }

    #[test]
    fn test_override_is_clamped() {
        let mut overrides = WasteOverrideTable::default();
        overrides.set("drip-edge", 150.0);
        overrides.set("valley-metal", -10.0);
        let settings = WasteSettings::default();
        assert_eq!(resolve_waste(material("drip-edge"), &settings, &overrides).percent, 100.0);
        assert_eq!(resolve_waste(material("valley-metal"), &settings, &overrides).percent, 0.0);
    }

    #[test]
    fn test_primary_shingle_ignores_global() {
        let overrides = WasteOverrideTable::default();
        let settings = WasteSettings {
            global_percent: Some(30.0),
            primary_shingle_percent: 15.0,
            ..Default::default()
        };
        let waste = resolve_waste(material(PRIMARY_SHINGLE_ID), &settings, &overrides);
        assert_eq!(waste.percent, 15.0);
        assert_eq!(waste.source, WasteSource::PrimaryShingle);
    }

    #[test]
    fn test_primary_shingle_minimum() {
        let overrides = WasteOverrideTable::default();
        let settings = WasteSettings {
            primary_shingle_percent: 5.0,
            ..Default::default()
        };
        let waste = resolve_waste(material(PRIMARY_SHINGLE_ID), &settings, &overrides);
        assert_eq!(waste.percent, 12.0);
    }

    #[test]
    fn test_other_shingles_fixed_at_twelve() {
        let overrides = WasteOverrideTable::default();
        let settings = WasteSettings {
            global_percent: Some(0.0),
            ..Default::default()
        };
        let waste = resolve_waste(material("gaf-seal-a-ridge"), &settings, &overrides);
        assert_eq!(waste.percent, 12.0);
        assert_eq!(waste.source, WasteSource::ShingleDefault);
    }

    #[test]
    fn test_accessories_default_to_zero() {
        let overrides = WasteOverrideTable::default();
        let mut settings = WasteSettings {
            global_percent: Some(20.0),
            ..Default::default()
        };
        assert_eq!(resolve_waste(material("box-vent"), &settings, &overrides).percent, 0.0);
        assert_eq!(resolve_waste(material("coil-nails"), &settings, &overrides).percent, 0.0);

        settings.apply_global_to_accessories = true;
        assert_eq!(resolve_waste(material("coil-nails"), &settings, &overrides).percent, 20.0);
    }

    #[test]
    fn test_global_applies_to_other_categories() {
        let overrides = WasteOverrideTable::default();
        let settings = WasteSettings {
            global_percent: Some(8.0),
            ..Default::default()
        };
        for id in ["gaf-feltbuster", "low-slope-base-sheet", "valley-metal"] {
            let waste = resolve_waste(material(id), &settings, &overrides);
            assert_eq!(waste.percent, 8.0, "{}", id);
            assert!((waste.fraction() - 0.08).abs() < 1e-12);
        }
    }

    #[test]
    fn test_global_falls_back_to_labor_waste() {
        let overrides = WasteOverrideTable::default();
        let unset = WasteSettings::default();
        assert_eq!(resolve_waste(material("drip-edge"), &unset, &overrides).percent, 12.0);

        let labor = unset.or_global(30.0);
        assert_eq!(resolve_waste(material("drip-edge"), &labor, &overrides).percent, 30.0);

        // An explicit global setting beats the labor value
        let explicit = WasteSettings {
            global_percent: Some(5.0),
            ..Default::default()
        };
        let merged = explicit.or_global(30.0);
        assert_eq!(resolve_waste(material("drip-edge"), &merged, &overrides).percent, 5.0);
    }

    #[test]
    fn test_settings_decode_leniently() {
        let json = r#"{"globalWastePercentage": "18"}"#;
        let settings: WasteSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.global_percent, Some(18.0));
        let settings: WasteSettings = serde_json::from_str(r#"{"global_percent": "n/a"}"#).unwrap();
        assert_eq!(settings.global_percent, None);
        assert_eq!(serde_json::to_value(&settings).unwrap().get("global_percent"), None);
    }

    #[test]
    fn test_override_table_serialization() {
        let table: WasteOverrideTable = vec![("drip-edge".to_string(), 7.5)].into_iter().collect();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"drip-edge":7.5}"#);
        let mut parsed: WasteOverrideTable = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_overridden("drip-edge"));
        assert_eq!(parsed.clear("drip-edge"), Some(7.5));
        assert!(parsed.is_empty());
    }
}
