//! # Quantity Resolution
//!
//! Converts a material, the roof measurements and an effective waste fraction
//! into a whole number of purchase units.
//!
//! Pure function of its inputs. A missing measurement set or missing linear
//! measures count as zero, so a partially specified roof still yields a
//! best-effort quantity.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::materials::catalog;
//! use estimate_core::measurements::MeasurementSet;
//! use estimate_core::quantity::resolve_quantity;
//!
//! let roof = MeasurementSet::single_pitch("6:12", 2000.0);
//! let hdz = catalog::standard().get("gaf-timberline-hdz").unwrap();
//!
//! // 2000 sq ft * 1.12 / 33.3 = 67.27 -> 68 bundles
//! assert_eq!(resolve_quantity(hdz, Some(&roof), 0.12), 68.0);
//! ```

use crate::lenient;
use crate::materials::{LowSlopeScope, Material, QuantityFormula};
use crate::measurements::{LinearMeasure, MeasurementSet};
use crate::units::{whole_units, LinearFeet, SquareFeet};

/// Resolve the required quantity of a material.
///
/// `waste_fraction` is the effective waste (0.12 for 12 %). Negative or
/// non-finite waste counts as 0.
pub fn resolve_quantity(
    material: &Material,
    measurements: Option<&MeasurementSet>,
    waste_fraction: f64,
) -> f64 {
    let waste = lenient::measure_or_zero(waste_fraction);

    if let QuantityFormula::Manual { default_count } = material.formula {
        return f64::from(default_count);
    }

    let Some(roof) = measurements else {
        return 0.0;
    };

    match &material.formula {
        QuantityFormula::FieldShingle { sqft_per_unit } => {
            divide_area(roof.steep_area().with_waste(waste), *sqft_per_unit)
        }
        QuantityFormula::ShingleTrim {
            measures,
            lf_per_unit,
        } => divide_length(roof.linear_sum(measures), *lf_per_unit),
        QuantityFormula::Linear {
            measures,
            lf_per_unit,
        } => divide_length(roof.linear_sum(measures).with_waste(waste), *lf_per_unit),
        QuantityFormula::Underlayment { squares_per_unit } => {
            divide(roof.total_squares().0, *squares_per_unit)
        }
        QuantityFormula::PeelAndStick { lf_per_unit } => {
            let run = roof.linear_sum(&[LinearMeasure::Valley, LinearMeasure::Eave]);
            let rolls = divide_length(run.with_waste(waste), *lf_per_unit);
            if roof.linear(LinearMeasure::Valley).0 > 0.0 {
                rolls.max(1.0)
            } else {
                rolls
            }
        }
        QuantityFormula::LowSlope {
            scope,
            sqft_per_unit,
        } => {
            let area = match scope {
                LowSlopeScope::AllLowSlope => roof.low_slope_area(),
                LowSlopeScope::ZeroPitchOnly => roof.zero_pitch_area(),
            };
            divide_area(area.with_waste(waste), *sqft_per_unit)
        }
        QuantityFormula::AreaCoverage { sqft_per_unit } => {
            divide_area(roof.total_area().with_waste(waste), *sqft_per_unit)
        }
        QuantityFormula::Manual { default_count } => f64::from(*default_count),
    }
}

/// Quantity for a material being added interactively.
///
/// Manually counted categories (ventilation, accessories) never drop below
/// one unit when added by hand.
pub fn interactive_quantity(material: &Material, computed: f64) -> f64 {
    let computed = lenient::measure_or_zero(computed);
    if material.category.is_manually_counted() && computed <= 0.0 {
        return 1.0;
    }
    computed
}

fn divide_area(area: SquareFeet, sqft_per_unit: f64) -> f64 {
    divide(area.0, sqft_per_unit)
}

fn divide_length(length: LinearFeet, lf_per_unit: f64) -> f64 {
    divide(length.0, lf_per_unit)
}

fn divide(amount: f64, per_unit: f64) -> f64 {
    if !per_unit.is_finite() || per_unit <= 0.0 {
        return 0.0;
    }
    whole_units(amount / per_unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::catalog;
    use crate::measurements::PitchArea;

    fn material(id: &str) -> &'static Material {
        catalog::standard().get(id).unwrap()
    }

    fn sample_roof() -> MeasurementSet {
        MeasurementSet {
            total_area: 2600.0,
            predominant_pitch: "6:12".to_string(),
            areas_by_pitch: vec![
                PitchArea::new("6:12", 2000.0),
                PitchArea::new("1:12", 400.0),
                PitchArea::new("0:12", 200.0),
            ],
            eave_length: 140.0,
            rake_length: 100.0,
            ridge_length: 40.0,
            hip_length: 10.0,
            valley_length: 30.0,
        }
    }

    #[test]
    fn test_field_shingle_uses_steep_area_only() {
        let roof = sample_roof();
        // 2000 * 1.12 / 33.3 = 67.27
        assert_eq!(resolve_quantity(material("gaf-timberline-hdz"), Some(&roof), 0.12), 68.0);
        // 2000 / 33.3 = 60.06
        assert_eq!(resolve_quantity(material("gaf-timberline-hdz"), Some(&roof), 0.0), 61.0);
    }

    #[test]
    fn test_trims() {
        let roof = sample_roof();
        // (140 + 100) / 120 = 2
        assert_eq!(resolve_quantity(material("gaf-prostart-starter"), Some(&roof), 0.0), 2.0);
        // (40 + 10) / 25 = 2
        assert_eq!(resolve_quantity(material("gaf-seal-a-ridge"), Some(&roof), 0.0), 2.0);
    }

    #[test]
    fn test_trims_and_underlayment_ignore_waste() {
        let roof = MeasurementSet {
            eave_length: 140.0,
            rake_length: 100.0,
            ridge_length: 40.0,
            hip_length: 10.0,
            ..MeasurementSet::single_pitch("6:12", 2000.0)
        };
        // ceil(240 / 120), not ceil(240 * 1.12 / 120)
        assert_eq!(resolve_quantity(material("gaf-prostart-starter"), Some(&roof), 0.12), 2.0);
        assert_eq!(resolve_quantity(material("gaf-seal-a-ridge"), Some(&roof), 0.12), 2.0);
        // ceil(20 / 10)
        assert_eq!(resolve_quantity(material("gaf-feltbuster"), Some(&roof), 0.12), 2.0);
        // Metal still carries waste: 240 * 1.12 / 10 = 26.88
        assert_eq!(resolve_quantity(material("drip-edge"), Some(&roof), 0.12), 27.0);
    }

    #[test]
    fn test_underlayment() {
        let roof = sample_roof();
        // 26 squares / 10
        assert_eq!(resolve_quantity(material("gaf-feltbuster"), Some(&roof), 0.0), 3.0);
        let small = MeasurementSet::single_pitch("5:12", 1000.0);
        assert_eq!(resolve_quantity(material("gaf-feltbuster"), Some(&small), 0.0), 1.0);
    }

    #[test]
    fn test_peel_and_stick_minimum_with_valley() {
        let roof = MeasurementSet {
            total_area: 1000.0,
            valley_length: 5.0,
            ..Default::default()
        };
        let peel = material("gaf-weatherwatch-peel-stick");
        assert_eq!(resolve_quantity(peel, Some(&roof), 0.0), 1.0);

        let no_valley = MeasurementSet {
            total_area: 1000.0,
            ..Default::default()
        };
        assert_eq!(resolve_quantity(peel, Some(&no_valley), 0.0), 0.0);

        // (30 + 140) / 66.7 = 2.55
        assert_eq!(
            resolve_quantity(material("gaf-weatherwatch-peel-stick"), Some(&sample_roof()), 0.0),
            3.0
        );
    }

    #[test]
    fn test_low_slope_subsets() {
        let roof = sample_roof();
        // low-slope area 600 / 200
        assert_eq!(resolve_quantity(material("low-slope-base-sheet"), Some(&roof), 0.0), 3.0);
        // 600 / 100
        assert_eq!(resolve_quantity(material("low-slope-cap-sheet"), Some(&roof), 0.0), 6.0);
        // ISO only over the 0/12 area: 200 / 32 = 6.25
        assert_eq!(resolve_quantity(material("low-slope-iso-board"), Some(&roof), 0.0), 7.0);
    }

    #[test]
    fn test_iso_zero_without_flat_area() {
        let roof = MeasurementSet::single_pitch("2:12", 800.0);
        assert_eq!(resolve_quantity(material("low-slope-iso-board"), Some(&roof), 0.12), 0.0);
    }

    #[test]
    fn test_metal() {
        let roof = sample_roof();
        // (140 + 100) / 10
        assert_eq!(resolve_quantity(material("drip-edge"), Some(&roof), 0.0), 24.0);
        assert_eq!(resolve_quantity(material("valley-metal"), Some(&roof), 0.0), 3.0);
    }

    #[test]
    fn test_manual_count_ignores_measurements() {
        assert_eq!(resolve_quantity(material("box-vent"), None, 0.5), 1.0);
        assert_eq!(resolve_quantity(material("pipe-boot"), Some(&sample_roof()), 0.0), 1.0);
    }

    #[test]
    fn test_missing_measurements_yield_zero() {
        assert_eq!(resolve_quantity(material("drip-edge"), None, 0.12), 0.0);
        assert_eq!(resolve_quantity(material("gaf-timberline-hdz"), None, 0.12), 0.0);

        let partial = MeasurementSet {
            total_area: 1500.0,
            eave_length: f64::NAN,
            ..Default::default()
        };
        assert_eq!(resolve_quantity(material("drip-edge"), Some(&partial), 0.12), 0.0);
        assert_eq!(resolve_quantity(material("gaf-timberline-hdz"), Some(&partial), 0.0), 46.0);
    }

    #[test]
    fn test_bad_waste_reads_as_zero() {
        let roof = sample_roof();
        let clean = resolve_quantity(material("drip-edge"), Some(&roof), 0.0);
        assert_eq!(resolve_quantity(material("drip-edge"), Some(&roof), f64::NAN), clean);
        assert_eq!(resolve_quantity(material("drip-edge"), Some(&roof), -0.5), clean);
    }

    #[test]
    fn test_interactive_floor() {
        assert_eq!(interactive_quantity(material("box-vent"), 0.0), 1.0);
        assert_eq!(interactive_quantity(material("gaf-cobra-ridge-vent"), 0.0), 1.0);
        assert_eq!(interactive_quantity(material("pipe-boot"), 4.0), 4.0);
        assert_eq!(interactive_quantity(material("drip-edge"), 0.0), 0.0);
    }

    #[test]
    fn test_quantity_is_deterministic() {
        let roof = sample_roof();
        for m in catalog::standard().iter() {
            let a = resolve_quantity(m, Some(&roof), 0.12);
            let b = resolve_quantity(m, Some(&roof), 0.12);
            assert_eq!(a.to_bits(), b.to_bits(), "{}", m.id);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::materials::catalog;
    use crate::measurements::PitchArea;
    use proptest::prelude::*;

    fn roof_strategy() -> impl Strategy<Value = MeasurementSet> {
        (
            prop::collection::vec((0u32..14, 0.0f64..4000.0), 0..4),
            0.0f64..400.0,
            0.0f64..400.0,
            0.0f64..200.0,
            0.0f64..200.0,
            0.0f64..150.0,
        )
            .prop_map(|(areas, eave, rake, ridge, hip, valley)| {
                let areas_by_pitch: Vec<PitchArea> = areas
                    .into_iter()
                    .map(|(rise, area)| PitchArea::new(format!("{}:12", rise), area))
                    .collect();
                MeasurementSet {
                    total_area: areas_by_pitch.iter().map(|pa| pa.area).sum(),
                    predominant_pitch: String::new(),
                    areas_by_pitch,
                    eave_length: eave,
                    rake_length: rake,
                    ridge_length: ridge,
                    hip_length: hip,
                    valley_length: valley,
                }
            })
    }

    proptest! {
        #[test]
        fn more_waste_never_means_fewer_units(
            roof in roof_strategy(),
            low in 0.0f64..0.5,
            extra in 0.0f64..0.5,
        ) {
            for material in catalog::standard().iter() {
                let base = resolve_quantity(material, Some(&roof), low);
                let more = resolve_quantity(material, Some(&roof), low + extra);
                prop_assert!(more >= base, "{}: {} < {}", material.id, more, base);
            }
        }

        #[test]
        fn quantities_are_whole_and_non_negative(roof in roof_strategy(), waste in 0.0f64..1.0) {
            for material in catalog::standard().iter() {
                let q = resolve_quantity(material, Some(&roof), waste);
                prop_assert!(q >= 0.0);
                prop_assert_eq!(q.fract(), 0.0);
            }
        }
    }
}
