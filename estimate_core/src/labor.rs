//! # Labor Cost Engine
//!
//! Computes labor per pitch band plus discrete add-ons.
//!
//! ## Rate Table
//!
//! | Rise | Rate per square |
//! |------|-----------------|
//! | 0    | pitch override, else 159 |
//! | 1-2  | pitch override, else 109 |
//! | 3-7  | `labor_rate` (default 85) |
//! | 8+   | pitch override, else `90 + (rise - 8) * 5` |
//!
//! Each pitch line costs `rate * ceil(area / 100) * (1 + waste / 100)`.
//!
//! `include_low_slope_labor` gates rise 0-2 and `include_steep_slope_labor`
//! gates every rise of 3 and up, the standard 3-7 band included.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::labor::{calculate_labor, LaborConfiguration};
//! use estimate_core::measurements::MeasurementSet;
//!
//! let roof = MeasurementSet::single_pitch("6:12", 2000.0);
//! let config = LaborConfiguration { include_permits: false, ..Default::default() };
//!
//! let labor = calculate_labor(Some(&roof), &config);
//! // 20 squares * $85 * 1.12
//! assert!((labor.total - 1904.0).abs() < 1e-6);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::measurements::{parse_rise, LinearMeasure, MeasurementSet, SlopeBand};
use crate::units::{SquareFeet, Squares};

/// Default per-square rate for the standard 3-7 band
pub const DEFAULT_LABOR_RATE: f64 = 85.0;
/// Default rate for 0/12
pub const FLAT_RATE: f64 = 159.0;
/// Default rate for 1/12 and 2/12
pub const LOW_SLOPE_RATE: f64 = 109.0;
/// Rate at 8/12; each additional rise adds [`STEEP_RATE_STEP`]
pub const STEEP_BASE_RATE: f64 = 90.0;
pub const STEEP_RATE_STEP: f64 = 5.0;

/// Labor configuration entered by the user.
///
/// Every field has a default, so a partial JSON object decodes. The
/// camelCase names used by form state are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaborConfiguration {
    /// Per-square rate for rise 3-7
    #[serde(alias = "laborRate", deserialize_with = "lenient::number_or_zero")]
    pub labor_rate: f64,

    /// Sparse pitch-string -> rate overrides (e.g. `"0:12": 175`)
    #[serde(alias = "pitchRates", deserialize_with = "lenient::number_map")]
    pub pitch_rates: IndexMap<String, f64>,

    /// Labor waste percentage
    #[serde(alias = "wastePercentage", deserialize_with = "lenient::number_or_zero")]
    pub waste_percentage: f64,

    #[serde(alias = "includeLowSlopeLabor")]
    pub include_low_slope_labor: bool,

    #[serde(alias = "includeSteepSlopeLabor")]
    pub include_steep_slope_labor: bool,

    #[serde(alias = "isHandload")]
    pub is_handload: bool,
    #[serde(alias = "handloadRate", deserialize_with = "lenient::number_or_zero")]
    pub handload_rate: f64,

    #[serde(alias = "includeDumpsters")]
    pub include_dumpsters: bool,
    #[serde(alias = "dumpsterCount", deserialize_with = "lenient::count")]
    pub dumpster_count: u32,
    #[serde(alias = "dumpsterRate", deserialize_with = "lenient::number_or_zero")]
    pub dumpster_rate: f64,

    #[serde(alias = "includePermits")]
    pub include_permits: bool,
    #[serde(alias = "permitCount", deserialize_with = "lenient::count")]
    pub permit_count: u32,
    /// Fee for the first permit
    #[serde(alias = "permitRate", deserialize_with = "lenient::number_or_zero")]
    pub permit_rate: f64,
    /// Fee for each permit after the first
    #[serde(alias = "permitAdditionalRate", deserialize_with = "lenient::number_or_zero")]
    pub permit_additional_rate: f64,

    #[serde(alias = "includeGutters")]
    pub include_gutters: bool,
    /// Gutter run in LF; the eave length is used when absent
    #[serde(alias = "gutterLinearFeet")]
    pub gutter_linear_feet: Option<f64>,
    #[serde(alias = "gutterRate", deserialize_with = "lenient::number_or_zero")]
    pub gutter_rate: f64,

    #[serde(alias = "includeDownspouts")]
    pub include_downspouts: bool,
    #[serde(alias = "downspoutCount", deserialize_with = "lenient::count")]
    pub downspout_count: u32,
    #[serde(alias = "downspoutRate", deserialize_with = "lenient::number_or_zero")]
    pub downspout_rate: f64,

    #[serde(alias = "includeDetachResetGutters")]
    pub include_detach_reset_gutters: bool,
    /// Detach/reset run in LF; the eave length is used when absent
    #[serde(alias = "detachResetGutterLinearFeet")]
    pub detach_reset_linear_feet: Option<f64>,
    #[serde(alias = "detachResetGutterRate", deserialize_with = "lenient::number_or_zero")]
    pub detach_reset_rate: f64,

    #[serde(alias = "includeSkylights2x2")]
    pub include_skylights_2x2: bool,
    #[serde(alias = "skylights2x2Count", deserialize_with = "lenient::count")]
    pub skylights_2x2_count: u32,
    #[serde(alias = "skylights2x2Rate", deserialize_with = "lenient::number_or_zero")]
    pub skylights_2x2_rate: f64,

    #[serde(alias = "includeSkylights2x4")]
    pub include_skylights_2x4: bool,
    #[serde(alias = "skylights2x4Count", deserialize_with = "lenient::count")]
    pub skylights_2x4_count: u32,
    #[serde(alias = "skylights2x4Rate", deserialize_with = "lenient::number_or_zero")]
    pub skylights_2x4_rate: f64,
}

impl Default for LaborConfiguration {
    fn default() -> Self {
        LaborConfiguration {
            labor_rate: DEFAULT_LABOR_RATE,
            pitch_rates: IndexMap::new(),
            waste_percentage: 12.0,
            include_low_slope_labor: true,
            include_steep_slope_labor: true,
            is_handload: false,
            handload_rate: 10.0,
            include_dumpsters: false,
            dumpster_count: 1,
            dumpster_rate: 450.0,
            include_permits: true,
            permit_count: 1,
            permit_rate: 450.0,
            permit_additional_rate: 150.0,
            include_gutters: false,
            gutter_linear_feet: None,
            gutter_rate: 12.0,
            include_downspouts: false,
            downspout_count: 0,
            downspout_rate: 85.0,
            include_detach_reset_gutters: false,
            detach_reset_linear_feet: None,
            detach_reset_rate: 4.0,
            include_skylights_2x2: false,
            skylights_2x2_count: 0,
            skylights_2x2_rate: 375.0,
            include_skylights_2x4: false,
            skylights_2x4_count: 0,
            skylights_2x4_rate: 475.0,
        }
    }
}

impl LaborConfiguration {
    /// Waste multiplier `1 + waste / 100`; malformed or negative waste reads as 0
    pub fn waste_multiplier(&self) -> f64 {
        1.0 + lenient::measure_or_zero(self.waste_percentage) / 100.0
    }

    /// Override rate for a pitch: exact string first, then `N:12` and `N/12`.
    pub fn pitch_override(&self, pitch: &str, rise: u32) -> Option<f64> {
        let exact = self.pitch_rates.get(pitch.trim());
        exact
            .or_else(|| self.pitch_rates.get(&format!("{}:12", rise)))
            .or_else(|| self.pitch_rates.get(&format!("{}/12", rise)))
            .copied()
            .filter(|rate| rate.is_finite() && *rate >= 0.0)
    }

    /// Per-square labor rate for a pitch string.
    ///
    /// ```rust
    /// use estimate_core::labor::LaborConfiguration;
    ///
    /// let config = LaborConfiguration::default();
    /// assert_eq!(config.rate_for_pitch("7:12"), 85.0);
    /// assert_eq!(config.rate_for_pitch("8:12"), 90.0);
    /// assert_eq!(config.rate_for_pitch("9/12"), 95.0);
    /// ```
    pub fn rate_for_pitch(&self, pitch: &str) -> f64 {
        let rise = parse_rise(pitch);
        match SlopeBand::from_rise(rise) {
            SlopeBand::Flat => self.pitch_override(pitch, rise).unwrap_or(FLAT_RATE),
            SlopeBand::LowSlope => self.pitch_override(pitch, rise).unwrap_or(LOW_SLOPE_RATE),
            SlopeBand::Standard => lenient::measure_or_zero(self.labor_rate),
            SlopeBand::Steep => self
                .pitch_override(pitch, rise)
                .unwrap_or(STEEP_BASE_RATE + f64::from(rise - 8) * STEEP_RATE_STEP),
        }
    }

    /// Whether labor for a slope band is enabled
    pub fn band_enabled(&self, band: SlopeBand) -> bool {
        if band.is_low_slope() {
            self.include_low_slope_labor
        } else {
            self.include_steep_slope_labor
        }
    }
}

/// Kind of a labor line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaborLineKind {
    /// Roofing labor for one pitch entry
    Pitch,
    /// Roofing labor from the total area when no pitch breakdown exists
    TotalAreaFallback,
    Handload,
    Dumpsters,
    Permits,
    Gutters,
    Downspouts,
    DetachResetGutters,
    Skylights2x2,
    Skylights2x4,
}

impl LaborLineKind {
    /// Whether the line is roofing labor billed per square
    pub fn is_roofing(&self) -> bool {
        matches!(self, LaborLineKind::Pitch | LaborLineKind::TotalAreaFallback)
    }
}

/// One itemized labor line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborLine {
    pub kind: LaborLineKind,
    pub description: String,
    /// Pitch string for pitch lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<String>,
    /// Squares, count or linear feet, depending on kind
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

/// Itemized labor and its total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaborBreakdown {
    pub lines: Vec<LaborLine>,
    /// Squares billed across roofing lines
    pub billable_squares: f64,
    /// Roofing labor only (pitch and fallback lines)
    pub roofing_cost: f64,
    /// Everything, add-ons included
    pub total: f64,
}

impl LaborBreakdown {
    fn push(&mut self, line: LaborLine) {
        let amount = lenient::finite_or_zero(line.amount);
        if line.kind.is_roofing() {
            self.roofing_cost += amount;
        }
        self.total += amount;
        self.lines.push(line);
    }

    /// Lines of one kind
    pub fn lines_of(&self, kind: LaborLineKind) -> impl Iterator<Item = &LaborLine> {
        self.lines.iter().filter(move |l| l.kind == kind)
    }
}

/// Compute itemized labor for a roof.
///
/// A missing measurement set yields add-on lines only.
pub fn calculate_labor(
    measurements: Option<&MeasurementSet>,
    config: &LaborConfiguration,
) -> LaborBreakdown {
    let mut breakdown = LaborBreakdown::default();
    let waste = config.waste_multiplier();

    if let Some(roof) = measurements {
        if roof.has_pitch_breakdown() {
            for entry in roof.measured_areas() {
                if !config.band_enabled(entry.band()) {
                    continue;
                }
                let squares = entry.area().billable_squares();
                let rate = config.rate_for_pitch(&entry.pitch);
                breakdown.billable_squares += squares.0;
                breakdown.push(LaborLine {
                    kind: LaborLineKind::Pitch,
                    description: format!("Roofing labor {}", entry.pitch.trim()),
                    pitch: Some(entry.pitch.clone()),
                    quantity: squares.0,
                    rate,
                    amount: rate * squares.0 * waste,
                });
            }
        } else if config.include_steep_slope_labor {
            let area: SquareFeet = roof.total_area();
            if area.0 > 0.0 {
                let squares: Squares = area.into();
                let rate = lenient::measure_or_zero(config.labor_rate);
                breakdown.billable_squares += squares.0;
                breakdown.push(LaborLine {
                    kind: LaborLineKind::TotalAreaFallback,
                    description: "Roofing labor (total area)".to_string(),
                    pitch: None,
                    quantity: squares.0,
                    rate,
                    amount: rate * squares.0 * waste,
                });
            }
        }

        // Handload only rides on a roof that actually has billed roofing
        // labor, but carries material for the whole roof.
        if config.is_handload && breakdown.roofing_cost > 0.0 {
            let rate = lenient::measure_or_zero(config.handload_rate);
            let squares = roof.total_squares().0;
            breakdown.push(LaborLine {
                kind: LaborLineKind::Handload,
                description: "Handload materials".to_string(),
                pitch: None,
                quantity: squares,
                rate,
                amount: rate * squares * waste,
            });
        }
    }

    add_discrete_lines(&mut breakdown, measurements, config);
    breakdown
}

fn add_discrete_lines(
    breakdown: &mut LaborBreakdown,
    measurements: Option<&MeasurementSet>,
    config: &LaborConfiguration,
) {
    let eave = measurements
        .map(|m| m.linear(LinearMeasure::Eave).0)
        .unwrap_or(0.0);

    if config.include_dumpsters {
        push_flat(
            breakdown,
            LaborLineKind::Dumpsters,
            "Dumpsters",
            f64::from(config.dumpster_count),
            config.dumpster_rate,
        );
    }

    if config.include_permits {
        let count = config.permit_count.max(1);
        let base = lenient::measure_or_zero(config.permit_rate);
        let additional = lenient::measure_or_zero(config.permit_additional_rate);
        breakdown.push(LaborLine {
            kind: LaborLineKind::Permits,
            description: if count == 1 {
                "Permit".to_string()
            } else {
                format!(
                    "Permits (1 at ${:.2}, {} additional at ${:.2})",
                    base,
                    count - 1,
                    additional
                )
            },
            pitch: None,
            quantity: f64::from(count),
            rate: base,
            amount: base + f64::from(count - 1) * additional,
        });
    }

    if config.include_gutters {
        let feet = config.gutter_linear_feet.map(lenient::measure_or_zero).unwrap_or(eave);
        push_flat(breakdown, LaborLineKind::Gutters, "Gutters (LF)", feet, config.gutter_rate);
    }

    if config.include_downspouts {
        push_flat(
            breakdown,
            LaborLineKind::Downspouts,
            "Downspouts",
            f64::from(config.downspout_count),
            config.downspout_rate,
        );
    }

    if config.include_detach_reset_gutters {
        let feet = config.detach_reset_linear_feet.map(lenient::measure_or_zero).unwrap_or(eave);
        push_flat(
            breakdown,
            LaborLineKind::DetachResetGutters,
            "Detach & reset gutters (LF)",
            feet,
            config.detach_reset_rate,
        );
    }

    if config.include_skylights_2x2 {
        push_flat(
            breakdown,
            LaborLineKind::Skylights2x2,
            "Skylights 2x2",
            f64::from(config.skylights_2x2_count),
            config.skylights_2x2_rate,
        );
    }

    if config.include_skylights_2x4 {
        push_flat(
            breakdown,
            LaborLineKind::Skylights2x4,
            "Skylights 2x4",
            f64::from(config.skylights_2x4_count),
            config.skylights_2x4_rate,
        );
    }
}

/// `quantity * rate` line; skipped when it comes to nothing
fn push_flat(
    breakdown: &mut LaborBreakdown,
    kind: LaborLineKind,
    description: &str,
    quantity: f64,
    rate: f64,
) {
    let quantity = lenient::measure_or_zero(quantity);
    let rate = lenient::measure_or_zero(rate);
    if quantity <= 0.0 {
        return;
    }
    breakdown.push(LaborLine {
        kind,
        description: description.to_string(),
        pitch: None,
        quantity,
        rate,
        amount: quantity * rate,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurements::PitchArea;

    fn no_addons() -> LaborConfiguration {
        LaborConfiguration {
            include_permits: false,
            ..Default::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_end_to_end_single_pitch() {
        let roof = MeasurementSet::single_pitch("6:12", 2000.0);
        let labor = calculate_labor(Some(&roof), &no_addons());
        assert!(approx(labor.total, 1904.0), "got {}", labor.total);
        assert_eq!(labor.lines.len(), 1);
        assert_eq!(labor.lines[0].quantity, 20.0);
        assert_eq!(labor.billable_squares, 20.0);
    }

    #[test]
    fn test_pitch_rate_boundaries() {
        let config = LaborConfiguration::default();
        assert_eq!(config.rate_for_pitch("0:12"), 159.0);
        assert_eq!(config.rate_for_pitch("1:12"), 109.0);
        assert_eq!(config.rate_for_pitch("2/12"), 109.0);
        assert_eq!(config.rate_for_pitch("3:12"), 85.0);
        assert_eq!(config.rate_for_pitch("7:12"), 85.0);
        assert_eq!(config.rate_for_pitch("8:12"), 90.0);
        assert_eq!(config.rate_for_pitch("9:12"), 95.0);
        assert_eq!(config.rate_for_pitch("12:12"), 110.0);
        assert_eq!(config.rate_for_pitch("garbage"), 159.0);
    }

    #[test]
    fn test_pitch_overrides() {
        let mut config = LaborConfiguration {
            labor_rate: 100.0,
            ..Default::default()
        };
        config.pitch_rates.insert("0:12".to_string(), 175.0);
        config.pitch_rates.insert("2/12".to_string(), 120.0);
        config.pitch_rates.insert("10:12".to_string(), 130.0);
        config.pitch_rates.insert("5:12".to_string(), 999.0);

        assert_eq!(config.rate_for_pitch("0/12"), 175.0);
        assert_eq!(config.rate_for_pitch("2:12"), 120.0);
        assert_eq!(config.rate_for_pitch("1:12"), 109.0);
        assert_eq!(config.rate_for_pitch("10:12"), 130.0);
        assert_eq!(config.rate_for_pitch("11:12"), 105.0);
        // The standard band always uses labor_rate
        assert_eq!(config.rate_for_pitch("5:12"), 100.0);
    }

    #[test]
    fn test_squares_round_up_per_entry() {
        let roof = MeasurementSet {
            total_area: 1050.0,
            areas_by_pitch: vec![PitchArea::new("6:12", 1001.0), PitchArea::new("9:12", 49.0)],
            ..Default::default()
        };
        let config = LaborConfiguration {
            waste_percentage: 0.0,
            ..no_addons()
        };
        let labor = calculate_labor(Some(&roof), &config);
        // 11 squares at 85 + 1 square at 95
        assert!(approx(labor.total, 11.0 * 85.0 + 95.0));
        assert_eq!(labor.billable_squares, 12.0);
    }

    #[test]
    fn test_low_slope_toggle() {
        let roof = MeasurementSet {
            total_area: 1500.0,
            areas_by_pitch: vec![PitchArea::new("0:12", 500.0), PitchArea::new("2:12", 1000.0)],
            ..Default::default()
        };
        let config = LaborConfiguration {
            include_low_slope_labor: false,
            ..no_addons()
        };
        let labor = calculate_labor(Some(&roof), &config);
        assert_eq!(labor.total, 0.0);
        assert!(labor.lines.is_empty());
    }

    #[test]
    fn test_steep_slope_toggle_covers_standard_band() {
        let roof = MeasurementSet {
            total_area: 2000.0,
            areas_by_pitch: vec![PitchArea::new("4:12", 1000.0), PitchArea::new("10:12", 1000.0)],
            ..Default::default()
        };
        let config = LaborConfiguration {
            include_steep_slope_labor: false,
            ..no_addons()
        };
        assert_eq!(calculate_labor(Some(&roof), &config).total, 0.0);

        // Permits are not gated by the slope toggles
        let with_permit = LaborConfiguration {
            include_steep_slope_labor: false,
            ..Default::default()
        };
        let labor = calculate_labor(Some(&roof), &with_permit);
        assert!(approx(labor.total, 450.0));
        assert_eq!(labor.roofing_cost, 0.0);
    }

    #[test]
    fn test_fallback_uses_total_area() {
        let roof = MeasurementSet {
            total_area: 1850.0,
            ..Default::default()
        };
        let labor = calculate_labor(Some(&roof), &no_addons());
        let line = labor.lines_of(LaborLineKind::TotalAreaFallback).next().unwrap();
        assert_eq!(line.quantity, 18.5);
        assert!(approx(labor.total, 18.5 * 85.0 * 1.12));

        let disabled = LaborConfiguration {
            include_steep_slope_labor: false,
            ..no_addons()
        };
        assert_eq!(calculate_labor(Some(&roof), &disabled).total, 0.0);
    }

    #[test]
    fn test_handload_requires_billed_roofing() {
        let roof = MeasurementSet::single_pitch("6:12", 2000.0);
        let config = LaborConfiguration {
            is_handload: true,
            handload_rate: 10.0,
            ..no_addons()
        };
        let labor = calculate_labor(Some(&roof), &config);
        let handload = labor.lines_of(LaborLineKind::Handload).next().unwrap();
        assert!(approx(handload.amount, 10.0 * 20.0 * 1.12));

        let gated = LaborConfiguration {
            include_steep_slope_labor: false,
            ..config
        };
        let labor = calculate_labor(Some(&roof), &gated);
        assert!(labor.lines_of(LaborLineKind::Handload).next().is_none());
        assert_eq!(labor.total, 0.0);
    }

    #[test]
    fn test_handload_covers_disabled_bands() {
        let roof = MeasurementSet {
            total_area: 2000.0,
            areas_by_pitch: vec![PitchArea::new("6:12", 1000.0), PitchArea::new("1:12", 1000.0)],
            ..Default::default()
        };
        let config = LaborConfiguration {
            is_handload: true,
            handload_rate: 10.0,
            include_low_slope_labor: false,
            ..no_addons()
        };
        let labor = calculate_labor(Some(&roof), &config);
        let handload = labor.lines_of(LaborLineKind::Handload).next().unwrap();
        assert_eq!(handload.quantity, 20.0);
        assert!(approx(handload.amount, 224.0), "got {}", handload.amount);
        assert_eq!(labor.billable_squares, 10.0);
    }

    #[test]
    fn test_handload_uses_unrounded_total_squares() {
        let roof = MeasurementSet {
            total_area: 1050.0,
            areas_by_pitch: vec![PitchArea::new("6:12", 1001.0), PitchArea::new("9:12", 49.0)],
            ..Default::default()
        };
        let config = LaborConfiguration {
            is_handload: true,
            handload_rate: 10.0,
            waste_percentage: 0.0,
            ..no_addons()
        };
        let labor = calculate_labor(Some(&roof), &config);
        let handload = labor.lines_of(LaborLineKind::Handload).next().unwrap();
        assert!(approx(handload.quantity, 10.5));
        assert!(approx(handload.amount, 105.0));
    }

    #[test]
    fn test_permit_tiers() {
        let config = LaborConfiguration {
            permit_count: 3,
            permit_rate: 400.0,
            permit_additional_rate: 100.0,
            ..Default::default()
        };
        let labor = calculate_labor(None, &config);
        assert!(approx(labor.total, 600.0));

        let zero = LaborConfiguration {
            permit_count: 0,
            ..Default::default()
        };
        let labor = calculate_labor(None, &zero);
        assert_eq!(labor.lines_of(LaborLineKind::Permits).next().unwrap().quantity, 1.0);
        assert!(approx(labor.total, 450.0));
    }

    #[test]
    fn test_discrete_addons() {
        let roof = MeasurementSet {
            eave_length: 150.0,
            ..MeasurementSet::single_pitch("6:12", 1000.0)
        };
        let config = LaborConfiguration {
            waste_percentage: 0.0,
            include_permits: false,
            include_dumpsters: true,
            dumpster_count: 2,
            dumpster_rate: 400.0,
            include_gutters: true,
            gutter_rate: 10.0,
            include_downspouts: true,
            downspout_count: 4,
            downspout_rate: 50.0,
            include_detach_reset_gutters: true,
            detach_reset_linear_feet: Some(80.0),
            detach_reset_rate: 5.0,
            include_skylights_2x2: true,
            skylights_2x2_count: 1,
            skylights_2x2_rate: 300.0,
            include_skylights_2x4: true,
            skylights_2x4_count: 2,
            skylights_2x4_rate: 500.0,
            ..Default::default()
        };
        let labor = calculate_labor(Some(&roof), &config);
        let expected = 10.0 * 85.0 // roofing
            + 800.0 // dumpsters
            + 1500.0 // gutters on the 150 LF eave
            + 200.0 // downspouts
            + 400.0 // detach/reset
            + 300.0 // 2x2
            + 1000.0; // 2x4
        assert!(approx(labor.total, expected), "got {}", labor.total);
    }

    #[test]
    fn test_addon_toggles_gate_lines() {
        let config = LaborConfiguration {
            include_permits: false,
            downspout_count: 6,
            skylights_2x2_count: 2,
            ..Default::default()
        };
        let labor = calculate_labor(None, &config);
        assert!(labor.lines.is_empty());
        assert_eq!(labor.total, 0.0);
    }

    #[test]
    fn test_partial_json_configuration() {
        let json = r#"{
            "laborRate": "95",
            "pitchRates": {"0:12": "180", "9:12": 100},
            "includePermits": false,
            "wastePercentage": null
        }"#;
        let config: LaborConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(config.labor_rate, 95.0);
        assert_eq!(config.pitch_rates["0:12"], 180.0);
        assert_eq!(config.waste_percentage, 0.0);
        assert!(!config.include_permits);
        assert!(config.include_steep_slope_labor);
        assert_eq!(config.rate_for_pitch("9:12"), 100.0);
    }
}
