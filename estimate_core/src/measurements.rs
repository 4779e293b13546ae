//! # Roof Measurements
//!
//! The measured roof geometry consumed by the engine. Measurements are
//! produced upstream (report extraction, manual entry) and treated as an
//! immutable input here.
//!
//! Pitch strings use `"N:12"` or `"N/12"` notation. The leading integer is the
//! *rise* used for every rate and formula lookup; anything unparsable is rise 0.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::measurements::{MeasurementSet, PitchArea, RoofType};
//!
//! let roof = MeasurementSet {
//!     total_area: 2400.0,
//!     areas_by_pitch: vec![PitchArea::new("6:12", 2000.0), PitchArea::new("0/12", 400.0)],
//!     ..Default::default()
//! };
//!
//! assert_eq!(roof.roof_type(), RoofType::Hybrid);
//! assert_eq!(roof.steep_area().0, 2000.0);
//! assert_eq!(roof.zero_pitch_area().0, 400.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::units::{LinearFeet, SquareFeet, Squares};

/// Highest rise still treated as low-slope (flat-roof materials, low-slope labor)
pub const LOW_SLOPE_MAX_RISE: u32 = 2;

/// Parse the rise from a pitch string such as `"6:12"`, `"6/12"` or `"10"`.
///
/// Only the leading run of ASCII digits counts; anything else yields 0.
///
/// ```rust
/// use estimate_core::measurements::parse_rise;
/// assert_eq!(parse_rise("6:12"), 6);
/// assert_eq!(parse_rise(" 12/12"), 12);
/// assert_eq!(parse_rise("flat"), 0);
/// ```
pub fn parse_rise(pitch: &str) -> u32 {
    let digits: String = pitch
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Slope band of a pitch, used by the labor rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlopeBand {
    /// Rise 0 (dead flat)
    Flat,
    /// Rise 1-2
    LowSlope,
    /// Rise 3-7
    Standard,
    /// Rise 8 and up
    Steep,
}

impl SlopeBand {
    /// Classify a rise value
    pub fn from_rise(rise: u32) -> Self {
        match rise {
            0 => SlopeBand::Flat,
            1..=LOW_SLOPE_MAX_RISE => SlopeBand::LowSlope,
            3..=7 => SlopeBand::Standard,
            _ => SlopeBand::Steep,
        }
    }

    /// Whether this band takes low-slope materials and labor (rise 0-2)
    pub fn is_low_slope(&self) -> bool {
        matches!(self, SlopeBand::Flat | SlopeBand::LowSlope)
    }
}

/// One measured facet group: a pitch and the area at that pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchArea {
    /// Pitch string, e.g. `"6:12"`
    #[serde(default)]
    pub pitch: String,

    /// Area in square feet
    #[serde(default, deserialize_with = "lenient::measure")]
    pub area: f64,
}

impl PitchArea {
    /// Create a new pitch area entry
    pub fn new(pitch: impl Into<String>, area: f64) -> Self {
        PitchArea {
            pitch: pitch.into(),
            area,
        }
    }

    /// Rise parsed from the pitch string
    pub fn rise(&self) -> u32 {
        parse_rise(&self.pitch)
    }

    /// Slope band of this entry
    pub fn band(&self) -> SlopeBand {
        SlopeBand::from_rise(self.rise())
    }

    /// Sanitized area (NaN and negatives read as 0)
    pub fn area(&self) -> SquareFeet {
        SquareFeet(lenient::measure_or_zero(self.area))
    }
}

/// Linear roof measures addressed by quantity formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinearMeasure {
    Eave,
    Rake,
    Ridge,
    Hip,
    Valley,
}

/// Classification of the roof by its pitch mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoofType {
    /// Every measured pitch area has rise <= 2
    FlatOnly,
    /// Both low-slope and steep pitch areas
    Hybrid,
    /// Only rise >= 3 areas, or no pitch breakdown at all
    SteepOnly,
}

/// Measured roof geometry.
///
/// Field names are snake_case; the camelCase names used by form state are
/// accepted as aliases.
///
/// ## JSON Example
///
/// ```json
/// {
///   "total_area": 2000.0,
///   "predominant_pitch": "6:12",
///   "areas_by_pitch": [{ "pitch": "6:12", "area": 2000.0 }],
///   "eave_length": 120.0,
///   "rake_length": 80.0,
///   "ridge_length": 40.0,
///   "hip_length": 0.0,
///   "valley_length": 20.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementSet {
    /// Total roof area in square feet
    #[serde(default, alias = "totalArea", deserialize_with = "lenient::measure")]
    pub total_area: f64,

    /// Predominant pitch string
    #[serde(default, alias = "predominantPitch")]
    pub predominant_pitch: String,

    /// Area per pitch, in measurement order
    #[serde(default, alias = "areasByPitch")]
    pub areas_by_pitch: Vec<PitchArea>,

    /// Eave length (LF)
    #[serde(default, alias = "eaveLength", deserialize_with = "lenient::measure")]
    pub eave_length: f64,

    /// Rake length (LF)
    #[serde(default, alias = "rakeLength", deserialize_with = "lenient::measure")]
    pub rake_length: f64,

    /// Ridge length (LF)
    #[serde(default, alias = "ridgeLength", deserialize_with = "lenient::measure")]
    pub ridge_length: f64,

    /// Hip length (LF)
    #[serde(default, alias = "hipLength", deserialize_with = "lenient::measure")]
    pub hip_length: f64,

    /// Valley length (LF)
    #[serde(default, alias = "valleyLength", deserialize_with = "lenient::measure")]
    pub valley_length: f64,
}

impl MeasurementSet {
    /// A roof with a single pitch covering the whole area
    pub fn single_pitch(pitch: impl Into<String>, area: f64) -> Self {
        let pitch = pitch.into();
        MeasurementSet {
            total_area: area,
            predominant_pitch: pitch.clone(),
            areas_by_pitch: vec![PitchArea::new(pitch, area)],
            ..Default::default()
        }
    }

    /// Whether a per-pitch breakdown with any measured area is available
    pub fn has_pitch_breakdown(&self) -> bool {
        self.measured_areas().next().is_some()
    }

    /// Pitch entries that actually carry area
    pub fn measured_areas(&self) -> impl Iterator<Item = &PitchArea> {
        self.areas_by_pitch.iter().filter(|pa| pa.area().0 > 0.0)
    }

    /// Total roof area. Falls back to the breakdown sum when the total is missing.
    pub fn total_area(&self) -> SquareFeet {
        let total = lenient::measure_or_zero(self.total_area);
        if total > 0.0 {
            return SquareFeet(total);
        }
        self.areas_by_pitch.iter().map(PitchArea::area).sum()
    }

    /// Total roof area in squares (not rounded)
    pub fn total_squares(&self) -> Squares {
        self.total_area().into()
    }

    /// Area at rise 0-2
    pub fn low_slope_area(&self) -> SquareFeet {
        self.areas_by_pitch
            .iter()
            .filter(|pa| pa.band().is_low_slope())
            .map(PitchArea::area)
            .sum()
    }

    /// Area at rise 0 only (ISO board applies here)
    pub fn zero_pitch_area(&self) -> SquareFeet {
        self.areas_by_pitch
            .iter()
            .filter(|pa| pa.rise() == 0)
            .map(PitchArea::area)
            .sum()
    }

    /// Area at rise >= 3. Without a breakdown the whole roof counts as steep.
    pub fn steep_area(&self) -> SquareFeet {
        if !self.has_pitch_breakdown() {
            return self.total_area();
        }
        self.areas_by_pitch
            .iter()
            .filter(|pa| !pa.band().is_low_slope())
            .map(PitchArea::area)
            .sum()
    }

    /// Rise of the predominant pitch
    pub fn predominant_rise(&self) -> u32 {
        parse_rise(&self.predominant_pitch)
    }

    /// Sanitized linear measure
    pub fn linear(&self, measure: LinearMeasure) -> LinearFeet {
        let raw = match measure {
            LinearMeasure::Eave => self.eave_length,
            LinearMeasure::Rake => self.rake_length,
            LinearMeasure::Ridge => self.ridge_length,
            LinearMeasure::Hip => self.hip_length,
            LinearMeasure::Valley => self.valley_length,
        };
        LinearFeet(lenient::measure_or_zero(raw))
    }

    /// Sum of several linear measures
    pub fn linear_sum(&self, measures: &[LinearMeasure]) -> LinearFeet {
        measures.iter().map(|m| self.linear(*m)).sum()
    }

    /// Classify the roof by pitch mix.
    ///
    /// Zero-area entries are ignored. A roof without any measured pitch area
    /// is treated as steep so package selection still applies.
    pub fn roof_type(&self) -> RoofType {
        let mut has_low = false;
        let mut has_steep = false;
        for pa in self.measured_areas() {
            if pa.band().is_low_slope() {
                has_low = true;
            } else {
                has_steep = true;
            }
        }
        match (has_low, has_steep) {
            (true, false) => RoofType::FlatOnly,
            (true, true) => RoofType::Hybrid,
            _ => RoofType::SteepOnly,
        }
    }
}
