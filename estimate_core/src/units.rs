//! # Unit Types
//!
//! Lightweight newtype wrappers for roofing units. JSON stays clean (just
//! numbers) while the code keeps square feet, squares and linear feet apart.
//!
//! ## Roofing Units
//!
//! - Area: square feet (sq ft), squares (1 square = 100 sq ft)
//! - Length: linear feet (LF) for eaves, rakes, ridges, hips and valleys
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::units::{SquareFeet, Squares};
//!
//! let area = SquareFeet(2050.0);
//! let squares: Squares = area.into();
//! assert_eq!(squares.0, 20.5);
//! assert_eq!(area.billable_squares().0, 21.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// Square feet per roofing square
pub const SQFT_PER_SQUARE: f64 = 100.0;

/// Area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareFeet(pub f64);

/// Area in roofing squares (100 sq ft)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Squares(pub f64);

/// Length in linear feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinearFeet(pub f64);

impl SquareFeet {
    /// Whole squares billed for this area, rounded up (labor is billed per started square)
    pub fn billable_squares(self) -> Squares {
        Squares((self.0 / SQFT_PER_SQUARE).ceil())
    }

    /// Apply a waste fraction: `area * (1 + waste)`
    pub fn with_waste(self, waste_fraction: f64) -> SquareFeet {
        SquareFeet(self.0 * (1.0 + waste_fraction))
    }
}

impl LinearFeet {
    /// Apply a waste fraction: `length * (1 + waste)`
    pub fn with_waste(self, waste_fraction: f64) -> LinearFeet {
        LinearFeet(self.0 * (1.0 + waste_fraction))
    }
}

impl From<SquareFeet> for Squares {
    fn from(sqft: SquareFeet) -> Self {
        Squares(sqft.0 / SQFT_PER_SQUARE)
    }
}

impl From<Squares> for SquareFeet {
    fn from(sq: Squares) -> Self {
        SquareFeet(sq.0 * SQFT_PER_SQUARE)
    }
}

impl Add for SquareFeet {
    type Output = SquareFeet;
    fn add(self, rhs: SquareFeet) -> SquareFeet {
        SquareFeet(self.0 + rhs.0)
    }
}

impl Add for Squares {
    type Output = Squares;
    fn add(self, rhs: Squares) -> Squares {
        Squares(self.0 + rhs.0)
    }
}

impl Add for LinearFeet {
    type Output = LinearFeet;
    fn add(self, rhs: LinearFeet) -> LinearFeet {
        LinearFeet(self.0 + rhs.0)
    }
}

impl Mul<f64> for Squares {
    type Output = Squares;
    fn mul(self, rhs: f64) -> Squares {
        Squares(self.0 * rhs)
    }
}

impl std::iter::Sum for SquareFeet {
    fn sum<I: Iterator<Item = SquareFeet>>(iter: I) -> Self {
        iter.fold(SquareFeet(0.0), |a, b| a + b)
    }
}

impl std::iter::Sum for LinearFeet {
    fn sum<I: Iterator<Item = LinearFeet>>(iter: I) -> Self {
        iter.fold(LinearFeet(0.0), |a, b| a + b)
    }
}

/// Round up to whole units, never below zero.
///
/// The value is first snapped to 1e-6 so that products like `25.0 * 1.2`
/// (30.000000000000004) do not round up a whole extra unit. Non-finite input
/// yields 0.
pub fn whole_units(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    let snapped = (value * 1e6).round() / 1e6;
    snapped.ceil()
}
