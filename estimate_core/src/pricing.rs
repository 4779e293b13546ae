//! # Pricing
//!
//! Material add-ons and the margin-on-price total.
//!
//! The margin is applied to the selling price, not marked up on cost:
//! `total = subtotal / (1 - margin)`, so a 25 % margin on a 1000 subtotal
//! sells for 1333.33 and keeps 333.33 as profit.
//!
//! ```rust
//! use estimate_core::pricing::price_with_margin;
//!
//! let (total, profit) = price_with_margin(1000.0, 25.0);
//! assert!((total - 1333.333333).abs() < 1e-4);
//! assert!((profit - 333.333333).abs() < 1e-4);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::lenient;
use crate::packages::{PackageDefinition, PackageRegistry};
use crate::selection::MaterialSelection;
use crate::units::Squares;

/// Default per-square price of the peel-and-stick system upgrade
pub const DEFAULT_PEEL_STICK_SYSTEM_RATE: f64 = 65.0;

/// Optional material-side add-ons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonOptions {
    /// Full-deck peel-and-stick upgrade, billed per square
    #[serde(alias = "includePeelStickSystem")]
    pub include_peel_stick_system: bool,
    #[serde(alias = "peelStickSystemRate", deserialize_with = "lenient::number_or_zero")]
    pub peel_stick_system_rate: f64,

    /// Requested warranty id
    pub warranty: Option<String>,
}

impl Default for AddonOptions {
    fn default() -> Self {
        AddonOptions {
            include_peel_stick_system: false,
            peel_stick_system_rate: DEFAULT_PEEL_STICK_SYSTEM_RATE,
            warranty: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddonKind {
    PeelStickSystem,
    Warranty,
}

/// A priced add-on line, counted as material cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonLine {
    pub kind: AddonKind,
    pub description: String,
    pub squares: f64,
    pub rate: f64,
    pub amount: f64,
}

/// Price the requested add-ons.
///
/// An unknown or ineligible warranty is left off with a warning.
pub fn resolve_addons(
    options: &AddonOptions,
    registry: &PackageRegistry,
    package: Option<&PackageDefinition>,
    selection: &MaterialSelection,
    billable_squares: Squares,
) -> Vec<AddonLine> {
    let squares = lenient::measure_or_zero(billable_squares.0);
    let mut lines = Vec::new();

    if options.include_peel_stick_system {
        let rate = lenient::measure_or_zero(options.peel_stick_system_rate);
        lines.push(AddonLine {
            kind: AddonKind::PeelStickSystem,
            description: "Peel & stick system".to_string(),
            squares,
            rate,
            amount: rate * squares,
        });
    }

    if let Some(warranty_id) = options.warranty.as_deref() {
        match registry.warranty(warranty_id) {
            None => warn!(warranty_id, "unknown warranty, skipped"),
            Some(warranty) => match warranty.check_eligibility(
                package,
                selection,
                Squares(squares),
            ) {
                Ok(()) => lines.push(AddonLine {
                    kind: AddonKind::Warranty,
                    description: warranty.name.clone(),
                    squares,
                    rate: warranty.price_per_square,
                    amount: warranty.cost(Squares(squares)),
                }),
                Err(reason) => warn!(warranty_id, %reason, "warranty not eligible, skipped"),
            },
        }
    }

    lines
}

/// `(total, profit)` for a subtotal and a margin percentage.
///
/// A non-finite margin counts as 0. At 100 % or more the total stays at the
/// subtotal instead of dividing by zero.
pub fn price_with_margin(subtotal: f64, margin_percent: f64) -> (f64, f64) {
    let subtotal = lenient::finite_or_zero(subtotal);
    let margin = lenient::finite_or_zero(margin_percent) / 100.0;
    let total = if margin < 1.0 {
        subtotal / (1.0 - margin)
    } else {
        subtotal
    };
    (total, total - subtotal)
}

/// Cost roll-up of one estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingSummary {
    /// Selected materials only
    pub material_cost: f64,
    pub addon_cost: f64,
    pub labor_cost: f64,
    pub subtotal: f64,
    pub profit_margin_percent: f64,
    pub profit_amount: f64,
    pub total_price: f64,
}

impl PricingSummary {
    /// Materials plus add-ons, the figure persisted as material cost
    pub fn total_material_cost(&self) -> f64 {
        self.material_cost + self.addon_cost
    }
}

/// Aggregate material, add-on and labor costs into the final price.
pub fn aggregate(
    selection: &MaterialSelection,
    addons: &[AddonLine],
    labor_cost: f64,
    margin_percent: f64,
) -> PricingSummary {
    let material_cost = lenient::finite_or_zero(selection.material_cost());
    let addon_cost: f64 = addons.iter().map(|a| lenient::finite_or_zero(a.amount)).sum();
    let labor_cost = lenient::finite_or_zero(labor_cost);
    let subtotal = material_cost + addon_cost + labor_cost;
    let (total_price, profit_amount) = price_with_margin(subtotal, margin_percent);

    PricingSummary {
        material_cost,
        addon_cost,
        labor_cost,
        subtotal,
        profit_margin_percent: lenient::finite_or_zero(margin_percent),
        profit_amount,
        total_price,
    }
}
