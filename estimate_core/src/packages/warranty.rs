//! Manufacturer warranty eligibility.
//!
//! A warranty is eligible when the active package offers it, every required
//! material is on the estimate, and the roof meets the minimum size.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PackageDefinition;
use crate::selection::MaterialSelection;
use crate::units::Squares;

/// A warranty line that can be added to an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarrantyOption {
    pub id: String,
    pub name: String,
    /// Registration fee per billable square
    pub price_per_square: f64,
    /// Minimum roof size in squares
    pub min_squares: f64,
    /// Materials that must be present on the estimate
    pub required_material_ids: Vec<String>,
}

impl WarrantyOption {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price_per_square: f64,
        min_squares: f64,
        required_material_ids: &[&str],
    ) -> Self {
        WarrantyOption {
            id: id.into(),
            name: name.into(),
            price_per_square,
            min_squares,
            required_material_ids: required_material_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check eligibility against the active package and resolved selection.
    pub fn check_eligibility(
        &self,
        package: Option<&PackageDefinition>,
        selection: &MaterialSelection,
        roof_squares: Squares,
    ) -> Result<(), WarrantyIneligibility> {
        let package = package.ok_or(WarrantyIneligibility::NoPackage)?;
        if !package.offers_warranty(&self.id) {
            return Err(WarrantyIneligibility::NotOffered {
                package_id: package.id.clone(),
            });
        }
        if let Some(missing) = self
            .required_material_ids
            .iter()
            .find(|id| !selection.contains(id))
        {
            return Err(WarrantyIneligibility::MissingMaterial {
                material_id: missing.clone(),
            });
        }
        if roof_squares.0 < self.min_squares {
            return Err(WarrantyIneligibility::BelowMinimumSquares {
                squares: roof_squares.0,
                minimum: self.min_squares,
            });
        }
        Ok(())
    }

    /// Warranty fee for a roof of the given billable squares
    pub fn cost(&self, billable_squares: Squares) -> f64 {
        self.price_per_square * billable_squares.0
    }
}

/// Why a requested warranty cannot be applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarrantyIneligibility {
    #[error("no package is active")]
    NoPackage,
    #[error("package {package_id} does not offer this warranty")]
    NotOffered { package_id: String },
    #[error("required material {material_id} is not on the estimate")]
    MissingMaterial { material_id: String },
    #[error("roof is {squares} squares, warranty requires {minimum}")]
    BelowMinimumSquares { squares: f64, minimum: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::catalog;
    use crate::packages;
    use crate::selection::{MaterialSource, SelectedMaterial};

    fn selection_with(ids: &[&str]) -> MaterialSelection {
        let mut selection = MaterialSelection::new();
        for id in ids {
            let material = catalog::standard().get(id).unwrap().clone();
            selection.install(SelectedMaterial::mandatory(
                material,
                1.0,
                MaterialSource::Package {
                    package_id: "GAF 2".to_string(),
                },
                0.0,
            ));
        }
        selection
    }

    #[test]
    fn test_eligible() {
        let registry = packages::standard();
        let silver = registry.warranty("gaf-silver-pledge").unwrap();
        let selection = selection_with(&[
            "gaf-prostart-starter",
            "gaf-timbertex",
            "gaf-deck-armor",
            "gaf-stormguard-peel-stick",
        ]);
        assert!(silver
            .check_eligibility(registry.get("GAF 2"), &selection, Squares(25.0))
            .is_ok());
        assert_eq!(silver.cost(Squares(25.0)), 300.0);
    }

    #[test]
    fn test_ineligible_reasons() {
        let registry = packages::standard();
        let golden = registry.warranty("gaf-golden-pledge").unwrap();
        let selection = selection_with(&["gaf-prostart-starter"]);

        assert_eq!(
            golden.check_eligibility(None, &selection, Squares(30.0)),
            Err(WarrantyIneligibility::NoPackage)
        );
        assert!(matches!(
            golden.check_eligibility(registry.get("GAF 1"), &selection, Squares(30.0)),
            Err(WarrantyIneligibility::NotOffered { .. })
        ));
        assert!(matches!(
            golden.check_eligibility(registry.get("GAF 3"), &selection, Squares(30.0)),
            Err(WarrantyIneligibility::MissingMaterial { .. })
        ));
    }

    #[test]
    fn test_minimum_squares() {
        let registry = packages::standard();
        let silver = registry.warranty("gaf-silver-pledge").unwrap();
        let selection = selection_with(&[
            "gaf-prostart-starter",
            "gaf-timbertex",
            "gaf-deck-armor",
            "gaf-stormguard-peel-stick",
        ]);
        let result = silver.check_eligibility(registry.get("GAF 2"), &selection, Squares(8.0));
        assert!(matches!(result, Err(WarrantyIneligibility::BelowMinimumSquares { .. })));
    }
}
