//! # Packages
//!
//! Named bundles of mandatory materials tied to a manufacturer and warranty
//! tier, plus the fixed low-slope material sets.
//!
//! The set of every material id that belongs to *any* package is derived once
//! when the registry is built and used by every package transition.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::packages;
//!
//! let registry = packages::standard();
//! let gaf1 = registry.get("GAF 1").unwrap();
//! assert!(gaf1.material_ids.iter().any(|id| id == "gaf-timberline-hdz"));
//! assert!(registry.is_package_material("drip-edge"));
//! assert!(!registry.is_package_material("box-vent"));
//! ```

pub mod resolver;
pub mod warranty;

pub use resolver::PackageResolver;
pub use warranty::{WarrantyIneligibility, WarrantyOption};

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::materials::PRIMARY_SHINGLE_ID;

/// A named package: ordered mandatory material ids and the warranties it qualifies for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDefinition {
    /// Package id, e.g. "GAF 1" or "3MG Select"
    pub id: String,

    /// Material ids installed when the package is active, in display order
    pub material_ids: Vec<String>,

    /// Warranty ids this package is eligible for
    #[serde(default)]
    pub warranty_ids: Vec<String>,
}

impl PackageDefinition {
    pub fn new(id: impl Into<String>, material_ids: &[&str], warranty_ids: &[&str]) -> Self {
        PackageDefinition {
            id: id.into(),
            material_ids: material_ids.iter().map(|s| s.to_string()).collect(),
            warranty_ids: warranty_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn offers_warranty(&self, warranty_id: &str) -> bool {
        self.warranty_ids.iter().any(|w| w == warranty_id)
    }
}

/// Package definitions, warranties and the low-slope material sets.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRegistry {
    packages: IndexMap<String, PackageDefinition>,
    warranties: IndexMap<String, WarrantyOption>,
    /// Installed alongside a package on hybrid roofs
    low_slope_supplement_ids: Vec<String>,
    /// Installed instead of any package on flat-only roofs
    flat_roof_ids: Vec<String>,
    /// Union of every package's material ids
    all_package_material_ids: IndexSet<String>,
}

impl PackageRegistry {
    pub fn new(
        packages: Vec<PackageDefinition>,
        warranties: Vec<WarrantyOption>,
        low_slope_supplement_ids: &[&str],
        flat_roof_ids: &[&str],
    ) -> Self {
        let all_package_material_ids = packages
            .iter()
            .flat_map(|p| p.material_ids.iter().cloned())
            .collect();
        PackageRegistry {
            packages: packages.into_iter().map(|p| (p.id.clone(), p)).collect(),
            warranties: warranties.into_iter().map(|w| (w.id.clone(), w)).collect(),
            low_slope_supplement_ids: low_slope_supplement_ids
                .iter()
                .map(|s| s.to_string())
                .collect(),
            flat_roof_ids: flat_roof_ids.iter().map(|s| s.to_string()).collect(),
            all_package_material_ids,
        }
    }

    pub fn get(&self, package_id: &str) -> Option<&PackageDefinition> {
        self.packages.get(package_id)
    }

    pub fn package_ids(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn warranty(&self, warranty_id: &str) -> Option<&WarrantyOption> {
        self.warranties.get(warranty_id)
    }

    pub fn warranties(&self) -> impl Iterator<Item = &WarrantyOption> {
        self.warranties.values()
    }

    /// Whether the id belongs to any package definition
    pub fn is_package_material(&self, material_id: &str) -> bool {
        self.all_package_material_ids.contains(material_id)
    }

    /// Every material id belonging to any package, de-duplicated
    pub fn all_package_material_ids(&self) -> &IndexSet<String> {
        &self.all_package_material_ids
    }

    pub fn low_slope_supplement_ids(&self) -> &[String] {
        &self.low_slope_supplement_ids
    }

    pub fn flat_roof_ids(&self) -> &[String] {
        &self.flat_roof_ids
    }
}

static STANDARD_REGISTRY: Lazy<PackageRegistry> = Lazy::new(standard_registry);

/// The built-in package registry
pub fn standard() -> &'static PackageRegistry {
    &STANDARD_REGISTRY
}

fn standard_registry() -> PackageRegistry {
    let packages = vec![
        PackageDefinition::new(
            "GAF 1",
            &[
                PRIMARY_SHINGLE_ID,
                "gaf-prostart-starter",
                "gaf-seal-a-ridge",
                "gaf-feltbuster",
                "gaf-weatherwatch-peel-stick",
                "drip-edge",
            ],
            &["gaf-system-plus"],
        ),
        PackageDefinition::new(
            "GAF 2",
            &[
                PRIMARY_SHINGLE_ID,
                "gaf-prostart-starter",
                "gaf-timbertex",
                "gaf-deck-armor",
                "gaf-stormguard-peel-stick",
                "drip-edge",
                "valley-metal",
            ],
            &["gaf-system-plus", "gaf-silver-pledge"],
        ),
        PackageDefinition::new(
            "GAF 3",
            &[
                "gaf-timberline-uhdz",
                "gaf-prostart-starter",
                "gaf-timbertex",
                "gaf-deck-armor",
                "gaf-stormguard-peel-stick",
                "drip-edge",
                "valley-metal",
            ],
            &["gaf-system-plus", "gaf-silver-pledge", "gaf-golden-pledge"],
        ),
        PackageDefinition::new(
            "3MG Standard",
            &[
                "oc-oakridge",
                "oc-starter-strip",
                "oc-proedge-hip-ridge",
                "oc-deck-defense",
                "oc-weatherlock-g-peel-stick",
                "drip-edge",
            ],
            &["oc-system-protection"],
        ),
        PackageDefinition::new(
            "3MG Select",
            &[
                "oc-duration",
                "oc-starter-strip",
                "oc-proedge-hip-ridge",
                "oc-deck-defense",
                "oc-weatherlock-g-peel-stick",
                "drip-edge",
                "valley-metal",
            ],
            &["oc-system-protection", "oc-preferred-protection"],
        ),
    ];

    let warranties = vec![
        WarrantyOption::new(
            "gaf-system-plus",
            "GAF System Plus Limited Warranty",
            0.0,
            0.0,
            &["gaf-prostart-starter"],
        ),
        WarrantyOption::new(
            "gaf-silver-pledge",
            "GAF Silver Pledge Limited Warranty",
            12.0,
            10.0,
            &[
                "gaf-prostart-starter",
                "gaf-timbertex",
                "gaf-deck-armor",
                "gaf-stormguard-peel-stick",
            ],
        ),
        WarrantyOption::new(
            "gaf-golden-pledge",
            "GAF Golden Pledge Limited Warranty",
            25.0,
            10.0,
            &[
                "gaf-timberline-uhdz",
                "gaf-prostart-starter",
                "gaf-timbertex",
                "gaf-deck-armor",
                "gaf-stormguard-peel-stick",
                "gaf-cobra-ridge-vent",
            ],
        ),
        WarrantyOption::new(
            "oc-system-protection",
            "Owens Corning System Protection Limited Warranty",
            0.0,
            0.0,
            &["oc-starter-strip", "oc-proedge-hip-ridge"],
        ),
        WarrantyOption::new(
            "oc-preferred-protection",
            "Owens Corning Preferred Protection Limited Warranty",
            10.0,
            10.0,
            &[
                "oc-duration",
                "oc-starter-strip",
                "oc-proedge-hip-ridge",
                "oc-deck-defense",
                "oc-weatherlock-g-peel-stick",
            ],
        ),
    ];

    PackageRegistry::new(
        packages,
        warranties,
        &["low-slope-base-sheet", "low-slope-cap-sheet"],
        &[
            "low-slope-base-sheet",
            "low-slope-cap-sheet",
            "low-slope-iso-board",
            "low-slope-primer",
            "valley-metal",
            "low-slope-sealant",
        ],
    )
}
