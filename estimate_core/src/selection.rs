//! # Material Selection
//!
//! The resolved set of materials on an estimate, keyed by material id in
//! insertion order. Entries installed by package or low-slope resolution are
//! flagged mandatory and refuse per-item removal; they only leave through a
//! package transition (see [`crate::packages::PackageResolver::transition`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};
use crate::lenient;
use crate::materials::Material;

/// Why a material is on the estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialSource {
    /// Added independently by the user
    User,
    /// Installed by the active package
    Package { package_id: String },
    /// Low-slope base/cap sheet installed alongside a package on a hybrid roof
    LowSlopeSupplement,
    /// Installed because every pitch area is low-slope
    FlatRoof,
}

impl MaterialSource {
    /// Short label used in messages
    pub fn label(&self) -> String {
        match self {
            MaterialSource::User => "user selection".to_string(),
            MaterialSource::Package { package_id } => format!("package {}", package_id),
            MaterialSource::LowSlopeSupplement => "low-slope supplement".to_string(),
            MaterialSource::FlatRoof => "flat roof material set".to_string(),
        }
    }
}

/// One material on the estimate with its resolved quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedMaterial {
    pub material: Material,

    /// Whole purchase units
    pub quantity: f64,

    /// Installed by package or low-slope resolution; not removable per item
    pub is_mandatory: bool,

    pub source: MaterialSource,

    /// Effective waste percentage used for the quantity
    #[serde(default)]
    pub waste_percent: f64,
}

impl SelectedMaterial {
    /// A mandatory entry produced by package or low-slope resolution
    pub fn mandatory(
        material: Material,
        quantity: f64,
        source: MaterialSource,
        waste_percent: f64,
    ) -> Self {
        SelectedMaterial {
            material,
            quantity: lenient::measure_or_zero(quantity),
            is_mandatory: true,
            source,
            waste_percent,
        }
    }

    /// A user-chosen entry
    pub fn user(material: Material, quantity: f64, waste_percent: f64) -> Self {
        SelectedMaterial {
            material,
            quantity: lenient::measure_or_zero(quantity),
            is_mandatory: false,
            source: MaterialSource::User,
            waste_percent,
        }
    }

    /// `price * quantity`, with malformed numbers read as 0
    pub fn line_cost(&self) -> f64 {
        self.material.unit_price() * lenient::measure_or_zero(self.quantity)
    }
}

/// Insertion-ordered, id-keyed material selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialSelection {
    entries: IndexMap<String, SelectedMaterial>,
}

impl MaterialSelection {
    pub fn new() -> Self {
        MaterialSelection::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SelectedMaterial> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedMaterial> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether the id is present and flagged mandatory
    pub fn is_mandatory(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|e| e.is_mandatory)
    }

    /// Install an entry from package or low-slope resolution, replacing any
    /// user entry with the same id.
    pub(crate) fn install(&mut self, entry: SelectedMaterial) {
        self.entries.insert(entry.material.id.clone(), entry);
    }

    /// Drop every entry matching the predicate, mandatory or not.
    ///
    /// Only package transitions use this; ordinary edits go through
    /// [`MaterialSelection::remove_material`].
    pub(crate) fn strip(&mut self, mut predicate: impl FnMut(&str, &SelectedMaterial) -> bool) {
        self.entries.retain(|id, entry| !predicate(id, entry));
    }

    /// Add a user material. A mandatory entry with the same id is kept as is.
    pub fn add_material(&mut self, entry: SelectedMaterial) -> &SelectedMaterial {
        let id = entry.material.id.clone();
        if !self.is_mandatory(&id) {
            self.entries.insert(id.clone(), entry);
        }
        &self.entries[&id]
    }

    /// Remove a user material.
    ///
    /// Mandatory entries are refused with [`EstimateError::MandatoryMaterial`].
    pub fn remove_material(&mut self, id: &str) -> EstimateResult<SelectedMaterial> {
        match self.entries.get(id) {
            None => Err(EstimateError::material_not_found(id)),
            Some(entry) if entry.is_mandatory => {
                Err(EstimateError::mandatory_material(id, entry.source.label()))
            }
            Some(_) => self
                .entries
                .shift_remove(id)
                .ok_or_else(|| EstimateError::material_not_found(id)),
        }
    }

    /// Set the quantity of an entry.
    pub fn set_quantity(&mut self, id: &str, quantity: f64) -> EstimateResult<()> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(EstimateError::invalid_input(
                id,
                quantity.to_string(),
                "Quantity must be a non-negative number",
            ));
        }
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| EstimateError::material_not_found(id))?;
        entry.quantity = quantity;
        Ok(())
    }

    /// Id -> quantity
    pub fn quantities(&self) -> IndexMap<String, f64> {
        self.entries
            .iter()
            .map(|(id, e)| (id.clone(), e.quantity))
            .collect()
    }

    /// Id -> material
    pub fn materials(&self) -> IndexMap<String, Material> {
        self.entries
            .iter()
            .map(|(id, e)| (id.clone(), e.material.clone()))
            .collect()
    }

    /// Sum of `price * quantity` over every entry
    pub fn material_cost(&self) -> f64 {
        self.entries.values().map(SelectedMaterial::line_cost).sum()
    }
}
