//! # Error Types
//!
//! Structured error types for estimate_core. The calculation engine itself
//! never fails: missing numbers become zero and unknown references are logged
//! and skipped. Errors surface only from selection edits, the persistence
//! boundary, and estimate file I/O.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::errors::{EstimateError, EstimateResult};
//!
//! fn validate_quantity(id: &str, quantity: f64) -> EstimateResult<()> {
//!     if !quantity.is_finite() || quantity < 0.0 {
//!         return Err(EstimateError::invalid_input(
//!             id,
//!             quantity.to_string(),
//!             "Quantity must be a non-negative number",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for estimate_core operations
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Structured error type for estimate operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EstimateError {
    /// An input value is invalid (out of range, not a number, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Material id not present in the catalog or the current selection
    #[error("Material not found: {material_id}")]
    MaterialNotFound { material_id: String },

    /// Attempt to remove a package or low-slope material through a per-item edit
    #[error("Material '{material_id}' is required by {required_by} and cannot be removed directly")]
    MandatoryMaterial { material_id: String, required_by: String },

    /// A caller-level requirement failed at the persistence boundary
    #[error("Validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl EstimateError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EstimateError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_id: impl Into<String>) -> Self {
        EstimateError::MaterialNotFound {
            material_id: material_id.into(),
        }
    }

    /// Create a MandatoryMaterial error
    pub fn mandatory_material(
        material_id: impl Into<String>,
        required_by: impl Into<String>,
    ) -> Self {
        EstimateError::MandatoryMaterial {
            material_id: material_id.into(),
            required_by: required_by.into(),
        }
    }

    /// Create a Validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EstimateError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        EstimateError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EstimateError::FileLocked { .. })
    }

    /// Whether the error should be shown to the user as a form problem
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            EstimateError::Validation { .. }
                | EstimateError::InvalidInput { .. }
                | EstimateError::MandatoryMaterial { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { .. } => "INVALID_INPUT",
            EstimateError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            EstimateError::MandatoryMaterial { .. } => "MANDATORY_MATERIAL",
            EstimateError::Validation { .. } => "VALIDATION_FAILED",
            EstimateError::FileError { .. } => "FILE_ERROR",
            EstimateError::FileLocked { .. } => "FILE_LOCKED",
            EstimateError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EstimateError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for EstimateError {
    fn from(e: serde_json::Error) -> Self {
        EstimateError::SerializationError {
            reason: e.to_string(),
        }
    }
}
