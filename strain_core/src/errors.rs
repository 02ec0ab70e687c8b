//! # Error Types
//!
//! Structured error types for strain_core. Every failure mode of the
//! solver pipeline maps to its own variant so callers can react
//! programmatically: configuration problems abort a run outright, while
//! a convergence failure can be retried with a looser tolerance or a
//! different search interval.
//!
//! ## Example
//!
//! ```rust
//! use strain_core::errors::{StrainError, StrainResult};
//!
//! fn validate_thickness(thickness_nm: f64) -> StrainResult<()> {
//!     if thickness_nm <= 0.0 {
//!         return Err(StrainError::invalid_input(
//!             "thickness_nm",
//!             thickness_nm.to_string(),
//!             "Layer thickness must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for strain_core operations
pub type StrainResult<T> = Result<T, StrainError>;

/// Structured error type for the solver pipeline.
///
/// Variants fall into four classes: configuration errors (bad material
/// names, malformed scripts, invalid ratios), numerical input errors
/// (shape mismatches, out-of-range positions), convergence failures,
/// and query-before-ready programmer errors.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum StrainError {
    /// An input value is invalid (out of range, wrong sign, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Material not found in the parameter database
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// Alloy composition string could not be parsed
    #[error("Malformed composition '{name}': {reason}")]
    MalformedComposition { name: String, reason: String },

    /// Stack description script could not be parsed
    #[error("Script error at line {line}: {reason}")]
    ScriptError { line: usize, reason: String },

    /// Matrix/vector shapes do not describe a square system
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A through-thickness position lies outside its valid range
    #[error("Position {position} outside [{min}, {max}] in {context}")]
    PositionOutOfRange {
        context: String,
        position: f64,
        min: f64,
        max: f64,
    },

    /// Elimination hit a column with no usable pivot
    #[error("Linear system is singular: no usable pivot in column {column}")]
    SingularSystem { column: usize },

    /// Minimizer exhausted its iteration budget
    #[error("Did not converge after {iterations} iterations (|derivative| = {residual})")]
    DidNotConverge { iterations: usize, residual: f64 },

    /// Stress/strain queried before the layer was solved
    #[error("Layer '{layer}' has no force/curvature yet; run a solve first")]
    LayerNotSolved { layer: String },

    /// File I/O error (script loading, result persistence)
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },
}

impl StrainError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        StrainError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        StrainError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a MalformedComposition error
    pub fn malformed_composition(name: impl Into<String>, reason: impl Into<String>) -> Self {
        StrainError::MalformedComposition {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a ScriptError
    pub fn script_error(line: usize, reason: impl Into<String>) -> Self {
        StrainError::ScriptError {
            line,
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        StrainError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Convergence failures are the one class a caller may retry
    /// (with a looser tolerance or a different interval).
    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, StrainError::DidNotConverge { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            StrainError::InvalidInput { .. } => "INVALID_INPUT",
            StrainError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            StrainError::MalformedComposition { .. } => "MALFORMED_COMPOSITION",
            StrainError::ScriptError { .. } => "SCRIPT_ERROR",
            StrainError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            StrainError::PositionOutOfRange { .. } => "POSITION_OUT_OF_RANGE",
            StrainError::SingularSystem { .. } => "SINGULAR_SYSTEM",
            StrainError::DidNotConverge { .. } => "DID_NOT_CONVERGE",
            StrainError::LayerNotSolved { .. } => "LAYER_NOT_SOLVED",
            StrainError::FileError { .. } => "FILE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = StrainError::invalid_input("thickness_nm", "-5.0", "must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: StrainError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            StrainError::material_not_found("InN").error_code(),
            "MATERIAL_NOT_FOUND"
        );
        assert_eq!(
            StrainError::script_error(3, "bad layer").error_code(),
            "SCRIPT_ERROR"
        );
    }

    #[test]
    fn test_convergence_classification() {
        let conv = StrainError::DidNotConverge {
            iterations: 100,
            residual: 1e-3,
        };
        assert!(conv.is_convergence_failure());
        assert!(!StrainError::material_not_found("X").is_convergence_failure());
    }
}
