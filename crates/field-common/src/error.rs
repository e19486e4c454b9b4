//! Error types for grid, field and time handling.

use thiserror::Error;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

/// Primary error type for constructing grids, fields and time keys.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    // === Shape Errors ===
    #[error("Invalid grid shape {ni}x{nj}: need ni >= 2 and nj >= 1")]
    InvalidGridShape { ni: usize, nj: usize },

    #[error("{what} has {actual} values, expected {expected}")]
    DataShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Texture coordinate margin {axis}={value} outside [0, 0.5]")]
    InvalidTexcoordMargin { axis: char, value: f32 },

    // === Time Errors ===
    #[error("Invalid time key: {0}")]
    InvalidTime(String),

    // === Style Errors ===
    #[error("Invalid style: {0}")]
    InvalidStyle(String),
}

impl FieldError {
    /// Create a DataShapeMismatch error.
    pub fn shape_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DataShapeMismatch {
            what,
            expected,
            actual,
        }
    }

    /// True for errors raised while validating grid or data dimensions.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            FieldError::InvalidGridShape { .. } | FieldError::DataShapeMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(err: serde_json::Error) -> Self {
        FieldError::InvalidStyle(format!("JSON error: {}", err))
    }
}
