//! Scalar fields of physical values on a grid.

use std::sync::Arc;

use crate::error::{FieldError, FieldResult};
use crate::grid::Grid;

/// Backing storage for a field's values.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    /// Single-precision values
    F32(Vec<f32>),
    /// IEEE 754 binary16 bit patterns (reduced precision)
    F16(Vec<u16>),
}

impl FieldData {
    pub fn len(&self) -> usize {
        match self {
            FieldData::F32(v) => v.len(),
            FieldData::F16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_float16(&self) -> bool {
        matches!(self, FieldData::F16(_))
    }

    /// Size of one value in bytes.
    pub fn bytes_per_value(&self) -> usize {
        match self {
            FieldData::F32(_) => 4,
            FieldData::F16(_) => 2,
        }
    }
}

/// A 2-D array of values living on a shared grid.
///
/// Several fields may reference the same grid (e.g. every forecast hour of
/// a model run), so the grid is held behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RawScalarField {
    grid: Arc<Grid>,
    data: FieldData,
}

impl RawScalarField {
    /// Create a field, checking that the data matches the grid's node count.
    pub fn new(grid: Arc<Grid>, data: FieldData) -> FieldResult<Self> {
        if data.len() != grid.len() {
            return Err(FieldError::shape_mismatch("field data", grid.len(), data.len()));
        }
        Ok(Self { grid, data })
    }

    /// Convenience constructor for single-precision data.
    pub fn from_f32(grid: Arc<Grid>, values: Vec<f32>) -> FieldResult<Self> {
        Self::new(grid, FieldData::F32(values))
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn data(&self) -> &FieldData {
        &self.data
    }

    pub fn is_float16(&self) -> bool {
        self.data.is_float16()
    }
}
