//! Common types shared by the field layer crates.
//!
//! Grids and fields are immutable once built; everything downstream
//! (tessellation, GPU upload, layer bookkeeping) borrows or shares them.

pub mod error;
pub mod field;
pub mod grid;
pub mod layer;
pub mod style;
pub mod time;

pub use error::{FieldError, FieldResult};
pub use field::{FieldData, RawScalarField};
pub use grid::{Grid, GridKind};
pub use layer::LayerId;
pub use style::{
    Color, ColorStop, ContourStyle, PlotStyle, RasterStyle, StyleSet, MAX_CONTOUR_LEVELS,
};
pub use time::{TimeKey, ValidTime};
