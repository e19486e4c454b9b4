//! Error types for renderables and layers.

use field_common::FieldError;
use tessellator::TessellatorError;
use thiserror::Error;

use crate::gpu::GpuError;

/// Result type for renderer operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while attaching or configuring a renderable.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Program compile or link failure.
    #[error(transparent)]
    Gpu(#[from] GpuError),

    /// `attach` was called on a renderable that already started attaching.
    #[error("renderable already attached")]
    AlreadyAttached,

    #[error("tessellation failed: {0}")]
    Tessellation(#[from] TessellatorError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl RenderError {
    /// True for program build failures, which leave the renderable unusable.
    pub fn is_gpu_error(&self) -> bool {
        matches!(self, RenderError::Gpu(_))
    }
}
