//! Error types for tessellation.

use field_common::FieldError;
use thiserror::Error;

/// Errors that can occur while tessellating a grid.
#[derive(Error, Debug)]
pub enum TessellatorError {
    /// The grid or margins failed validation.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The worker queue is closed or the worker dropped the request.
    #[error("tessellator worker unavailable")]
    WorkerUnavailable,

    /// A worker thread could not be started.
    #[error("failed to spawn tessellator thread: {0}")]
    WorkerSpawn(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Result type for tessellator operations.
pub type Result<T> = std::result::Result<T, TessellatorError>;
