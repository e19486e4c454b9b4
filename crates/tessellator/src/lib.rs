//! Grid tessellation for GPU rasterization.
//!
//! Turns the lat/lon node arrays of a [`Grid`](field_common::Grid) into
//! triangle-strip vertex, texture-coordinate and per-cell area buffers in
//! normalised Web Mercator space.
//!
//! # Architecture
//!
//! ```text
//! render thread                         tessellator thread(s)
//!      │                                        │
//!      ├─► TessellatorHandle::tessellate(req) ──┤
//!      │        (request copied into queue)     ├─► tessellate(...)
//!      │                                        │
//!      ◄──────── oneshot reply (mesh) ──────────┘
//! ```
//!
//! [`tessellate`] itself is pure; the worker only moves it off the thread
//! that owns the GPU context so frame rendering never blocks on it.

pub mod config;
pub mod error;
pub mod mesh;
pub mod worker;

pub use config::TessellatorConfig;
pub use error::{Result, TessellatorError};
pub use mesh::{tessellate, TessellatedMesh};
pub use worker::{TessellationJob, TessellationRequest, TessellatorHandle, TessellatorWorker};
