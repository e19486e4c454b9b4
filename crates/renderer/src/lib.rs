//! GPU map overlays for gridded fields.
//!
//! # Architecture
//!
//! ```text
//! MapLayer ──► TimeFieldLayer ──► FieldRenderable (per hour) ──► PlotComponent
//!          └─► StaticFieldLayer ─► FieldRenderable              (Contour, Raster)
//!                                       │
//!                                       ▼
//!                                 FieldResources
//!                          (programs, meshes, mesh buffers)
//!                                       │
//!                                       ▼
//!                               TessellatorHandle ──► worker thread
//! ```
//!
//! Everything above the tessellator runs on the thread that owns the
//! rendering context. Attach work runs as local tasks, so layers must be
//! mounted from within a `tokio::task::LocalSet`.

pub mod cache;
pub mod contour;
pub mod error;
pub mod gpu;
pub mod host;
pub mod layer;
pub mod plot;
pub mod raster;
pub mod renderable;
pub mod resources;
pub mod static_layer;
pub mod time_layer;

pub use cache::{CacheStats, ResourceCache, SingleFlight};
pub use contour::Contour;
pub use error::{RenderError, Result};
pub use gpu::{
    BlendState, ContextId, DrawCall, GpuError, RenderContext, TextureFilter, TextureLayout,
    TextureSpec,
};
pub use host::{MapHost, ViewState};
pub use layer::{AttachHandle, MapLayer};
pub use plot::{PlotComponent, ProgramSource};
pub use raster::Raster;
pub use renderable::{FieldRenderable, RenderStatus};
pub use resources::{FieldResources, MeshBuffers, MeshKey};
pub use static_layer::StaticFieldLayer;
pub use time_layer::TimeFieldLayer;
