//! Shared GPU and mesh resources.
//!
//! One [`FieldResources`] is built by whatever composes the rendering
//! pipeline and handed to every renderable. It owns three caches:
//!
//! | Cache | Key | Value |
//! |-------|-----|-------|
//! | programs | context + program key | compiled program |
//! | meshes | grid fingerprint + dimensions + margins | CPU mesh from the tessellator |
//! | mesh buffers | context + mesh key | uploaded vertex buffers |
//!
//! Fields that share a grid therefore share one tessellation and one set
//! of vertex buffers per context.

use std::sync::Arc;

use field_common::Grid;
use tessellator::{TessellatedMesh, TessellationRequest, TessellatorError, TessellatorHandle};
use tracing::debug;

use crate::cache::{CacheStats, ResourceCache, SingleFlight};
use crate::error::RenderError;
use crate::gpu::{BufferHandle, GpuError, ProgramHandle, RenderContext};
use crate::plot::ProgramSource;

/// Identity of a tessellated mesh.
///
/// The node content is only known through its 64-bit fingerprint, so the
/// dimensions are part of the key as well: a fingerprint collision between
/// differently shaped grids cannot hand out the wrong mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshKey {
    pub grid: u64,
    pub ni: usize,
    pub nj: usize,
    margin_r: u32,
    margin_s: u32,
}

impl MeshKey {
    pub fn new(grid: u64, (ni, nj): (usize, usize), margin_r: f32, margin_s: f32) -> Self {
        Self {
            grid,
            ni,
            nj,
            margin_r: margin_r.to_bits(),
            margin_s: margin_s.to_bits(),
        }
    }

    /// Key for a grid with texel-centre margins.
    pub fn for_grid(grid: &Grid) -> Self {
        let (margin_r, margin_s) = grid.texcoord_margins();
        Self::new(grid.fingerprint(), (grid.ni(), grid.nj()), margin_r, margin_s)
    }
}

/// Vertex buffers of an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBuffers {
    pub vertices: BufferHandle,
    pub texcoords: BufferHandle,
    pub cell_areas: BufferHandle,
    pub vertex_count: usize,
}

/// Program, mesh and buffer caches shared by renderables.
pub struct FieldResources {
    programs: ResourceCache<&'static str, ProgramHandle>,
    meshes: SingleFlight<MeshKey, Arc<TessellatedMesh>>,
    mesh_buffers: ResourceCache<MeshKey, MeshBuffers>,
    tessellator: TessellatorHandle,
}

impl FieldResources {
    pub fn new(tessellator: TessellatorHandle) -> Self {
        Self {
            programs: ResourceCache::new(),
            meshes: SingleFlight::new(),
            mesh_buffers: ResourceCache::new(),
            tessellator,
        }
    }

    pub fn tessellator(&self) -> &TessellatorHandle {
        &self.tessellator
    }

    /// Compiled program for `source` on `context`.
    pub async fn program(
        &self,
        context: &dyn RenderContext,
        source: &'static ProgramSource,
    ) -> Result<ProgramHandle, GpuError> {
        self.programs
            .get_or_create(context.id(), source.key, || async {
                debug!(program = source.key, context = context.id().0, "Compiling program");
                context.create_program(source.vertex, source.fragment)
            })
            .await
    }

    /// Tessellated mesh for `grid`, built once on the worker.
    pub async fn mesh(&self, grid: &Grid) -> Result<Arc<TessellatedMesh>, TessellatorError> {
        self.meshes
            .get_or_try_init(MeshKey::for_grid(grid), || async {
                debug!(ni = grid.ni(), nj = grid.nj(), "Requesting tessellation");
                let mesh = self
                    .tessellator
                    .tessellate(TessellationRequest::for_grid(grid))
                    .await?;
                Ok::<_, TessellatorError>(Arc::new(mesh))
            })
            .await
    }

    /// Vertex buffers for `grid` on `context`.
    pub async fn mesh_buffers(
        &self,
        context: &dyn RenderContext,
        grid: &Grid,
    ) -> Result<MeshBuffers, RenderError> {
        self.mesh_buffers
            .get_or_create(context.id(), MeshKey::for_grid(grid), || async {
                let mesh = self.mesh(grid).await?;
                let buffers = MeshBuffers {
                    vertices: context.create_buffer(mesh.vertices()),
                    texcoords: context.create_buffer(mesh.texcoords()),
                    cell_areas: context.create_buffer(mesh.cell_areas()),
                    vertex_count: mesh.vertex_count(),
                };
                debug!(
                    vertices = buffers.vertex_count,
                    bytes = mesh.byte_size(),
                    "Uploaded mesh buffers"
                );
                Ok::<_, RenderError>(buffers)
            })
            .await
    }

    pub async fn program_stats(&self) -> CacheStats {
        self.programs.stats().await
    }

    pub async fn mesh_stats(&self) -> CacheStats {
        self.meshes.stats().await
    }

    pub async fn buffer_stats(&self) -> CacheStats {
        self.mesh_buffers.stats().await
    }
}
