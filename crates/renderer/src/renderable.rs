//! GPU-bound, drawable representation of one field.
//!
//! # State machine
//!
//! ```text
//! Unattached ──attach()──► Attaching ──ok──► Ready
//!                              │
//!                              └──err──► Failed
//! ```
//!
//! `draw` is a no-op in every state except `Ready`, so a layer can call it
//! every frame while resources are still being built. `Failed` is terminal:
//! a field whose program fails to build simply never draws.

use std::cell::RefCell;
use std::rc::Rc;

use field_common::{FieldData, RawScalarField};
use tracing::{debug, error, warn};

use crate::error::{RenderError, Result};
use crate::gpu::{
    BlendState, DrawCall, PrimitiveMode, ProgramHandle, RenderContext, TextureBinding,
    TextureHandle, TextureLayout, TextureSpec, VertexAttribute,
};
use crate::host::ViewState;
use crate::plot::PlotComponent;
use crate::resources::{FieldResources, MeshBuffers};

/// Sampler uniform the field data texture is bound to.
pub const DATA_SAMPLER: &str = "u_data_sampler";

/// Observable lifecycle of a renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Unattached,
    Attaching,
    Ready,
    Failed,
}

enum RenderState {
    Unattached,
    Attaching,
    Ready(GlElements),
    Failed,
}

/// GPU handles owned by a ready renderable.
struct GlElements {
    program: ProgramHandle,
    mesh: MeshBuffers,
    data_texture: TextureHandle,
    aux_textures: Vec<(&'static str, TextureHandle)>,
}

/// A field bound to a plot component and, once attached, to GPU resources.
pub struct FieldRenderable {
    plot: Box<dyn PlotComponent>,
    resources: Rc<FieldResources>,
    state: RefCell<RenderState>,
}

impl FieldRenderable {
    pub fn new(plot: Box<dyn PlotComponent>, resources: Rc<FieldResources>) -> Self {
        Self {
            plot,
            resources,
            state: RefCell::new(RenderState::Unattached),
        }
    }

    pub fn status(&self) -> RenderStatus {
        match &*self.state.borrow() {
            RenderState::Unattached => RenderStatus::Unattached,
            RenderState::Attaching => RenderStatus::Attaching,
            RenderState::Ready(_) => RenderStatus::Ready,
            RenderState::Failed => RenderStatus::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status() == RenderStatus::Ready
    }

    pub fn field(&self) -> &RawScalarField {
        self.plot.field()
    }

    /// Build or fetch every GPU resource this renderable needs.
    ///
    /// Only the first call does anything; later calls return
    /// [`RenderError::AlreadyAttached`] whatever state the first left.
    pub async fn attach(&self, context: &dyn RenderContext) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if !matches!(*state, RenderState::Unattached) {
                warn!("attach called twice on the same renderable");
                return Err(RenderError::AlreadyAttached);
            }
            *state = RenderState::Attaching;
        }

        match self.build(context).await {
            Ok(elements) => {
                debug!(
                    program = self.plot.program().key,
                    vertices = elements.mesh.vertex_count,
                    "Renderable ready"
                );
                *self.state.borrow_mut() = RenderState::Ready(elements);
                Ok(())
            }
            Err(e) => {
                if e.is_gpu_error() {
                    error!(program = self.plot.program().key, error = %e, "Program build failed");
                } else {
                    warn!(error = %e, "Renderable attach failed");
                }
                *self.state.borrow_mut() = RenderState::Failed;
                Err(e)
            }
        }
    }

    async fn build(&self, context: &dyn RenderContext) -> Result<GlElements> {
        let field = self.plot.field();

        let (program, mesh) = futures::try_join!(
            async {
                self.resources
                    .program(context, self.plot.program())
                    .await
                    .map_err(RenderError::from)
            },
            self.resources.mesh_buffers(context, field.grid()),
        )?;

        let data_texture = upload_field(context, field, self.plot.as_ref());

        let aux_textures = self
            .plot
            .auxiliary_textures()
            .iter()
            .map(|aux| {
                let texture = context.create_texture(&TextureSpec {
                    layout: TextureLayout::RGBA8,
                    width: aux.width,
                    height: aux.height,
                    data: &aux.rgba,
                    mag_filter: aux.filter,
                });
                (aux.sampler, texture)
            })
            .collect();

        Ok(GlElements {
            program,
            mesh,
            data_texture,
            aux_textures,
        })
    }

    /// Submit one draw call if ready.
    pub fn draw(&self, context: &dyn RenderContext, view: &ViewState, matrix: &[f32; 16]) {
        let state = self.state.borrow();
        let RenderState::Ready(gl) = &*state else {
            return;
        };

        let mut textures = vec![TextureBinding {
            sampler: DATA_SAMPLER,
            unit: 0,
            texture: gl.data_texture,
        }];
        textures.extend(
            gl.aux_textures
                .iter()
                .enumerate()
                .map(|(n, (sampler, texture))| TextureBinding {
                    sampler: *sampler,
                    unit: n as u32 + 1,
                    texture: *texture,
                }),
        );

        context.draw(&DrawCall {
            program: gl.program,
            attributes: vec![
                VertexAttribute {
                    name: "a_pos",
                    buffer: gl.mesh.vertices,
                    components: 2,
                },
                VertexAttribute {
                    name: "a_tex_coord",
                    buffer: gl.mesh.texcoords,
                    components: 2,
                },
                VertexAttribute {
                    name: "a_grid_cell_size",
                    buffer: gl.mesh.cell_areas,
                    components: 1,
                },
            ],
            textures,
            uniforms: self.plot.uniforms(view, matrix),
            mode: PrimitiveMode::TriangleStrip,
            vertex_count: gl.mesh.vertex_count,
            blend: BlendState::ALPHA_OVER,
        });
    }
}

/// Upload the field values as an `ni x nj` single-channel texture.
fn upload_field(
    context: &dyn RenderContext,
    field: &RawScalarField,
    plot: &dyn PlotComponent,
) -> TextureHandle {
    let grid = field.grid();
    let layout = TextureLayout::for_field(field.is_float16(), context.is_webgl2());

    let data: &[u8] = match field.data() {
        FieldData::F32(values) => bytemuck::cast_slice(values),
        FieldData::F16(bits) => bytemuck::cast_slice(bits),
    };

    context.create_texture(&TextureSpec {
        layout,
        width: grid.ni() as u32,
        height: grid.nj() as u32,
        data,
        mag_filter: plot.data_filter(),
    })
}
