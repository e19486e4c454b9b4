//! Common test doubles for renderer tests
//!
//! Provides:
//! - A rendering context that hands out fake handles and records calls
//! - A map host that counts repaint requests
//! - Grid, field and resource builders

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use field_common::{ContourStyle, FieldData, Grid, RawScalarField};
use renderer::gpu::{
    BufferHandle, ContextId, DrawCall, GpuError, ProgramHandle, RenderContext, ShaderStage,
    TextureHandle, TextureLayout, TextureSpec,
};
use renderer::{Contour, FieldResources, MapHost, PlotComponent};
use tessellator::{TessellationJob, TessellatorConfig, TessellatorHandle, TessellatorWorker};
use test_utils::{create_f16_ones, create_test_values};
use tokio::sync::mpsc;

/// What a texture upload looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTexture {
    pub handle: TextureHandle,
    pub layout: TextureLayout,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

/// Rendering context double with call counters.
pub struct MockRenderContext {
    id: ContextId,
    webgl2: bool,
    fail_compile: Cell<bool>,
    next_handle: Cell<u64>,
    programs: Cell<usize>,
    buffers: Cell<usize>,
    textures: RefCell<Vec<RecordedTexture>>,
    draws: RefCell<Vec<DrawCall>>,
}

impl MockRenderContext {
    pub fn new(id: u64) -> Self {
        Self {
            id: ContextId(id),
            webgl2: true,
            fail_compile: Cell::new(false),
            next_handle: Cell::new(1),
            programs: Cell::new(0),
            buffers: Cell::new(0),
            textures: RefCell::new(Vec::new()),
            draws: RefCell::new(Vec::new()),
        }
    }

    /// Context without WebGL2 texture formats.
    pub fn webgl1(id: u64) -> Self {
        Self {
            webgl2: false,
            ..Self::new(id)
        }
    }

    /// Context whose fragment shaders never compile.
    pub fn failing(id: u64) -> Self {
        let ctx = Self::new(id);
        ctx.fail_compile.set(true);
        ctx
    }

    fn next(&self) -> u64 {
        let n = self.next_handle.get();
        self.next_handle.set(n + 1);
        n
    }

    pub fn program_count(&self) -> usize {
        self.programs.get()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.get()
    }

    pub fn textures(&self) -> Vec<RecordedTexture> {
        self.textures.borrow().clone()
    }

    pub fn draw_count(&self) -> usize {
        self.draws.borrow().len()
    }

    pub fn last_draw(&self) -> Option<DrawCall> {
        self.draws.borrow().last().cloned()
    }
}

impl RenderContext for MockRenderContext {
    fn id(&self) -> ContextId {
        self.id
    }

    fn is_webgl2(&self) -> bool {
        self.webgl2
    }

    fn create_program(&self, vertex: &str, fragment: &str) -> Result<ProgramHandle, GpuError> {
        assert!(!vertex.is_empty() && !fragment.is_empty());
        if self.fail_compile.get() {
            return Err(GpuError::ShaderCompileFailure {
                stage: ShaderStage::Fragment,
                log: "ERROR: 0:1: syntax error".to_string(),
            });
        }
        self.programs.set(self.programs.get() + 1);
        Ok(ProgramHandle(self.next()))
    }

    fn create_buffer(&self, _data: &[f32]) -> BufferHandle {
        self.buffers.set(self.buffers.get() + 1);
        BufferHandle(self.next())
    }

    fn create_texture(&self, spec: &TextureSpec<'_>) -> TextureHandle {
        let handle = TextureHandle(self.next());
        self.textures.borrow_mut().push(RecordedTexture {
            handle,
            layout: spec.layout,
            width: spec.width,
            height: spec.height,
            byte_len: spec.data.len(),
        });
        handle
    }

    fn draw(&self, call: &DrawCall) {
        self.draws.borrow_mut().push(call.clone());
    }
}

/// Map host double counting repaint requests.
pub struct MockMapHost {
    zoom: Cell<f64>,
    repaints: Cell<usize>,
}

impl MockMapHost {
    pub fn new() -> Self {
        Self {
            zoom: Cell::new(4.0),
            repaints: Cell::new(0),
        }
    }

    pub fn repaints(&self) -> usize {
        self.repaints.get()
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.zoom.set(zoom);
    }
}

impl MapHost for MockMapHost {
    fn zoom(&self) -> f64 {
        self.zoom.get()
    }

    fn size(&self) -> (u32, u32) {
        (800, 600)
    }

    fn bearing(&self) -> f64 {
        0.0
    }

    fn pitch(&self) -> f64 {
        0.0
    }

    fn trigger_repaint(&self) {
        self.repaints.set(self.repaints.get() + 1);
    }
}

/// Regular grid over the central US.
pub fn regular_grid(ni: usize, nj: usize) -> Arc<Grid> {
    Arc::new(Grid::plate_carree(ni, nj, -100.0, 30.0, -90.0, 40.0).unwrap())
}

pub fn f32_field(grid: &Arc<Grid>) -> RawScalarField {
    RawScalarField::from_f32(Arc::clone(grid), create_test_values(grid.ni(), grid.nj())).unwrap()
}

pub fn f16_field(grid: &Arc<Grid>) -> RawScalarField {
    RawScalarField::new(Arc::clone(grid), FieldData::F16(create_f16_ones(grid.len()))).unwrap()
}

pub fn contour(field: RawScalarField) -> Box<dyn PlotComponent> {
    Box::new(Contour::new(field, &ContourStyle::default()).unwrap())
}

/// Resources backed by a real worker thread.
pub fn worker_resources() -> Rc<FieldResources> {
    let (handle, _worker) = TessellatorWorker::spawn(&TessellatorConfig::default()).unwrap();
    Rc::new(FieldResources::new(handle))
}

/// Resources whose tessellation jobs the test answers itself.
pub fn manual_resources() -> (Rc<FieldResources>, mpsc::Receiver<TessellationJob>) {
    let (handle, rx) = TessellatorHandle::channel(16);
    (Rc::new(FieldResources::new(handle)), rx)
}

pub fn identity() -> [f32; 16] {
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}
