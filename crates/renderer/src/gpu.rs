//! Rendering context abstraction.
//!
//! The renderer never talks to a graphics API directly. Everything it needs
//! from the GPU goes through [`RenderContext`]: compile a program, upload a
//! float buffer, upload a 2-D texture, submit a draw. Handles are opaque
//! ids owned by the context.

use std::fmt;

use thiserror::Error;

/// Identity of a rendering context, used to scope cached GPU objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

/// Compiled and linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// 2-D texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Program build failures reported by the context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GpuError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompileFailure { stage: ShaderStage, log: String },

    #[error("program failed to link: {log}")]
    ProgramLinkFailure { log: String },
}

/// Internal texel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// Single 32-bit float channel (WebGL2).
    R32F,
    /// Single 16-bit float channel (WebGL2).
    R16F,
    /// Single channel, WebGL1 float extensions.
    Luminance,
    /// 8-bit RGBA.
    Rgba8,
}

/// Component type of the uploaded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Float,
    HalfFloat,
    UnsignedByte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Format, component type and row alignment of a texture upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureLayout {
    pub format: TextureFormat,
    pub pixel_type: PixelType,
    /// Unpack alignment of each row in bytes.
    pub row_alignment: u32,
}

impl TextureLayout {
    /// Tightly packed 8-bit RGBA.
    pub const RGBA8: TextureLayout = TextureLayout {
        format: TextureFormat::Rgba8,
        pixel_type: PixelType::UnsignedByte,
        row_alignment: 4,
    };

    /// Layout for a scalar field texture.
    ///
    /// Half-precision rows are only 2-byte aligned when `ni` is odd, so
    /// they unpack with an alignment of 2.
    pub fn for_field(is_float16: bool, webgl2: bool) -> Self {
        match (is_float16, webgl2) {
            (true, true) => Self {
                format: TextureFormat::R16F,
                pixel_type: PixelType::HalfFloat,
                row_alignment: 2,
            },
            (true, false) => Self {
                format: TextureFormat::Luminance,
                pixel_type: PixelType::HalfFloat,
                row_alignment: 2,
            },
            (false, true) => Self {
                format: TextureFormat::R32F,
                pixel_type: PixelType::Float,
                row_alignment: 4,
            },
            (false, false) => Self {
                format: TextureFormat::Luminance,
                pixel_type: PixelType::Float,
                row_alignment: 4,
            },
        }
    }
}

/// A texture upload request.
#[derive(Debug, Clone, Copy)]
pub struct TextureSpec<'a> {
    pub layout: TextureLayout,
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
    pub mag_filter: TextureFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// Separate color and alpha blend functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl BlendState {
    /// Standard alpha-over compositing.
    pub const ALPHA_OVER: BlendState = BlendState {
        src_rgb: BlendFactor::SrcAlpha,
        dst_rgb: BlendFactor::OneMinusSrcAlpha,
        src_alpha: BlendFactor::One,
        dst_alpha: BlendFactor::OneMinusSrcAlpha,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    FloatArray(Vec<f32>),
    Mat4([f32; 16]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub name: &'static str,
    pub value: UniformValue,
}

impl Uniform {
    pub fn new(name: &'static str, value: UniformValue) -> Self {
        Self { name, value }
    }
}

/// A float buffer bound to a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub buffer: BufferHandle,
    /// Floats per vertex.
    pub components: u32,
}

/// A texture bound to a sampler uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureBinding {
    pub sampler: &'static str,
    pub unit: u32,
    pub texture: TextureHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    TriangleStrip,
    Triangles,
}

/// Everything needed for one draw submission.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: ProgramHandle,
    pub attributes: Vec<VertexAttribute>,
    pub textures: Vec<TextureBinding>,
    pub uniforms: Vec<Uniform>,
    pub mode: PrimitiveMode,
    pub vertex_count: usize,
    pub blend: BlendState,
}

impl DrawCall {
    /// Look up a uniform by name.
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .map(|u| &u.value)
    }
}

/// The GPU operations the renderer relies on.
///
/// A context is owned by one thread; methods take `&self` so it can be
/// shared through `Rc` by every layer drawing into it.
pub trait RenderContext {
    fn id(&self) -> ContextId;

    /// Whether WebGL2-class texture formats are available.
    fn is_webgl2(&self) -> bool;

    fn create_program(&self, vertex: &str, fragment: &str) -> Result<ProgramHandle, GpuError>;

    fn create_buffer(&self, data: &[f32]) -> BufferHandle;

    fn create_texture(&self, spec: &TextureSpec<'_>) -> TextureHandle;

    fn draw(&self, call: &DrawCall);
}
