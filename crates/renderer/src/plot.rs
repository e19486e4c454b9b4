//! Plot components.
//!
//! A plot component is the part of a renderable that differs between plot
//! types: which program draws it, how its data texture is filtered, what
//! extra textures it needs and which uniforms it sets each frame. The
//! mesh, data upload and draw submission are shared.

use field_common::RawScalarField;

use crate::gpu::{TextureFilter, Uniform};
use crate::host::ViewState;

/// Shader pair for one plot type.
#[derive(Debug)]
pub struct ProgramSource {
    /// Cache key; one compiled program per key per context.
    pub key: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
}

/// An RGBA8 texture a plot needs besides the field data.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxTexture {
    pub sampler: &'static str,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub filter: TextureFilter,
}

/// Plot-type specific behaviour of a renderable.
pub trait PlotComponent {
    /// The field being plotted.
    fn field(&self) -> &RawScalarField;

    fn program(&self) -> &'static ProgramSource;

    /// Magnification filter for the data texture.
    fn data_filter(&self) -> TextureFilter {
        TextureFilter::Nearest
    }

    fn auxiliary_textures(&self) -> Vec<AuxTexture> {
        Vec::new()
    }

    /// Per-frame uniforms, including `u_matrix`.
    fn uniforms(&self, view: &ViewState, matrix: &[f32; 16]) -> Vec<Uniform>;
}
