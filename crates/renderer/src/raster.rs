//! Filled raster colored through a user color ramp.
//!
//! The ramp is baked into a 256x1 RGBA texture and the fragment shader
//! maps each sample from `[u_min, u_max]` onto it.

use field_common::{FieldError, FieldResult, RasterStyle, RawScalarField};

use crate::gpu::{TextureFilter, Uniform, UniformValue};
use crate::host::ViewState;
use crate::plot::{AuxTexture, PlotComponent, ProgramSource};

pub static RASTER_PROGRAM: ProgramSource = ProgramSource {
    key: "raster",
    vertex: include_str!("glsl/raster_vertex.glsl"),
    fragment: include_str!("glsl/raster_fragment.glsl"),
};

/// Texels in the baked color ramp.
pub const RAMP_WIDTH: usize = 256;

pub struct Raster {
    field: RawScalarField,
    ramp: Vec<u8>,
    min: f32,
    max: f32,
    opacity: f32,
}

impl Raster {
    /// Fails unless the ramp has at least two strictly ascending stops and
    /// the opacity is within `[0, 1]`.
    pub fn new(field: RawScalarField, style: &RasterStyle) -> FieldResult<Self> {
        style.validate().map_err(FieldError::InvalidStyle)?;
        Ok(Self::from_valid_style(field, style))
    }

    pub(crate) fn from_valid_style(field: RawScalarField, style: &RasterStyle) -> Self {
        let (min, max) = style.value_range();
        Self {
            field,
            ramp: bake_ramp(style),
            min: min as f32,
            max: max as f32,
            opacity: style.opacity,
        }
    }

    /// The baked ramp, `RAMP_WIDTH` RGBA texels.
    pub fn ramp(&self) -> &[u8] {
        &self.ramp
    }
}

impl PlotComponent for Raster {
    fn field(&self) -> &RawScalarField {
        &self.field
    }

    fn program(&self) -> &'static ProgramSource {
        &RASTER_PROGRAM
    }

    fn auxiliary_textures(&self) -> Vec<AuxTexture> {
        vec![AuxTexture {
            sampler: "u_ramp_sampler",
            width: RAMP_WIDTH as u32,
            height: 1,
            rgba: self.ramp.clone(),
            filter: TextureFilter::Linear,
        }]
    }

    fn uniforms(&self, _view: &ViewState, matrix: &[f32; 16]) -> Vec<Uniform> {
        vec![
            Uniform::new("u_matrix", UniformValue::Mat4(*matrix)),
            Uniform::new("u_min", UniformValue::Float(self.min)),
            Uniform::new("u_max", UniformValue::Float(self.max)),
            Uniform::new("u_opacity", UniformValue::Float(self.opacity)),
        ]
    }
}

/// Sample the ramp at `RAMP_WIDTH` evenly spaced values.
fn bake_ramp(style: &RasterStyle) -> Vec<u8> {
    let stops: Vec<(f64, [f64; 4])> = style
        .stops
        .iter()
        .map(|stop| {
            let (r, g, b, a) = stop.color.to_rgba();
            (stop.value, [r as f64, g as f64, b as f64, a as f64])
        })
        .collect();

    let mut rgba = Vec::with_capacity(RAMP_WIDTH * 4);
    let (min, max) = style.value_range();

    for texel in 0..RAMP_WIDTH {
        let value = min + (max - min) * texel as f64 / (RAMP_WIDTH - 1) as f64;
        let color = interpolate(&stops, value);
        rgba.extend(color.iter().map(|c| c.round().clamp(0.0, 255.0) as u8));
    }

    rgba
}

fn interpolate(stops: &[(f64, [f64; 4])], value: f64) -> [f64; 4] {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return [0.0; 4];
    };
    if value <= first.0 {
        return first.1;
    }
    if value >= last.0 {
        return last.1;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if value <= hi.0 {
            let span = hi.0 - lo.0;
            let t = if span > 0.0 { (value - lo.0) / span } else { 0.0 };
            let mut out = [0.0; 4];
            for (k, c) in out.iter_mut().enumerate() {
                *c = lo.1[k] + (hi.1[k] - lo.1[k]) * t;
            }
            return out;
        }
    }

    last.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_common::{Color, ColorStop, Grid};
    use std::sync::Arc;

    fn style() -> RasterStyle {
        RasterStyle {
            stops: vec![
                ColorStop::new(0.0, Color::Hex("#000000".to_string())),
                ColorStop::new(10.0, Color::Hex("#FFFFFF".to_string())),
            ],
            opacity: 0.8,
        }
    }

    #[test]
    fn test_ramp_endpoints() {
        let ramp = bake_ramp(&style());
        assert_eq!(ramp.len(), RAMP_WIDTH * 4);
        assert_eq!(&ramp[0..4], &[0, 0, 0, 255]);
        assert_eq!(&ramp[ramp.len() - 4..], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_ramp_is_monotonic_for_grey_scale() {
        let ramp = bake_ramp(&style());
        let reds: Vec<u8> = ramp.chunks_exact(4).map(|px| px[0]).collect();
        assert!(reds.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_interpolate_midpoint() {
        let stops = [(0.0, [0.0, 0.0, 0.0, 0.0]), (2.0, [200.0, 100.0, 50.0, 255.0])];
        assert_eq!(interpolate(&stops, 1.0), [100.0, 50.0, 25.0, 127.5]);
        assert_eq!(interpolate(&stops, -1.0), stops[0].1);
        assert_eq!(interpolate(&stops, 9.0), stops[1].1);
        assert_eq!(interpolate(&[], 1.0), [0.0; 4]);
    }

    #[test]
    fn test_invalid_ramps_rejected() {
        let grid = Arc::new(Grid::plate_carree(2, 2, 0.0, 0.0, 1.0, 1.0).unwrap());
        let field = || RawScalarField::from_f32(Arc::clone(&grid), vec![0.0; 4]).unwrap();

        let single_stop = RasterStyle {
            stops: vec![ColorStop::new(0.0, Color::transparent())],
            opacity: 1.0,
        };
        assert!(matches!(
            Raster::new(field(), &single_stop),
            Err(FieldError::InvalidStyle(_))
        ));

        let mut descending = style();
        descending.stops.reverse();
        assert!(matches!(
            Raster::new(field(), &descending),
            Err(FieldError::InvalidStyle(_))
        ));

        let raster = Raster::new(field(), &style()).unwrap();
        assert_eq!(raster.ramp().len(), RAMP_WIDTH * 4);
    }
}
