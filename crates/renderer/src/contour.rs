//! Contour lines drawn in the fragment shader.
//!
//! The field is sampled with linear filtering and lines are drawn where the
//! value crosses a multiple of the interval (or one of the explicit levels).

use field_common::{ContourStyle, FieldError, FieldResult, RawScalarField};

use crate::gpu::{TextureFilter, Uniform, UniformValue};
use crate::host::ViewState;
use crate::plot::{PlotComponent, ProgramSource};

pub static CONTOUR_PROGRAM: ProgramSource = ProgramSource {
    key: "contour",
    vertex: include_str!("glsl/contour_vertex.glsl"),
    fragment: include_str!("glsl/contour_fragment.glsl"),
};

/// Returns `n` to draw only every n-th contour at a zoom level.
pub type Thinner = Box<dyn Fn(f64) -> u32>;

/// Contour plot of a scalar field.
pub struct Contour {
    field: RawScalarField,
    color: [f32; 3],
    interval: f32,
    levels: Vec<f32>,
    thinner: Thinner,
}

impl Contour {
    /// Contour `field` with `style`; every contour is drawn at every zoom.
    ///
    /// Fails if the interval is not positive or there are more levels than
    /// the program accepts.
    pub fn new(field: RawScalarField, style: &ContourStyle) -> FieldResult<Self> {
        style.validate().map_err(FieldError::InvalidStyle)?;
        Ok(Self::from_valid_style(field, style))
    }

    /// Build from a style that already passed `validate`.
    pub(crate) fn from_valid_style(field: RawScalarField, style: &ContourStyle) -> Self {
        Self {
            field,
            color: style.color.to_unit_rgb(),
            interval: style.interval as f32,
            levels: style.levels.iter().map(|&l| l as f32).collect(),
            thinner: Box::new(|_| 1),
        }
    }

    /// Thin contours by zoom, e.g. `|zoom| if zoom < 5.0 { 2 } else { 1 }`.
    pub fn with_thinner(mut self, thinner: impl Fn(f64) -> u32 + 'static) -> Self {
        self.thinner = Box::new(thinner);
        self
    }

    /// Interval actually drawn at `zoom`.
    pub fn interval_at(&self, zoom: f64) -> f32 {
        (self.thinner)(zoom).max(1) as f32 * self.interval
    }
}

impl PlotComponent for Contour {
    fn field(&self) -> &RawScalarField {
        &self.field
    }

    fn program(&self) -> &'static ProgramSource {
        &CONTOUR_PROGRAM
    }

    fn data_filter(&self) -> TextureFilter {
        TextureFilter::Linear
    }

    fn uniforms(&self, view: &ViewState, matrix: &[f32; 16]) -> Vec<Uniform> {
        let grid = self.field.grid();
        let interval = self.interval_at(view.zoom);

        // The shader loops over a fixed-size array; an empty list still
        // needs one element
        let levels = if self.levels.is_empty() {
            vec![0.0]
        } else {
            self.levels.clone()
        };

        vec![
            Uniform::new("u_matrix", UniformValue::Mat4(*matrix)),
            Uniform::new("u_contour_interval", UniformValue::Float(interval)),
            Uniform::new("u_line_cutoff", UniformValue::Float(0.5 / interval)),
            Uniform::new("u_color", UniformValue::Vec3(self.color)),
            Uniform::new(
                "u_step_size",
                UniformValue::Vec2([0.25 / grid.ni() as f32, 0.25 / grid.nj() as f32]),
            ),
            Uniform::new("u_zoom_fac", UniformValue::Float(view.zoom_factor() as f32)),
            Uniform::new("u_num_contours", UniformValue::Int(self.levels.len() as i32)),
            Uniform::new("u_contour_levels", UniformValue::FloatArray(levels)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_common::{Color, Grid};
    use std::sync::Arc;

    fn field() -> RawScalarField {
        let grid = Arc::new(Grid::plate_carree(4, 2, 0.0, 0.0, 3.0, 1.0).unwrap());
        RawScalarField::from_f32(grid, vec![0.0; 8]).unwrap()
    }

    fn uniform<'a>(uniforms: &'a [Uniform], name: &str) -> &'a UniformValue {
        &uniforms.iter().find(|u| u.name == name).unwrap().value
    }

    #[test]
    fn test_uniforms_follow_zoom() {
        let style = ContourStyle {
            color: Color::Hex("#FF0000".to_string()),
            interval: 4.0,
            levels: Vec::new(),
        };
        let contour = Contour::new(field(), &style)
            .unwrap()
            .with_thinner(|zoom| if zoom < 5.0 { 2 } else { 1 });

        let view = ViewState {
            zoom: 3.0,
            ..Default::default()
        };
        let uniforms = contour.uniforms(&view, &[0.0; 16]);

        assert_eq!(uniform(&uniforms, "u_contour_interval"), &UniformValue::Float(8.0));
        assert_eq!(uniform(&uniforms, "u_line_cutoff"), &UniformValue::Float(0.0625));
        assert_eq!(uniform(&uniforms, "u_zoom_fac"), &UniformValue::Float(8.0));
        assert_eq!(uniform(&uniforms, "u_step_size"), &UniformValue::Vec2([0.0625, 0.125]));
        assert_eq!(uniform(&uniforms, "u_color"), &UniformValue::Vec3([1.0, 0.0, 0.0]));
        assert_eq!(uniform(&uniforms, "u_num_contours"), &UniformValue::Int(0));
        assert_eq!(
            uniform(&uniforms, "u_contour_levels"),
            &UniformValue::FloatArray(vec![0.0])
        );

        let view = ViewState {
            zoom: 6.0,
            ..Default::default()
        };
        assert_eq!(contour.interval_at(view.zoom), 4.0);
    }

    #[test]
    fn test_explicit_levels() {
        let style = ContourStyle {
            levels: vec![5400.0, 5460.0, 5520.0],
            ..Default::default()
        };
        let contour = Contour::new(field(), &style).unwrap();
        let uniforms = contour.uniforms(&ViewState::default(), &[0.0; 16]);

        assert_eq!(uniform(&uniforms, "u_num_contours"), &UniformValue::Int(3));
        assert_eq!(
            uniform(&uniforms, "u_contour_levels"),
            &UniformValue::FloatArray(vec![5400.0, 5460.0, 5520.0])
        );
        assert_eq!(contour.data_filter(), TextureFilter::Linear);
    }

    #[test]
    fn test_invalid_styles_rejected() {
        let zero_interval = ContourStyle {
            interval: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            Contour::new(field(), &zero_interval),
            Err(FieldError::InvalidStyle(_))
        ));

        let too_many_levels = ContourStyle {
            levels: (0..45).map(f64::from).collect(),
            ..Default::default()
        };
        assert!(matches!(
            Contour::new(field(), &too_many_levels),
            Err(FieldError::InvalidStyle(_))
        ));
    }
}
