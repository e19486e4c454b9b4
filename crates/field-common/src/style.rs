//! Plot style configuration.
//!
//! Styles are plain data: the renderer turns them into plot components.
//! A style set can be loaded from JSON so applications can keep plot
//! options next to their layer definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{FieldError, FieldResult};

/// Maximum number of explicit contour levels a contour program accepts.
pub const MAX_CONTOUR_LEVELS: usize = 40;

/// Named plot styles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSet {
    /// Version of the style schema
    #[serde(default = "default_version")]
    pub version: String,

    /// Named style definitions
    pub styles: HashMap<String, PlotStyle>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StyleSet {
    /// Load a style set from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> FieldResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FieldError::InvalidStyle(e.to_string()))?;
        Self::from_json(&content)
    }

    /// Parse a style set from a JSON string.
    pub fn from_json(json: &str) -> FieldResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get a style by name.
    pub fn get(&self, name: &str) -> Option<&PlotStyle> {
        self.styles.get(name)
    }

    /// Validate all styles in the set.
    pub fn validate(&self) -> FieldResult<()> {
        for (name, style) in &self.styles {
            style
                .validate()
                .map_err(|e| FieldError::InvalidStyle(format!("{}: {}", name, e)))?;
        }
        Ok(())
    }
}

/// Style for one plot type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlotStyle {
    Contour(ContourStyle),
    Raster(RasterStyle),
}

impl PlotStyle {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            PlotStyle::Contour(c) => c.validate(),
            PlotStyle::Raster(r) => r.validate(),
        }
    }
}

/// Contour line configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourStyle {
    /// Line color
    #[serde(default = "default_contour_color")]
    pub color: Color,

    /// Contour interval
    #[serde(default = "default_interval")]
    pub interval: f64,

    /// Explicit levels; overrides `interval` when non-empty
    #[serde(default)]
    pub levels: Vec<f64>,
}

fn default_contour_color() -> Color {
    Color::Hex("#000000".to_string())
}

fn default_interval() -> f64 {
    1.0
}

impl Default for ContourStyle {
    fn default() -> Self {
        Self {
            color: default_contour_color(),
            interval: default_interval(),
            levels: Vec::new(),
        }
    }
}

impl ContourStyle {
    pub fn validate(&self) -> Result<(), String> {
        if self.interval <= 0.0 || !self.interval.is_finite() {
            return Err("Contour interval must be positive".to_string());
        }
        if self.levels.len() > MAX_CONTOUR_LEVELS {
            return Err(format!(
                "At most {} contour levels are supported, got {}",
                MAX_CONTOUR_LEVELS,
                self.levels.len()
            ));
        }
        if self.levels.iter().any(|l| !l.is_finite()) {
            return Err("Contour levels must be finite".to_string());
        }
        Ok(())
    }
}

/// Filled raster configuration driven by a color ramp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterStyle {
    /// Ramp stops in ascending value order
    pub stops: Vec<ColorStop>,

    /// Layer opacity in [0, 1]
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_opacity() -> f32 {
    1.0
}

impl RasterStyle {
    pub fn validate(&self) -> Result<(), String> {
        if self.stops.len() < 2 {
            return Err("Raster ramp needs at least 2 stops".to_string());
        }
        if self.stops.windows(2).any(|w| w[1].value <= w[0].value) {
            return Err("Raster stops must be strictly ascending".to_string());
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err("Raster opacity must be within [0, 1]".to_string());
        }
        Ok(())
    }

    /// Value range covered by the ramp.
    pub fn value_range(&self) -> (f64, f64) {
        match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first.value, last.value),
            _ => (0.0, 1.0),
        }
    }
}

/// A color stop in a ramp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorStop {
    /// The data value at this stop
    pub value: f64,

    /// The color at this stop
    pub color: Color,

    /// Optional label for legend
    #[serde(default)]
    pub label: Option<String>,
}

impl ColorStop {
    pub fn new(value: f64, color: Color) -> Self {
        Self {
            value,
            color,
            label: None,
        }
    }
}

/// Color representation supporting multiple formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// Hex string "#RRGGBB" / "#RRGGBBAA", or a color name
    Hex(String),

    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Explicit RGBA
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    pub fn transparent() -> Self {
        Color::Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert to RGBA tuple.
    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        match self {
            Color::Hex(s) if s.starts_with('#') => parse_hex_color(s),
            Color::Hex(name) => named_color(name),
            Color::Array(arr) => {
                let r = arr.first().copied().unwrap_or(0);
                let g = arr.get(1).copied().unwrap_or(0);
                let b = arr.get(2).copied().unwrap_or(0);
                let a = arr.get(3).copied().unwrap_or(255);
                (r, g, b, a)
            }
            Color::Rgba { r, g, b, a } => (*r, *g, *b, *a),
        }
    }

    /// RGB scaled to [0, 1] for shader uniforms.
    pub fn to_unit_rgb(&self) -> [f32; 3] {
        let (r, g, b, _) = self.to_rgba();
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
    }
}

fn parse_hex_color(s: &str) -> (u8, u8, u8, u8) {
    let s = s.trim_start_matches('#');
    if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&s[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&s[4..6], 16).unwrap_or(0);
        (r, g, b, 255)
    } else if s.len() == 8 {
        let r = u8::from_str_radix(&s[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&s[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&s[4..6], 16).unwrap_or(0);
        let a = u8::from_str_radix(&s[6..8], 16).unwrap_or(255);
        (r, g, b, a)
    } else {
        (0, 0, 0, 255)
    }
}

fn named_color(name: &str) -> (u8, u8, u8, u8) {
    match name.to_lowercase().as_str() {
        "transparent" => (0, 0, 0, 0),
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 255, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        _ => (0, 0, 0, 255),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_style_set() {
        let json = r##"{"styles":{"height":{"type":"contour","color":"#202020","interval":30},"t2m":{"type":"raster","stops":[{"value":-40,"color":"#9013FE"},{"value":0,"color":"#00FFFF"},{"value":40,"color":"#FF0000"}],"opacity":0.8}}}"##;

        let set = StyleSet::from_json(json).unwrap();
        set.validate().unwrap();
        assert_eq!(set.version, "1.0");

        match set.get("height").unwrap() {
            PlotStyle::Contour(c) => {
                assert_eq!(c.interval, 30.0);
                assert!(c.levels.is_empty());
            }
            _ => panic!("Expected contour style"),
        }

        match set.get("t2m").unwrap() {
            PlotStyle::Raster(r) => assert_eq!(r.value_range(), (-40.0, 40.0)),
            _ => panic!("Expected raster style"),
        }
    }

    #[test]
    fn test_contour_validation() {
        let mut style = ContourStyle::default();
        assert!(style.validate().is_ok());

        style.interval = 0.0;
        assert!(style.validate().is_err());

        style = ContourStyle {
            levels: vec![1.0; MAX_CONTOUR_LEVELS + 1],
            ..ContourStyle::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_raster_validation() {
        let style = RasterStyle {
            stops: vec![
                ColorStop::new(10.0, Color::Hex("red".to_string())),
                ColorStop::new(0.0, Color::Hex("blue".to_string())),
            ],
            opacity: 1.0,
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(Color::Hex("#FF5500".to_string()).to_rgba(), (255, 85, 0, 255));
        assert_eq!(Color::Hex("#FF550080".to_string()).to_rgba(), (255, 85, 0, 128));
        assert_eq!(Color::Array(vec![100, 150, 200]).to_rgba(), (100, 150, 200, 255));
        assert_eq!(Color::Hex("red".to_string()).to_rgba(), (255, 0, 0, 255));
        assert_eq!(Color::Hex("#FFFFFF".to_string()).to_unit_rgb(), [1.0, 1.0, 1.0]);
    }
}
