//! Normalised Web Mercator coordinates.
//!
//! The map plane is the unit square: x runs west to east from the
//! antimeridian, y runs north to south. This is the coordinate space the
//! host map's projection matrix expects for custom layer vertices.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Latitude at which the Web Mercator square is clipped.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Project to the normalised Mercator plane.
    ///
    /// Latitudes beyond ±[`MAX_MERCATOR_LATITUDE`] are clamped so nodes at
    /// the poles still produce finite vertices.
    pub fn to_mercator(&self) -> MercatorCoord {
        let lat = self.lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
        MercatorCoord {
            x: mercator_x_from_lng(self.lng),
            y: mercator_y_from_lat(lat),
        }
    }
}

/// A point on the normalised Mercator plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MercatorCoord {
    pub x: f64,
    pub y: f64,
}

impl MercatorCoord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Invert the projection back to degrees.
    pub fn to_lng_lat(&self) -> LngLat {
        LngLat {
            lng: lng_from_mercator_x(self.x),
            lat: lat_from_mercator_y(self.y),
        }
    }
}

/// Normalised x for a longitude in degrees.
pub fn mercator_x_from_lng(lng: f64) -> f64 {
    (180.0 + lng) / 360.0
}

/// Normalised y for a latitude in degrees.
pub fn mercator_y_from_lat(lat: f64) -> f64 {
    (180.0 - (180.0 / PI) * (PI / 4.0 + lat * PI / 360.0).tan().ln()) / 360.0
}

pub fn lng_from_mercator_x(x: f64) -> f64 {
    x * 360.0 - 180.0
}

pub fn lat_from_mercator_y(y: f64) -> f64 {
    let y2 = 180.0 - y * 360.0;
    360.0 / PI * (y2 * PI / 180.0).exp().atan() - 90.0
}
