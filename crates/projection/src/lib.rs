//! Coordinate transforms used to place grid nodes on the map plane.
//!
//! Implements the projections from scratch without external dependencies.

pub mod lambert;
pub mod mercator;

pub use lambert::LambertConformal;
pub use mercator::{
    lat_from_mercator_y, lng_from_mercator_x, mercator_x_from_lng, mercator_y_from_lat, LngLat,
    MercatorCoord, MAX_MERCATOR_LATITUDE,
};
