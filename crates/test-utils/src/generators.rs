//! Test data generators for grids, field values and timestamps.
//!
//! Patterns are predictable so tests can check values by index.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Node arrays for a regular lat/lon grid spanning a bounding box.
///
/// Returns `(lats, lons)` in row-major order (`i + j * ni`). Longitudes
/// step along i, latitudes along j. A single-row grid sits at `ll_lat`.
///
/// # Example
///
/// ```
/// use test_utils::regular_nodes;
///
/// let (lats, lons) = regular_nodes(3, 2, (0.0, 0.0, 2.0, 1.0));
/// assert_eq!(lons, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
/// assert_eq!(lats, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
/// ```
pub fn regular_nodes(ni: usize, nj: usize, bbox: (f32, f32, f32, f32)) -> (Vec<f32>, Vec<f32>) {
    let (ll_lon, ll_lat, ur_lon, ur_lat) = bbox;
    let dlon = if ni > 1 {
        (ur_lon - ll_lon) / (ni - 1) as f32
    } else {
        0.0
    };
    let dlat = if nj > 1 {
        (ur_lat - ll_lat) / (nj - 1) as f32
    } else {
        0.0
    };

    let mut lats = Vec::with_capacity(ni * nj);
    let mut lons = Vec::with_capacity(ni * nj);
    for j in 0..nj {
        for i in 0..ni {
            lats.push(ll_lat + j as f32 * dlat);
            lons.push(ll_lon + i as f32 * dlon);
        }
    }
    (lats, lons)
}

/// Node arrays for a sheared grid, like a rotated or conic model domain.
///
/// Each row is shifted east by `shear` degrees per row so cells are
/// parallelograms rather than rectangles.
pub fn sheared_nodes(
    ni: usize,
    nj: usize,
    bbox: (f32, f32, f32, f32),
    shear: f32,
) -> (Vec<f32>, Vec<f32>) {
    let (lats, mut lons) = regular_nodes(ni, nj, bbox);
    for j in 0..nj {
        for lon in &mut lons[j * ni..(j + 1) * ni] {
            *lon += j as f32 * shear;
        }
    }
    (lats, lons)
}

/// Creates field values with a predictable pattern.
///
/// Each value is `i * 1000 + j`, so `values[i + j * ni] == i * 1000 + j`.
///
/// # Example
///
/// ```
/// use test_utils::create_test_values;
///
/// let values = create_test_values(10, 5);
/// assert_eq!(values.len(), 50);
/// assert_eq!(values[1], 1000.0);
/// assert_eq!(values[10], 1.0);
/// ```
pub fn create_test_values(ni: usize, nj: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(ni * nj);
    for j in 0..nj {
        for i in 0..ni {
            data.push((i * 1000 + j) as f32);
        }
    }
    data
}

/// Creates geopotential-height-like values in meters.
///
/// Heights fall from about 5880 m in the south to 5400 m in the north with
/// a weak wave along i, which gives contour tests something to draw.
pub fn create_height_values(ni: usize, nj: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(ni * nj);
    for j in 0..nj {
        for i in 0..ni {
            let y_factor = j as f32 / nj.max(1) as f32;
            let x_phase = i as f32 / ni.max(1) as f32 * std::f32::consts::TAU;
            data.push(5880.0 - 480.0 * y_factor + 60.0 * x_phase.sin());
        }
    }
    data
}

/// Half-precision bit patterns for a field of constant value 1.0.
pub fn create_f16_ones(len: usize) -> Vec<u16> {
    // IEEE 754 binary16 for 1.0
    vec![0x3C00; len]
}

/// Fixed reference time used across the test suite.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 12, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// `count` timestamps spaced one hour apart starting at `start`.
pub fn hourly_times(start: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    (0..count)
        .map(|h| start + Duration::hours(h as i64))
        .collect()
}
