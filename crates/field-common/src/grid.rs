//! Geographic grids of lat/lon nodes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use projection::LambertConformal;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

/// How the node coordinates of a grid were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    /// Regularly spaced longitudes and latitudes
    PlateCarree,
    /// Regularly spaced in a Lambert conformal conic plane
    LambertConformal,
    /// Arbitrary node arrays supplied by the caller
    Curvilinear,
}

/// A structured grid of geographic nodes.
///
/// Nodes are stored row-major with index `i + j * ni`. The grid is a
/// quadrilateral mesh of `(ni - 1) x (nj - 1)` cells, or a strip of
/// `ni - 1` segments when `nj == 1` (profile grids).
#[derive(Debug, Clone)]
pub struct Grid {
    kind: GridKind,
    ni: usize,
    nj: usize,
    lats: Arc<[f32]>,
    lons: Arc<[f32]>,
    fingerprint: u64,
}

impl Grid {
    /// Create a grid from explicit node arrays.
    pub fn new(ni: usize, nj: usize, lats: Vec<f32>, lons: Vec<f32>) -> FieldResult<Self> {
        Self::with_kind(GridKind::Curvilinear, ni, nj, lats, lons)
    }

    fn with_kind(
        kind: GridKind,
        ni: usize,
        nj: usize,
        lats: Vec<f32>,
        lons: Vec<f32>,
    ) -> FieldResult<Self> {
        check_shape(ni, nj)?;

        let n = ni * nj;
        if lats.len() != n {
            return Err(FieldError::shape_mismatch("lats", n, lats.len()));
        }
        if lons.len() != n {
            return Err(FieldError::shape_mismatch("lons", n, lons.len()));
        }

        let fingerprint = fingerprint(ni, nj, &lats, &lons);

        Ok(Self {
            kind,
            ni,
            nj,
            lats: lats.into(),
            lons: lons.into(),
            fingerprint,
        })
    }

    /// Create a regular lat/lon grid spanning a bounding box.
    ///
    /// Longitudes step evenly from `ll_lon` to `ur_lon` along i, latitudes
    /// from `ll_lat` to `ur_lat` along j. A single-row grid sits at `ll_lat`.
    pub fn plate_carree(
        ni: usize,
        nj: usize,
        ll_lon: f64,
        ll_lat: f64,
        ur_lon: f64,
        ur_lat: f64,
    ) -> FieldResult<Self> {
        check_shape(ni, nj)?;

        let dlon = (ur_lon - ll_lon) / (ni - 1) as f64;
        let dlat = if nj > 1 {
            (ur_lat - ll_lat) / (nj - 1) as f64
        } else {
            0.0
        };

        let mut lats = Vec::with_capacity(ni * nj);
        let mut lons = Vec::with_capacity(ni * nj);
        for j in 0..nj {
            for i in 0..ni {
                lats.push((ll_lat + j as f64 * dlat) as f32);
                lons.push((ll_lon + i as f64 * dlon) as f32);
            }
        }

        Self::with_kind(GridKind::PlateCarree, ni, nj, lats, lons)
    }

    /// Create a grid whose nodes are evenly spaced in a Lambert conformal plane.
    pub fn lambert_conformal(proj: &LambertConformal) -> FieldResult<Self> {
        let (ni, nj) = proj.dimensions();
        check_shape(ni, nj)?;

        let (lats, lons) = proj.node_coordinates();
        Self::with_kind(GridKind::LambertConformal, ni, nj, lats, lons)
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    /// Number of nodes along i.
    pub fn ni(&self) -> usize {
        self.ni
    }

    /// Number of nodes along j.
    pub fn nj(&self) -> usize {
        self.nj
    }

    pub fn lats(&self) -> &[f32] {
        &self.lats
    }

    pub fn lons(&self) -> &[f32] {
        &self.lons
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.ni * self.nj
    }

    /// Always false; construction rejects empty grids.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Degenerate single-row grid used for profiles.
    pub fn is_strip(&self) -> bool {
        self.nj == 1
    }

    /// Node (lon, lat) at grid index (i, j).
    pub fn node(&self, i: usize, j: usize) -> Option<(f32, f32)> {
        if i >= self.ni || j >= self.nj {
            return None;
        }
        let idx = i + j * self.ni;
        Some((self.lons[idx], self.lats[idx]))
    }

    /// Content hash of the dimensions and node coordinates.
    ///
    /// Two grids with identical nodes share a fingerprint and therefore
    /// share tessellated meshes and GPU buffers. The hash is 64-bit and not
    /// collision-free; mesh caches also key on the dimensions.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Texture coordinate margins that keep samples on texel centres.
    pub fn texcoord_margins(&self) -> (f32, f32) {
        (0.5 / self.ni as f32, 0.5 / self.nj as f32)
    }
}

fn check_shape(ni: usize, nj: usize) -> FieldResult<()> {
    if ni < 2 || nj < 1 {
        return Err(FieldError::InvalidGridShape { ni, nj });
    }
    Ok(())
}

fn fingerprint(ni: usize, nj: usize, lats: &[f32], lons: &[f32]) -> u64 {
    let mut hasher = DefaultHasher::new();
    ni.hash(&mut hasher);
    nj.hash(&mut hasher);
    for v in lats.iter().chain(lons.iter()) {
        v.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}
