//! Lambert Conformal Conic grids.
//!
//! Regional models (HRRR, NAM) lay their nodes out evenly in a Lambert
//! conformal plane. The node lat/lon arrays such a grid needs for
//! tessellation come from inverting the projection at every (i, j).
//!
//! The projection parameters include:
//! - Central meridian (LoV in GRIB2)
//! - Standard parallel(s): Latin1 and Latin2 (equal for a tangent cone)
//! - Grid spacing: dx, dy in meters
//! - First grid point: lat1, lon1

use std::f64::consts::PI;

/// Mean earth radius used by NCEP Lambert grids (meters).
const EARTH_RADIUS: f64 = 6_371_229.0;

/// Lambert Conformal Conic grid definition.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian (LoV) in radians
    lon0: f64,
    /// Grid spacing in X direction (meters)
    dx: f64,
    /// Grid spacing in Y direction (meters)
    dy: f64,
    /// Number of grid points in X (i) direction
    nx: usize,
    /// Number of grid points in Y (j) direction
    ny: usize,
    /// Cone constant
    n: f64,
    /// Scaled F constant (earth radius included)
    rf: f64,
    /// Rho at the first grid point
    rho0: f64,
    /// Plane coordinates of the first grid point
    origin: (f64, f64),
}

impl LambertConformal {
    /// Create a grid definition from GRIB2 template 3.30 parameters.
    ///
    /// # Arguments
    /// * `lat1_deg`, `lon1_deg` - First grid point (degrees)
    /// * `lov_deg` - Central meridian (degrees)
    /// * `latin1_deg`, `latin2_deg` - Standard parallels (degrees)
    /// * `dx`, `dy` - Grid spacing (meters)
    /// * `nx`, `ny` - Grid dimensions
    #[allow(clippy::too_many_arguments)]
    pub fn from_grib2(
        lat1_deg: f64,
        lon1_deg: f64,
        lov_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> Self {
        let lat1 = lat1_deg.to_radians();
        let lon1 = lon1_deg.to_radians();
        let lon0 = lov_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();

        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let rf = EARTH_RADIUS * latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n) / n;
        let rho0 = rf / (PI / 4.0 + lat1 / 2.0).tan().powf(n);

        let theta0 = n * wrap_longitude(lon1 - lon0);
        let origin = (rho0 * theta0.sin(), rho0 - rho0 * theta0.cos());

        Self {
            lon0,
            dx,
            dy,
            nx,
            ny,
            n,
            rf,
            rho0,
            origin,
        }
    }

    /// HRRR CONUS grid (3 km, 1799 x 1059).
    pub fn hrrr() -> Self {
        Self::from_grib2(
            21.138123,   // lat1
            -122.719528, // lon1 (237.280472 - 360)
            -97.5,       // LoV (262.5 - 360)
            38.5,        // latin1
            38.5,        // latin2
            3000.0,
            3000.0,
            1799,
            1059,
        )
    }

    /// Same projection with a coarser node spacing.
    ///
    /// Every `stride`-th node is kept, which is how thinned previews of
    /// large regional grids are built.
    pub fn thinned(&self, stride: usize) -> Self {
        let stride = stride.max(1);
        Self {
            dx: self.dx * stride as f64,
            dy: self.dy * stride as f64,
            nx: (self.nx - 1) / stride + 1,
            ny: (self.ny - 1) / stride + 1,
            ..self.clone()
        }
    }

    /// Convert geographic coordinates (degrees) to fractional grid indices.
    pub fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let dlon = wrap_longitude(lon_deg.to_radians() - self.lon0);

        let rho = self.rf / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();

        ((x - self.origin.0) / self.dx, (y - self.origin.1) / self.dy)
    }

    /// Convert grid indices to geographic coordinates.
    ///
    /// Returns (lat, lon) in degrees.
    pub fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let x = self.origin.0 + i * self.dx;
        let y = self.origin.1 + j * self.dy;
        let dy = self.rho0 - y;

        let rho = (x * x + dy * dy).sqrt().copysign(self.n);
        let theta = if self.n < 0.0 {
            (-x).atan2(-dy)
        } else {
            x.atan2(dy)
        };

        let lat = 2.0 * (self.rf / rho).powf(1.0 / self.n).atan() - PI / 2.0;
        let lon = wrap_longitude(self.lon0 + theta / self.n);

        (lat.to_degrees(), lon.to_degrees())
    }

    /// Node latitudes and longitudes, row-major (`i + j * nx`).
    pub fn node_coordinates(&self) -> (Vec<f32>, Vec<f32>) {
        let mut lats = Vec::with_capacity(self.nx * self.ny);
        let mut lons = Vec::with_capacity(self.nx * self.ny);

        for j in 0..self.ny {
            for i in 0..self.nx {
                let (lat, lon) = self.grid_to_geo(i as f64, j as f64);
                lats.push(lat as f32);
                lons.push(lon as f32);
            }
        }

        (lats, lons)
    }

    /// Get grid dimensions.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

/// Normalize a longitude difference to [-π, π]. Non-finite input stays NaN.
fn wrap_longitude(lon: f64) -> f64 {
    if (-PI..=PI).contains(&lon) {
        lon
    } else {
        (lon + PI).rem_euclid(2.0 * PI) - PI
    }
}
