//! Triangle-strip meshes built from geographic grids.

use field_common::{FieldError, FieldResult};
use projection::{LngLat, MercatorCoord};
use rayon::prelude::*;

/// Node counts above which node projection is spread across the rayon pool.
const PARALLEL_PROJECTION_THRESHOLD: usize = 1 << 16;

/// GPU-ready buffers for one grid.
///
/// The mesh is a single triangle strip. Each grid column `i` contributes
/// `2 * (nj + 1)` vertices: a duplicated first vertex, a zig-zag pair
/// `(P(i, j), P(i + 1, j))` per row, and a duplicated last vertex. The
/// duplicates form degenerate triangles so neighbouring columns never
/// bleed into each other.
#[derive(Debug, Clone, PartialEq)]
pub struct TessellatedMesh {
    ni: usize,
    nj: usize,
    vertices: Vec<f32>,
    texcoords: Vec<f32>,
    cell_areas: Vec<f32>,
}

impl TessellatedMesh {
    /// Interleaved `(x, y)` Mercator positions.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Interleaved `(r, s)` texture coordinates.
    pub fn texcoords(&self) -> &[f32] {
        &self.texcoords
    }

    /// One area per vertex, aligned with the strip.
    pub fn cell_areas(&self) -> &[f32] {
        &self.cell_areas
    }

    /// Number of strip vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }

    /// Grid dimensions the mesh was built from.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.ni, self.nj)
    }

    /// Projected area of cell `(i, j)`, or `None` outside the cell range.
    pub fn cell_area(&self, i: usize, j: usize) -> Option<f32> {
        if i + 1 >= self.ni || j + 1 >= self.nj {
            return None;
        }
        let column_start = i * 2 * (self.nj + 1);
        self.cell_areas.get(column_start + 1 + 2 * j).copied()
    }

    /// Rough size of the buffers in bytes.
    pub fn byte_size(&self) -> usize {
        (self.vertices.len() + self.texcoords.len() + self.cell_areas.len())
            * std::mem::size_of::<f32>()
    }
}

/// Build the strip mesh for a grid of `ni x nj` nodes.
///
/// `lats` and `lons` are row-major (`i + j * ni`). Texture coordinates are
/// compressed into `[margin, 1 - margin]` on both axes so linear sampling
/// stays on texel centres; `0.5 / dimension` is the usual margin.
///
/// For single-row grids (`nj == 1`) the strip has no cells: `s` sits at
/// 0.5 and every cell area is 0.
pub fn tessellate(
    lats: &[f32],
    lons: &[f32],
    ni: usize,
    nj: usize,
    margin_r: f32,
    margin_s: f32,
) -> FieldResult<TessellatedMesh> {
    if ni < 2 || nj < 1 {
        return Err(FieldError::InvalidGridShape { ni, nj });
    }
    let n_nodes = ni * nj;
    if lats.len() != n_nodes {
        return Err(FieldError::shape_mismatch("lats", n_nodes, lats.len()));
    }
    if lons.len() != n_nodes {
        return Err(FieldError::shape_mismatch("lons", n_nodes, lons.len()));
    }
    check_margin('r', margin_r)?;
    check_margin('s', margin_s)?;

    let points = project_nodes(lats, lons);
    let point = |i: usize, j: usize| points[i + j * ni];

    let n_verts = 2 * (ni - 1) * (nj + 1);
    let mut vertices = Vec::with_capacity(2 * n_verts);
    let mut texcoords = Vec::with_capacity(2 * n_verts);

    let (mr, ms) = (margin_r as f64, margin_s as f64);
    let r_at = |i: usize| (i as f64 / (ni - 1) as f64 * (1.0 - 2.0 * mr) + mr) as f32;
    let s_at = |j: usize| {
        if nj > 1 {
            (j as f64 / (nj - 1) as f64 * (1.0 - 2.0 * ms) + ms) as f32
        } else {
            0.5
        }
    };

    for i in 0..ni - 1 {
        let r = r_at(i);
        let rp1 = r_at(i + 1);

        for j in 0..nj {
            let pt = point(i, j);
            let pt_ip1 = point(i + 1, j);
            let s = s_at(j);

            if j == 0 {
                push_pair(&mut vertices, pt.x as f32, pt.y as f32);
                push_pair(&mut texcoords, r, s);
            }

            push_pair(&mut vertices, pt.x as f32, pt.y as f32);
            push_pair(&mut vertices, pt_ip1.x as f32, pt_ip1.y as f32);
            push_pair(&mut texcoords, r, s);
            push_pair(&mut texcoords, rp1, s);

            if j == nj - 1 {
                push_pair(&mut vertices, pt_ip1.x as f32, pt_ip1.y as f32);
                push_pair(&mut texcoords, rp1, s);
            }
        }
    }

    let mut cell_areas = Vec::with_capacity(n_verts);
    for i in 0..ni - 1 {
        if nj == 1 {
            cell_areas.extend_from_slice(&[0.0; 4]);
            continue;
        }

        for j in 0..nj - 1 {
            let area = quad_area(
                point(i, j),
                point(i + 1, j),
                point(i + 1, j + 1),
                point(i, j + 1),
            ) as f32;

            // Leading and trailing duplicates line up with the degenerate
            // strip vertices of the column
            if j == 0 {
                cell_areas.push(area);
            }
            cell_areas.push(area);
            cell_areas.push(area);
            if j == nj - 2 {
                cell_areas.extend_from_slice(&[area; 3]);
            }
        }
    }

    debug_assert_eq!(vertices.len(), 2 * n_verts);
    debug_assert_eq!(texcoords.len(), 2 * n_verts);
    debug_assert_eq!(cell_areas.len(), n_verts);

    Ok(TessellatedMesh {
        ni,
        nj,
        vertices,
        texcoords,
        cell_areas,
    })
}

fn check_margin(axis: char, value: f32) -> FieldResult<()> {
    if !(0.0..=0.5).contains(&value) {
        return Err(FieldError::InvalidTexcoordMargin { axis, value });
    }
    Ok(())
}

fn project_nodes(lats: &[f32], lons: &[f32]) -> Vec<MercatorCoord> {
    let project = |(&lat, &lon): (&f32, &f32)| LngLat::new(lon as f64, lat as f64).to_mercator();

    if lats.len() >= PARALLEL_PROJECTION_THRESHOLD {
        lats.par_iter().zip(lons.par_iter()).map(project).collect()
    } else {
        lats.iter().zip(lons.iter()).map(project).collect()
    }
}

#[inline]
fn push_pair(buf: &mut Vec<f32>, a: f32, b: f32) {
    buf.push(a);
    buf.push(b);
}

/// Shoelace area of the quadrilateral ll → lr → ur → ul.
fn quad_area(ll: MercatorCoord, lr: MercatorCoord, ur: MercatorCoord, ul: MercatorCoord) -> f64 {
    let corners = [ll, lr, ur, ul];
    let twice_area: f64 = (0..4)
        .map(|k| {
            let a = corners[k];
            let b = corners[(k + 1) % 4];
            a.x * b.y - b.x * a.y
        })
        .sum();
    0.5 * twice_area.abs()
}
