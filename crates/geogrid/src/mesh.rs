//! Conversion between centroid and vertex representations of a grid.
//!
//! Interior vertices are the midpoint (rectilinear) or 4-point average
//! (irregular) of adjacent centroids; border vertices come from linear
//! extrapolation of the two nearest centroids, which may return garbage if
//! the mesh is far from regular. The inverse conversions are plain averages,
//! so round trips reproduce interior centroids exactly but not the
//! extrapolated borders.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{GeogridError, Result};

/// Caller-supplied lower/upper limits for the outermost vertices, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBounds {
    pub lower_x: f64,
    pub upper_x: f64,
    pub lower_y: f64,
    pub upper_y: f64,
}

/// What to do with the extrapolated boundary vertices.
///
/// Forcing and limiting are mutually exclusive, so they are variants rather
/// than two flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsPolicy {
    /// Keep the extrapolated values.
    Free,
    /// Hard-set the two outermost vertices per axis to the given bounds.
    Forced(MeshBounds),
    /// Clamp the outermost vertices into the given bounds.
    Limit(MeshBounds),
}

fn check_axis(len: usize) -> Result<()> {
    if len < 2 {
        return Err(GeogridError::AxisTooShort { needed: 2, got: len });
    }
    Ok(())
}

/// Midpoints of one padded axis: output length is `axis.len() + 1`.
fn axis_centroids_to_vertices(axis: ArrayView1<'_, f64>) -> Array1<f64> {
    let n = axis.len();
    let mut extended = Array1::zeros(n + 2);
    extended.slice_mut(ndarray::s![1..n + 1]).assign(&axis);
    extended[0] = 2.0 * extended[1] - extended[2];
    extended[n + 1] = 2.0 * extended[n] - extended[n - 1];
    Array1::from_iter((0..n + 1).map(|i| (extended[i] + extended[i + 1]) / 2.0))
}

/// Position of the minimum tells the axis orientation: index 0 means the
/// axis ascends, so the lower bound belongs at the start.
fn apply_axis_bounds(vertices: &mut Array1<f64>, lower: f64, upper: f64, force: bool) {
    let n = vertices.len();
    let mut min_index = 0;
    for (i, &v) in vertices.iter().enumerate() {
        if v < vertices[min_index] {
            min_index = i;
        }
    }
    let min_at_start = min_index == 0;
    if force {
        if min_at_start {
            vertices[0] = lower;
            vertices[n - 1] = upper;
        } else {
            vertices[0] = upper;
            vertices[n - 1] = lower;
        }
    } else if min_at_start {
        if vertices[0] < lower {
            vertices[0] = lower;
        }
        if vertices[n - 1] > upper {
            vertices[n - 1] = upper;
        }
    } else {
        if vertices[n - 1] < lower {
            vertices[n - 1] = lower;
        }
        if vertices[0] > upper {
            vertices[0] = upper;
        }
    }
}

/// Estimate rectilinear vertices from centroids.
///
/// Output lengths are N+1 and M+1. Interior vertices are midpoints of
/// neighbor centroids; the two border vertices per axis are linearly
/// extrapolated and then adjusted per `bounds`.
pub fn rectilinear_centroids_to_vertices(
    x: ArrayView1<'_, f64>,
    y: ArrayView1<'_, f64>,
    bounds: BoundsPolicy,
) -> Result<(Array1<f64>, Array1<f64>)> {
    check_axis(x.len())?;
    check_axis(y.len())?;
    let mut xv = axis_centroids_to_vertices(x);
    let mut yv = axis_centroids_to_vertices(y);
    match bounds {
        BoundsPolicy::Free => {}
        BoundsPolicy::Forced(b) => {
            apply_axis_bounds(&mut xv, b.lower_x, b.upper_x, true);
            apply_axis_bounds(&mut yv, b.lower_y, b.upper_y, true);
        }
        BoundsPolicy::Limit(b) => {
            apply_axis_bounds(&mut xv, b.lower_x, b.upper_x, false);
            apply_axis_bounds(&mut yv, b.lower_y, b.upper_y, false);
        }
    }
    Ok((xv, yv))
}

/// Pad a 2D centroid field by one ring: edge-wise linear extrapolation on the
/// four borders, corner-wise extrapolation from adjacent border values.
fn extend_centroid_field(c: ArrayView2<'_, f64>) -> Array2<f64> {
    let (rows, cols) = c.dim();
    let mut e = Array2::zeros((rows + 2, cols + 2));
    e.slice_mut(ndarray::s![1..rows + 1, 1..cols + 1]).assign(&c);
    for i in 1..cols + 1 {
        e[[0, i]] = 2.0 * e[[1, i]] - e[[2, i]];
        e[[rows + 1, i]] = 2.0 * e[[rows, i]] - e[[rows - 1, i]];
    }
    for j in 1..rows + 1 {
        e[[j, 0]] = 2.0 * e[[j, 1]] - e[[j, 2]];
        e[[j, cols + 1]] = 2.0 * e[[j, cols]] - e[[j, cols - 1]];
    }
    e[[0, 0]] = e[[0, 1]] - e[[1, 1]] + e[[1, 0]];
    e[[0, cols + 1]] = e[[0, cols]] - e[[1, cols]] + e[[1, cols + 1]];
    e[[rows + 1, cols + 1]] = e[[rows + 1, cols]] - e[[rows, cols]] + e[[rows, cols + 1]];
    e[[rows + 1, 0]] = e[[rows + 1, 1]] - e[[rows, 1]] + e[[rows, 0]];
    e
}

/// Every vertex of the output mesh is the 4-neighbor average of the padded
/// centroid field.
fn field_vertices(e: &Array2<f64>) -> Array2<f64> {
    let (er, ec) = e.dim();
    Array2::from_shape_fn((er - 1, ec - 1), |(i, j)| {
        (e[[i, j]] + e[[i + 1, j]] + e[[i, j + 1]] + e[[i + 1, j + 1]]) / 4.0
    })
}

/// Estimate a quadrilaterals mesh from 2D centroids.
///
/// Input shapes (N, M), output shapes (N+1, M+1).
///
/// TODO: the bound assignment below indexes border rows/columns by position
/// without checking axis orientation, so a grid stored north-to-south gets
/// lower/upper swapped; behavior is pinned by
/// `quadrilaterals_forced_bounds_descending_rows_pinned` until resolved.
pub fn centroids_to_quadrilaterals_mesh(
    x: ArrayView2<'_, f64>,
    y: ArrayView2<'_, f64>,
    bounds: BoundsPolicy,
) -> Result<(Array2<f64>, Array2<f64>)> {
    let (rows, cols) = x.dim();
    if y.dim() != (rows, cols) {
        return Err(GeogridError::ShapeMismatch(format!(
            "lon {:?} vs lat {:?}",
            x.dim(),
            y.dim()
        )));
    }
    check_axis(rows)?;
    check_axis(cols)?;
    let mut xv = field_vertices(&extend_centroid_field(x));
    let mut yv = field_vertices(&extend_centroid_field(y));
    let (vr, vc) = xv.dim();
    match bounds {
        BoundsPolicy::Free => {}
        BoundsPolicy::Forced(b) => {
            for i in 0..vr {
                xv[[i, 0]] = b.lower_x;
                xv[[i, vc - 1]] = b.upper_x;
            }
            for j in 0..vc {
                yv[[0, j]] = b.lower_y;
                yv[[vr - 1, j]] = b.upper_y;
            }
        }
        BoundsPolicy::Limit(b) => {
            for i in 0..vr {
                if xv[[i, 0]] < b.lower_x {
                    xv[[i, 0]] = b.lower_x;
                }
                if xv[[i, vc - 1]] > b.upper_x {
                    xv[[i, vc - 1]] = b.upper_x;
                }
            }
            for j in 0..vc {
                if yv[[0, j]] < b.lower_y {
                    yv[[0, j]] = b.lower_y;
                }
                if yv[[vr - 1, j]] > b.upper_y {
                    yv[[vr - 1, j]] = b.upper_y;
                }
            }
        }
    }
    Ok((xv, yv))
}

/// Centroids of a quadrilaterals mesh: 4-corner averages, shapes (N-1, M-1).
pub fn quadrilaterals_mesh_to_centroids(
    x_vertices: ArrayView2<'_, f64>,
    y_vertices: ArrayView2<'_, f64>,
) -> (Array2<f64>, Array2<f64>) {
    let (vr, vc) = x_vertices.dim();
    let x = Array2::from_shape_fn((vr - 1, vc - 1), |(i, j)| {
        (x_vertices[[i, j]]
            + x_vertices[[i + 1, j]]
            + x_vertices[[i + 1, j + 1]]
            + x_vertices[[i, j + 1]])
            / 4.0
    });
    let y = Array2::from_shape_fn((vr - 1, vc - 1), |(i, j)| {
        (y_vertices[[i, j]]
            + y_vertices[[i + 1, j]]
            + y_vertices[[i + 1, j + 1]]
            + y_vertices[[i, j + 1]])
            / 4.0
    });
    (x, y)
}

/// Centroids of a rectilinear grid from its vertices: midpoints, lengths N-1.
pub fn rectilinear_vertices_to_centroids(
    lon_vertices: ArrayView1<'_, f64>,
    lat_vertices: ArrayView1<'_, f64>,
) -> (Array1<f64>, Array1<f64>) {
    let lon = Array1::from_iter(
        (0..lon_vertices.len() - 1).map(|i| (lon_vertices[i] + lon_vertices[i + 1]) / 2.0),
    );
    let lat = Array1::from_iter(
        (0..lat_vertices.len() - 1).map(|i| (lat_vertices[i] + lat_vertices[i + 1]) / 2.0),
    );
    (lon, lat)
}

/// Vertices of a rectilinear grid from CF `bounds` pairs, shapes (N, 2).
///
/// Contiguity (`bound[i].upper == bound[i+1].lower`) is assumed, not
/// verified.
pub fn rectilinear_2d_bounds_to_vertices(
    lon_bnds: ArrayView2<'_, f64>,
    lat_bnds: ArrayView2<'_, f64>,
) -> (Array1<f64>, Array1<f64>) {
    let n = lon_bnds.nrows();
    let m = lat_bnds.nrows();
    let lon = Array1::from_iter(
        (0..n)
            .map(|i| lon_bnds[[i, 0]])
            .chain(std::iter::once(lon_bnds[[n - 1, 1]])),
    );
    let lat = Array1::from_iter(
        (0..m)
            .map(|i| lat_bnds[[i, 0]])
            .chain(std::iter::once(lat_bnds[[m - 1, 1]])),
    );
    (lon, lat)
}
