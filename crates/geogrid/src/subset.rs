//! Polygon-driven subsetting: the minimal index cover of a query geometry.

use std::ops::Range;

use geo::{BoundingRect, Centroid, Intersects, LineString, MultiPolygon, Point, Polygon};
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::classify::Grid;
use crate::error::{GeogridError, Result};
use crate::mesh::{
    centroids_to_quadrilaterals_mesh, quadrilaterals_mesh_to_centroids,
    rectilinear_2d_bounds_to_vertices, rectilinear_centroids_to_vertices, BoundsPolicy,
};
use crate::nearest::GridIndex;

/// The index cover of a query geometry, shaped by the grid topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubsetIndices {
    /// Per-axis cell ranges for rectilinear grids (longitude, latitude axes).
    Slices { x: Range<usize>, y: Range<usize> },
    /// Row/column cell ranges for irregular grids.
    IndexBox {
        rows: Range<usize>,
        cols: Range<usize>,
    },
    /// Indices of the covered points in a point list.
    Points(Vec<usize>),
}

/// Closed rectangle polygon from `(min_x, min_y, max_x, max_y)`.
pub fn bbox_polygon(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (min_x, min_y),
            (min_x, max_y),
            (max_x, max_y),
            (max_x, min_y),
            (min_x, min_y),
        ]),
        vec![],
    )
}

/// Quadrilateral of one cell of a vertex mesh.
fn cell_polygon(xv: ArrayView2<'_, f64>, yv: ArrayView2<'_, f64>, r: usize, c: usize) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (xv[[r, c]], yv[[r, c]]),
            (xv[[r, c + 1]], yv[[r, c + 1]]),
            (xv[[r + 1, c + 1]], yv[[r + 1, c + 1]]),
            (xv[[r + 1, c]], yv[[r + 1, c]]),
            (xv[[r, c]], yv[[r, c]]),
        ]),
        vec![],
    )
}

/// Minimal cell range on one vertex axis covering [qmin, qmax].
///
/// When the query span is narrower than one cell this degenerates to the
/// single cell whose two vertices straddle it.
fn axis_cell_range(
    vertices: ArrayView1<'_, f64>,
    qmin: f64,
    qmax: f64,
    axis: &'static str,
) -> Result<Range<usize>> {
    let n_cells = vertices.len() - 1;
    let ascending = vertices[0] < vertices[n_cells];
    if ascending {
        if qmax < vertices[0] || qmin > vertices[n_cells] {
            return Err(GeogridError::OutsideGrid { axis });
        }
        let below_min = vertices.iter().filter(|&&v| v <= qmin).count();
        let below_max = vertices.iter().filter(|&&v| v < qmax).count();
        let start = below_min.saturating_sub(1).min(n_cells - 1);
        let end = below_max.saturating_sub(1).min(n_cells - 1);
        Ok(start..end.max(start) + 1)
    } else {
        let reversed: Vec<f64> = vertices.iter().rev().copied().collect();
        let range = axis_cell_range(ArrayView1::from(&reversed[..]), qmin, qmax, axis)?;
        Ok(n_cells - range.end..n_cells - range.start)
    }
}

fn rectilinear_slices(
    lon_vertices: ArrayView1<'_, f64>,
    lat_vertices: ArrayView1<'_, f64>,
    region: &MultiPolygon<f64>,
) -> Result<SubsetIndices> {
    let rect = region.bounding_rect().ok_or(GeogridError::EmptyRegion)?;
    let x = axis_cell_range(lon_vertices, rect.min().x, rect.max().x, "longitude")?;
    let y = axis_cell_range(lat_vertices, rect.min().y, rect.max().y, "latitude")?;
    Ok(SubsetIndices::Slices { x, y })
}

/// Any cell of a one-cell-wide ring geometrically intersects the region.
fn ring_intersects(
    xv: ArrayView2<'_, f64>,
    yv: ArrayView2<'_, f64>,
    rows: Range<usize>,
    cols: Range<usize>,
    region: &MultiPolygon<f64>,
) -> bool {
    rows.flat_map(|r| cols.clone().map(move |c| (r, c)))
        .any(|(r, c)| cell_polygon(xv, yv, r, c).intersects(region))
}

fn irregular_index_box(
    xv: ArrayView2<'_, f64>,
    yv: ArrayView2<'_, f64>,
    region: &MultiPolygon<f64>,
) -> Result<SubsetIndices> {
    let rect = region.bounding_rect().ok_or(GeogridError::EmptyRegion)?;
    let (vrows, vcols) = xv.dim();
    let (cell_rows, cell_cols) = (vrows - 1, vcols - 1);

    let mut vertex_rows: Option<(usize, usize)> = None;
    let mut vertex_cols: Option<(usize, usize)> = None;
    for r in 0..vrows {
        for c in 0..vcols {
            let (x, y) = (xv[[r, c]], yv[[r, c]]);
            if x >= rect.min().x && x <= rect.max().x && y >= rect.min().y && y <= rect.max().y {
                vertex_rows = Some(match vertex_rows {
                    None => (r, r),
                    Some((lo, hi)) => (lo.min(r), hi.max(r)),
                });
                vertex_cols = Some(match vertex_cols {
                    None => (c, c),
                    Some((lo, hi)) => (lo.min(c), hi.max(c)),
                });
            }
        }
    }

    let (mut rows, mut cols) = match (vertex_rows, vertex_cols) {
        (Some((r0, r1)), Some((c0, c1))) => {
            let rows = if r1 > r0 {
                r0..r1
            } else {
                let r = r0.min(cell_rows - 1);
                r..r + 1
            };
            let cols = if c1 > c0 {
                c0..c1
            } else {
                let c = c0.min(cell_cols - 1);
                c..c + 1
            };
            (rows, cols)
        }
        _ => {
            // Polygon smaller than a cell or between vertices: locate the
            // nearest cell and verify it truly intersects the geometry.
            let centroid = region.centroid().ok_or(GeogridError::EmptyRegion)?;
            let (lonc, latc) = quadrilaterals_mesh_to_centroids(xv, yv);
            let (i, j) = nearest_cell(&lonc, &latc, centroid);
            if !cell_polygon(xv, yv, i, j).intersects(region) {
                return Err(GeogridError::NoIntersection);
            }
            (i..i + 1, j..j + 1)
        }
    };

    // Grow each side outward one ring at a time while the adjacent ring of
    // cells still intersects the polygon; recovers partially-covered border
    // cells a pure bbox test misses.
    loop {
        let mut grew = false;
        while rows.start > 0
            && ring_intersects(xv, yv, rows.start - 1..rows.start, cols.clone(), region)
        {
            rows.start -= 1;
            grew = true;
        }
        while rows.end < cell_rows
            && ring_intersects(xv, yv, rows.end..rows.end + 1, cols.clone(), region)
        {
            rows.end += 1;
            grew = true;
        }
        while cols.start > 0
            && ring_intersects(xv, yv, rows.clone(), cols.start - 1..cols.start, region)
        {
            cols.start -= 1;
            grew = true;
        }
        while cols.end < cell_cols
            && ring_intersects(xv, yv, rows.clone(), cols.end..cols.end + 1, region)
        {
            cols.end += 1;
            grew = true;
        }
        if !grew {
            break;
        }
    }

    Ok(SubsetIndices::IndexBox { rows, cols })
}

fn nearest_cell(lonc: &Array2<f64>, latc: &Array2<f64>, point: Point<f64>) -> (usize, usize) {
    let cols = lonc.ncols();
    let mut best = (0usize, f64::INFINITY);
    for (k, (&x, &y)) in lonc.iter().zip(latc.iter()).enumerate() {
        let d = crate::distance::distance_lon_lat(x, y, point.x(), point.y());
        if d < best.1 {
            best = (k, d);
        }
    }
    (best.0 / cols, best.0 % cols)
}

impl Grid {
    /// Smallest contiguous index range (or index set) of grid cells that
    /// cover or intersect `region`.
    pub fn subset_indices(&self, region: &MultiPolygon<f64>) -> Result<SubsetIndices> {
        match self {
            Grid::ListOfPoints { lon, lat } => {
                let indices: Vec<usize> = lon
                    .iter()
                    .zip(lat.iter())
                    .enumerate()
                    .filter(|(_, (&x, &y))| region.intersects(&Point::new(x, y)))
                    .map(|(k, _)| k)
                    .collect();
                if indices.is_empty() {
                    return Err(GeogridError::NoIntersection);
                }
                Ok(SubsetIndices::Points(indices))
            }
            Grid::RectilinearCentroids { lon, lat } => {
                let (lonv, latv) =
                    rectilinear_centroids_to_vertices(lon.view(), lat.view(), BoundsPolicy::Free)?;
                rectilinear_slices(lonv.view(), latv.view(), region)
            }
            Grid::RectilinearBounds { lon, lat } => {
                let (lonv, latv) = rectilinear_2d_bounds_to_vertices(lon.view(), lat.view());
                rectilinear_slices(lonv.view(), latv.view(), region)
            }
            Grid::RectilinearVertices { lon, lat } => {
                rectilinear_slices(lon.view(), lat.view(), region)
            }
            Grid::IrregularCentroids { lon, lat } => {
                let (lonv, latv) =
                    centroids_to_quadrilaterals_mesh(lon.view(), lat.view(), BoundsPolicy::Free)?;
                irregular_index_box(lonv.view(), latv.view(), region)
            }
            Grid::IrregularVertices { lon, lat } => {
                irregular_index_box(lon.view(), lat.view(), region)
            }
        }
    }

    /// Convenience wrapper: subset by a plain bounding box.
    pub fn subset_bbox_indices(
        &self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<SubsetIndices> {
        let region = MultiPolygon::new(vec![bbox_polygon(min_x, min_y, max_x, max_y)]);
        self.subset_indices(&region)
    }

    /// Nearest cell to a point, reported with the same index shape the
    /// subsetter uses.
    pub fn nearest_index(&self, lon: f64, lat: f64) -> Result<GridIndex> {
        Ok(self.find_nearest(lon, lat, None)?.index)
    }
}
