//! Polygon-weighted spatial averaging.
//!
//! Weights are area-overlap ratios between each candidate cell and the query
//! polygon. Polygon areas in raw lon/lat are not metrically meaningful, so
//! both geometries are run through a sinusoidal equal-area projection before
//! the overlap is measured.

use geo::{Area, BooleanOps, Coord, MapCoords, MultiPolygon};
use ndarray::{Array2, ArrayD, ArrayViewD, Axis, IxDyn};
use serde::{Deserialize, Serialize};

use crate::classify::Grid;
use crate::distance::EARTH_RADIUS_M;
use crate::error::{GeogridError, Result};
use crate::mesh::{
    centroids_to_quadrilaterals_mesh, rectilinear_2d_bounds_to_vertices,
    rectilinear_centroids_to_vertices, BoundsPolicy,
};
use crate::subset::SubsetIndices;

/// Per-cell weights over the candidate cells of a subset query.
///
/// `weights` rows follow the latitude (or grid-row) axis and columns the
/// longitude (or grid-column) axis of `indices`; they sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellWeights {
    pub indices: SubsetIndices,
    pub weights: Array2<f64>,
}

/// Sinusoidal equal-area projection of one coordinate.
fn sinusoidal(c: Coord<f64>) -> Coord<f64> {
    let lat_rad = c.y.to_radians();
    Coord {
        x: EARTH_RADIUS_M * c.x.to_radians() * lat_rad.cos(),
        y: EARTH_RADIUS_M * lat_rad,
    }
}

/// Overlap fraction of one cell with the (already projected) region.
///
/// Degenerate intersections (a shared edge or corner) have zero area and
/// contribute nothing.
fn overlap_fraction(cell: geo::Polygon<f64>, region_proj: &MultiPolygon<f64>) -> f64 {
    let cell_proj = MultiPolygon::new(vec![cell.map_coords(sinusoidal)]);
    let cell_area = cell_proj.unsigned_area();
    if cell_area == 0.0 {
        return 0.0;
    }
    cell_proj.intersection(region_proj).unsigned_area() / cell_area
}

fn quad(
    xv: &Array2<f64>,
    yv: &Array2<f64>,
    r: usize,
    c: usize,
) -> geo::Polygon<f64> {
    geo::Polygon::new(
        geo::LineString::from(vec![
            (xv[[r, c]], yv[[r, c]]),
            (xv[[r, c + 1]], yv[[r, c + 1]]),
            (xv[[r + 1, c + 1]], yv[[r + 1, c + 1]]),
            (xv[[r + 1, c]], yv[[r + 1, c]]),
            (xv[[r, c]], yv[[r, c]]),
        ]),
        vec![],
    )
}

fn rect_cell(lonv: &ndarray::Array1<f64>, latv: &ndarray::Array1<f64>, i: usize, j: usize) -> geo::Polygon<f64> {
    let (x0, x1) = (lonv[i], lonv[i + 1]);
    let (y0, y1) = (latv[j], latv[j + 1]);
    geo::Polygon::new(
        geo::LineString::from(vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]),
        vec![],
    )
}

/// Area-overlap weights between `region` and the cells covering it.
///
/// The candidate set comes from [`Grid::subset_indices`]; weights are
/// renormalized to sum to 1 over it. Point-list grids carry no cell
/// geometry and fail.
pub fn cell_weights(grid: &Grid, region: &MultiPolygon<f64>) -> Result<CellWeights> {
    let region_proj = region.map_coords(sinusoidal);
    // A region that is a line or a point overlaps nothing; bail before
    // handing a degenerate geometry to the boolean ops.
    if region_proj.unsigned_area() == 0.0 {
        return Err(GeogridError::NoIntersection);
    }
    let indices = grid.subset_indices(region)?;
    let mut weights = match (grid, &indices) {
        (Grid::ListOfPoints { .. }, _) => {
            return Err(GeogridError::NoCellGeometry(grid.kind().as_cf_tag()))
        }
        (Grid::RectilinearCentroids { lon, lat }, SubsetIndices::Slices { x, y }) => {
            let (lonv, latv) =
                rectilinear_centroids_to_vertices(lon.view(), lat.view(), BoundsPolicy::Free)?;
            rect_weights(&lonv, &latv, x, y, &region_proj)
        }
        (Grid::RectilinearBounds { lon, lat }, SubsetIndices::Slices { x, y }) => {
            let (lonv, latv) = rectilinear_2d_bounds_to_vertices(lon.view(), lat.view());
            rect_weights(&lonv, &latv, x, y, &region_proj)
        }
        (Grid::RectilinearVertices { lon, lat }, SubsetIndices::Slices { x, y }) => {
            rect_weights(lon, lat, x, y, &region_proj)
        }
        (Grid::IrregularCentroids { lon, lat }, SubsetIndices::IndexBox { rows, cols }) => {
            let (lonv, latv) =
                centroids_to_quadrilaterals_mesh(lon.view(), lat.view(), BoundsPolicy::Free)?;
            irregular_weights(&lonv, &latv, rows, cols, &region_proj)
        }
        (Grid::IrregularVertices { lon, lat }, SubsetIndices::IndexBox { rows, cols }) => {
            irregular_weights(lon, lat, rows, cols, &region_proj)
        }
        (_, _) => return Err(GeogridError::UnknownGrid),
    };
    let total: f64 = weights.sum();
    if total == 0.0 {
        return Err(GeogridError::NoIntersection);
    }
    weights.mapv_inplace(|w| w / total);
    Ok(CellWeights { indices, weights })
}

fn rect_weights(
    lonv: &ndarray::Array1<f64>,
    latv: &ndarray::Array1<f64>,
    x: &std::ops::Range<usize>,
    y: &std::ops::Range<usize>,
    region_proj: &MultiPolygon<f64>,
) -> Array2<f64> {
    Array2::from_shape_fn((y.len(), x.len()), |(jj, ii)| {
        overlap_fraction(rect_cell(lonv, latv, x.start + ii, y.start + jj), region_proj)
    })
}

fn irregular_weights(
    xv: &Array2<f64>,
    yv: &Array2<f64>,
    rows: &std::ops::Range<usize>,
    cols: &std::ops::Range<usize>,
    region_proj: &MultiPolygon<f64>,
) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), cols.len()), |(rr, cc)| {
        overlap_fraction(quad(xv, yv, rows.start + rr, cols.start + cc), region_proj)
    })
}

/// Reduce a field to its polygon-weighted average.
///
/// With `spatial_axes` unset, `field` and `weights` must have the same shape
/// and the result is a 0-dim array. Otherwise `spatial_axes[k]` names the
/// field axis matching weights axis `k`; weights are tiled across the
/// remaining axes and the spatial axes are summed out in descending order,
/// leaving one value per non-spatial coordinate.
pub fn weighted_average(
    field: ArrayViewD<'_, f64>,
    weights: ArrayViewD<'_, f64>,
    spatial_axes: Option<&[usize]>,
) -> Result<ArrayD<f64>> {
    match spatial_axes {
        None => {
            if field.shape() != weights.shape() {
                return Err(GeogridError::ShapeMismatch(format!(
                    "field {:?} vs weights {:?}",
                    field.shape(),
                    weights.shape()
                )));
            }
            let total = (&field * &weights).sum();
            Ok(ndarray::arr0(total).into_dyn())
        }
        Some(axes) => {
            if axes.len() != weights.ndim() {
                return Err(GeogridError::ShapeMismatch(format!(
                    "{} spatial axes for weights of rank {}",
                    axes.len(),
                    weights.ndim()
                )));
            }
            let mut broadcast_shape = vec![1usize; field.ndim()];
            for (k, &axis) in axes.iter().enumerate() {
                if axis >= field.ndim() {
                    return Err(GeogridError::ShapeMismatch(format!(
                        "axis {} out of range for field of rank {}",
                        axis,
                        field.ndim()
                    )));
                }
                if field.shape()[axis] != weights.shape()[k] {
                    return Err(GeogridError::ShapeMismatch(format!(
                        "field axis {} has length {}, weights axis {} has length {}",
                        axis,
                        field.shape()[axis],
                        k,
                        weights.shape()[k]
                    )));
                }
                broadcast_shape[axis] = weights.shape()[k];
            }
            let tiled = weights
                .to_owned()
                .into_shape(IxDyn(&broadcast_shape))
                .map_err(|e| GeogridError::ShapeMismatch(e.to_string()))?;
            let product = &field * &tiled;
            let mut sorted_axes: Vec<usize> = axes.to_vec();
            sorted_axes.sort_unstable();
            sorted_axes.dedup();
            if sorted_axes.len() != axes.len() {
                return Err(GeogridError::ShapeMismatch(
                    "duplicate spatial axis".to_string(),
                ));
            }
            let mut reduced = product;
            for &axis in sorted_axes.iter().rev() {
                reduced = reduced.sum_axis(Axis(axis));
            }
            Ok(reduced)
        }
    }
}

impl CellWeights {
    /// Apply these weights to a field slice matching the candidate box.
    pub fn apply(
        &self,
        field: ArrayViewD<'_, f64>,
        spatial_axes: Option<&[usize]>,
    ) -> Result<ArrayD<f64>> {
        weighted_average(field, self.weights.view().into_dyn(), spatial_axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subset::bbox_polygon;
    use float_cmp::assert_approx_eq;
    use ndarray::{array, Array3};

    fn region_from(poly: geo::Polygon<f64>) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![poly])
    }

    #[test]
    fn single_cell_polygon_gets_full_weight() {
        let grid = Grid::RectilinearVertices {
            lon: array![0.0, 1.0, 2.0, 3.0],
            lat: array![0.0, 1.0, 2.0],
        };
        // Exactly cell (1, 0).
        let region = region_from(bbox_polygon(1.0, 0.0, 2.0, 1.0));
        let cw = cell_weights(&grid, &region).unwrap();
        let total: f64 = cw.weights.sum();
        assert_approx_eq!(f64, total, 1.0, epsilon = 1e-12);
        // The covering cell carries all of it.
        let max = cw.weights.iter().cloned().fold(f64::MIN, f64::max);
        assert_approx_eq!(f64, max, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn single_cell_average_equals_cell_value() {
        let grid = Grid::RectilinearVertices {
            lon: array![0.0, 1.0, 2.0, 3.0],
            lat: array![0.0, 1.0, 2.0],
        };
        let region = region_from(bbox_polygon(1.2, 0.2, 1.8, 0.8));
        let cw = cell_weights(&grid, &region).unwrap();
        assert_eq!(cw.indices, SubsetIndices::Slices { x: 1..2, y: 0..1 });
        let field = array![[42.5]];
        let out = cw.apply(field.view().into_dyn(), None).unwrap();
        assert_approx_eq!(f64, out.sum(), 42.5, epsilon = 1e-12);
    }

    #[test]
    fn half_covered_cells_split_weight() {
        let grid = Grid::RectilinearVertices {
            lon: array![0.0, 1.0, 2.0],
            lat: array![0.0, 1.0],
        };
        // Covers the right half of cell 0 and left half of cell 1 at equal
        // latitudes: equal areas, equal weights.
        let region = region_from(bbox_polygon(0.5, 0.0, 1.5, 1.0));
        let cw = cell_weights(&grid, &region).unwrap();
        assert_eq!(cw.weights.dim(), (1, 2));
        assert_approx_eq!(f64, cw.weights[[0, 0]], 0.5, epsilon = 1e-9);
        assert_approx_eq!(f64, cw.weights[[0, 1]], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn weights_reduce_time_series() {
        // Field (time, lat, lon) = (2, 1, 2); spatial axes 1 and 2.
        let grid = Grid::RectilinearVertices {
            lon: array![0.0, 1.0, 2.0],
            lat: array![0.0, 1.0],
        };
        let region = region_from(bbox_polygon(0.5, 0.0, 1.5, 1.0));
        let cw = cell_weights(&grid, &region).unwrap();

        let mut field = Array3::<f64>::zeros((2, 1, 2));
        field[[0, 0, 0]] = 10.0;
        field[[0, 0, 1]] = 20.0;
        field[[1, 0, 0]] = 30.0;
        field[[1, 0, 1]] = 50.0;
        let out = cw
            .apply(field.view().into_dyn(), Some(&[1, 2]))
            .unwrap();
        assert_eq!(out.shape(), &[2]);
        assert_approx_eq!(f64, out[[0]], 15.0, epsilon = 1e-9);
        assert_approx_eq!(f64, out[[1]], 40.0, epsilon = 1e-9);
    }

    #[test]
    fn point_list_has_no_cell_geometry() {
        let grid = Grid::ListOfPoints {
            lon: array![0.0, 1.0],
            lat: array![0.0, 1.0],
        };
        let region = region_from(bbox_polygon(0.0, 0.0, 1.0, 1.0));
        assert!(matches!(
            cell_weights(&grid, &region),
            Err(GeogridError::NoCellGeometry(_))
        ));
    }

    #[test]
    fn degenerate_touch_only_region_fails() {
        let grid = Grid::RectilinearVertices {
            lon: array![0.0, 1.0, 2.0],
            lat: array![0.0, 1.0],
        };
        // Shares only the edge x = 2 with the grid: zero overlap area
        // everywhere, so there is nothing to normalize.
        let region = region_from(bbox_polygon(2.0, 0.0, 2.0, 1.0));
        match cell_weights(&grid, &region) {
            Err(GeogridError::NoIntersection) | Err(GeogridError::EmptyRegion) => {}
            other => panic!("expected failure on degenerate region, got {other:?}"),
        }
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let field = array![[1.0, 2.0], [3.0, 4.0]];
        let weights = array![[1.0]];
        assert!(matches!(
            weighted_average(field.view().into_dyn(), weights.view().into_dyn(), None),
            Err(GeogridError::ShapeMismatch(_))
        ));
    }
}
