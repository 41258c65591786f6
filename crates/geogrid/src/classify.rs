//! Grid topology detection.
//!
//! Determines the layout of a (longitude, latitude) coordinate pair from the
//! array shapes, optional dimension-name hints, and monotonicity. The result
//! is a closed [`Grid`] sum type; anything unrecognizable fails with
//! [`GeogridError::UnknownGrid`] instead of guessing silently.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GeogridError, Result};

/// The topology tag of a classified grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridKind {
    /// A flat list of (lon, lat) points sharing one dimension.
    ListOfPoints,
    /// Independent 1D longitude and latitude centroid axes.
    RectilinearCentroids,
    /// CF-style per-cell bound pairs on each 1D axis.
    RectilinearBounds,
    /// 1D cell-corner arrays (N+1 per axis).
    RectilinearVertices,
    /// 2D longitude/latitude centroid arrays (curvilinear grid).
    IrregularCentroids,
    /// 2D cell-corner arrays, (N+1)×(M+1).
    IrregularVertices,
}

impl GridKind {
    /// The tag string used across the external API (CF-flavored vocabulary).
    pub fn as_cf_tag(&self) -> &'static str {
        match self {
            GridKind::ListOfPoints => "list_of_2d_points",
            GridKind::RectilinearCentroids => "rectilinear_2d_centroids",
            GridKind::RectilinearBounds => "rectilinear_2d_bounds",
            GridKind::RectilinearVertices => "rectilinear_2d_vertices",
            GridKind::IrregularCentroids => "irregular_2d_centroids",
            GridKind::IrregularVertices => "irregular_2d_vertices",
        }
    }

    /// True for the rectilinear family (centroids, bounds, vertices).
    pub fn is_rectilinear(&self) -> bool {
        matches!(
            self,
            GridKind::RectilinearCentroids
                | GridKind::RectilinearBounds
                | GridKind::RectilinearVertices
        )
    }

    /// True for the curvilinear family.
    pub fn is_irregular(&self) -> bool {
        matches!(
            self,
            GridKind::IrregularCentroids | GridKind::IrregularVertices
        )
    }
}

/// A coordinate array of either rank, as read from a file variable.
#[derive(Debug, Clone)]
pub enum CoordArray {
    /// 1D coordinate axis.
    D1(Array1<f64>),
    /// 2D coordinate field.
    D2(Array2<f64>),
}

impl From<Array1<f64>> for CoordArray {
    fn from(a: Array1<f64>) -> Self {
        CoordArray::D1(a)
    }
}

impl From<Array2<f64>> for CoordArray {
    fn from(a: Array2<f64>) -> Self {
        CoordArray::D2(a)
    }
}

/// A classified grid owning its coordinate arrays.
///
/// One variant per topology; every consumer matches exhaustively.
#[derive(Debug, Clone)]
pub enum Grid {
    /// A flat list of points: `lon[k]`, `lat[k]` belong together.
    ListOfPoints { lon: Array1<f64>, lat: Array1<f64> },
    /// Independent centroid axes, sizes N and M.
    RectilinearCentroids { lon: Array1<f64>, lat: Array1<f64> },
    /// Bound pairs, shapes (N, 2) and (M, 2).
    RectilinearBounds { lon: Array2<f64>, lat: Array2<f64> },
    /// Vertex axes, sizes N+1 and M+1.
    RectilinearVertices { lon: Array1<f64>, lat: Array1<f64> },
    /// 2D centroid fields of equal shape.
    IrregularCentroids { lon: Array2<f64>, lat: Array2<f64> },
    /// 2D vertex fields of equal shape (rows+1, cols+1).
    IrregularVertices { lon: Array2<f64>, lat: Array2<f64> },
}

impl Grid {
    /// The topology tag of this grid.
    pub fn kind(&self) -> GridKind {
        match self {
            Grid::ListOfPoints { .. } => GridKind::ListOfPoints,
            Grid::RectilinearCentroids { .. } => GridKind::RectilinearCentroids,
            Grid::RectilinearBounds { .. } => GridKind::RectilinearBounds,
            Grid::RectilinearVertices { .. } => GridKind::RectilinearVertices,
            Grid::IrregularCentroids { .. } => GridKind::IrregularCentroids,
            Grid::IrregularVertices { .. } => GridKind::IrregularVertices,
        }
    }
}

/// All consecutive differences share one sign (strictly monotonic axis).
fn is_strictly_monotonic(values: ArrayView1<'_, f64>) -> bool {
    if values.len() < 2 {
        return true;
    }
    let increasing = values.iter().zip(values.iter().skip(1)).all(|(a, b)| b > a);
    let decreasing = values.iter().zip(values.iter().skip(1)).all(|(a, b)| b < a);
    increasing || decreasing
}

fn hint_is(dims: Option<&[&str]>, expected: &[&str]) -> bool {
    dims.map(|d| d == expected).unwrap_or(false)
}

/// Determine the grid type from longitudes and latitudes.
///
/// `lon_dims`/`lat_dims` are the dimension names of the coordinate
/// variables, when known; they disambiguate CF bound pairs and known
/// curvilinear layouts. Ambiguous inputs resolve the way the catalog
/// crawler expects (a warning is logged when the type was guessed).
pub fn detect_grid(
    lon: CoordArray,
    lat: CoordArray,
    lon_dims: Option<&[&str]>,
    lat_dims: Option<&[&str]>,
) -> Result<Grid> {
    match (lon, lat) {
        (CoordArray::D2(lon), CoordArray::D2(lat)) => {
            if hint_is(lon_dims, &["lon", "bnds"]) && hint_is(lat_dims, &["lat", "bnds"]) {
                return Ok(Grid::RectilinearBounds { lon, lat });
            }
            if lon.shape() == lat.shape() {
                let known_curvilinear = (hint_is(lon_dims, &["yc", "xc"])
                    && hint_is(lat_dims, &["yc", "xc"]))
                    || (hint_is(lon_dims, &["rlat", "rlon"]) && hint_is(lat_dims, &["rlat", "rlon"]));
                if !known_curvilinear {
                    warn!("guessing irregular 2d centroids");
                }
                return Ok(Grid::IrregularCentroids { lon, lat });
            }
            Err(GeogridError::UnknownGrid)
        }
        (CoordArray::D1(lon), CoordArray::D1(lat)) => {
            if lon_dims.is_some() {
                if lon_dims == lat_dims && lon.len() == lat.len() {
                    return Ok(Grid::ListOfPoints { lon, lat });
                }
                if lon_dims != lat_dims
                    && is_strictly_monotonic(lon.view())
                    && is_strictly_monotonic(lat.view())
                {
                    return Ok(Grid::RectilinearCentroids { lon, lat });
                }
                Err(GeogridError::UnknownGrid)
            } else if is_strictly_monotonic(lon.view()) && is_strictly_monotonic(lat.view()) {
                if lon.len() == lat.len() {
                    warn!("guessing rectilinear 2d centroids");
                }
                Ok(Grid::RectilinearCentroids { lon, lat })
            } else if lon.len() == lat.len() {
                Ok(Grid::ListOfPoints { lon, lat })
            } else {
                Err(GeogridError::UnknownGrid)
            }
        }
        _ => Err(GeogridError::UnknownGrid),
    }
}
