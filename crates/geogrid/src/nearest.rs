//! Nearest grid point location, dispatched on grid topology.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::Grid;
use crate::distance::distance_lon_lat;
use crate::error::{GeogridError, Result};
use crate::mesh::{quadrilaterals_mesh_to_centroids, rectilinear_2d_bounds_to_vertices,
    rectilinear_vertices_to_centroids};

/// Index of a grid point, shaped by the grid's topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridIndex {
    /// Position in a point list.
    Flat(usize),
    /// (longitude-axis, latitude-axis) indices for rectilinear grids,
    /// (row, column) for irregular grids.
    TwoD { i: usize, j: usize },
}

/// Result of a nearest-point query.
///
/// Ties between equidistant candidates resolve deterministically to the
/// first index in storage order; `ambiguous` reports that a tie happened so
/// callers can assert on it instead of scraping logs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestPoint {
    pub index: GridIndex,
    /// Great-circle distance from the query to the selected point, meters.
    pub distance_m: f64,
    /// More than one grid point was exactly nearest.
    pub ambiguous: bool,
}

fn check_maximum(distance_m: f64, maximum: Option<f64>) -> Result<()> {
    if let Some(maximum_m) = maximum {
        if distance_m > maximum_m {
            return Err(GeogridError::NoPointWithinDistance {
                distance_m,
                maximum_m,
            });
        }
    }
    Ok(())
}

/// Arg-min over an iterator of distances with exact-equality tie counting.
fn argmin_with_ties(values: impl Iterator<Item = f64>) -> Option<(usize, f64, bool)> {
    let mut best: Option<(usize, f64)> = None;
    let mut ties = 0usize;
    for (k, d) in values.enumerate() {
        match best {
            None => {
                best = Some((k, d));
                ties = 1;
            }
            Some((_, bd)) => {
                if d < bd {
                    best = Some((k, d));
                    ties = 1;
                } else if d == bd {
                    ties += 1;
                }
            }
        }
    }
    best.map(|(k, d)| (k, d, ties > 1))
}

/// Brute-force nearest over paired lon/lat values.
fn nearest_from_points(
    lon: impl Iterator<Item = f64>,
    lat: impl Iterator<Item = f64>,
    lon_point: f64,
    lat_point: f64,
    maximum_distance: Option<f64>,
) -> Result<(usize, f64, bool)> {
    let (k, distance_m, ambiguous) = argmin_with_ties(
        lon.zip(lat)
            .map(|(x, y)| distance_lon_lat(x, y, lon_point, lat_point)),
    )
    .ok_or(GeogridError::UnknownGrid)?;
    check_maximum(distance_m, maximum_distance)?;
    if ambiguous {
        warn!("more than one nearest point, returning first index");
    }
    Ok((k, distance_m, ambiguous))
}

/// Longitude separation folded into [0, 180]: distances over 180 are shorter
/// the other way around the globe.
fn lon_separation(lon: f64, lon_point: f64) -> f64 {
    let d = (lon - lon_point).abs() % 360.0;
    if d > 180.0 {
        (d - 360.0).abs()
    } else {
        d
    }
}

/// Independent per-axis nearest search on a rectilinear grid.
fn nearest_from_rectilinear_centroids(
    lon: ArrayView1<'_, f64>,
    lat: ArrayView1<'_, f64>,
    lon_point: f64,
    lat_point: f64,
    maximum_distance: Option<f64>,
) -> Result<NearestPoint> {
    let (i, _, lon_ambiguous) =
        argmin_with_ties(lon.iter().map(|&x| lon_separation(x, lon_point)))
            .ok_or(GeogridError::UnknownGrid)?;
    if lon_ambiguous {
        warn!("more than one nearest meridian, returning first index");
    }
    let (j, _, lat_ambiguous) = argmin_with_ties(lat.iter().map(|&y| (y - lat_point).abs()))
        .ok_or(GeogridError::UnknownGrid)?;
    if lat_ambiguous {
        warn!("more than one nearest parallel, returning first index");
    }
    let distance_m = distance_lon_lat(lon[i], lat[j], lon_point, lat_point);
    check_maximum(distance_m, maximum_distance)?;
    Ok(NearestPoint {
        index: GridIndex::TwoD { i, j },
        distance_m,
        ambiguous: lon_ambiguous || lat_ambiguous,
    })
}

impl Grid {
    /// Find the grid index nearest to a query longitude/latitude.
    ///
    /// `maximum_distance` (meters), when given, turns a too-distant best
    /// match into [`GeogridError::NoPointWithinDistance`].
    pub fn find_nearest(
        &self,
        lon_point: f64,
        lat_point: f64,
        maximum_distance: Option<f64>,
    ) -> Result<NearestPoint> {
        match self {
            Grid::ListOfPoints { lon, lat } => {
                let (k, distance_m, ambiguous) = nearest_from_points(
                    lon.iter().copied(),
                    lat.iter().copied(),
                    lon_point,
                    lat_point,
                    maximum_distance,
                )?;
                Ok(NearestPoint {
                    index: GridIndex::Flat(k),
                    distance_m,
                    ambiguous,
                })
            }
            Grid::RectilinearCentroids { lon, lat } => nearest_from_rectilinear_centroids(
                lon.view(),
                lat.view(),
                lon_point,
                lat_point,
                maximum_distance,
            ),
            Grid::RectilinearBounds { lon, lat } => {
                let (lonv, latv) = rectilinear_2d_bounds_to_vertices(lon.view(), lat.view());
                let (lonc, latc) = rectilinear_vertices_to_centroids(lonv.view(), latv.view());
                nearest_from_rectilinear_centroids(
                    lonc.view(),
                    latc.view(),
                    lon_point,
                    lat_point,
                    maximum_distance,
                )
            }
            Grid::RectilinearVertices { lon, lat } => {
                let (lonc, latc) = rectilinear_vertices_to_centroids(lon.view(), lat.view());
                nearest_from_rectilinear_centroids(
                    lonc.view(),
                    latc.view(),
                    lon_point,
                    lat_point,
                    maximum_distance,
                )
            }
            Grid::IrregularCentroids { lon, lat } => {
                let cols = lon.ncols();
                let (k, distance_m, ambiguous) = nearest_from_points(
                    lon.iter().copied(),
                    lat.iter().copied(),
                    lon_point,
                    lat_point,
                    maximum_distance,
                )?;
                Ok(NearestPoint {
                    index: GridIndex::TwoD {
                        i: k / cols,
                        j: k % cols,
                    },
                    distance_m,
                    ambiguous,
                })
            }
            Grid::IrregularVertices { lon, lat } => {
                let (lonc, latc) = quadrilaterals_mesh_to_centroids(lon.view(), lat.view());
                let cols = lonc.ncols();
                let (k, distance_m, ambiguous) = nearest_from_points(
                    lonc.iter().copied(),
                    latc.iter().copied(),
                    lon_point,
                    lat_point,
                    maximum_distance,
                )?;
                Ok(NearestPoint {
                    index: GridIndex::TwoD {
                        i: k / cols,
                        j: k % cols,
                    },
                    distance_m,
                    ambiguous,
                })
            }
        }
    }
}
