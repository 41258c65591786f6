//! Geospatial grid algebra for climate datasets.
//!
//! Gridded climate data comes in a handful of layouts: plain point lists,
//! rectilinear grids described by 1D centroid/bound/vertex arrays, and
//! curvilinear ("irregular") grids where both longitude and latitude are full
//! 2D arrays. This crate detects which layout a coordinate pair uses,
//! converts between centroid and vertex representations, and answers the
//! spatial queries the subsetting services need:
//!
//! - nearest grid point to a longitude/latitude ([`Grid::find_nearest`])
//! - minimal index cover of a polygon ([`Grid::subset_indices`])
//! - polygon-weighted spatial averaging ([`cell_weights`], [`weighted_average`])
//!
//! All operations are synchronous, pure computations over in-memory arrays;
//! opening files and fetching data is the caller's concern.

pub mod average;
pub mod classify;
pub mod distance;
pub mod error;
pub mod mesh;
pub mod nearest;
pub mod subset;

pub use average::{cell_weights, weighted_average, CellWeights};
pub use classify::{detect_grid, CoordArray, Grid, GridKind};
pub use distance::{distance_lon_lat, EARTH_RADIUS_M};
pub use error::{GeogridError, Result};
pub use mesh::{
    centroids_to_quadrilaterals_mesh, quadrilaterals_mesh_to_centroids,
    rectilinear_2d_bounds_to_vertices, rectilinear_centroids_to_vertices,
    rectilinear_vertices_to_centroids, BoundsPolicy, MeshBounds,
};
pub use nearest::{GridIndex, NearestPoint};
pub use subset::{bbox_polygon, SubsetIndices};
