//! Error types for grid operations.

use thiserror::Error;

/// Result type alias using GeogridError.
pub type Result<T> = std::result::Result<T, GeogridError>;

/// Errors raised by grid classification and spatial queries.
#[derive(Debug, Error)]
pub enum GeogridError {
    /// The coordinate arrays match none of the known grid layouts.
    #[error("unknown grid")]
    UnknownGrid,

    /// The best match is farther away than the caller tolerates.
    #[error("no points within provided maximum distance (nearest {distance_m:.1} m, maximum {maximum_m:.1} m)")]
    NoPointWithinDistance { distance_m: f64, maximum_m: f64 },

    /// The query geometry falls entirely outside the grid.
    #[error("query geometry outside grid bounds on {axis} axis")]
    OutsideGrid { axis: &'static str },

    /// The query geometry has no bounding box (empty geometry).
    #[error("query geometry is empty")]
    EmptyRegion,

    /// No grid cell or point intersects the query geometry.
    #[error("query geometry intersects no grid cell")]
    NoIntersection,

    /// An axis is too short for the requested mesh conversion.
    #[error("axis needs at least {needed} elements, got {got}")]
    AxisTooShort { needed: usize, got: usize },

    /// The grid topology has no cell geometry (point lists).
    #[error("grid of type {0} has no cell geometry")]
    NoCellGeometry(&'static str),

    /// Field/weight shapes do not line up for the weighted reduction.
    #[error("shape mismatch in weighted reduction: {0}")]
    ShapeMismatch(String),
}
