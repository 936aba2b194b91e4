//! Error types for spatial element models.

use thiserror::Error;

use atlas_transform::{Axis, TransformError};

/// Result type for element operations.
pub type ElementResult<T> = Result<T, ElementError>;

/// Errors that can occur while building or validating spatial elements.
#[derive(Debug, Error)]
pub enum ElementError {
    /// A transformation graph lookup referenced an unmapped coordinate
    /// system.
    #[error("coordinate system not found: {name}")]
    CoordinateSystemNotFound {
        /// The missing coordinate-system name.
        name: String,
    },

    /// Raster axes must be an ordered subset of `(c, z, y, x)`; label
    /// rasters additionally exclude `c`.
    #[error("invalid raster axes {axes:?}: expected an ordered subset of (c, z, y, x)")]
    InvalidRasterAxes {
        /// The rejected axis sequence.
        axes: Vec<Axis>,
    },

    /// The data's dimensionality disagrees with the declared axes.
    #[error("data has {data_dims} dimensions but {axis_count} axes were declared")]
    DimensionMismatch {
        /// Number of array dimensions.
        data_dims: usize,
        /// Number of declared axes.
        axis_count: usize,
    },

    /// The element does not satisfy its schema.
    #[error("schema validation failed: {reason}")]
    SchemaValidation {
        /// Human-readable violation description.
        reason: String,
    },

    /// The element kind carries no transformation graph.
    #[error("{kind} elements do not carry a transformation graph")]
    NoTransformGraph {
        /// The element kind name.
        kind: &'static str,
    },

    /// A transformation-level failure.
    #[error(transparent)]
    Transform(#[from] TransformError),
}
