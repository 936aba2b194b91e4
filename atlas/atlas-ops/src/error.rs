//! Error types for the transform-application engine.

use thiserror::Error;

use atlas_elements::ElementError;
use atlas_transform::TransformError;

/// Result type for engine operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors that can occur while applying transformations to elements.
#[derive(Debug, Error)]
pub enum OpsError {
    /// The operation does not apply to this element kind.
    #[error("operation not supported for {kind} elements")]
    UnsupportedElementType {
        /// The element kind name.
        kind: &'static str,
    },

    /// The transformed raster would be empty along a spatial axis.
    #[error("transformed raster has an empty spatial extent: {shape:?}")]
    EmptyRasterExtent {
        /// The degenerate output shape.
        shape: Vec<usize>,
    },

    /// A transformation-level failure.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// An element-level failure.
    #[error(transparent)]
    Element(#[from] ElementError),
}
