//! Error types for landmark registration.

use thiserror::Error;

use atlas_elements::ElementError;
use atlas_transform::TransformError;

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Errors that can occur while estimating or installing a registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Too few landmark pairs to constrain the fit.
    #[error("registration needs at least {required} landmarks, got {provided}")]
    InsufficientLandmarks {
        /// Minimum number of landmark pairs.
        required: usize,
        /// Number of landmark pairs provided.
        provided: usize,
    },

    /// The two landmark sets differ in size.
    #[error("landmark sets differ in size: {reference} reference vs {moving} moving")]
    MismatchedLandmarks {
        /// Number of reference landmarks.
        reference: usize,
        /// Number of moving landmarks.
        moving: usize,
    },

    /// The landmarks are not a usable 2-D point set.
    #[error("invalid landmarks: {reason}")]
    InvalidLandmarks {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// The landmark configuration does not determine a transformation.
    #[error("landmark configuration is degenerate, no transformation can be fitted")]
    DegenerateFit,

    /// A transformation-level failure.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// An element-level failure.
    #[error(transparent)]
    Element(#[from] ElementError),
}
