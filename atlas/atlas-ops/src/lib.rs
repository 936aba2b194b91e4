//! Transform application for spatial elements.
//!
//! [`transform`] dispatches on the element kind: raster grids are resampled
//! into the transformed bounding box with the compensating translation
//! folded back into their transformation graph, multiscale pyramids
//! transform each level under the level-conjugated transformation, and
//! point tables and shape collections have their coordinates mapped
//! directly. [`transform_dataset`] applies one transformation across a
//! whole dataset.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod engine;
mod error;
mod resample;

pub use engine::{transform, transform_dataset};
pub use error::{OpsError, OpsResult};
pub use resample::{resample, Interpolation};
