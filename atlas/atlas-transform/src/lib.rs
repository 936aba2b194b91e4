//! Named axes, coordinate systems and composable axis-aware transformations.
//!
//! This crate is the foundation of the atlas workspace: it defines the
//! closed set of [`Axis`] names, named [`CoordinateSystem`]s, the
//! [`Transformation`] algebra (identity, axis rename, translation, scale,
//! affine, sequence composition) and the per-element [`TransformGraph`]
//! mapping coordinate-system names to transformations.
//!
//! # Example
//!
//! ```
//! use atlas_transform::{Axis, Transformation};
//! use nalgebra::dmatrix;
//!
//! let scale = Transformation::scale(vec![2.0, 2.0], vec![Axis::Y, Axis::X]).unwrap();
//! let shift = Transformation::translation(vec![1.0, 1.0], vec![Axis::Y, Axis::X]).unwrap();
//! let seq = Transformation::sequence(vec![scale, shift]);
//!
//! let coords = dmatrix![3.0, 4.0];
//! let out = seq.apply(&coords, &[Axis::Y, Axis::X], &[Axis::Y, Axis::X]).unwrap();
//! assert_eq!(out, dmatrix![7.0, 9.0]);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod axis;
mod coord_system;
mod error;
mod graph;
mod transformation;

pub use axis::{axis_index, spatial_axes, Axis};
pub use coord_system::{
    register_coordinate_systems, CoordinateSystem, DEFAULT_COORDINATE_SYSTEM,
};
pub use error::{TransformError, TransformResult};
pub use graph::TransformGraph;
pub use transformation::Transformation;
