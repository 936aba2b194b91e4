//! Spatial element models for the atlas workspace.
//!
//! Elements are the typed payloads a [`Dataset`] holds: dense rasters and
//! multiscale pyramids ([`Raster`], [`MultiscaleRaster`]), point tables
//! ([`PointTable`]), planar shape collections ([`ShapeCollection`]) and
//! annotation tables ([`AnnotationTable`]). Every coordinate-bearing
//! element carries a [`TransformGraph`](atlas_transform::TransformGraph)
//! mapping coordinate-system names to transformations; the free functions
//! in [`element`] read and edit those graphs uniformly across kinds.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod dataset;
pub mod element;
mod error;
mod points;
mod raster;
mod shapes;
mod table;

pub use dataset::Dataset;
pub use element::{
    get_all_transformations, get_transformation, remove_transformation,
    set_all_transformations, set_transformation, SpatialElement,
};
pub use error::{ElementError, ElementResult};
pub use points::PointTable;
pub use raster::{MultiscaleRaster, Raster, RasterKind};
pub use shapes::{Geometry, ShapeCollection};
pub use table::AnnotationTable;
