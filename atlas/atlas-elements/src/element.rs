//! The element sum type and transformation-graph accessors.

use std::collections::HashMap;

use atlas_transform::{
    TransformGraph, Transformation, DEFAULT_COORDINATE_SYSTEM,
};

use crate::error::{ElementError, ElementResult};
use crate::points::PointTable;
use crate::raster::{MultiscaleRaster, Raster};
use crate::shapes::ShapeCollection;
use crate::table::AnnotationTable;

/// Any element a dataset can hold.
///
/// All variants except [`SpatialElement::Table`] carry coordinates and a
/// transformation graph; annotation tables carry neither.
#[derive(Debug, Clone)]
pub enum SpatialElement {
    /// A single-resolution raster grid.
    Raster(Raster),
    /// A multiresolution raster pyramid.
    Multiscale(MultiscaleRaster),
    /// A point table.
    Points(PointTable),
    /// A shape collection.
    Shapes(ShapeCollection),
    /// An annotation table.
    Table(AnnotationTable),
}

impl SpatialElement {
    /// A short name for the element kind, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Raster(_) => "raster",
            Self::Multiscale(_) => "multiscale",
            Self::Points(_) => "points",
            Self::Shapes(_) => "shapes",
            Self::Table(_) => "table",
        }
    }

    /// The element's transformation graph.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::NoTransformGraph`] for annotation tables.
    pub fn graph(&self) -> ElementResult<&TransformGraph> {
        match self {
            Self::Raster(r) => Ok(r.graph()),
            Self::Multiscale(m) => Ok(m.graph()),
            Self::Points(p) => Ok(p.graph()),
            Self::Shapes(s) => Ok(s.graph()),
            Self::Table(_) => Err(ElementError::NoTransformGraph {
                kind: self.kind_name(),
            }),
        }
    }

    /// Mutable access to the element's transformation graph.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::NoTransformGraph`] for annotation tables.
    pub fn graph_mut(&mut self) -> ElementResult<&mut TransformGraph> {
        match self {
            Self::Raster(r) => Ok(r.graph_mut()),
            Self::Multiscale(m) => Ok(m.graph_mut()),
            Self::Points(p) => Ok(p.graph_mut()),
            Self::Shapes(s) => Ok(s.graph_mut()),
            Self::Table(_) => Err(ElementError::NoTransformGraph {
                kind: "table",
            }),
        }
    }

    /// Re-checks the element's schema invariants.
    ///
    /// # Errors
    ///
    /// Propagates the variant's validation errors.
    pub fn validate(&self) -> ElementResult<()> {
        match self {
            Self::Raster(r) => r.validate(),
            Self::Multiscale(m) => m.validate(),
            Self::Points(p) => p.validate(),
            Self::Shapes(s) => s.validate(),
            Self::Table(_) => Ok(()),
        }
    }
}

/// Looks up the element's transformation into `target` (the default
/// coordinate system when `None`).
///
/// # Errors
///
/// Returns [`ElementError::CoordinateSystemNotFound`] when the graph has no
/// entry for `target` and [`ElementError::NoTransformGraph`] for tables.
pub fn get_transformation(
    element: &SpatialElement,
    target: Option<&str>,
) -> ElementResult<Transformation> {
    let name = target.unwrap_or(DEFAULT_COORDINATE_SYSTEM);
    element
        .graph()?
        .get(name)
        .cloned()
        .ok_or_else(|| ElementError::CoordinateSystemNotFound {
            name: name.to_string(),
        })
}

/// All of the element's transformations, keyed by coordinate-system name.
///
/// # Errors
///
/// Returns [`ElementError::NoTransformGraph`] for tables.
pub fn get_all_transformations(
    element: &SpatialElement,
) -> ElementResult<HashMap<String, Transformation>> {
    Ok(element.graph()?.to_map())
}

/// Sets the element's transformation into `target` (the default coordinate
/// system when `None`), replacing any previous entry.
///
/// # Errors
///
/// Returns [`ElementError::NoTransformGraph`] for tables.
pub fn set_transformation(
    element: &mut SpatialElement,
    transformation: Transformation,
    target: Option<&str>,
) -> ElementResult<()> {
    let name = target.unwrap_or(DEFAULT_COORDINATE_SYSTEM);
    element.graph_mut()?.set(name, transformation);
    Ok(())
}

/// Replaces the element's whole transformation graph with `transformations`.
///
/// # Errors
///
/// Returns [`ElementError::NoTransformGraph`] for tables.
pub fn set_all_transformations(
    element: &mut SpatialElement,
    transformations: HashMap<String, Transformation>,
) -> ElementResult<()> {
    element.graph_mut()?.replace_all(transformations);
    Ok(())
}

/// Removes the element's transformation into `target` (the default
/// coordinate system when `None`).
///
/// # Errors
///
/// Returns [`ElementError::CoordinateSystemNotFound`] when no such entry
/// exists and [`ElementError::NoTransformGraph`] for tables.
pub fn remove_transformation(
    element: &mut SpatialElement,
    target: Option<&str>,
) -> ElementResult<Transformation> {
    let name = target.unwrap_or(DEFAULT_COORDINATE_SYSTEM);
    element
        .graph_mut()?
        .remove(name)
        .ok_or_else(|| ElementError::CoordinateSystemNotFound {
            name: name.to_string(),
        })
}
