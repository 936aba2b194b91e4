//! Point tables: coordinate matrices with optional per-point attributes.

use std::collections::BTreeMap;

use nalgebra::DMatrix;

use atlas_transform::{Axis, TransformGraph, Transformation};

use crate::error::{ElementError, ElementResult};

/// A table of points in 2D or 3D, one row per point, with optional numeric
/// attribute columns (e.g. intensities, radii, gene counts).
///
/// Coordinate columns follow the declared axes, `(x, y)` or `(x, y, z)`.
#[derive(Debug, Clone)]
pub struct PointTable {
    coords: DMatrix<f64>,
    axes: Vec<Axis>,
    attributes: BTreeMap<String, Vec<f64>>,
    transformations: TransformGraph,
}

fn check_point_axes(axes: &[Axis]) -> ElementResult<()> {
    let valid = axes == [Axis::X, Axis::Y] || axes == [Axis::X, Axis::Y, Axis::Z];
    if !valid {
        return Err(ElementError::SchemaValidation {
            reason: format!("point axes must be (x, y) or (x, y, z), got {axes:?}"),
        });
    }
    Ok(())
}

impl PointTable {
    /// Parses a coordinate matrix into a point table, attaching the given
    /// transformation (or a default identity into the default coordinate
    /// system).
    ///
    /// # Errors
    ///
    /// Fails when the axes are not `(x, y)` or `(x, y, z)`, when the matrix
    /// width disagrees with the axis count, or when an attribute column's
    /// length differs from the point count.
    pub fn parse(
        coords: DMatrix<f64>,
        axes: Vec<Axis>,
        attributes: BTreeMap<String, Vec<f64>>,
        transform: Option<Transformation>,
    ) -> ElementResult<Self> {
        check_point_axes(&axes)?;
        if coords.ncols() != axes.len() {
            return Err(ElementError::DimensionMismatch {
                data_dims: coords.ncols(),
                axis_count: axes.len(),
            });
        }
        for (name, column) in &attributes {
            if column.len() != coords.nrows() {
                return Err(ElementError::SchemaValidation {
                    reason: format!(
                        "attribute '{name}' has {} values for {} points",
                        column.len(),
                        coords.nrows()
                    ),
                });
            }
        }
        let transformations = match transform {
            Some(t) => {
                let mut graph = TransformGraph::new();
                graph.set(atlas_transform::DEFAULT_COORDINATE_SYSTEM, t);
                graph
            }
            None => TransformGraph::with_default_identity(),
        };
        Ok(Self {
            coords,
            axes,
            attributes,
            transformations,
        })
    }

    /// The coordinate matrix, one row per point.
    #[must_use]
    pub fn coords(&self) -> &DMatrix<f64> {
        &self.coords
    }

    /// The coordinate axes, `(x, y)` or `(x, y, z)`.
    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    /// Whether the table holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.nrows() == 0
    }

    /// An attribute column by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&[f64]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    /// All attribute columns.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.attributes
    }

    /// A copy of this table with new coordinates and the same attributes.
    ///
    /// # Errors
    ///
    /// Fails when the new matrix's row count differs from the point count or
    /// its width from the axis count.
    pub fn with_coords(&self, coords: DMatrix<f64>) -> ElementResult<Self> {
        if coords.nrows() != self.coords.nrows() {
            return Err(ElementError::SchemaValidation {
                reason: format!(
                    "replacement coordinates have {} rows for {} points",
                    coords.nrows(),
                    self.coords.nrows()
                ),
            });
        }
        if coords.ncols() != self.axes.len() {
            return Err(ElementError::DimensionMismatch {
                data_dims: coords.ncols(),
                axis_count: self.axes.len(),
            });
        }
        Ok(Self {
            coords,
            axes: self.axes.clone(),
            attributes: self.attributes.clone(),
            transformations: self.transformations.clone(),
        })
    }

    /// The transformation graph.
    #[must_use]
    pub fn graph(&self) -> &TransformGraph {
        &self.transformations
    }

    /// Mutable access to the transformation graph.
    pub fn graph_mut(&mut self) -> &mut TransformGraph {
        &mut self.transformations
    }

    /// Re-checks the schema invariants.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`PointTable::parse`].
    pub fn validate(&self) -> ElementResult<()> {
        check_point_axes(&self.axes)?;
        if self.coords.ncols() != self.axes.len() {
            return Err(ElementError::DimensionMismatch {
                data_dims: self.coords.ncols(),
                axis_count: self.axes.len(),
            });
        }
        for (name, column) in &self.attributes {
            if column.len() != self.coords.nrows() {
                return Err(ElementError::SchemaValidation {
                    reason: format!(
                        "attribute '{name}' has {} values for {} points",
                        column.len(),
                        self.coords.nrows()
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dmatrix;

    #[test]
    fn parse_accepts_2d_points() {
        let coords = dmatrix![0.0, 1.0; 2.0, 3.0];
        let table = PointTable::parse(
            coords,
            vec![Axis::X, Axis::Y],
            BTreeMap::new(),
            None,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.graph().get("global").is_some());
    }

    #[test]
    fn parse_rejects_yx_order() {
        let coords = dmatrix![0.0, 1.0];
        let result = PointTable::parse(
            coords,
            vec![Axis::Y, Axis::X],
            BTreeMap::new(),
            None,
        );
        assert!(matches!(result, Err(ElementError::SchemaValidation { .. })));
    }

    #[test]
    fn parse_rejects_short_attribute_column() {
        let coords = dmatrix![0.0, 1.0; 2.0, 3.0];
        let mut attributes = BTreeMap::new();
        attributes.insert("intensity".to_string(), vec![1.0]);
        let result = PointTable::parse(coords, vec![Axis::X, Axis::Y], attributes, None);
        assert!(matches!(result, Err(ElementError::SchemaValidation { .. })));
    }

    #[test]
    fn with_coords_keeps_attributes() {
        let coords = dmatrix![0.0, 1.0; 2.0, 3.0];
        let mut attributes = BTreeMap::new();
        attributes.insert("intensity".to_string(), vec![5.0, 6.0]);
        let table = PointTable::parse(coords, vec![Axis::X, Axis::Y], attributes, None).unwrap();
        let moved = table.with_coords(dmatrix![1.0, 2.0; 3.0, 4.0]).unwrap();
        assert_eq!(moved.attribute("intensity"), Some(&[5.0, 6.0][..]));
    }

    #[test]
    fn with_coords_rejects_row_count_change() {
        let coords = dmatrix![0.0, 1.0; 2.0, 3.0];
        let table = PointTable::parse(
            coords,
            vec![Axis::X, Axis::Y],
            BTreeMap::new(),
            None,
        )
        .unwrap();
        let result = table.with_coords(dmatrix![1.0, 2.0]);
        assert!(matches!(result, Err(ElementError::SchemaValidation { .. })));
    }
}
