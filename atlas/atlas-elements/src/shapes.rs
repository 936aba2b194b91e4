//! Shape collections: polygons, multipolygons and circles in the plane.

use nalgebra::{DMatrix, Point2};

use atlas_transform::{Axis, TransformGraph, Transformation};

use crate::error::{ElementError, ElementResult};

/// A planar region of interest.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A simple polygon given by its exterior ring.
    Polygon(Vec<Point2<f64>>),
    /// Several disjoint polygons treated as one region.
    MultiPolygon(Vec<Vec<Point2<f64>>>),
    /// A circle given by its center and radius.
    Circle {
        /// Center of the circle.
        center: Point2<f64>,
        /// Radius, strictly positive.
        radius: f64,
    },
}

impl Geometry {
    fn check(&self) -> ElementResult<()> {
        match self {
            Self::Polygon(ring) => {
                if ring.len() < 3 {
                    return Err(ElementError::SchemaValidation {
                        reason: format!("polygon ring has {} vertices, need at least 3", ring.len()),
                    });
                }
            }
            Self::MultiPolygon(rings) => {
                if rings.is_empty() {
                    return Err(ElementError::SchemaValidation {
                        reason: "multipolygon has no rings".into(),
                    });
                }
                for ring in rings {
                    if ring.len() < 3 {
                        return Err(ElementError::SchemaValidation {
                            reason: format!(
                                "multipolygon ring has {} vertices, need at least 3",
                                ring.len()
                            ),
                        });
                    }
                }
            }
            Self::Circle { radius, .. } => {
                if !(*radius > 0.0) {
                    return Err(ElementError::SchemaValidation {
                        reason: format!("circle radius must be positive, got {radius}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// All defining vertices as a row-per-point matrix in `(x, y)` order.
    /// For circles this is the center alone.
    #[must_use]
    pub fn vertices(&self) -> DMatrix<f64> {
        let points: Vec<Point2<f64>> = match self {
            Self::Polygon(ring) => ring.clone(),
            Self::MultiPolygon(rings) => rings.iter().flatten().copied().collect(),
            Self::Circle { center, .. } => vec![*center],
        };
        DMatrix::from_fn(points.len(), 2, |r, c| if c == 0 { points[r].x } else { points[r].y })
    }

    /// Rebuilds this geometry from transformed vertices, in the order
    /// [`Geometry::vertices`] produced them. Circle radii are rescaled by
    /// `radius_scale`.
    fn with_vertices(&self, vertices: &DMatrix<f64>, radius_scale: f64) -> Self {
        let point = |r: usize| Point2::new(vertices[(r, 0)], vertices[(r, 1)]);
        match self {
            Self::Polygon(ring) => Self::Polygon((0..ring.len()).map(point).collect()),
            Self::MultiPolygon(rings) => {
                let mut row = 0;
                let mut out = Vec::with_capacity(rings.len());
                for ring in rings {
                    out.push((row..row + ring.len()).map(point).collect());
                    row += ring.len();
                }
                Self::MultiPolygon(out)
            }
            Self::Circle { radius, .. } => Self::Circle {
                center: point(0),
                radius: radius * radius_scale,
            },
        }
    }
}

/// A collection of planar geometries sharing one transformation graph.
///
/// Shape coordinates live in the `(x, y)` plane; circle radii are rescaled
/// by the mean isotropic stretch when the collection is transformed.
#[derive(Debug, Clone)]
pub struct ShapeCollection {
    geometries: Vec<Geometry>,
    transformations: TransformGraph,
}

impl ShapeCollection {
    /// Parses geometries into a collection, attaching the given
    /// transformation (or a default identity into the default coordinate
    /// system).
    ///
    /// # Errors
    ///
    /// Fails when a polygon ring has fewer than three vertices or a circle
    /// radius is not positive.
    pub fn parse(
        geometries: Vec<Geometry>,
        transform: Option<Transformation>,
    ) -> ElementResult<Self> {
        for geometry in &geometries {
            geometry.check()?;
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
            geometries,
            transformations,
        })
    }

    /// The geometries in insertion order.
    #[must_use]
    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    /// Number of geometries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// The shape axes, always `(x, y)`.
    #[must_use]
    pub fn axes(&self) -> [Axis; 2] {
        [Axis::X, Axis::Y]
    }

    /// Applies `transform` to every geometry's vertices and returns the
    /// resulting collection (same graph).
    ///
    /// Circle radii are not left fixed: they are rescaled by the mean of
    /// the per-axis linear stretches, so uniformly scaled collections keep
    /// their proportions. Under anisotropic or shearing transforms the
    /// rescaled radius is an approximation (circles stay circles here,
    /// they are never turned into ellipses).
    ///
    /// # Errors
    ///
    /// Fails when the transformation cannot be expressed over the `(x, y)`
    /// plane.
    pub fn map_vertices(&self, transform: &Transformation) -> ElementResult<Self> {
        let axes = self.axes();
        let matrix = transform.to_affine_matrix(&axes, &axes)?;
        // mean isotropic stretch of the linear part
        let radius_scale = (matrix
            .view((0, 0), (2, 2))
            .column_iter()
            .map(|c| c.norm())
            .sum::<f64>())
            / 2.0;
        let geometries = self
            .geometries
            .iter()
            .map(|g| {
                let moved = transform.apply(&g.vertices(), &axes, &axes)?;
                Ok(g.with_vertices(&moved, radius_scale))
            })
            .collect::<ElementResult<Vec<Geometry>>>()?;
        Ok(Self {
            geometries,
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
    /// Returns the same errors as [`ShapeCollection::parse`].
    pub fn validate(&self) -> ElementResult<()> {
        for geometry in &self.geometries {
            geometry.check()?;
        }
        Ok(())
    }
}
