//! Landmark extraction and registration of element pairs.

use nalgebra::{dmatrix, DMatrix};
use tracing::debug;

use atlas_elements::{
    get_transformation, set_transformation, Geometry, SpatialElement,
};
use atlas_transform::{Axis, Transformation};

use crate::error::{RegistrationError, RegistrationResult};
use crate::fit::{fit_affine, fit_similarity};

const XY: [Axis; 2] = [Axis::X, Axis::Y];
const MIN_LANDMARKS: usize = 3;

/// Extracts a landmark point set from an element as an `n x 2` matrix in
/// `(x, y)` order.
///
/// Point tables contribute their coordinates directly; shape collections
/// must consist of circles, whose centers are used (the usual output of
/// interactive landmark annotation).
///
/// # Errors
///
/// Returns [`RegistrationError::InvalidLandmarks`] for 3-D point tables,
/// non-circle shapes and element kinds without point-like content.
pub fn landmark_points(element: &SpatialElement) -> RegistrationResult<DMatrix<f64>> {
    match element {
        SpatialElement::Points(table) => {
            if table.axes() != XY {
                return Err(RegistrationError::InvalidLandmarks {
                    reason: format!("landmarks must be 2-D points, got axes {:?}", table.axes()),
                });
            }
            Ok(table.coords().clone())
        }
        SpatialElement::Shapes(shapes) => {
            let mut rows = Vec::with_capacity(shapes.len());
            for geometry in shapes.geometries() {
                match geometry {
                    Geometry::Circle { center, .. } => rows.push((center.x, center.y)),
                    other => {
                        return Err(RegistrationError::InvalidLandmarks {
                            reason: format!(
                                "landmark shapes must be circles, got {other:?}"
                            ),
                        })
                    }
                }
            }
            Ok(DMatrix::from_fn(rows.len(), 2, |r, c| {
                if c == 0 {
                    rows[r].0
                } else {
                    rows[r].1
                }
            }))
        }
        other => Err(RegistrationError::InvalidLandmarks {
            reason: format!("{} elements carry no landmark points", other.kind_name()),
        }),
    }
}

/// Estimates the similarity transformation carrying `moving` onto
/// `reference` from corresponding 2-D landmark pairs.
///
/// A general affine fit is probed first; a negative determinant of its
/// linear part means the correspondence is mirrored, which a similarity
/// cannot express. In that case the moving points are flipped about the
/// vertical line through their horizontal midpoint, the similarity is
/// refitted on the flipped points and the flip is composed into the
/// result. The returned transformation is always materialized as a single
/// dense [`Transformation::Affine`] over `(x, y)`.
///
/// # Errors
///
/// Fails on fewer than three pairs, mismatched set sizes, non-planar
/// inputs or a degenerate configuration.
pub fn estimate_transformation(
    reference: &DMatrix<f64>,
    moving: &DMatrix<f64>,
) -> RegistrationResult<Transformation> {
    if reference.nrows() != moving.nrows() {
        return Err(RegistrationError::MismatchedLandmarks {
            reference: reference.nrows(),
            moving: moving.nrows(),
        });
    }
    if moving.nrows() < MIN_LANDMARKS {
        return Err(RegistrationError::InsufficientLandmarks {
            required: MIN_LANDMARKS,
            provided: moving.nrows(),
        });
    }
    if reference.ncols() != 2 || moving.ncols() != 2 {
        return Err(RegistrationError::InvalidLandmarks {
            reason: format!(
                "landmarks must be planar, got {} and {} columns",
                reference.ncols(),
                moving.ncols()
            ),
        });
    }

    let probe = fit_affine(moving, reference)?;
    let det = probe[(0, 0)] * probe[(1, 1)] - probe[(0, 1)] * probe[(1, 0)];
    let matrix = if det < 0.0 {
        debug!(det, "mirrored correspondence, flipping moving points");
        let min_x = moving.column(0).min();
        let max_x = moving.column(0).max();
        let half_span = (max_x - min_x) / 2.0;
        let flip = dmatrix![
            -1.0, 0.0, 2.0 * half_span;
            0.0, 1.0, 0.0;
            0.0, 0.0, 1.0;
        ];
        let flipped = DMatrix::from_fn(moving.nrows(), 2, |r, c| {
            if c == 0 {
                2.0 * half_span - moving[(r, 0)]
            } else {
                moving[(r, 1)]
            }
        });
        let refit = fit_similarity(&flipped, reference)?;
        refit * flip
    } else {
        fit_similarity(moving, reference)?
    };
    Ok(Transformation::affine(matrix, XY.to_vec(), XY.to_vec())?)
}

/// Registers a moving element onto a reference element using landmark
/// annotations and returns the moving element's new transformation.
///
/// The registering affine is composed after the moving element's existing
/// transformation into `moving_coordinate_system`. When
/// `new_coordinate_system` is given, both elements are mapped into it: the
/// reference keeps its existing transformation into
/// `reference_coordinate_system`, the moving element gets the composed
/// transformation.
///
/// # Errors
///
/// Propagates landmark extraction and fitting failures, and element
/// errors when a named coordinate system is missing.
#[allow(clippy::too_many_arguments)]
pub fn align_elements_using_landmarks(
    reference_landmarks: &SpatialElement,
    moving_landmarks: &SpatialElement,
    reference_element: &mut SpatialElement,
    moving_element: &mut SpatialElement,
    reference_coordinate_system: &str,
    moving_coordinate_system: &str,
    new_coordinate_system: Option<&str>,
) -> RegistrationResult<Transformation> {
    let reference_points = landmark_points(reference_landmarks)?;
    let moving_points = landmark_points(moving_landmarks)?;
    let affine = estimate_transformation(&reference_points, &moving_points)?;

    let old_moving = get_transformation(moving_element, Some(moving_coordinate_system))?;
    let old_reference =
        get_transformation(reference_element, Some(reference_coordinate_system))?;

    let new_moving = Transformation::sequence(vec![old_moving, affine]);
    if let Some(name) = new_coordinate_system {
        set_transformation(moving_element, new_moving.clone(), Some(name))?;
        set_transformation(reference_element, old_reference, Some(name))?;
    }
    Ok(new_moving)
}
