//! Composable, axis-aware affine transformations.
//!
//! Every transformation projects onto an augmented affine matrix for an
//! explicit pair of input/output axis sequences. Axes a transformation does
//! not act on pass through unchanged, which lets spatial-only transforms be
//! applied to data carrying extra axes (most commonly the channel axis `c`).

use nalgebra::DMatrix;

use crate::axis::{axis_index, Axis};
use crate::error::{TransformError, TransformResult};

/// A spatial transformation, polymorphic over a closed set of variants.
///
/// Transformations are immutable once constructed; composition and inversion
/// produce new values. [`Transformation::Sequence`] composes left-to-right:
/// the first listed transformation is applied first.
///
/// # Example
///
/// ```
/// use atlas_transform::{Axis, Transformation};
///
/// let t = Transformation::translation(vec![5.0, 5.0], vec![Axis::Y, Axis::X]).unwrap();
/// let m = t
///     .to_affine_matrix(&[Axis::Y, Axis::X], &[Axis::Y, Axis::X])
///     .unwrap();
/// assert_eq!(m[(0, 2)], 5.0);
/// assert_eq!(m[(2, 2)], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transformation {
    /// The identity transformation.
    Identity,
    /// Renames input axes; unlisted axes pass through unchanged.
    MapAxis {
        /// `(input, output)` axis rename pairs.
        map: Vec<(Axis, Axis)>,
    },
    /// A per-axis translation.
    Translation {
        /// Offsets, one per axis in `axes`.
        offsets: Vec<f64>,
        /// The axes the offsets act on.
        axes: Vec<Axis>,
    },
    /// A per-axis scaling.
    Scale {
        /// Scale factors, one per axis in `axes`.
        factors: Vec<f64>,
        /// The axes the factors act on.
        axes: Vec<Axis>,
    },
    /// A general affine map stored in augmented form.
    Affine {
        /// Augmented matrix of shape `(output_axes.len() + 1, input_axes.len() + 1)`
        /// whose last row is `[0, ..., 0, 1]`.
        matrix: DMatrix<f64>,
        /// Axes consumed by the matrix columns.
        input_axes: Vec<Axis>,
        /// Axes produced by the matrix rows.
        output_axes: Vec<Axis>,
    },
    /// An ordered composition, applied first-to-last.
    Sequence(Vec<Transformation>),
}

impl Transformation {
    /// Creates the identity transformation.
    #[must_use]
    pub const fn identity() -> Self {
        Self::Identity
    }

    /// Creates a translation by `offsets` along `axes`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ValueCountMismatch`] if the lengths differ.
    pub fn translation(offsets: Vec<f64>, axes: Vec<Axis>) -> TransformResult<Self> {
        if offsets.len() != axes.len() {
            return Err(TransformError::ValueCountMismatch {
                values: offsets.len(),
                axes: axes.len(),
            });
        }
        Ok(Self::Translation { offsets, axes })
    }

    /// Creates a scaling by `factors` along `axes`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ValueCountMismatch`] if the lengths differ.
    pub fn scale(factors: Vec<f64>, axes: Vec<Axis>) -> TransformResult<Self> {
        if factors.len() != axes.len() {
            return Err(TransformError::ValueCountMismatch {
                values: factors.len(),
                axes: axes.len(),
            });
        }
        Ok(Self::Scale { factors, axes })
    }

    /// Creates an axis rename from `(input, output)` pairs.
    #[must_use]
    pub fn map_axis(map: Vec<(Axis, Axis)>) -> Self {
        Self::MapAxis { map }
    }

    /// Creates an affine transformation from a matrix and its axes.
    ///
    /// The matrix may be given in reduced form, shape
    /// `(output_axes.len(), input_axes.len() + 1)`, or in full augmented form
    /// with an extra `[0, ..., 0, 1]` row; reduced form is normalized to
    /// augmented form here.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MatrixShape`] if the matrix fits neither
    /// form.
    pub fn affine(
        matrix: DMatrix<f64>,
        input_axes: Vec<Axis>,
        output_axes: Vec<Axis>,
    ) -> TransformResult<Self> {
        let (ni, no) = (input_axes.len(), output_axes.len());
        let shape_err = TransformError::MatrixShape {
            rows: matrix.nrows(),
            cols: matrix.ncols(),
            expected_rows: no + 1,
            expected_cols: ni + 1,
        };
        if matrix.ncols() != ni + 1 {
            return Err(shape_err);
        }
        let matrix = if matrix.nrows() == no {
            // reduced form: append the homogeneous row
            let mut augmented = matrix.insert_row(no, 0.0);
            augmented[(no, ni)] = 1.0;
            augmented
        } else if matrix.nrows() == no + 1 {
            matrix
        } else {
            return Err(shape_err);
        };
        Ok(Self::Affine {
            matrix,
            input_axes,
            output_axes,
        })
    }

    /// Creates an ordered composition, applied first-to-last.
    #[must_use]
    pub fn sequence(transforms: Vec<Transformation>) -> Self {
        Self::Sequence(transforms)
    }

    /// The axes produced when this transformation is applied to data with
    /// the given `input` axes. Axes the transformation does not rename or
    /// consume are preserved in place.
    #[must_use]
    pub fn resulting_axes(&self, input: &[Axis]) -> Vec<Axis> {
        match self {
            Self::Identity | Self::Translation { .. } | Self::Scale { .. } => input.to_vec(),
            Self::MapAxis { map } => input
                .iter()
                .map(|&a| {
                    map.iter()
                        .find(|&&(from, _)| from == a)
                        .map_or(a, |&(_, to)| to)
                })
                .collect(),
            Self::Affine {
                input_axes,
                output_axes,
                ..
            } => {
                if input_axes.len() == output_axes.len() {
                    input
                        .iter()
                        .map(|&a| {
                            input_axes
                                .iter()
                                .position(|&own| own == a)
                                .map_or(a, |i| output_axes[i])
                        })
                        .collect()
                } else {
                    output_axes.clone()
                }
            }
            Self::Sequence(transforms) => transforms
                .iter()
                .fold(input.to_vec(), |axes, t| t.resulting_axes(&axes)),
        }
    }

    /// Materializes the augmented affine matrix of shape
    /// `(output_axes.len() + 1, input_axes.len() + 1)` embedding this
    /// transformation for exactly the requested axis subsets.
    ///
    /// Output axes the transformation does not act on receive an identity
    /// row copying the same-named input axis.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::AxisMismatch`] when an output axis is
    /// neither produced by the transformation nor present among the input
    /// axes for pass-through.
    pub fn to_affine_matrix(
        &self,
        input_axes: &[Axis],
        output_axes: &[Axis],
    ) -> TransformResult<DMatrix<f64>> {
        let (ni, no) = (input_axes.len(), output_axes.len());
        let mut m = DMatrix::zeros(no + 1, ni + 1);
        m[(no, ni)] = 1.0;
        match self {
            Self::Identity => {
                for (row, &axis) in output_axes.iter().enumerate() {
                    m[(row, axis_index(input_axes, axis)?)] = 1.0;
                }
            }
            Self::Translation { offsets, axes } => {
                for (row, &axis) in output_axes.iter().enumerate() {
                    m[(row, axis_index(input_axes, axis)?)] = 1.0;
                    if let Some(i) = axes.iter().position(|&a| a == axis) {
                        m[(row, ni)] = offsets[i];
                    }
                }
            }
            Self::Scale { factors, axes } => {
                for (row, &axis) in output_axes.iter().enumerate() {
                    let factor = axes
                        .iter()
                        .position(|&a| a == axis)
                        .map_or(1.0, |i| factors[i]);
                    m[(row, axis_index(input_axes, axis)?)] = factor;
                }
            }
            Self::MapAxis { map } => {
                for (row, &axis) in output_axes.iter().enumerate() {
                    let source = match map.iter().find(|&&(_, to)| to == axis) {
                        Some(&(from, _)) => from,
                        // an axis renamed away cannot also pass through
                        None if map.iter().any(|&(from, _)| from == axis) => {
                            return Err(TransformError::AxisMismatch { axis });
                        }
                        None => axis,
                    };
                    m[(row, axis_index(input_axes, source)?)] = 1.0;
                }
            }
            Self::Affine {
                matrix,
                input_axes: own_in,
                output_axes: own_out,
            } => {
                for (row, &axis) in output_axes.iter().enumerate() {
                    if let Some(i) = own_out.iter().position(|&a| a == axis) {
                        for (j, &in_axis) in own_in.iter().enumerate() {
                            m[(row, axis_index(input_axes, in_axis)?)] = matrix[(i, j)];
                        }
                        m[(row, ni)] = matrix[(i, own_in.len())];
                    } else if !own_in.contains(&axis) && input_axes.contains(&axis) {
                        m[(row, axis_index(input_axes, axis)?)] = 1.0;
                    } else {
                        return Err(TransformError::AxisMismatch { axis });
                    }
                }
            }
            Self::Sequence(transforms) => {
                let mut current = input_axes.to_vec();
                let mut composed = DMatrix::identity(ni + 1, ni + 1);
                for t in transforms {
                    let next = t.resulting_axes(&current);
                    let stage = t.to_affine_matrix(&current, &next)?;
                    composed = stage * composed;
                    current = next;
                }
                let projection = Self::Identity.to_affine_matrix(&current, output_axes)?;
                return Ok(projection * composed);
            }
        }
        Ok(m)
    }

    /// Returns the inverse transformation.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonInvertible`] for zero scale factors,
    /// non-bijective axis renames, non-square or singular affine maps, and
    /// sequences containing any of these.
    pub fn inverse(&self) -> TransformResult<Self> {
        match self {
            Self::Identity => Ok(Self::Identity),
            Self::Translation { offsets, axes } => Ok(Self::Translation {
                offsets: offsets.iter().map(|o| -o).collect(),
                axes: axes.clone(),
            }),
            Self::Scale { factors, axes } => {
                if factors.iter().any(|f| f.abs() < f64::EPSILON) {
                    return Err(TransformError::NonInvertible);
                }
                Ok(Self::Scale {
                    factors: factors.iter().map(|f| 1.0 / f).collect(),
                    axes: axes.clone(),
                })
            }
            Self::MapAxis { map } => {
                let bijective = |side: fn(&(Axis, Axis)) -> Axis| {
                    let mut seen: Vec<Axis> = map.iter().map(side).collect();
                    seen.sort_unstable();
                    seen.windows(2).all(|w| w[0] != w[1])
                };
                if !bijective(|p| p.0) || !bijective(|p| p.1) {
                    return Err(TransformError::NonInvertible);
                }
                Ok(Self::MapAxis {
                    map: map.iter().map(|&(from, to)| (to, from)).collect(),
                })
            }
            Self::Affine {
                matrix,
                input_axes,
                output_axes,
            } => {
                if input_axes.len() != output_axes.len() {
                    return Err(TransformError::NonInvertible);
                }
                let inverse = matrix
                    .clone()
                    .try_inverse()
                    .ok_or(TransformError::NonInvertible)?;
                Ok(Self::Affine {
                    matrix: inverse,
                    input_axes: output_axes.clone(),
                    output_axes: input_axes.clone(),
                })
            }
            Self::Sequence(transforms) => {
                let inverses: TransformResult<Vec<Self>> =
                    transforms.iter().rev().map(Self::inverse).collect();
                Ok(Self::Sequence(inverses?))
            }
        }
    }

    /// Transforms an `N x D` coordinate table whose columns follow
    /// `input_axes`, returning an `N x output_axes.len()` table.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::CoordinateShape`] if the column count does
    /// not match `input_axes`, and propagates axis-projection failures from
    /// [`Transformation::to_affine_matrix`].
    pub fn apply(
        &self,
        coordinates: &DMatrix<f64>,
        input_axes: &[Axis],
        output_axes: &[Axis],
    ) -> TransformResult<DMatrix<f64>> {
        let (ni, no) = (input_axes.len(), output_axes.len());
        if coordinates.ncols() != ni {
            return Err(TransformError::CoordinateShape {
                columns: coordinates.ncols(),
                axes: ni,
            });
        }
        let m = self.to_affine_matrix(input_axes, output_axes)?;
        let n = coordinates.nrows();
        let mut homogeneous = DMatrix::from_element(ni + 1, n, 1.0);
        homogeneous
            .view_mut((0, 0), (ni, n))
            .copy_from(&coordinates.transpose());
        let mapped = m * homogeneous;
        Ok(mapped.view((0, 0), (no, n)).transpose().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    const YX: [Axis; 2] = [Axis::Y, Axis::X];
    const XY: [Axis; 2] = [Axis::X, Axis::Y];
    const CYX: [Axis; 3] = [Axis::C, Axis::Y, Axis::X];

    #[test]
    fn identity_matrix_is_identity() {
        let m = Transformation::identity()
            .to_affine_matrix(&YX, &YX)
            .unwrap();
        assert_eq!(m, DMatrix::identity(3, 3));
    }

    #[test]
    fn identity_reorders_axes_on_request() {
        let m = Transformation::identity()
            .to_affine_matrix(&YX, &XY)
            .unwrap();
        // output x copies input column 1, output y copies input column 0
        assert_eq!(m[(0, 1)], 1.0);
        assert_eq!(m[(1, 0)], 1.0);
        assert_eq!(m[(0, 0)], 0.0);
    }

    #[test]
    fn translation_embeds_offsets_in_last_column() {
        let t = Transformation::translation(vec![2.0, 3.0], YX.to_vec()).unwrap();
        let m = t.to_affine_matrix(&YX, &YX).unwrap();
        assert_eq!(m[(0, 2)], 2.0);
        assert_eq!(m[(1, 2)], 3.0);
        assert_eq!(m[(2, 2)], 1.0);
    }

    #[test]
    fn spatial_transform_passes_channel_axis_through() {
        let t = Transformation::scale(vec![2.0, 4.0], YX.to_vec()).unwrap();
        let m = t.to_affine_matrix(&CYX, &CYX).unwrap();
        assert_eq!(m[(0, 0)], 1.0); // c unchanged
        assert_eq!(m[(1, 1)], 2.0);
        assert_eq!(m[(2, 2)], 4.0);
    }

    #[test]
    fn map_axis_swaps_axes() {
        let t = Transformation::map_axis(vec![(Axis::X, Axis::Y), (Axis::Y, Axis::X)]);
        let m = t.to_affine_matrix(&XY, &XY).unwrap();
        assert_eq!(m[(0, 1)], 1.0);
        assert_eq!(m[(1, 0)], 1.0);
        assert_eq!(t.resulting_axes(&XY), vec![Axis::Y, Axis::X]);
    }

    #[test]
    fn renamed_away_axis_cannot_pass_through() {
        let t = Transformation::map_axis(vec![(Axis::X, Axis::Z)]);
        let result = t.to_affine_matrix(&XY, &XY);
        assert!(matches!(
            result,
            Err(TransformError::AxisMismatch { axis: Axis::X })
        ));
    }

    #[test]
    fn reduced_affine_form_is_augmented() {
        let reduced = dmatrix![
            2.0, 0.0, 1.0;
            0.0, 2.0, -1.0;
        ];
        let t = Transformation::affine(reduced, XY.to_vec(), XY.to_vec()).unwrap();
        let m = t.to_affine_matrix(&XY, &XY).unwrap();
        assert_eq!(m.nrows(), 3);
        assert_eq!(m[(2, 0)], 0.0);
        assert_eq!(m[(2, 2)], 1.0);
        assert_eq!(m[(0, 2)], 1.0);
    }

    #[test]
    fn bad_matrix_shape_is_rejected() {
        let wrong = DMatrix::zeros(4, 4);
        let result = Transformation::affine(wrong, XY.to_vec(), XY.to_vec());
        assert!(matches!(result, Err(TransformError::MatrixShape { .. })));
    }

    #[test]
    fn sequence_matrix_is_ordered_product() {
        let a = Transformation::scale(vec![2.0, 2.0], YX.to_vec()).unwrap();
        let b = Transformation::translation(vec![1.0, -1.0], YX.to_vec()).unwrap();
        let seq = Transformation::sequence(vec![a.clone(), b.clone()]);
        let expected = b.to_affine_matrix(&YX, &YX).unwrap() * a.to_affine_matrix(&YX, &YX).unwrap();
        let got = seq.to_affine_matrix(&YX, &YX).unwrap();
        assert_relative_eq!(got, expected, epsilon = 1e-12);
    }

    #[test]
    fn identity_in_sequence_is_neutral() {
        let a = Transformation::scale(vec![3.0, 0.5], YX.to_vec()).unwrap();
        let b = Transformation::translation(vec![1.0, 2.0], YX.to_vec()).unwrap();
        let plain = Transformation::sequence(vec![a.clone(), b.clone()])
            .to_affine_matrix(&YX, &YX)
            .unwrap();
        let padded = Transformation::sequence(vec![
            Transformation::identity(),
            a,
            Transformation::identity(),
            b,
            Transformation::identity(),
        ])
        .to_affine_matrix(&YX, &YX)
        .unwrap();
        assert_relative_eq!(plain, padded, epsilon = 1e-12);
    }

    #[test]
    fn sequence_inverse_reverses_stages() {
        let seq = Transformation::sequence(vec![
            Transformation::scale(vec![2.0, 4.0], YX.to_vec()).unwrap(),
            Transformation::translation(vec![1.0, -3.0], YX.to_vec()).unwrap(),
        ]);
        let m = seq.to_affine_matrix(&YX, &YX).unwrap();
        let mi = seq.inverse().unwrap().to_affine_matrix(&YX, &YX).unwrap();
        assert_relative_eq!(m * mi, DMatrix::identity(3, 3), epsilon = 1e-12);
    }

    #[test]
    fn zero_scale_is_not_invertible() {
        let t = Transformation::scale(vec![0.0, 2.0], YX.to_vec()).unwrap();
        assert!(matches!(t.inverse(), Err(TransformError::NonInvertible)));
    }

    #[test]
    fn singular_affine_is_not_invertible() {
        let singular = dmatrix![
            1.0, 1.0, 0.0;
            1.0, 1.0, 0.0;
        ];
        let t = Transformation::affine(singular, XY.to_vec(), XY.to_vec()).unwrap();
        assert!(matches!(t.inverse(), Err(TransformError::NonInvertible)));
    }

    #[test]
    fn non_bijective_rename_is_not_invertible() {
        let t = Transformation::map_axis(vec![(Axis::X, Axis::Z), (Axis::Y, Axis::Z)]);
        assert!(matches!(t.inverse(), Err(TransformError::NonInvertible)));
    }

    #[test]
    fn apply_respects_axis_names_not_positions() {
        // offsets declared in (y, x) order, coordinates stored in (x, y) order
        let t = Transformation::translation(vec![5.0, 7.0], YX.to_vec()).unwrap();
        let coords = dmatrix![0.0, 0.0; 1.0, 2.0];
        let out = t.apply(&coords, &XY, &XY).unwrap();
        assert_relative_eq!(out[(0, 0)], 7.0, epsilon = 1e-12);
        assert_relative_eq!(out[(0, 1)], 5.0, epsilon = 1e-12);
        assert_relative_eq!(out[(1, 0)], 8.0, epsilon = 1e-12);
        assert_relative_eq!(out[(1, 1)], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn apply_rejects_wrong_column_count() {
        let t = Transformation::identity();
        let coords = DMatrix::zeros(4, 3);
        let result = t.apply(&coords, &XY, &XY);
        assert!(matches!(result, Err(TransformError::CoordinateShape { .. })));
    }

    #[test]
    fn missing_axis_without_pass_through_fails() {
        let t = Transformation::affine(
            DMatrix::identity(3, 3),
            vec![Axis::X, Axis::Z],
            vec![Axis::X, Axis::Z],
        )
        .unwrap();
        // z is consumed by the transform but absent from the requested input
        let result = t.to_affine_matrix(&XY, &XY);
        assert!(matches!(result, Err(TransformError::AxisMismatch { .. })));
    }

    #[test]
    fn affine_inverse_round_trips_points() {
        let angle = std::f64::consts::FRAC_PI_3;
        let (s, c) = angle.sin_cos();
        let rotation = dmatrix![
            c, -s, 2.0;
            s, c, -1.0;
        ];
        let t = Transformation::affine(rotation, XY.to_vec(), XY.to_vec()).unwrap();
        let coords = dmatrix![1.0, 2.0; -3.0, 0.5; 10.0, -4.0];
        let there = t.apply(&coords, &XY, &XY).unwrap();
        let back = t.inverse().unwrap().apply(&there, &XY, &XY).unwrap();
        assert_relative_eq!(back, coords, epsilon = 1e-9);
    }
}
