//! Least-squares fitting of planar affine and similarity transforms.

use nalgebra::{DMatrix, DVector, Matrix2, Vector2};

use crate::error::{RegistrationError, RegistrationResult};

/// Fits a general planar affine mapping `src -> dst` by least squares.
///
/// Both inputs are `n x 2` row-per-point matrices. The result is the
/// augmented `3 x 3` matrix.
///
/// # Errors
///
/// Returns [`RegistrationError::DegenerateFit`] when the point
/// configuration leaves the six parameters underdetermined (e.g. all
/// points collinear).
pub fn fit_affine(src: &DMatrix<f64>, dst: &DMatrix<f64>) -> RegistrationResult<DMatrix<f64>> {
    let n = src.nrows();
    let mut design = DMatrix::zeros(2 * n, 6);
    let mut rhs = DVector::zeros(2 * n);
    for i in 0..n {
        let (x, y) = (src[(i, 0)], src[(i, 1)]);
        design[(2 * i, 0)] = x;
        design[(2 * i, 1)] = y;
        design[(2 * i, 2)] = 1.0;
        design[(2 * i + 1, 3)] = x;
        design[(2 * i + 1, 4)] = y;
        design[(2 * i + 1, 5)] = 1.0;
        rhs[2 * i] = dst[(i, 0)];
        rhs[2 * i + 1] = dst[(i, 1)];
    }
    let svd = design.svd(true, true);
    if svd.singular_values.iter().any(|&s| s < 1e-10) {
        return Err(RegistrationError::DegenerateFit);
    }
    let params = svd
        .solve(&rhs, 1e-10)
        .map_err(|_| RegistrationError::DegenerateFit)?;
    let mut matrix = DMatrix::identity(3, 3);
    matrix[(0, 0)] = params[0];
    matrix[(0, 1)] = params[1];
    matrix[(0, 2)] = params[2];
    matrix[(1, 0)] = params[3];
    matrix[(1, 1)] = params[4];
    matrix[(1, 2)] = params[5];
    Ok(matrix)
}

/// Fits a planar similarity (uniform scale, rotation, translation)
/// mapping `src -> dst` by least squares, Umeyama's method.
///
/// The rotation is constrained to be proper (determinant `+1`), so
/// reflections are never produced; callers wanting reflection support
/// must flip the source points first.
///
/// # Errors
///
/// Returns [`RegistrationError::DegenerateFit`] when the source points
/// coincide or the covariance has no usable decomposition.
pub fn fit_similarity(src: &DMatrix<f64>, dst: &DMatrix<f64>) -> RegistrationResult<DMatrix<f64>> {
    let n = src.nrows() as f64;
    let mu_src = Vector2::new(src.column(0).mean(), src.column(1).mean());
    let mu_dst = Vector2::new(dst.column(0).mean(), dst.column(1).mean());

    let mut sigma = Matrix2::zeros();
    let mut var_src = 0.0;
    for i in 0..src.nrows() {
        let s = Vector2::new(src[(i, 0)], src[(i, 1)]) - mu_src;
        let d = Vector2::new(dst[(i, 0)], dst[(i, 1)]) - mu_dst;
        sigma += d * s.transpose();
        var_src += s.norm_squared();
    }
    sigma /= n;
    var_src /= n;
    if var_src < 1e-12 {
        return Err(RegistrationError::DegenerateFit);
    }

    let svd = sigma.svd(true, true);
    let u = svd.u.ok_or(RegistrationError::DegenerateFit)?;
    let v_t = svd.v_t.ok_or(RegistrationError::DegenerateFit)?;
    // keep the rotation proper
    let sign = if (u.determinant() * v_t.determinant()) < 0.0 {
        -1.0
    } else {
        1.0
    };
    let s = Matrix2::new(1.0, 0.0, 0.0, sign);
    let rotation = u * s * v_t;
    let scale = (svd.singular_values[0] + sign * svd.singular_values[1]) / var_src;
    let translation = mu_dst - scale * rotation * mu_src;

    let mut matrix = DMatrix::identity(3, 3);
    for r in 0..2 {
        for c in 0..2 {
            matrix[(r, c)] = scale * rotation[(r, c)];
        }
        matrix[(r, 2)] = translation[r];
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    fn apply(matrix: &DMatrix<f64>, points: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(points.nrows(), 2, |r, c| {
            matrix[(c, 0)] * points[(r, 0)] + matrix[(c, 1)] * points[(r, 1)] + matrix[(c, 2)]
        })
    }

    #[test]
    fn affine_fit_recovers_exact_mapping() {
        let src = dmatrix![0.0, 0.0; 1.0, 0.0; 0.0, 1.0; 1.0, 1.0];
        let truth = dmatrix![
            2.0, 0.5, 3.0;
            -0.5, 1.5, -1.0;
            0.0, 0.0, 1.0;
        ];
        let dst = apply(&truth, &src);
        let fitted = fit_affine(&src, &dst).unwrap();
        for (a, b) in fitted.iter().zip(truth.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn affine_fit_rejects_collinear_points() {
        let src = dmatrix![0.0, 0.0; 1.0, 1.0; 2.0, 2.0];
        let dst = src.clone();
        assert!(matches!(
            fit_affine(&src, &dst),
            Err(RegistrationError::DegenerateFit)
        ));
    }

    #[test]
    fn similarity_fit_recovers_rotation_scale_translation() {
        let src = dmatrix![0.0, 0.0; 10.0, 0.0; 0.0, 10.0; 10.0, 10.0];
        let angle = std::f64::consts::FRAC_PI_6;
        let (sin, cos) = angle.sin_cos();
        let scale = 2.5;
        let truth = dmatrix![
            scale * cos, -scale * sin, 4.0;
            scale * sin, scale * cos, -7.0;
            0.0, 0.0, 1.0;
        ];
        let dst = apply(&truth, &src);
        let fitted = fit_similarity(&src, &dst).unwrap();
        for (a, b) in fitted.iter().zip(truth.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn similarity_fit_never_reflects() {
        // mirrored correspondence, best proper fit cannot reproduce it
        let src = dmatrix![0.0, 0.0; 10.0, 0.0; 0.0, 10.0];
        let dst = dmatrix![0.0, 0.0; -10.0, 0.0; 0.0, 10.0];
        let fitted = fit_similarity(&src, &dst).unwrap();
        let det = fitted[(0, 0)] * fitted[(1, 1)] - fitted[(0, 1)] * fitted[(1, 0)];
        assert!(det > 0.0, "similarity fit must stay proper, det = {det}");
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let src = dmatrix![1.0, 1.0; 1.0, 1.0; 1.0, 1.0];
        let dst = dmatrix![0.0, 0.0; 1.0, 0.0; 0.0, 1.0];
        assert!(matches!(
            fit_similarity(&src, &dst),
            Err(RegistrationError::DegenerateFit)
        ));
    }
}
