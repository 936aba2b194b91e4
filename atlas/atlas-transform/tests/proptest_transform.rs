//! Property-based tests for the transformation algebra.
//!
//! Run with: cargo test -p atlas-transform -- proptest

use atlas_transform::{Axis, Transformation};
use nalgebra::{dmatrix, DMatrix};
use proptest::prelude::*;

const XY: [Axis; 2] = [Axis::X, Axis::Y];

/// Generate a rotation + anisotropic scale + translation with a linear part
/// that is comfortably invertible.
fn arb_invertible_affine() -> impl Strategy<Value = Transformation> {
    (
        0.0..std::f64::consts::TAU,
        0.2..5.0f64,
        0.2..5.0f64,
        -50.0..50.0f64,
        -50.0..50.0f64,
    )
        .prop_map(|(angle, sx, sy, tx, ty)| {
            let (s, c) = angle.sin_cos();
            let matrix = dmatrix![
                c * sx, -s * sy, tx;
                s * sx, c * sy, ty;
            ];
            Transformation::affine(matrix, XY.to_vec(), XY.to_vec()).unwrap()
        })
}

fn arb_points() -> impl Strategy<Value = DMatrix<f64>> {
    prop::collection::vec((-100.0..100.0f64, -100.0..100.0f64), 1..20).prop_map(|rows| {
        DMatrix::from_fn(rows.len(), 2, |r, c| if c == 0 { rows[r].0 } else { rows[r].1 })
    })
}

proptest! {
    #[test]
    fn inverse_round_trips_coordinates(t in arb_invertible_affine(), points in arb_points()) {
        let there = t.apply(&points, &XY, &XY).unwrap();
        let back = t.inverse().unwrap().apply(&there, &XY, &XY).unwrap();
        for (a, b) in back.iter().zip(points.iter()) {
            prop_assert!((a - b).abs() < 1e-6, "round trip drifted: {a} vs {b}");
        }
    }

    #[test]
    fn sequence_matrix_matches_ordered_product(
        a in arb_invertible_affine(),
        b in arb_invertible_affine(),
    ) {
        let seq = Transformation::sequence(vec![a.clone(), b.clone()]);
        let expected = b.to_affine_matrix(&XY, &XY).unwrap() * a.to_affine_matrix(&XY, &XY).unwrap();
        let got = seq.to_affine_matrix(&XY, &XY).unwrap();
        for (x, y) in got.iter().zip(expected.iter()) {
            prop_assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn identity_composition_is_neutral(t in arb_invertible_affine()) {
        let padded = Transformation::sequence(vec![
            Transformation::identity(),
            t.clone(),
            Transformation::identity(),
        ]);
        let got = padded.to_affine_matrix(&XY, &XY).unwrap();
        let expected = t.to_affine_matrix(&XY, &XY).unwrap();
        for (x, y) in got.iter().zip(expected.iter()) {
            prop_assert!((x - y).abs() < 1e-12);
        }
    }
}
