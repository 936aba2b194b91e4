//! End-to-end checks of the transform engine across element kinds.

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use nalgebra::dmatrix;
use ndarray::{Array, ArrayD, IxDyn};

use atlas_elements::{
    set_transformation, AnnotationTable, Dataset, MultiscaleRaster, PointTable, Raster,
    RasterKind, SpatialElement,
};
use atlas_ops::{transform, transform_dataset};
use atlas_transform::{Axis, Transformation, DEFAULT_COORDINATE_SYSTEM};

const XY: [Axis; 2] = [Axis::X, Axis::Y];
const YX: [Axis; 2] = [Axis::Y, Axis::X];

fn labels(shape: &[usize]) -> Raster {
    let len: usize = shape.iter().product();
    let data = Array::from_shape_vec(IxDyn(shape), (0..len).map(|i| i as f64).collect()).unwrap();
    Raster::parse(data, vec![Axis::Y, Axis::X], RasterKind::Labels, None).unwrap()
}

fn rotation(angle: f64) -> Transformation {
    let (s, c) = angle.sin_cos();
    let matrix = dmatrix![
        c, -s, 0.0;
        s, c, 0.0;
    ];
    Transformation::affine(matrix, YX.to_vec(), YX.to_vec()).unwrap()
}

#[test]
fn rotation_by_45_degrees_grows_the_bounding_box() {
    let raster = labels(&[10, 10]);
    let out = match transform(
        &SpatialElement::Raster(raster),
        &rotation(std::f64::consts::FRAC_PI_4),
        false,
    )
    .unwrap()
    {
        SpatialElement::Raster(r) => r,
        other => panic!("expected a raster, got {}", other.kind_name()),
    };
    // the rotated 10x10 square spans 10 * sqrt(2) along both axes
    assert_eq!(out.shape(), &[14, 14]);

    // the compensating translation is the minimum rotated corner
    match out.graph().get(DEFAULT_COORDINATE_SYSTEM).unwrap() {
        Transformation::Sequence(stages) => match &stages[0] {
            Transformation::Translation { offsets, .. } => {
                assert_relative_eq!(offsets[0], -10.0 / std::f64::consts::SQRT_2, epsilon = 1e-9);
                assert_relative_eq!(offsets[1], 0.0, epsilon = 1e-9);
            }
            other => panic!("expected a translation prefix, got {other:?}"),
        },
        other => panic!("expected a sequence, got {other:?}"),
    }
}

#[test]
fn pure_rotation_about_the_origin_permutes_the_grid() {
    let raster = labels(&[4, 4]);
    let input = raster.data().clone();
    let out = match transform(
        &SpatialElement::Raster(raster),
        &rotation(std::f64::consts::FRAC_PI_2),
        false,
    )
    .unwrap()
    {
        SpatialElement::Raster(r) => r,
        other => panic!("expected a raster, got {}", other.kind_name()),
    };
    // a quarter turn keeps the shape
    assert_eq!(out.shape(), &[4, 4]);
    // interior voxels are a permutation of the input grid
    for i in 1..4 {
        for j in 0..4 {
            assert_eq!(
                out.data()[IxDyn(&[i, j])],
                input[IxDyn(&[j, 4 - i])],
                "voxel ({i}, {j})"
            );
        }
    }
}

#[test]
fn channel_axis_passes_through_a_spatial_transform() {
    let mut data = ArrayD::zeros(IxDyn(&[2, 4, 4]));
    data.index_axis_mut(ndarray::Axis(0), 0).fill(1.0);
    data.index_axis_mut(ndarray::Axis(0), 1).fill(2.0);
    let image = Raster::parse(
        data,
        vec![Axis::C, Axis::Y, Axis::X],
        RasterKind::Image,
        None,
    )
    .unwrap();
    let scale = Transformation::scale(vec![2.0, 2.0], YX.to_vec()).unwrap();
    let out = match transform(&SpatialElement::Raster(image), &scale, false).unwrap() {
        SpatialElement::Raster(r) => r,
        other => panic!("expected a raster, got {}", other.kind_name()),
    };
    assert_eq!(out.shape(), &[2, 8, 8]);
    assert_relative_eq!(out.data()[IxDyn(&[0, 0, 0])], 1.0, epsilon = 1e-12);
    assert_relative_eq!(out.data()[IxDyn(&[1, 0, 0])], 2.0, epsilon = 1e-12);
}

#[test]
fn raster_scale_round_trip_restores_the_data() {
    let original = labels(&[4, 4]);
    let image = Raster::parse(
        original.data().clone(),
        vec![Axis::Y, Axis::X],
        RasterKind::Image,
        None,
    )
    .unwrap();
    let double = Transformation::scale(vec![2.0, 2.0], YX.to_vec()).unwrap();
    let up = transform(&SpatialElement::Raster(image), &double, false).unwrap();
    let down = match transform(&up, &double.inverse().unwrap(), false).unwrap() {
        SpatialElement::Raster(r) => r,
        other => panic!("expected a raster, got {}", other.kind_name()),
    };
    assert_eq!(down.shape(), &[4, 4]);
    for (a, b) in down.data().iter().zip(original.data().iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-9);
    }
}

#[test]
fn multiscale_levels_stay_mutually_consistent() {
    let base = ArrayD::zeros(IxDyn(&[1, 8, 8]));
    let pyramid = MultiscaleRaster::parse(
        base,
        vec![Axis::C, Axis::Y, Axis::X],
        RasterKind::Image,
        None,
        &[2],
    )
    .unwrap();
    let scale = Transformation::scale(vec![2.0, 2.0], YX.to_vec()).unwrap();
    let out = match transform(&SpatialElement::Multiscale(pyramid), &scale, false).unwrap() {
        SpatialElement::Multiscale(m) => m,
        other => panic!("expected a pyramid, got {}", other.kind_name()),
    };
    assert_eq!(out.level(0).unwrap().shape(), &[1, 16, 16]);
    assert_eq!(out.level(1).unwrap().shape(), &[1, 8, 8]);
    // the level-to-base factor is unchanged by the transform
    match out.level_scale(1) {
        Transformation::Scale { factors, .. } => {
            assert_relative_eq!(factors[1], 2.0, epsilon = 1e-12);
            assert_relative_eq!(factors[2], 2.0, epsilon = 1e-12);
        }
        other => panic!("expected a scale, got {other:?}"),
    }
}

#[test]
fn translated_point_keeps_its_mapped_position() {
    // offsets declared over (y, x), the table stores (x, y)
    let points = PointTable::parse(
        dmatrix![0.0, 0.0],
        XY.to_vec(),
        BTreeMap::new(),
        None,
    )
    .unwrap();
    let shift = Transformation::translation(vec![5.0, 5.0], YX.to_vec()).unwrap();
    let out = match transform(&SpatialElement::Points(points), &shift, true).unwrap() {
        SpatialElement::Points(p) => p,
        other => panic!("expected points, got {}", other.kind_name()),
    };
    // stored coordinate moved
    assert_relative_eq!(out.coords()[(0, 0)], 5.0, epsilon = 1e-12);
    assert_relative_eq!(out.coords()[(0, 1)], 5.0, epsilon = 1e-12);
    // mapped position in the original coordinate system is unchanged
    let t = out.graph().get(DEFAULT_COORDINATE_SYSTEM).unwrap();
    let mapped = t.apply(out.coords(), &XY, &XY).unwrap();
    assert_relative_eq!(mapped[(0, 0)], 0.0, epsilon = 1e-12);
    assert_relative_eq!(mapped[(0, 1)], 0.0, epsilon = 1e-12);
}

#[test]
fn maintain_positioning_round_trip_restores_graph_content() {
    let (s, c) = std::f64::consts::FRAC_PI_6.sin_cos();
    let t = Transformation::affine(
        dmatrix![
            2.0 * c, -2.0 * s, 3.0;
            2.0 * s, 2.0 * c, -1.0;
        ],
        XY.to_vec(),
        XY.to_vec(),
    )
    .unwrap();

    let mut element = SpatialElement::Points(
        PointTable::parse(dmatrix![1.0, 2.0; -4.0, 0.5], XY.to_vec(), BTreeMap::new(), None)
            .unwrap(),
    );
    set_transformation(
        &mut element,
        Transformation::translation(vec![7.0, -3.0], XY.to_vec()).unwrap(),
        Some("physical"),
    )
    .unwrap();
    let before = element.graph().unwrap().to_map();

    let there = transform(&element, &t, true).unwrap();
    let back = transform(&there, &t.inverse().unwrap(), true).unwrap();

    // stored coordinates return to their originals
    let original = match &element {
        SpatialElement::Points(p) => p.coords().clone(),
        other => panic!("expected points, got {}", other.kind_name()),
    };
    match &back {
        SpatialElement::Points(p) => {
            for (a, b) in p.coords().iter().zip(original.iter()) {
                assert_relative_eq!(a, b, epsilon = 1e-9);
            }
        }
        other => panic!("expected points, got {}", other.kind_name()),
    }

    // every coordinate system still materializes to its original mapping
    for (name, original_t) in &before {
        let restored = back.graph().unwrap().get(name).unwrap();
        let expected = original_t.to_affine_matrix(&XY, &XY).unwrap();
        let got = restored.to_affine_matrix(&XY, &XY).unwrap();
        for (a, b) in got.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }
}

#[test]
fn transforming_one_element_leaves_others_untouched() {
    let make_points = || {
        PointTable::parse(dmatrix![1.0, 1.0], XY.to_vec(), BTreeMap::new(), None).unwrap()
    };
    let first = SpatialElement::Points(make_points());
    let second = SpatialElement::Points(make_points());
    let before = second.graph().unwrap().clone();

    let shift = Transformation::translation(vec![3.0, 3.0], XY.to_vec()).unwrap();
    let _ = transform(&first, &shift, true).unwrap();

    // the inputs are never mutated
    assert_eq!(second.graph().unwrap(), &before);
    assert_eq!(
        first.graph().unwrap().get(DEFAULT_COORDINATE_SYSTEM),
        Some(&Transformation::Identity)
    );
}

#[test]
fn dataset_transform_carries_tables_through() {
    let mut dataset = Dataset::new();
    let points =
        PointTable::parse(dmatrix![1.0, 2.0], XY.to_vec(), BTreeMap::new(), None).unwrap();
    dataset
        .insert("spots", SpatialElement::Points(points))
        .unwrap();
    let table = AnnotationTable::parse(
        vec!["spots".into()],
        "region",
        "instance_id",
        vec!["spots".into()],
        vec![0],
        BTreeMap::new(),
    )
    .unwrap();
    dataset
        .insert("measurements", SpatialElement::Table(table))
        .unwrap();

    let shift = Transformation::translation(vec![10.0, 0.0], XY.to_vec()).unwrap();
    let out = transform_dataset(&dataset, &shift, false).unwrap();

    match out.get("spots").unwrap() {
        SpatialElement::Points(p) => {
            assert_relative_eq!(p.coords()[(0, 0)], 11.0, epsilon = 1e-12);
        }
        other => panic!("expected points, got {}", other.kind_name()),
    }
    match out.get("measurements").unwrap() {
        SpatialElement::Table(t) => assert_eq!(t.len(), 1),
        other => panic!("expected a table, got {}", other.kind_name()),
    }
}
