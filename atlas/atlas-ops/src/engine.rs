//! Type-dispatched application of transformations to elements.
//!
//! Raster elements are resampled into the transformed bounding box of
//! their spatial extent; the compensating translation that re-aligns the
//! output grid with the original positioning is folded back into the
//! element's transformation graph. Vector elements (points, shapes) have
//! their coordinates mapped directly.

use nalgebra::DMatrix;
use ndarray::ArrayD;
use tracing::{debug, info};

use atlas_elements::{
    Dataset, MultiscaleRaster, PointTable, Raster, RasterKind, ShapeCollection, SpatialElement,
};
use atlas_transform::{
    spatial_axes, Axis, TransformGraph, Transformation, DEFAULT_COORDINATE_SYSTEM,
};

use crate::error::{OpsError, OpsResult};
use crate::resample::{resample, Interpolation};

/// Resamples raster data under `transformation` and returns the new grid
/// together with the compensating translation (the minimum corner of the
/// transformed bounding box, over the spatial axes).
fn transform_raster_data(
    data: &ArrayD<f64>,
    axes: &[Axis],
    transformation: &Transformation,
    interpolation: Interpolation,
) -> OpsResult<(ArrayD<f64>, Transformation)> {
    let spatial = spatial_axes(axes);
    let k = spatial.len();
    let non_spatial = axes.len() - k;
    let spatial_shape = &data.shape()[non_spatial..];

    let matrix = transformation.to_affine_matrix(&spatial, &spatial)?;

    // push the 2^k corners of [0, shape] through the forward transformation
    let mut mins = vec![f64::INFINITY; k];
    let mut maxs = vec![f64::NEG_INFINITY; k];
    for corner in 0..(1usize << k) {
        let mut v = DMatrix::zeros(k + 1, 1);
        for d in 0..k {
            if (corner >> d) & 1 == 1 {
                v[(d, 0)] = spatial_shape[d] as f64;
            }
        }
        v[(k, 0)] = 1.0;
        let moved = &matrix * v;
        for d in 0..k {
            mins[d] = mins[d].min(moved[(d, 0)]);
            maxs[d] = maxs[d].max(moved[(d, 0)]);
        }
    }
    let out_spatial_shape: Vec<usize> = mins
        .iter()
        .zip(&maxs)
        .map(|(lo, hi)| (hi - lo) as usize)
        .collect();
    let translation = Transformation::translation(mins, spatial.clone())?;

    // output voxel -> input coordinates
    let pullback = Transformation::sequence(vec![
        translation.clone(),
        transformation.inverse()?,
    ])
    .to_affine_matrix(&spatial, &spatial)?;

    debug!(
        input = ?spatial_shape,
        output = ?out_spatial_shape,
        "resampling raster"
    );
    let out = resample(data, non_spatial, &pullback, &out_spatial_shape, interpolation)?;
    Ok((out, translation))
}

/// The interpolation appropriate for a raster kind.
const fn interpolation_for(kind: RasterKind) -> Interpolation {
    match kind {
        RasterKind::Image => Interpolation::Linear,
        RasterKind::Labels => Interpolation::Nearest,
    }
}

/// What to fold into the graph after the data has been transformed.
///
/// Raster data moves to a new grid, so its graph always absorbs the
/// compensating translation; with `maintain_positioning` the inverse of the
/// applied transformation is absorbed as well, leaving every mapped
/// position unchanged.
fn graph_prefix(
    transformation: &Transformation,
    raster_translation: Option<Transformation>,
    maintain_positioning: bool,
) -> OpsResult<Option<Transformation>> {
    let prefix = match (raster_translation, maintain_positioning) {
        (Some(translation), true) => Some(Transformation::sequence(vec![
            translation,
            transformation.inverse()?,
        ])),
        (Some(translation), false) => Some(translation),
        (None, true) => Some(transformation.inverse()?),
        (None, false) => None,
    };
    Ok(prefix)
}

fn apply_graph_prefix(graph: &mut TransformGraph, prefix: Option<Transformation>) {
    if graph.is_empty() {
        info!(
            coordinate_system = DEFAULT_COORDINATE_SYSTEM,
            "element has no transformations, adding a default identity"
        );
        graph.set(DEFAULT_COORDINATE_SYSTEM, Transformation::identity());
    }
    if let Some(prefix) = prefix {
        graph.prepend_all(&prefix);
    }
}

fn transform_raster(
    raster: &Raster,
    transformation: &Transformation,
    maintain_positioning: bool,
) -> OpsResult<Raster> {
    let (data, translation) = transform_raster_data(
        raster.data(),
        raster.axes(),
        transformation,
        interpolation_for(raster.kind()),
    )?;
    let mut out = Raster::parse(data, raster.axes().to_vec(), raster.kind(), None)?;
    *out.graph_mut() = raster.graph().clone();
    let prefix = graph_prefix(transformation, Some(translation), maintain_positioning)?;
    apply_graph_prefix(out.graph_mut(), prefix);
    Ok(out)
}

fn transform_multiscale(
    pyramid: &MultiscaleRaster,
    transformation: &Transformation,
    maintain_positioning: bool,
) -> OpsResult<MultiscaleRaster> {
    let interpolation = interpolation_for(pyramid.kind());
    let mut levels = Vec::with_capacity(pyramid.level_count());
    let mut base_translation = None;
    for (index, level) in pyramid.levels().iter().enumerate() {
        // conjugate into level coordinates: level -> base, transform, back
        let composed = if index == 0 {
            transformation.clone()
        } else {
            let scale = pyramid.level_scale(index);
            Transformation::sequence(vec![scale.clone(), transformation.clone(), scale.inverse()?])
        };
        let (data, translation) =
            transform_raster_data(level, pyramid.axes(), &composed, interpolation)?;
        if index == 0 {
            base_translation = Some(translation);
        }
        levels.push(data);
    }
    let mut out = MultiscaleRaster::from_levels(
        levels,
        pyramid.axes().to_vec(),
        pyramid.kind(),
        pyramid.graph().clone(),
    )?;
    let prefix = graph_prefix(transformation, base_translation, maintain_positioning)?;
    apply_graph_prefix(out.graph_mut(), prefix);
    Ok(out)
}

fn transform_points(
    points: &PointTable,
    transformation: &Transformation,
    maintain_positioning: bool,
) -> OpsResult<PointTable> {
    let axes = points.axes().to_vec();
    let moved = transformation.apply(points.coords(), &axes, &axes)?;
    let mut out = points.with_coords(moved)?;
    let prefix = graph_prefix(transformation, None, maintain_positioning)?;
    apply_graph_prefix(out.graph_mut(), prefix);
    Ok(out)
}

fn transform_shapes(
    shapes: &ShapeCollection,
    transformation: &Transformation,
    maintain_positioning: bool,
) -> OpsResult<ShapeCollection> {
    let mut out = shapes.map_vertices(transformation)?;
    let prefix = graph_prefix(transformation, None, maintain_positioning)?;
    apply_graph_prefix(out.graph_mut(), prefix);
    Ok(out)
}

/// Applies `transformation` to an element's data and returns the
/// transformed element.
///
/// With `maintain_positioning` the element's transformation graph is
/// rewritten so every coordinate system still sees the element at its old
/// position; without it the data moves and only the raster grid
/// compensation (for raster kinds) is folded into the graph.
///
/// # Errors
///
/// Returns [`OpsError::UnsupportedElementType`] for annotation tables and
/// propagates transformation and resampling failures.
///
/// # Example
///
/// ```
/// use atlas_elements::{PointTable, SpatialElement};
/// use atlas_ops::transform;
/// use atlas_transform::{Axis, Transformation};
/// use nalgebra::dmatrix;
/// use std::collections::BTreeMap;
///
/// let points = PointTable::parse(
///     dmatrix![1.0, 2.0],
///     vec![Axis::X, Axis::Y],
///     BTreeMap::new(),
///     None,
/// )
/// .unwrap();
/// let shift = Transformation::translation(vec![10.0, 0.0], vec![Axis::X, Axis::Y]).unwrap();
/// let moved = transform(&SpatialElement::Points(points), &shift, false).unwrap();
/// match moved {
///     SpatialElement::Points(p) => assert_eq!(p.coords()[(0, 0)], 11.0),
///     _ => unreachable!(),
/// }
/// ```
pub fn transform(
    element: &SpatialElement,
    transformation: &Transformation,
    maintain_positioning: bool,
) -> OpsResult<SpatialElement> {
    match element {
        SpatialElement::Raster(r) => Ok(SpatialElement::Raster(transform_raster(
            r,
            transformation,
            maintain_positioning,
        )?)),
        SpatialElement::Multiscale(m) => Ok(SpatialElement::Multiscale(transform_multiscale(
            m,
            transformation,
            maintain_positioning,
        )?)),
        SpatialElement::Points(p) => Ok(SpatialElement::Points(transform_points(
            p,
            transformation,
            maintain_positioning,
        )?)),
        SpatialElement::Shapes(s) => Ok(SpatialElement::Shapes(transform_shapes(
            s,
            transformation,
            maintain_positioning,
        )?)),
        SpatialElement::Table(_) => Err(OpsError::UnsupportedElementType {
            kind: element.kind_name(),
        }),
    }
}

/// Applies one transformation to every coordinate-bearing element of a
/// dataset. Annotation tables are carried over unchanged.
///
/// # Errors
///
/// Propagates the first element-level failure.
pub fn transform_dataset(
    dataset: &Dataset,
    transformation: &Transformation,
    maintain_positioning: bool,
) -> OpsResult<Dataset> {
    let mut out = Dataset::new();
    for (name, element) in dataset.iter() {
        let transformed = match element {
            SpatialElement::Table(_) => element.clone(),
            _ => transform(element, transformation, maintain_positioning)?,
        };
        out.insert(name, transformed)?;
    }
    Ok(out)
}
