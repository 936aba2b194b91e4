//! Dense raster elements: single-resolution grids and multiscale pyramids.

use ndarray::{ArrayD, Dimension, IxDyn};
use tracing::debug;

use atlas_transform::{Axis, TransformGraph, Transformation};

use crate::error::{ElementError, ElementResult};

/// Canonical raster axis order.
const CANONICAL: [Axis; 4] = [Axis::C, Axis::Z, Axis::Y, Axis::X];

/// Distinguishes continuous-valued images from integer-valued label maps.
///
/// The distinction drives resampling: label maps must be interpolated with
/// nearest-neighbour lookups so label identities survive, images use
/// multilinear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterKind {
    /// Continuous-valued intensity data, one or more channels.
    Image,
    /// Integer-valued label map, no channel axis.
    Labels,
}

/// A single-resolution dense raster grid.
///
/// Axes follow the canonical order, an ordered subset of `(c, z, y, x)`:
/// images carry a leading channel axis, label maps are purely spatial.
/// Spatial axes are always the trailing dimensions.
///
/// # Example
///
/// ```
/// use atlas_elements::{Raster, RasterKind};
/// use atlas_transform::Axis;
/// use ndarray::ArrayD;
///
/// let data = ArrayD::zeros(ndarray::IxDyn(&[3, 10, 10]));
/// let raster = Raster::parse(
///     data,
///     vec![Axis::C, Axis::Y, Axis::X],
///     RasterKind::Image,
///     None,
/// )
/// .unwrap();
/// assert_eq!(raster.spatial_shape(), &[10, 10]);
/// ```
#[derive(Debug, Clone)]
pub struct Raster {
    data: ArrayD<f64>,
    axes: Vec<Axis>,
    kind: RasterKind,
    transformations: TransformGraph,
}

fn check_raster_axes(axes: &[Axis], kind: RasterKind) -> ElementResult<()> {
    let positions: Vec<usize> = axes
        .iter()
        .map(|a| CANONICAL.iter().position(|c| c == a))
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| ElementError::InvalidRasterAxes {
            axes: axes.to_vec(),
        })?;
    let ordered = positions.windows(2).all(|w| w[0] < w[1]);
    let has_plane = axes.contains(&Axis::Y) && axes.contains(&Axis::X);
    let channel_ok = match kind {
        RasterKind::Image => axes.contains(&Axis::C),
        RasterKind::Labels => !axes.contains(&Axis::C),
    };
    if !ordered || !has_plane || !channel_ok {
        return Err(ElementError::InvalidRasterAxes {
            axes: axes.to_vec(),
        });
    }
    Ok(())
}

impl Raster {
    /// Parses raster data into an element, validating axes against the
    /// canonical order and attaching the given transformation (or a default
    /// identity into the default coordinate system) to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::InvalidRasterAxes`] for out-of-order or
    /// unsupported axes and [`ElementError::DimensionMismatch`] when the
    /// array dimensionality disagrees with the axis count.
    pub fn parse(
        data: ArrayD<f64>,
        axes: Vec<Axis>,
        kind: RasterKind,
        transform: Option<Transformation>,
    ) -> ElementResult<Self> {
        check_raster_axes(&axes, kind)?;
        if data.ndim() != axes.len() {
            return Err(ElementError::DimensionMismatch {
                data_dims: data.ndim(),
                axis_count: axes.len(),
            });
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
            data,
            axes,
            kind,
            transformations,
        })
    }

    /// The raw grid data.
    #[must_use]
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// The intrinsic axes, canonical order.
    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Whether this raster is an image or a label map.
    #[must_use]
    pub const fn kind(&self) -> RasterKind {
        self.kind
    }

    /// The full array shape, axis order.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// The shape of the trailing spatial axes.
    #[must_use]
    pub fn spatial_shape(&self) -> &[usize] {
        let spatial = self.axes.iter().filter(|a| a.is_spatial()).count();
        &self.data.shape()[self.data.ndim() - spatial..]
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
    /// Returns the same errors as [`Raster::parse`].
    pub fn validate(&self) -> ElementResult<()> {
        check_raster_axes(&self.axes, self.kind)?;
        if self.data.ndim() != self.axes.len() {
            return Err(ElementError::DimensionMismatch {
                data_dims: self.data.ndim(),
                axis_count: self.axes.len(),
            });
        }
        Ok(())
    }
}

/// A multiresolution raster pyramid.
///
/// Level 0 is the full-resolution base; every further level downsamples the
/// spatial axes. All levels share axes, kind and one transformation graph
/// declared for base-level coordinates.
#[derive(Debug, Clone)]
pub struct MultiscaleRaster {
    levels: Vec<ArrayD<f64>>,
    axes: Vec<Axis>,
    kind: RasterKind,
    transformations: TransformGraph,
}

impl MultiscaleRaster {
    /// Builds a pyramid from base data and successive integer scale factors.
    ///
    /// Each factor downsamples the previous level: block-mean for images,
    /// stride subsampling for label maps (so label identities survive).
    ///
    /// # Errors
    ///
    /// Returns the same schema errors as [`Raster::parse`].
    pub fn parse(
        data: ArrayD<f64>,
        axes: Vec<Axis>,
        kind: RasterKind,
        transform: Option<Transformation>,
        scale_factors: &[usize],
    ) -> ElementResult<Self> {
        let base = Raster::parse(data, axes, kind, transform)?;
        let mut levels = vec![base.data.clone()];
        for &factor in scale_factors {
            let previous = match levels.last() {
                Some(level) => level,
                None => break,
            };
            let next = downsample(previous, &base.axes, factor.max(1), kind);
            debug!(
                from = ?previous.shape(),
                to = ?next.shape(),
                factor,
                "built pyramid level"
            );
            levels.push(next);
        }
        Ok(Self {
            levels,
            axes: base.axes,
            kind,
            transformations: base.transformations,
        })
    }

    /// Assembles a pyramid from precomputed levels.
    ///
    /// # Errors
    ///
    /// Fails when no level is given, when a level's dimensionality differs
    /// from the axis count, or when spatial shapes do not shrink
    /// monotonically.
    pub fn from_levels(
        levels: Vec<ArrayD<f64>>,
        axes: Vec<Axis>,
        kind: RasterKind,
        transformations: TransformGraph,
    ) -> ElementResult<Self> {
        check_raster_axes(&axes, kind)?;
        if levels.is_empty() {
            return Err(ElementError::SchemaValidation {
                reason: "multiscale raster needs at least one level".into(),
            });
        }
        for level in &levels {
            if level.ndim() != axes.len() {
                return Err(ElementError::DimensionMismatch {
                    data_dims: level.ndim(),
                    axis_count: axes.len(),
                });
            }
        }
        let spatial = axes.iter().filter(|a| a.is_spatial()).count();
        let non_spatial = axes.len() - spatial;
        for pair in levels.windows(2) {
            let coarser_not_larger = pair[0].shape()[non_spatial..]
                .iter()
                .zip(&pair[1].shape()[non_spatial..])
                .all(|(a, b)| b <= a);
            if !coarser_not_larger {
                return Err(ElementError::SchemaValidation {
                    reason: "pyramid levels must shrink along spatial axes".into(),
                });
            }
        }
        Ok(Self {
            levels,
            axes,
            kind,
            transformations,
        })
    }

    /// Number of resolution levels.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// The data of one resolution level.
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&ArrayD<f64>> {
        self.levels.get(index)
    }

    /// All levels, base first.
    #[must_use]
    pub fn levels(&self) -> &[ArrayD<f64>] {
        &self.levels
    }

    /// The intrinsic axes, canonical order.
    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Whether this pyramid holds images or label maps.
    #[must_use]
    pub const fn kind(&self) -> RasterKind {
        self.kind
    }

    /// The scale transformation carrying level-`index` coordinates into
    /// base-level coordinates. Non-spatial axes keep factor 1.
    #[must_use]
    pub fn level_scale(&self, index: usize) -> Transformation {
        let base_shape = self.levels[0].shape();
        let level_shape = self.levels[index].shape();
        let factors: Vec<f64> = self
            .axes
            .iter()
            .enumerate()
            .map(|(i, a)| {
                if a.is_spatial() && level_shape[i] > 0 {
                    base_shape[i] as f64 / level_shape[i] as f64
                } else {
                    1.0
                }
            })
            .collect();
        // factor count always matches the axes by construction
        Transformation::scale(factors, self.axes.clone())
            .unwrap_or(Transformation::Identity)
    }

    /// The transformation graph, declared for base-level coordinates.
    #[must_use]
    pub fn graph(&self) -> &TransformGraph {
        &self.transformations
    }

    /// Mutable access to the transformation graph.
    pub fn graph_mut(&mut self) -> &mut TransformGraph {
        &mut self.transformations
    }

    /// Re-checks the schema invariants across all levels.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`MultiscaleRaster::from_levels`].
    pub fn validate(&self) -> ElementResult<()> {
        Self::from_levels(
            self.levels.clone(),
            self.axes.clone(),
            self.kind,
            self.transformations.clone(),
        )
        .map(|_| ())
    }
}

/// Downsamples the spatial axes of `data` by `factor`: block-mean for
/// images, stride subsampling for label maps.
fn downsample(data: &ArrayD<f64>, axes: &[Axis], factor: usize, kind: RasterKind) -> ArrayD<f64> {
    let shape = data.shape();
    let out_shape: Vec<usize> = axes
        .iter()
        .zip(shape)
        .map(|(a, &dim)| {
            if a.is_spatial() {
                (dim / factor).max(1)
            } else {
                dim
            }
        })
        .collect();
    let spatial: Vec<usize> = axes
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_spatial())
        .map(|(i, _)| i)
        .collect();

    let mut out = ArrayD::zeros(IxDyn(&out_shape));
    for (idx, value) in out.indexed_iter_mut() {
        let idx = idx.slice();
        let mut base: Vec<usize> = idx.to_vec();
        for &dim in &spatial {
            base[dim] *= factor;
        }
        *value = match kind {
            RasterKind::Labels => data.get(IxDyn(&base)).copied().unwrap_or(0.0),
            RasterKind::Image => block_mean(data, &base, &spatial, factor),
        };
    }
    out
}

/// Mean over the `factor`-wide block starting at `base` along the spatial
/// dimensions, clipped to the array bounds.
fn block_mean(data: &ArrayD<f64>, base: &[usize], spatial: &[usize], factor: usize) -> f64 {
    let shape = data.shape();
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut offsets = vec![0usize; spatial.len()];
    loop {
        let mut idx = base.to_vec();
        let mut in_bounds = true;
        for (k, &dim) in spatial.iter().enumerate() {
            idx[dim] += offsets[k];
            if idx[dim] >= shape[dim] {
                in_bounds = false;
            }
        }
        if in_bounds {
            if let Some(v) = data.get(IxDyn(&idx)) {
                sum += v;
                count += 1;
            }
        }
        // odometer over block offsets
        let mut carry = true;
        for offset in offsets.iter_mut().rev() {
            if carry {
                *offset += 1;
                if *offset == factor {
                    *offset = 0;
                } else {
                    carry = false;
                }
            }
        }
        if carry {
            break;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
