//! Inverse-warp resampling of dense grids.
//!
//! The engine hands this module a pullback matrix mapping output voxel
//! indices to input coordinates; each output voxel is filled by sampling
//! the input there. Voxels that pull back outside the input grid read as
//! zero.

use nalgebra::DMatrix;
use ndarray::{ArrayD, Dimension, IxDyn};
use rayon::prelude::*;

use crate::error::{OpsError, OpsResult};

/// How to read the input grid at non-integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Nearest-neighbour lookup. Keeps label identities intact.
    Nearest,
    /// Multilinear blend of the surrounding `2^k` grid corners.
    Linear,
}

/// Fills an output grid by pulling every voxel back into `data`.
///
/// The leading `non_spatial` dimensions (e.g. the channel axis) are copied
/// through unchanged; `pullback` is the augmented `(k+1, k+1)` matrix over
/// the `k` trailing spatial dimensions, mapping output voxel indices to
/// input coordinates.
///
/// # Errors
///
/// Returns [`OpsError::EmptyRasterExtent`] when `out_spatial_shape` has a
/// zero entry.
pub fn resample(
    data: &ArrayD<f64>,
    non_spatial: usize,
    pullback: &DMatrix<f64>,
    out_spatial_shape: &[usize],
    interpolation: Interpolation,
) -> OpsResult<ArrayD<f64>> {
    if out_spatial_shape.iter().any(|&d| d == 0) {
        return Err(OpsError::EmptyRasterExtent {
            shape: out_spatial_shape.to_vec(),
        });
    }
    let mut out_shape = data.shape()[..non_spatial].to_vec();
    out_shape.extend_from_slice(out_spatial_shape);

    let mut out = ArrayD::zeros(IxDyn(&out_shape));
    if let Some(slice) = out.as_slice_mut() {
        slice.par_iter_mut().enumerate().for_each(|(flat, value)| {
            let idx = unravel(flat, &out_shape);
            *value = pull_one(data, non_spatial, pullback, &idx, interpolation);
        });
    } else {
        // non-contiguous layout, fall back to sequential indexed iteration
        for (idx, value) in out.indexed_iter_mut() {
            *value = pull_one(data, non_spatial, pullback, idx.slice(), interpolation);
        }
    }
    Ok(out)
}

fn unravel(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut idx = vec![0usize; shape.len()];
    for (slot, &dim) in idx.iter_mut().zip(shape).rev() {
        *slot = flat % dim;
        flat /= dim;
    }
    idx
}

fn pull_one(
    data: &ArrayD<f64>,
    non_spatial: usize,
    pullback: &DMatrix<f64>,
    out_idx: &[usize],
    interpolation: Interpolation,
) -> f64 {
    let k = out_idx.len() - non_spatial;
    let mut source = vec![0.0f64; k];
    for (i, slot) in source.iter_mut().enumerate() {
        let mut acc = pullback[(i, k)];
        for j in 0..k {
            acc += pullback[(i, j)] * out_idx[non_spatial + j] as f64;
        }
        *slot = acc;
    }
    match interpolation {
        Interpolation::Nearest => sample_nearest(data, &out_idx[..non_spatial], &source),
        Interpolation::Linear => sample_linear(data, &out_idx[..non_spatial], &source),
    }
}

fn sample_nearest(data: &ArrayD<f64>, prefix: &[usize], coords: &[f64]) -> f64 {
    let shape = &data.shape()[prefix.len()..];
    let mut idx = prefix.to_vec();
    for (&c, &dim) in coords.iter().zip(shape) {
        let rounded = c.round();
        if rounded < 0.0 || rounded >= dim as f64 {
            return 0.0;
        }
        idx.push(rounded as usize);
    }
    data.get(IxDyn(&idx)).copied().unwrap_or(0.0)
}

fn sample_linear(data: &ArrayD<f64>, prefix: &[usize], coords: &[f64]) -> f64 {
    let shape = &data.shape()[prefix.len()..];
    let k = coords.len();
    let base: Vec<f64> = coords.iter().map(|c| c.floor()).collect();
    let frac: Vec<f64> = coords.iter().zip(&base).map(|(c, b)| c - b).collect();

    let mut acc = 0.0;
    for corner in 0..(1usize << k) {
        let mut weight = 1.0;
        let mut idx = prefix.to_vec();
        let mut in_bounds = true;
        for d in 0..k {
            let hi = (corner >> d) & 1 == 1;
            weight *= if hi { frac[d] } else { 1.0 - frac[d] };
            let coord = base[d] + if hi { 1.0 } else { 0.0 };
            if coord < 0.0 || coord >= shape[d] as f64 {
                in_bounds = false;
                break;
            }
            idx.push(coord as usize);
        }
        if in_bounds && weight != 0.0 {
            if let Some(v) = data.get(IxDyn(&idx)) {
                acc += weight * v;
            }
        }
    }
    acc
}
