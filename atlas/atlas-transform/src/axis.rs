//! Named coordinate axes.

use std::fmt;
use std::str::FromStr;

use crate::error::TransformError;

/// A named coordinate axis.
///
/// Spatial data uses a small closed set of axis names: the spatial axes
/// `x`, `y` and `z`, the channel axis `c` and the time axis `t`. Axis order
/// matters for array indexing, not for set-membership checks.
///
/// # Example
///
/// ```
/// use atlas_transform::Axis;
///
/// assert!(Axis::X.is_spatial());
/// assert!(!Axis::C.is_spatial());
/// assert_eq!(Axis::Y.to_string(), "y");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Spatial axis `x`.
    X,
    /// Spatial axis `y`.
    Y,
    /// Spatial axis `z`.
    Z,
    /// Channel axis `c`.
    C,
    /// Time axis `t`.
    T,
}

impl Axis {
    /// Returns the lowercase name of the axis.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::C => "c",
            Self::T => "t",
        }
    }

    /// Returns true for the spatial axes `x`, `y` and `z`.
    #[must_use]
    pub const fn is_spatial(self) -> bool {
        matches!(self, Self::X | Self::Y | Self::Z)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            "c" => Ok(Self::C),
            "t" => Ok(Self::T),
            _ => Err(TransformError::UnknownAxis {
                name: s.to_string(),
            }),
        }
    }
}

/// Returns the spatial subset of `axes`, preserving order.
#[must_use]
pub fn spatial_axes(axes: &[Axis]) -> Vec<Axis> {
    axes.iter().copied().filter(|a| a.is_spatial()).collect()
}

/// Returns the position of `axis` within `axes`.
///
/// # Errors
///
/// Returns [`TransformError::AxisMismatch`] if the axis is absent.
pub fn axis_index(axes: &[Axis], axis: Axis) -> Result<usize, TransformError> {
    axes.iter()
        .position(|&a| a == axis)
        .ok_or(TransformError::AxisMismatch { axis })
}
