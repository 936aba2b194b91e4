//! Error types for coordinate systems and transformations.

use thiserror::Error;

use crate::axis::Axis;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur while building or applying transformations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// An axis was requested that the transformation neither acts on nor can
    /// pass through unchanged.
    #[error("axis {axis} is not covered by the transformation and cannot be passed through")]
    AxisMismatch {
        /// The offending axis.
        axis: Axis,
    },

    /// The transformation has no inverse.
    #[error("transformation is not invertible")]
    NonInvertible,

    /// A coordinate system name was registered twice with differing axes.
    #[error("coordinate system {name} is already registered with different axes")]
    DuplicateCoordinateSystem {
        /// Name of the coordinate system.
        name: String,
    },

    /// An axis name outside the closed set `x`, `y`, `z`, `c`, `t`.
    #[error("unknown axis name: {name}")]
    UnknownAxis {
        /// The unrecognized name.
        name: String,
    },

    /// A matrix was supplied whose shape does not match the declared axes.
    #[error(
        "matrix shape ({rows}, {cols}) does not match the declared axes: \
         expected ({expected_rows}, {expected_cols}) augmented or reduced form"
    )]
    MatrixShape {
        /// Rows of the supplied matrix.
        rows: usize,
        /// Columns of the supplied matrix.
        cols: usize,
        /// Expected augmented row count.
        expected_rows: usize,
        /// Expected augmented column count.
        expected_cols: usize,
    },

    /// A value vector's length disagrees with the number of declared axes.
    #[error("{values} values provided for {axes} axes")]
    ValueCountMismatch {
        /// Number of values supplied.
        values: usize,
        /// Number of axes declared.
        axes: usize,
    },

    /// A coordinate table's column count disagrees with the input axes.
    #[error("coordinate table has {columns} columns but {axes} input axes were given")]
    CoordinateShape {
        /// Columns in the coordinate table.
        columns: usize,
        /// Number of input axes.
        axes: usize,
    },
}
