//! Named coordinate systems and their registry.

use std::collections::HashMap;

use crate::axis::Axis;
use crate::error::{TransformError, TransformResult};

/// Name of the coordinate system used when an element declares none.
pub const DEFAULT_COORDINATE_SYSTEM: &str = "global";

/// A named coordinate system: an ordered sequence of axes with one unit per
/// axis.
///
/// Two coordinate systems are equal iff their name and axis sequence match;
/// units are descriptive and do not participate in equality.
///
/// # Example
///
/// ```
/// use atlas_transform::{Axis, CoordinateSystem};
///
/// let cs = CoordinateSystem::new("global", vec![Axis::Y, Axis::X]);
/// assert_eq!(cs.name(), "global");
/// assert_eq!(cs.axes(), &[Axis::Y, Axis::X]);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinateSystem {
    name: String,
    axes: Vec<Axis>,
    units: Vec<String>,
}

impl CoordinateSystem {
    /// Creates a coordinate system with the default unit for every axis.
    #[must_use]
    pub fn new(name: impl Into<String>, axes: Vec<Axis>) -> Self {
        let units = vec![String::from("unit"); axes.len()];
        Self {
            name: name.into(),
            axes,
            units,
        }
    }

    /// Replaces the per-axis units.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ValueCountMismatch`] if the number of units
    /// differs from the number of axes.
    pub fn with_units(mut self, units: Vec<String>) -> TransformResult<Self> {
        if units.len() != self.axes.len() {
            return Err(TransformError::ValueCountMismatch {
                values: units.len(),
                axes: self.axes.len(),
            });
        }
        self.units = units;
        Ok(self)
    }

    /// The coordinate system name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered axis sequence.
    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// The unit of each axis, in axis order.
    #[must_use]
    pub fn units(&self) -> &[String] {
        &self.units
    }
}

impl PartialEq for CoordinateSystem {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.axes == other.axes
    }
}

impl Eq for CoordinateSystem {}

/// Registers a list of coordinate systems, returning them keyed by name.
///
/// Registration is idempotent: repeating a fully identical definition is
/// accepted. Re-registering a name with a different axis sequence fails;
/// callers needing a changed definition must pick a new name.
///
/// # Errors
///
/// Returns [`TransformError::DuplicateCoordinateSystem`] if two distinct
/// definitions share a name.
///
/// # Example
///
/// ```
/// use atlas_transform::{register_coordinate_systems, Axis, CoordinateSystem};
///
/// let systems = vec![
///     CoordinateSystem::new("global", vec![Axis::Y, Axis::X]),
///     CoordinateSystem::new("physical", vec![Axis::X, Axis::Y]),
/// ];
/// let registry = register_coordinate_systems(&systems).unwrap();
/// assert_eq!(registry.len(), 2);
/// ```
pub fn register_coordinate_systems(
    systems: &[CoordinateSystem],
) -> TransformResult<HashMap<String, CoordinateSystem>> {
    let mut registry: HashMap<String, CoordinateSystem> = HashMap::new();
    for cs in systems {
        match registry.get(cs.name()) {
            Some(existing) if existing == cs => {}
            Some(_) => {
                return Err(TransformError::DuplicateCoordinateSystem {
                    name: cs.name().to_string(),
                });
            }
            None => {
                registry.insert(cs.name().to_string(), cs.clone());
            }
        }
    }
    Ok(registry)
}
