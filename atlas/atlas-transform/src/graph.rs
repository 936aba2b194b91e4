//! Per-element transformation graphs.

use std::collections::HashMap;

use crate::coord_system::DEFAULT_COORDINATE_SYSTEM;
use crate::transformation::Transformation;

/// The mapping from coordinate-system name to the transformation carrying an
/// element's intrinsic coordinates into that system.
///
/// Keys are unique; iteration order is unspecified. Each entry's declared
/// input axes are the owning element's intrinsic axes, its output axes those
/// of the named coordinate system.
///
/// # Example
///
/// ```
/// use atlas_transform::{Axis, TransformGraph, Transformation};
///
/// let mut graph = TransformGraph::new();
/// graph.set("global", Transformation::identity());
/// assert!(graph.get("global").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformGraph {
    entries: HashMap<String, Transformation>,
}

impl TransformGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph holding a single identity entry for the default
    /// coordinate system.
    #[must_use]
    pub fn with_default_identity() -> Self {
        let mut graph = Self::new();
        graph.set(DEFAULT_COORDINATE_SYSTEM, Transformation::identity());
        graph
    }

    /// Looks up the transformation into the named coordinate system.
    #[must_use]
    pub fn get(&self, coordinate_system: &str) -> Option<&Transformation> {
        self.entries.get(coordinate_system)
    }

    /// Inserts or overwrites the transformation into the named coordinate
    /// system.
    pub fn set(&mut self, coordinate_system: impl Into<String>, transformation: Transformation) {
        self.entries.insert(coordinate_system.into(), transformation);
    }

    /// Removes and returns the entry for the named coordinate system.
    pub fn remove(&mut self, coordinate_system: &str) -> Option<Transformation> {
        self.entries.remove(coordinate_system)
    }

    /// Replaces every entry with the provided mapping.
    pub fn replace_all(&mut self, entries: HashMap<String, Transformation>) {
        self.entries = entries;
    }

    /// Returns a defensive copy of the full mapping.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, Transformation> {
        self.entries.clone()
    }

    /// True when no coordinate system is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of mapped coordinate systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The mapped coordinate-system names, in unspecified order.
    pub fn coordinate_systems(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(coordinate system, transformation)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Transformation)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Prepends `transformation` to every entry: each mapped transformation
    /// `t` becomes `Sequence([transformation, t])`.
    pub fn prepend_all(&mut self, transformation: &Transformation) {
        for entry in self.entries.values_mut() {
            let previous = entry.clone();
            *entry = Transformation::sequence(vec![transformation.clone(), previous]);
        }
    }
}
