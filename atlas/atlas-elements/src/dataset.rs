//! The dataset container: named elements under shared coordinate systems.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::element::SpatialElement;
use crate::error::ElementResult;

/// A named collection of spatial elements.
///
/// Elements are stored under unique names; the set of coordinate systems a
/// dataset knows about is the union of the coordinate systems its elements
/// map into.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    elements: BTreeMap<String, SpatialElement>,
}

impl Dataset {
    /// An empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and inserts an element, replacing any element previously
    /// stored under `name`.
    ///
    /// # Errors
    ///
    /// Propagates the element's validation errors; the dataset is left
    /// unchanged on failure.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        element: SpatialElement,
    ) -> ElementResult<()> {
        element.validate()?;
        let name = name.into();
        debug!(name = %name, kind = element.kind_name(), "inserted element");
        self.elements.insert(name, element);
        Ok(())
    }

    /// An element by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SpatialElement> {
        self.elements.get(name)
    }

    /// Mutable access to an element by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut SpatialElement> {
        self.elements.get_mut(name)
    }

    /// Removes and returns an element.
    pub fn remove(&mut self, name: &str) -> Option<SpatialElement> {
        self.elements.remove(name)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the dataset holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.elements.keys().map(String::as_str).collect()
    }

    /// Iterates over `(name, element)` pairs in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpatialElement)> {
        self.elements.iter().map(|(n, e)| (n.as_str(), e))
    }

    /// Mutable iteration over `(name, element)` pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut SpatialElement)> {
        self.elements.iter_mut().map(|(n, e)| (n.as_str(), e))
    }

    /// All coordinate systems any element maps into, sorted and deduplicated.
    #[must_use]
    pub fn coordinate_systems(&self) -> Vec<String> {
        let mut systems = BTreeSet::new();
        for element in self.elements.values() {
            if let Ok(graph) = element.graph() {
                for name in graph.coordinate_systems() {
                    systems.insert(name.to_string());
                }
            }
        }
        systems.into_iter().collect()
    }

    /// Names of elements carrying a transformation into `coordinate_system`.
    #[must_use]
    pub fn elements_in(&self, coordinate_system: &str) -> Vec<&str> {
        self.elements
            .iter()
            .filter(|(_, e)| {
                e.graph()
                    .map(|g| g.get(coordinate_system).is_some())
                    .unwrap_or(false)
            })
            .map(|(n, _)| n.as_str())
            .collect()
    }
}
