//! Annotation tables linking tabular measurements to region elements.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::error::{ElementError, ElementResult};

/// A table of per-instance measurements annotating one or more region
/// elements (label rasters or shape collections).
///
/// Each row targets one instance of one region element: the region column
/// names the element, the instance column identifies the instance within
/// it. Annotation tables carry no coordinates and no transformation graph.
#[derive(Debug, Clone)]
pub struct AnnotationTable {
    regions: Vec<String>,
    region_key: String,
    instance_key: String,
    region_column: Vec<String>,
    instance_column: Vec<i64>,
    values: BTreeMap<String, Vec<f64>>,
}

impl AnnotationTable {
    /// Parses annotation columns into a table.
    ///
    /// `regions` lists the element names this table may annotate; duplicate
    /// entries are collapsed. The region column is checked against that
    /// list and stored as a categorical over it.
    ///
    /// # Errors
    ///
    /// Fails when the region and instance columns differ in length, when a
    /// value column's length differs from the row count, or when the region
    /// column mentions an element outside `regions`.
    pub fn parse(
        regions: Vec<String>,
        region_key: impl Into<String>,
        instance_key: impl Into<String>,
        region_column: Vec<String>,
        instance_column: Vec<i64>,
        values: BTreeMap<String, Vec<f64>>,
    ) -> ElementResult<Self> {
        let mut seen = BTreeSet::new();
        let deduped: Vec<String> = regions
            .into_iter()
            .filter(|r| seen.insert(r.clone()))
            .collect();
        if region_column.len() != instance_column.len() {
            return Err(ElementError::SchemaValidation {
                reason: format!(
                    "region column has {} rows but instance column has {}",
                    region_column.len(),
                    instance_column.len()
                ),
            });
        }
        for (name, column) in &values {
            if column.len() != region_column.len() {
                return Err(ElementError::SchemaValidation {
                    reason: format!(
                        "value column '{name}' has {} rows for a {}-row table",
                        column.len(),
                        region_column.len()
                    ),
                });
            }
        }
        let allowed: BTreeSet<&str> = deduped.iter().map(String::as_str).collect();
        for region in &region_column {
            if !allowed.contains(region.as_str()) {
                return Err(ElementError::SchemaValidation {
                    reason: format!("region column references unknown element '{region}'"),
                });
            }
        }
        info!(
            regions = deduped.len(),
            rows = region_column.len(),
            "converted region column to categorical"
        );
        Ok(Self {
            regions: deduped,
            region_key: region_key.into(),
            instance_key: instance_key.into(),
            region_column,
            instance_column,
            values,
        })
    }

    /// The element names this table annotates.
    #[must_use]
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Name of the column holding the annotated element per row.
    #[must_use]
    pub fn region_key(&self) -> &str {
        &self.region_key
    }

    /// Name of the column holding the instance id per row.
    #[must_use]
    pub fn instance_key(&self) -> &str {
        &self.instance_key
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.region_column.len()
    }

    /// Whether the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.region_column.is_empty()
    }

    /// The annotated element name per row.
    #[must_use]
    pub fn region_column(&self) -> &[String] {
        &self.region_column
    }

    /// The instance id per row.
    #[must_use]
    pub fn instance_column(&self) -> &[i64] {
        &self.instance_column
    }

    /// A value column by name.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&[f64]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Row indices annotating the given element.
    #[must_use]
    pub fn rows_for_region(&self, region: &str) -> Vec<usize> {
        self.region_column
            .iter()
            .enumerate()
            .filter(|(_, r)| r.as_str() == region)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> (Vec<String>, Vec<i64>) {
        (
            vec!["cells".into(), "cells".into(), "nuclei".into()],
            vec![1, 2, 1],
        )
    }

    #[test]
    fn parse_collapses_duplicate_regions() {
        let (region_column, instance_column) = columns();
        let table = AnnotationTable::parse(
            vec!["cells".into(), "nuclei".into(), "cells".into()],
            "region",
            "instance_id",
            region_column,
            instance_column,
            BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(table.regions(), &["cells".to_string(), "nuclei".to_string()]);
    }

    #[test]
    fn parse_rejects_unknown_region() {
        let (region_column, instance_column) = columns();
        let result = AnnotationTable::parse(
            vec!["cells".into()],
            "region",
            "instance_id",
            region_column,
            instance_column,
            BTreeMap::new(),
        );
        assert!(matches!(result, Err(ElementError::SchemaValidation { .. })));
    }

    #[test]
    fn parse_rejects_ragged_value_column() {
        let (region_column, instance_column) = columns();
        let mut values = BTreeMap::new();
        values.insert("area".to_string(), vec![1.0]);
        let result = AnnotationTable::parse(
            vec!["cells".into(), "nuclei".into()],
            "region",
            "instance_id",
            region_column,
            instance_column,
            values,
        );
        assert!(matches!(result, Err(ElementError::SchemaValidation { .. })));
    }

    #[test]
    fn rows_for_region_filters_rows() {
        let (region_column, instance_column) = columns();
        let table = AnnotationTable::parse(
            vec!["cells".into(), "nuclei".into()],
            "region",
            "instance_id",
            region_column,
            instance_column,
            BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(table.rows_for_region("cells"), vec![0, 1]);
        assert_eq!(table.rows_for_region("nuclei"), vec![2]);
    }
}
