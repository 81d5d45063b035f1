//! Multidimensional result tables.
//!
//! A [`Crosstab`] is an ordered list of named dimensions, each holding an
//! open, grow-only set of categories. A cell is addressed by choosing one
//! category per dimension; cells may be empty and may carry
//! [`AnnotatedRows`] attachments as drill-down evidence.
//!
//! ```rust
//! use term_profile::crosstab::{Crosstab, CrosstabDimension};
//! use term_profile::types::MetricValue;
//!
//! let mut crosstab: Crosstab<MetricValue> = Crosstab::new(vec![
//!     CrosstabDimension::new("Column").with_category("age"),
//!     CrosstabDimension::new("Measure").with_categories(["Row count", "Mean"]),
//! ])
//! .unwrap();
//!
//! let mut nav = crosstab.navigate();
//! nav.at("Column", "age").unwrap();
//! nav.at("Measure", "Row count").unwrap().put(10i64).unwrap();
//!
//! let view = crosstab.view().at("Column", "age").unwrap();
//! assert_eq!(
//!     view.clone().at("Measure", "Row count").unwrap().get().unwrap(),
//!     &MetricValue::Long(10)
//! );
//! assert!(view.at("Measure", "Mean").unwrap().get().is_err());
//! ```

mod dimension;
mod navigator;

pub use dimension::CrosstabDimension;
pub use navigator::{CrosstabNavigator, CrosstabView};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ProfileError, Result};
use crate::storage::AnnotatedRows;

/// Standard dimension holding one category per analyzed column.
pub const DIMENSION_COLUMN: &str = "Column";

/// A single cell: an optional value plus attachments.
#[derive(Debug, Clone)]
pub(crate) struct Cell<T> {
    value: Option<T>,
    attachments: Vec<AnnotatedRows>,
}

impl<T> Default for Cell<T> {
    fn default() -> Self {
        Self {
            value: None,
            attachments: Vec::new(),
        }
    }
}

/// A generic N-dimensional table of optional values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Crosstab<T> {
    dimensions: Vec<CrosstabDimension>,
    #[serde(with = "cell_entries")]
    cells: BTreeMap<Vec<String>, Cell<T>>,
}

impl<T> Crosstab<T> {
    /// Creates an empty crosstab over the given dimensions.
    ///
    /// Dimension names must be unique.
    pub fn new(dimensions: Vec<CrosstabDimension>) -> Result<Self> {
        for (i, dimension) in dimensions.iter().enumerate() {
            if dimensions[..i].iter().any(|d| d.name() == dimension.name()) {
                return Err(ProfileError::invalid_config(format!(
                    "duplicate crosstab dimension '{}'",
                    dimension.name()
                )));
            }
        }
        Ok(Self {
            dimensions,
            cells: BTreeMap::new(),
        })
    }

    /// Returns the dimensions in order.
    pub fn dimensions(&self) -> &[CrosstabDimension] {
        &self.dimensions
    }

    /// Looks up a dimension by name.
    pub fn dimension(&self, name: &str) -> Result<&CrosstabDimension> {
        let index = self.dimension_index(name)?;
        Ok(&self.dimensions[index])
    }

    /// Adds a category to a dimension. Existing categories are left alone.
    pub fn add_category(&mut self, dimension: &str, category: impl Into<String>) -> Result<()> {
        let index = self.dimension_index(dimension)?;
        self.dimensions[index].add_category(category);
        Ok(())
    }

    /// Returns a mutable cursor for writing cells.
    pub fn navigate(&mut self) -> CrosstabNavigator<'_, T> {
        CrosstabNavigator::new(self)
    }

    /// Returns a read-only cursor.
    pub fn view(&self) -> CrosstabView<'_, T> {
        CrosstabView::new(self)
    }

    /// Number of cells holding a value or an attachment.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterates over written cells as (categories, value) pairs, in
    /// category order.
    pub fn values(&self) -> impl Iterator<Item = (&[String], &T)> {
        self.cells
            .iter()
            .filter_map(|(key, cell)| cell.value.as_ref().map(|v| (key.as_slice(), v)))
    }

    fn dimension_index(&self, name: &str) -> Result<usize> {
        self.dimensions
            .iter()
            .position(|d| d.name() == name)
            .ok_or_else(|| ProfileError::UnknownDimension(name.to_string()))
    }
}

/// Cells serialize as a list of `{key, value, attachments}` entries; JSON
/// map keys must be strings.
mod cell_entries {
    use super::Cell;
    use crate::storage::AnnotatedRows;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct EntryRef<'a, T> {
        key: &'a [String],
        value: &'a Option<T>,
        attachments: &'a [AnnotatedRows],
    }

    #[derive(Deserialize)]
    struct Entry<T> {
        key: Vec<String>,
        value: Option<T>,
        #[serde(default)]
        attachments: Vec<AnnotatedRows>,
    }

    pub fn serialize<S, T>(
        cells: &BTreeMap<Vec<String>, Cell<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(cells.iter().map(|(key, cell)| EntryRef {
            key: key.as_slice(),
            value: &cell.value,
            attachments: &cell.attachments,
        }))
    }

    pub fn deserialize<'de, D, T>(
        deserializer: D,
    ) -> Result<BTreeMap<Vec<String>, Cell<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let entries: Vec<Entry<T>> = Vec::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| {
                let cell = Cell {
                    value: e.value,
                    attachments: e.attachments,
                };
                (e.key, cell)
            })
            .collect())
    }
}
