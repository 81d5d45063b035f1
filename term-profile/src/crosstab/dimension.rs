//! Named, grow-only crosstab dimensions.

use serde::{Deserialize, Serialize};

/// One axis of a [`Crosstab`](super::Crosstab).
///
/// Categories keep insertion order and can only be added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosstabDimension {
    name: String,
    categories: Vec<String>,
}

impl CrosstabDimension {
    /// Creates an empty dimension.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
        }
    }

    /// Adds a category and returns the dimension, for construction chains.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.add_category(category);
        self
    }

    /// Adds several categories in order.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for category in categories {
            self.add_category(category);
        }
        self
    }

    /// Adds a category. Returns false if it already existed.
    pub fn add_category(&mut self, category: impl Into<String>) -> bool {
        let category = category.into();
        if self.contains_category(&category) {
            return false;
        }
        self.categories.push(category);
        true
    }

    /// Returns the dimension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the categories in insertion order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns true if the category exists.
    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}
