//! Cursors that address a single crosstab cell.

use super::{Cell, Crosstab};
use crate::error::{ProfileError, Result};
use crate::storage::AnnotatedRows;

/// One optional category per dimension, in dimension order.
#[derive(Debug, Clone)]
struct Selection(Vec<Option<String>>);

impl Selection {
    fn empty<T>(crosstab: &Crosstab<T>) -> Self {
        Self(vec![None; crosstab.dimensions.len()])
    }

    fn select<T>(&mut self, crosstab: &Crosstab<T>, dimension: &str, category: &str) -> Result<()> {
        let index = crosstab.dimension_index(dimension)?;
        if !crosstab.dimensions[index].contains_category(category) {
            return Err(ProfileError::unknown_category(dimension, category));
        }
        self.0[index] = Some(category.to_string());
        Ok(())
    }

    fn key<T>(&self, crosstab: &Crosstab<T>) -> Result<Vec<String>> {
        self.0
            .iter()
            .zip(&crosstab.dimensions)
            .map(|(category, dimension)| {
                category
                    .clone()
                    .ok_or_else(|| ProfileError::IncompleteSelection(dimension.name().to_string()))
            })
            .collect()
    }
}

/// Mutable cursor returned by [`Crosstab::navigate`].
///
/// A navigator keeps its selection between writes, so one column can be
/// selected once and then every measure written in turn.
#[derive(Debug)]
pub struct CrosstabNavigator<'a, T> {
    crosstab: &'a mut Crosstab<T>,
    selection: Selection,
}

impl<'a, T> CrosstabNavigator<'a, T> {
    pub(super) fn new(crosstab: &'a mut Crosstab<T>) -> Self {
        let selection = Selection::empty(&*crosstab);
        Self {
            crosstab,
            selection,
        }
    }

    /// Selects a category of a dimension, replacing any earlier selection
    /// for that dimension.
    pub fn at(&mut self, dimension: &str, category: &str) -> Result<&mut Self> {
        self.selection.select(&*self.crosstab, dimension, category)?;
        Ok(self)
    }

    /// Writes a value into the selected cell.
    pub fn put(&mut self, value: impl Into<T>) -> Result<()> {
        let key = self.selection.key(&*self.crosstab)?;
        self.crosstab.cells.entry(key).or_default().value = Some(value.into());
        Ok(())
    }

    /// Appends an attachment to the selected cell without touching its value.
    pub fn attach(&mut self, attachment: AnnotatedRows) -> Result<()> {
        let key = self.selection.key(&*self.crosstab)?;
        self.crosstab
            .cells
            .entry(key)
            .or_default()
            .attachments
            .push(attachment);
        Ok(())
    }

    /// Reads the selected cell, failing if it was never written.
    pub fn get(&self) -> Result<&T> {
        let key = self.selection.key(&*self.crosstab)?;
        lookup_value(&*self.crosstab, key)
    }

    /// Reads the selected cell, falling back to `default` if it was never
    /// written. An incomplete selection is still an error.
    pub fn safe_get(&self, default: T) -> Result<T>
    where
        T: Clone,
    {
        cloned_or(self.get(), default)
    }
}

/// Read-only cursor returned by [`Crosstab::view`].
#[derive(Debug, Clone)]
pub struct CrosstabView<'a, T> {
    crosstab: &'a Crosstab<T>,
    selection: Selection,
}

impl<'a, T> CrosstabView<'a, T> {
    pub(super) fn new(crosstab: &'a Crosstab<T>) -> Self {
        Self {
            crosstab,
            selection: Selection::empty(crosstab),
        }
    }

    /// Selects a category of a dimension.
    pub fn at(mut self, dimension: &str, category: &str) -> Result<Self> {
        self.selection.select(self.crosstab, dimension, category)?;
        Ok(self)
    }

    /// Reads the selected cell, failing if it was never written.
    pub fn get(&self) -> Result<&'a T> {
        let key = self.selection.key(self.crosstab)?;
        lookup_value(self.crosstab, key)
    }

    /// Reads the selected cell, falling back to `default` if it was never
    /// written. An incomplete selection is still an error.
    pub fn safe_get(&self, default: T) -> Result<T>
    where
        T: Clone,
    {
        cloned_or(self.get(), default)
    }

    /// Returns the value of the selected cell if it was written.
    pub fn value(&self) -> Option<&'a T> {
        self.get().ok()
    }

    /// Returns the attachments of the selected cell (empty when none).
    pub fn attachments(&self) -> Result<&'a [AnnotatedRows]> {
        let key = self.selection.key(self.crosstab)?;
        Ok(self
            .crosstab
            .cells
            .get(&key)
            .map(|cell| cell.attachments.as_slice())
            .unwrap_or(&[]))
    }
}

fn cloned_or<T: Clone>(value: Result<&T>, default: T) -> Result<T> {
    match value {
        Ok(value) => Ok(value.clone()),
        Err(ProfileError::EmptyCell(_)) => Ok(default),
        Err(e) => Err(e),
    }
}

fn lookup_value<T>(crosstab: &Crosstab<T>, key: Vec<String>) -> Result<&T> {
    match crosstab.cells.get(&key).and_then(|cell: &Cell<T>| cell.value.as_ref()) {
        Some(value) => Ok(value),
        None => Err(ProfileError::EmptyCell(key)),
    }
}
