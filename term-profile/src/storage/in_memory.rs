//! In-memory annotation store with a capped evidence sample.

use std::collections::HashSet;

use super::{RowAnnotation, RowAnnotationFactory};
use crate::data::{InputRow, SampleRow};

/// Default number of sample rows retained per annotation.
pub const DEFAULT_MAX_SAMPLE_ROWS: usize = 1000;

/// Keeps annotation counts and up to `max_sample_rows` sample rows per
/// annotation in memory.
///
/// A cap of zero keeps counts only.
#[derive(Debug, Clone)]
pub struct InMemoryRowAnnotationFactory {
    max_sample_rows: usize,
}

impl Default for InMemoryRowAnnotationFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRowAnnotationFactory {
    /// Creates a factory with the default sample cap.
    pub fn new() -> Self {
        Self::with_max_sample_rows(DEFAULT_MAX_SAMPLE_ROWS)
    }

    /// Creates a factory retaining at most `max_sample_rows` rows per annotation.
    pub fn with_max_sample_rows(max_sample_rows: usize) -> Self {
        Self { max_sample_rows }
    }

    /// Returns the sample cap.
    pub fn max_sample_rows(&self) -> usize {
        self.max_sample_rows
    }
}

impl RowAnnotationFactory for InMemoryRowAnnotationFactory {
    fn create_annotation(&self) -> RowAnnotation {
        RowAnnotation::new()
    }

    fn annotate(&self, row: &dyn InputRow, distinct_count: u64, annotation: &RowAnnotation) {
        let mut state = annotation.lock();
        state.row_count += distinct_count;
        if state.sample_rows.len() < self.max_sample_rows {
            state.sample_rows.push(row.snapshot());
        }
    }

    fn reset_annotation(&self, annotation: &RowAnnotation) {
        let mut state = annotation.lock();
        state.row_count = 0;
        state.sample_rows.clear();
    }

    fn transfer_annotations(&self, from: &RowAnnotation, to: &RowAnnotation) {
        if from.ptr_eq(to) {
            return;
        }

        // Never hold both locks at once.
        let source = from.snapshot();

        let mut state = to.lock();
        state.row_count += source.row_count;

        let mut seen: HashSet<u64> = state.sample_rows.iter().map(|row| row.id).collect();
        for row in source.sample_rows {
            if seen.insert(row.id) {
                state.sample_rows.push(row);
            }
        }
        state.sample_rows.sort_by_key(|row| row.id);
        state.sample_rows.truncate(self.max_sample_rows);
    }

    fn sample_rows(&self, annotation: &RowAnnotation) -> Vec<SampleRow> {
        annotation.lock().sample_rows.clone()
    }

    fn has_sample_rows(&self, annotation: &RowAnnotation) -> bool {
        !annotation.lock().sample_rows.is_empty()
    }
}
