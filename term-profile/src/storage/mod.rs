//! Bounded-memory record of which rows contributed to a statistic.
//!
//! A [`RowAnnotation`] keeps an exact, weighted count of the rows that satisfy
//! some predicate ("is null", "is the current maximum", ...) together with a
//! capped sample of those rows for drill-to-detail inspection. Annotations are
//! created and mutated through a [`RowAnnotationFactory`], which is injected
//! into every analyzer explicitly so that independent analyzers never share
//! annotation state by accident.
//!
//! ## Example
//!
//! ```rust
//! use term_profile::data::MemoryRow;
//! use term_profile::storage::{InMemoryRowAnnotationFactory, RowAnnotationFactory};
//!
//! let factory = InMemoryRowAnnotationFactory::with_max_sample_rows(1);
//! let annotation = factory.create_annotation();
//!
//! factory.annotate(&MemoryRow::new(1).with("x", 1.0), 3, &annotation);
//! factory.annotate(&MemoryRow::new(2).with("x", 1.0), 2, &annotation);
//!
//! // Counts stay exact even though only one sample row is retained.
//! assert_eq!(annotation.row_count(), 5);
//! assert_eq!(factory.sample_rows(&annotation).len(), 1);
//! ```

mod annotated_rows;
mod annotation;
mod in_memory;

pub use annotated_rows::AnnotatedRows;
pub use annotation::{AnnotationSnapshot, RowAnnotation};
pub use in_memory::{InMemoryRowAnnotationFactory, DEFAULT_MAX_SAMPLE_ROWS};

use std::fmt::Debug;

use crate::data::{InputRow, SampleRow};

/// Creates and maintains row annotations.
///
/// Implementations must be safe to call concurrently for different
/// annotations, and must serialize concurrent calls against the same
/// annotation. None of the operations fail: an implementation may cap the
/// number of retained sample rows, but never the count.
pub trait RowAnnotationFactory: Send + Sync + Debug {
    /// Creates a new, empty annotation.
    fn create_annotation(&self) -> RowAnnotation;

    /// Adds `distinct_count` logical rows to the annotation, sampling the row
    /// if the sample is not yet full.
    fn annotate(&self, row: &dyn InputRow, distinct_count: u64, annotation: &RowAnnotation);

    /// Discards the annotation's sample and zeroes its count.
    fn reset_annotation(&self, annotation: &RowAnnotation);

    /// Merges the rows accounted by `from` into `to`.
    fn transfer_annotations(&self, from: &RowAnnotation, to: &RowAnnotation);

    /// Returns the retained sample rows of the annotation.
    fn sample_rows(&self, annotation: &RowAnnotation) -> Vec<SampleRow>;

    /// Returns true if any sample rows are retained for the annotation.
    fn has_sample_rows(&self, annotation: &RowAnnotation) -> bool {
        !self.sample_rows(annotation).is_empty()
    }
}

#[cfg(test)]
mod tests;
