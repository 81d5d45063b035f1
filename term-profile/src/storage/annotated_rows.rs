//! Crosstab attachment giving row-level evidence for a measure.

use serde::{Deserialize, Serialize};

use super::{RowAnnotation, RowAnnotationFactory};
use crate::data::{InputColumn, SampleRow};

/// A "drill to detail" view of an annotation, attached to a crosstab cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedRows {
    annotation: RowAnnotation,
    highlighted_columns: Vec<String>,
}

impl AnnotatedRows {
    /// Wraps an annotation, highlighting the given columns.
    pub fn new<'a>(
        annotation: RowAnnotation,
        highlighted_columns: impl IntoIterator<Item = &'a InputColumn>,
    ) -> Self {
        Self {
            annotation,
            highlighted_columns: highlighted_columns
                .into_iter()
                .map(|c| c.name().to_string())
                .collect(),
        }
    }

    /// Wraps the annotation only if the factory retained sample rows for it.
    pub fn create_if_sample_rows_available<'a>(
        annotation: &RowAnnotation,
        factory: &dyn RowAnnotationFactory,
        highlighted_columns: impl IntoIterator<Item = &'a InputColumn>,
    ) -> Option<Self> {
        if factory.has_sample_rows(annotation) {
            Some(Self::new(annotation.clone(), highlighted_columns))
        } else {
            None
        }
    }

    /// Returns the underlying annotation.
    pub fn annotation(&self) -> &RowAnnotation {
        &self.annotation
    }

    /// Returns the number of logical rows in the annotation.
    pub fn row_count(&self) -> u64 {
        self.annotation.row_count()
    }

    /// Returns the retained sample rows.
    pub fn sample_rows(&self) -> Vec<SampleRow> {
        self.annotation.snapshot().sample_rows
    }

    /// Returns the names of the highlighted columns.
    pub fn highlighted_columns(&self) -> &[String] {
        &self.highlighted_columns
    }
}
