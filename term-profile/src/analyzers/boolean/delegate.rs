//! Per-column accumulator for boolean values.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::data::InputRow;
use crate::storage::{RowAnnotation, RowAnnotationFactory};

/// Counts nulls, trues and falses of one column, with evidence for each.
#[derive(Debug)]
pub struct BooleanColumnDelegate {
    factory: Arc<dyn RowAnnotationFactory>,
    row_count: Mutex<u64>,
    null_annotation: RowAnnotation,
    true_annotation: RowAnnotation,
    false_annotation: RowAnnotation,
}

impl BooleanColumnDelegate {
    pub fn new(factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self {
            null_annotation: factory.create_annotation(),
            true_annotation: factory.create_annotation(),
            false_annotation: factory.create_annotation(),
            row_count: Mutex::new(0),
            factory,
        }
    }

    /// Processes one value; `None` counts as null.
    pub fn run(&self, row: &dyn InputRow, value: Option<bool>, distinct_count: u64) {
        let mut row_count = self.row_count.lock();
        *row_count += distinct_count;
        let annotation = match value {
            None => &self.null_annotation,
            Some(true) => &self.true_annotation,
            Some(false) => &self.false_annotation,
        };
        self.factory.annotate(row, distinct_count, annotation);
    }

    pub fn row_count(&self) -> u64 {
        *self.row_count.lock()
    }

    pub fn null_count(&self) -> u64 {
        self.null_annotation.row_count()
    }

    pub fn true_count(&self) -> u64 {
        self.true_annotation.row_count()
    }

    pub fn false_count(&self) -> u64 {
        self.false_annotation.row_count()
    }

    pub fn null_annotation(&self) -> &RowAnnotation {
        &self.null_annotation
    }

    pub fn true_annotation(&self) -> &RowAnnotation {
        &self.true_annotation
    }

    pub fn false_annotation(&self) -> &RowAnnotation {
        &self.false_annotation
    }
}
