//! Per-column accumulator for numeric values.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::analyzers::{track_extreme, Extreme};
use crate::data::InputRow;
use crate::stats::{DescriptiveStatistics, SummaryStatistics};
use crate::storage::{RowAnnotation, RowAnnotationFactory};

#[derive(Debug, Default)]
struct NumberState {
    row_count: u64,
    summary: SummaryStatistics,
    descriptive: Option<DescriptiveStatistics>,
}

/// Accumulates every numeric measure of one column in a single pass.
///
/// All state, including the min/max evidence resets, changes under one lock
/// so that a new extreme and its annotation reset are observed together.
#[derive(Debug)]
pub struct NumberColumnDelegate {
    factory: Arc<dyn RowAnnotationFactory>,
    state: Mutex<NumberState>,
    null_annotation: RowAnnotation,
    max_annotation: RowAnnotation,
    min_annotation: RowAnnotation,
}

impl NumberColumnDelegate {
    /// Creates a delegate; `descriptive_statistics` retains values for order
    /// statistics.
    pub fn new(factory: Arc<dyn RowAnnotationFactory>, descriptive_statistics: bool) -> Self {
        let state = NumberState {
            descriptive: descriptive_statistics.then(DescriptiveStatistics::new),
            ..NumberState::default()
        };
        Self {
            null_annotation: factory.create_annotation(),
            max_annotation: factory.create_annotation(),
            min_annotation: factory.create_annotation(),
            state: Mutex::new(state),
            factory,
        }
    }

    /// Processes one value; `None` counts as null.
    pub fn run(&self, row: &dyn InputRow, value: Option<f64>, distinct_count: u64) {
        let mut state = self.state.lock();
        state.row_count += distinct_count;

        let Some(value) = value else {
            self.factory.annotate(row, distinct_count, &self.null_annotation);
            return;
        };

        let (mut max, mut min) = (state.summary.max(), state.summary.min());
        let factory = self.factory.as_ref();
        track_extreme(
            Extreme::Max,
            &mut max,
            value,
            factory,
            &self.max_annotation,
            row,
            distinct_count,
        );
        track_extreme(
            Extreme::Min,
            &mut min,
            value,
            factory,
            &self.min_annotation,
            row,
            distinct_count,
        );

        state.summary.add(value, distinct_count);
        if let Some(descriptive) = state.descriptive.as_mut() {
            descriptive.add(value, distinct_count);
        }
    }

    /// Sum of all distinct counts seen.
    pub fn row_count(&self) -> u64 {
        self.state.lock().row_count
    }

    /// Number of null rows.
    pub fn null_count(&self) -> u64 {
        self.null_annotation.row_count()
    }

    /// Snapshot of the running summary.
    pub fn statistics(&self) -> SummaryStatistics {
        self.state.lock().summary.clone()
    }

    /// Snapshot of the retained values, when enabled.
    pub fn descriptive_statistics(&self) -> Option<DescriptiveStatistics> {
        self.state.lock().descriptive.clone()
    }

    /// Rows that were null.
    pub fn null_annotation(&self) -> &RowAnnotation {
        &self.null_annotation
    }

    /// Rows holding the highest value.
    pub fn max_annotation(&self) -> &RowAnnotation {
        &self.max_annotation
    }

    /// Rows holding the lowest value.
    pub fn min_annotation(&self) -> &RowAnnotation {
        &self.min_annotation
    }
}
