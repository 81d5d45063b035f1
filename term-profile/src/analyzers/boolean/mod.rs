//! Boolean column profiling.

mod delegate;
mod result;

pub use delegate::BooleanColumnDelegate;
pub use result::{BooleanResult, ValueCombination};
pub(crate) use result::{combination_crosstab, BooleanColumnMeasures, CombinationTally};

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::measures::{measure_crosstab, MeasureWriter};
use super::traits::{check_distinct_count, Analyzer, Lifecycle, LifecycleState};
use super::validate_columns;
use crate::data::{InputColumn, InputRow, ValueFamily};
use crate::error::Result;
use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotation, RowAnnotationFactory};

/// Name of the measure dimension.
pub const DIMENSION_MEASURE: &str = "Measure";
/// Column-dimension category holding the frequency of a value tuple.
pub const COLUMN_FREQUENCY: &str = "Frequency";
/// Prefix of the labels between the most and least frequent tuple.
pub const COMBINATION_PREFIX: &str = "Combination ";

pub const MEASURE_ROW_COUNT: &str = "Row count";
pub const MEASURE_NULL_COUNT: &str = "Null count";
pub const MEASURE_TRUE_COUNT: &str = "True count";
pub const MEASURE_FALSE_COUNT: &str = "False count";
pub const MEASURE_MOST_FREQUENT: &str = "Most frequent";
pub const MEASURE_LEAST_FREQUENT: &str = "Least frequent";

pub(crate) const MEASURES: [&str; 4] = [
    MEASURE_ROW_COUNT,
    MEASURE_NULL_COUNT,
    MEASURE_TRUE_COUNT,
    MEASURE_FALSE_COUNT,
];

/// Profiles boolean columns.
///
/// With more than one column, every row's tuple of values is tallied as
/// well, so that the most and least frequent combinations can be reported.
#[derive(Debug)]
pub struct BooleanAnalyzer {
    columns: Vec<InputColumn>,
    factory: Arc<dyn RowAnnotationFactory>,
    delegates: Vec<BooleanColumnDelegate>,
    combinations: CombinationTallies,
    lifecycle: Lifecycle,
}

impl BooleanAnalyzer {
    /// Creates an uninitialized analyzer.
    pub fn new(columns: Vec<InputColumn>, factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self {
            columns,
            factory,
            delegates: Vec::new(),
            combinations: CombinationTallies::default(),
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn builder() -> BooleanAnalyzerBuilder {
        BooleanAnalyzerBuilder::default()
    }

    pub fn delegate(&self, column: &InputColumn) -> Option<&BooleanColumnDelegate> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.delegates.get(index)
    }
}

impl Analyzer for BooleanAnalyzer {
    type Result = BooleanResult;

    fn name(&self) -> &str {
        "BooleanAnalyzer"
    }

    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }

    fn lifecycle(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    fn initialize(&mut self) -> Result<()> {
        validate_columns(self.name(), &self.columns, Some(ValueFamily::Boolean))?;
        self.lifecycle.initialize(self.name())?;
        self.delegates = self
            .columns
            .iter()
            .map(|_| BooleanColumnDelegate::new(self.factory.clone()))
            .collect();
        debug!(columns = self.columns.len(), "Initialized boolean analyzer");
        Ok(())
    }

    fn run(&self, row: &dyn InputRow, distinct_count: u64) -> Result<()> {
        check_distinct_count(distinct_count)?;
        self.lifecycle.enter_run(self.name())?;
        let mut values = Vec::with_capacity(self.columns.len());
        for (column, delegate) in self.columns.iter().zip(&self.delegates) {
            let value = row.value(column).as_boolean();
            delegate.run(row, value, distinct_count);
            values.push(value);
        }
        if self.columns.len() > 1 {
            self.combinations
                .record(self.factory.as_ref(), row, values, distinct_count);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(analyzer = "boolean", columns = self.columns.len()))]
    fn result(&self) -> Result<BooleanResult> {
        self.lifecycle.finalize(self.name())?;
        let delegates: Vec<&BooleanColumnDelegate> = self.delegates.iter().collect();
        let result = materialize(
            &self.columns,
            &delegates,
            &self.combinations,
            self.factory.as_ref(),
        )?;
        info!(columns = self.columns.len(), "Boolean analysis finalized");
        Ok(result)
    }
}

/// Tally of value tuples across several boolean columns.
#[derive(Debug, Default)]
pub(crate) struct CombinationTallies(Mutex<HashMap<Vec<Option<bool>>, RowAnnotation>>);

impl CombinationTallies {
    pub(crate) fn record(
        &self,
        factory: &dyn RowAnnotationFactory,
        row: &dyn InputRow,
        values: Vec<Option<bool>>,
        distinct_count: u64,
    ) {
        let mut tallies = self.0.lock();
        let annotation = tallies
            .entry(values)
            .or_insert_with(|| factory.create_annotation());
        factory.annotate(row, distinct_count, annotation);
    }

    fn snapshot(&self) -> Vec<CombinationTally> {
        self.0
            .lock()
            .iter()
            .map(|(values, annotation)| CombinationTally {
                values: values.clone(),
                frequency: annotation.row_count(),
                annotation: Some(annotation.clone()),
            })
            .collect()
    }
}

/// Writes the counts of the given delegates, and the tuple tally when more
/// than one column is involved, into a fresh result.
pub(crate) fn materialize(
    columns: &[InputColumn],
    delegates: &[&BooleanColumnDelegate],
    combinations: &CombinationTallies,
    factory: &dyn RowAnnotationFactory,
) -> Result<BooleanResult> {
    let mut column_statistics = measure_crosstab(columns, DIMENSION_MEASURE, &MEASURES)?;
    {
        let mut writer = MeasureWriter::new(&mut column_statistics, DIMENSION_MEASURE, factory);
        for (column, delegate) in columns.iter().zip(delegates) {
            BooleanColumnMeasures {
                row_count: delegate.row_count(),
                null_count: delegate.null_count(),
                true_count: delegate.true_count(),
                false_count: delegate.false_count(),
                null_annotation: Some(delegate.null_annotation().clone()),
                true_annotation: Some(delegate.true_annotation().clone()),
                false_annotation: Some(delegate.false_annotation().clone()),
            }
            .write(&mut writer, column)?;
        }
    }

    let value_combinations = if columns.len() > 1 {
        let tallies = combinations.snapshot();
        debug!(combinations = tallies.len(), "Tallied value combinations");
        Some(combination_crosstab(columns, tallies, factory)?)
    } else {
        None
    };

    Ok(BooleanResult::new(
        columns.to_vec(),
        column_statistics,
        value_combinations,
    ))
}

/// Builder for [`BooleanAnalyzer`].
#[derive(Debug, Default)]
pub struct BooleanAnalyzerBuilder {
    columns: Vec<InputColumn>,
    factory: Option<Arc<dyn RowAnnotationFactory>>,
}

impl BooleanAnalyzerBuilder {
    pub fn column(mut self, column: InputColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = InputColumn>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn annotation_factory(mut self, factory: Arc<dyn RowAnnotationFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Builds and initializes the analyzer.
    pub fn build(self) -> Result<BooleanAnalyzer> {
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(InMemoryRowAnnotationFactory::new()));
        let mut analyzer = BooleanAnalyzer::new(self.columns, factory);
        analyzer.initialize()?;
        Ok(analyzer)
    }
}
