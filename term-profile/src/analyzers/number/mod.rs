//! Numeric column profiling.

mod delegate;
mod result;

pub use delegate::NumberColumnDelegate;
pub use result::NumberResult;
pub(crate) use result::{NumberColumnMeasures, OrderStatistics};

use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::measures::{measure_crosstab, MeasureWriter};
use super::traits::{check_distinct_count, Analyzer, Lifecycle, LifecycleState};
use super::validate_columns;
use crate::data::{InputColumn, InputRow, ValueFamily};
use crate::error::Result;
use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotationFactory};

/// Name of the measure dimension.
pub const DIMENSION_MEASURE: &str = "Measure";

pub const MEASURE_ROW_COUNT: &str = "Row count";
pub const MEASURE_NULL_COUNT: &str = "Null count";
pub const MEASURE_HIGHEST_VALUE: &str = "Highest value";
pub const MEASURE_LOWEST_VALUE: &str = "Lowest value";
pub const MEASURE_SUM: &str = "Sum";
pub const MEASURE_MEAN: &str = "Mean";
pub const MEASURE_GEOMETRIC_MEAN: &str = "Geometric mean";
pub const MEASURE_STANDARD_DEVIATION: &str = "Standard deviation";
pub const MEASURE_VARIANCE: &str = "Variance";
pub const MEASURE_SECOND_MOMENT: &str = "Second moment";
pub const MEASURE_SUM_OF_SQUARES: &str = "Sum of squares";
pub const MEASURE_MEDIAN: &str = "Median";
pub const MEASURE_PERCENTILE_25: &str = "25th percentile";
pub const MEASURE_PERCENTILE_75: &str = "75th percentile";
pub const MEASURE_SKEWNESS: &str = "Skewness";
pub const MEASURE_KURTOSIS: &str = "Kurtosis";

const BASIC_MEASURES: [&str; 11] = [
    MEASURE_ROW_COUNT,
    MEASURE_NULL_COUNT,
    MEASURE_HIGHEST_VALUE,
    MEASURE_LOWEST_VALUE,
    MEASURE_SUM,
    MEASURE_MEAN,
    MEASURE_GEOMETRIC_MEAN,
    MEASURE_STANDARD_DEVIATION,
    MEASURE_VARIANCE,
    MEASURE_SECOND_MOMENT,
    MEASURE_SUM_OF_SQUARES,
];

const DESCRIPTIVE_MEASURES: [&str; 5] = [
    MEASURE_MEDIAN,
    MEASURE_PERCENTILE_25,
    MEASURE_PERCENTILE_75,
    MEASURE_SKEWNESS,
    MEASURE_KURTOSIS,
];

/// The measure categories, in display order.
pub(crate) fn measures(descriptive_statistics: bool) -> Vec<&'static str> {
    let mut measures = BASIC_MEASURES.to_vec();
    if descriptive_statistics {
        measures.extend(DESCRIPTIVE_MEASURES);
    }
    measures
}

/// Profiles numeric columns: counts, extremes, sums and moments, and
/// optionally exact order statistics.
#[derive(Debug)]
pub struct NumberAnalyzer {
    columns: Vec<InputColumn>,
    descriptive_statistics: bool,
    factory: Arc<dyn RowAnnotationFactory>,
    delegates: Vec<NumberColumnDelegate>,
    lifecycle: Lifecycle,
}

impl NumberAnalyzer {
    /// Creates an uninitialized analyzer.
    pub fn new(columns: Vec<InputColumn>, factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self {
            columns,
            descriptive_statistics: false,
            factory,
            delegates: Vec::new(),
            lifecycle: Lifecycle::default(),
        }
    }

    /// Enables median, percentiles, skewness and kurtosis.
    ///
    /// These retain every distinct (value, weight) pair in memory.
    pub fn with_descriptive_statistics(mut self, enabled: bool) -> Self {
        self.descriptive_statistics = enabled;
        self
    }

    /// Returns a builder that initializes the analyzer on `build()`.
    pub fn builder() -> NumberAnalyzerBuilder {
        NumberAnalyzerBuilder::default()
    }

    /// Returns the delegate of a column, once initialized.
    pub fn delegate(&self, column: &InputColumn) -> Option<&NumberColumnDelegate> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.delegates.get(index)
    }

    /// Returns true if order statistics are gathered.
    pub fn descriptive_statistics(&self) -> bool {
        self.descriptive_statistics
    }
}

impl Analyzer for NumberAnalyzer {
    type Result = NumberResult;

    fn name(&self) -> &str {
        "NumberAnalyzer"
    }

    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }

    fn lifecycle(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    fn initialize(&mut self) -> Result<()> {
        validate_columns(self.name(), &self.columns, Some(ValueFamily::Number))?;
        self.lifecycle.initialize(self.name())?;
        self.delegates = self
            .columns
            .iter()
            .map(|_| NumberColumnDelegate::new(self.factory.clone(), self.descriptive_statistics))
            .collect();
        debug!(
            columns = self.columns.len(),
            descriptive_statistics = self.descriptive_statistics,
            "Initialized number analyzer"
        );
        Ok(())
    }

    fn run(&self, row: &dyn InputRow, distinct_count: u64) -> Result<()> {
        check_distinct_count(distinct_count)?;
        self.lifecycle.enter_run(self.name())?;
        for (column, delegate) in self.columns.iter().zip(&self.delegates) {
            delegate.run(row, row.value(column).as_number(), distinct_count);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(analyzer = "number", columns = self.columns.len()))]
    fn result(&self) -> Result<NumberResult> {
        self.lifecycle.finalize(self.name())?;
        let delegates: Vec<&NumberColumnDelegate> = self.delegates.iter().collect();
        let result = materialize(
            &self.columns,
            &delegates,
            self.descriptive_statistics,
            self.factory.as_ref(),
        )?;
        info!(columns = self.columns.len(), "Number analysis finalized");
        Ok(result)
    }
}

/// Writes the measures of the given delegates into a fresh result.
pub(crate) fn materialize(
    columns: &[InputColumn],
    delegates: &[&NumberColumnDelegate],
    descriptive_statistics: bool,
    factory: &dyn RowAnnotationFactory,
) -> Result<NumberResult> {
    let measures = measures(descriptive_statistics);
    let mut crosstab = measure_crosstab(columns, DIMENSION_MEASURE, &measures)?;
    {
        let mut writer = MeasureWriter::new(&mut crosstab, DIMENSION_MEASURE, factory);
        for (column, delegate) in columns.iter().zip(delegates) {
            let order = delegate
                .descriptive_statistics()
                .filter(|d| d.n() > 0)
                .map(|d| OrderStatistics::from_descriptive(&d));
            let column_measures = NumberColumnMeasures {
                row_count: delegate.row_count(),
                null_count: delegate.null_count(),
                summary: delegate.statistics(),
                order,
                null_annotation: Some(delegate.null_annotation().clone()),
                max_annotation: Some(delegate.max_annotation().clone()),
                min_annotation: Some(delegate.min_annotation().clone()),
            };
            column_measures.write(&mut writer, column)?;
        }
    }
    Ok(NumberResult::new(
        columns.to_vec(),
        crosstab,
        descriptive_statistics,
    ))
}

/// Builder for [`NumberAnalyzer`].
#[derive(Debug, Default)]
pub struct NumberAnalyzerBuilder {
    columns: Vec<InputColumn>,
    descriptive_statistics: bool,
    factory: Option<Arc<dyn RowAnnotationFactory>>,
}

impl NumberAnalyzerBuilder {
    /// Adds a column.
    pub fn column(mut self, column: InputColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds several columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = InputColumn>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Enables order statistics.
    pub fn descriptive_statistics(mut self, enabled: bool) -> Self {
        self.descriptive_statistics = enabled;
        self
    }

    /// Sets the annotation factory; defaults to an in-memory factory.
    pub fn annotation_factory(mut self, factory: Arc<dyn RowAnnotationFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Builds and initializes the analyzer.
    pub fn build(self) -> Result<NumberAnalyzer> {
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(InMemoryRowAnnotationFactory::new()));
        let mut analyzer = NumberAnalyzer::new(self.columns, factory)
            .with_descriptive_statistics(self.descriptive_statistics);
        analyzer.initialize()?;
        Ok(analyzer)
    }
}

#[cfg(test)]
mod tests;
