//! Date/time column profiling.

mod delegate;
mod result;

pub use delegate::{DateTimeColumnDelegate, DateTimeStatistics};
pub(crate) use delegate::{instant_millis, mean_instant, DateTimeAnnotations};
pub use result::DateTimeResult;
pub(crate) use result::{DateOrderStatistics, DateTimeColumnMeasures, DateTimeEvidence};

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
pub const MEASURE_HIGHEST_DATE: &str = "Highest date";
pub const MEASURE_LOWEST_DATE: &str = "Lowest date";
pub const MEASURE_HIGHEST_TIME: &str = "Highest time";
pub const MEASURE_LOWEST_TIME: &str = "Lowest time";
pub const MEASURE_MEAN: &str = "Mean";
pub const MEASURE_MEDIAN: &str = "Median";
pub const MEASURE_PERCENTILE_25: &str = "25th percentile";
pub const MEASURE_PERCENTILE_75: &str = "75th percentile";
pub const MEASURE_SKEWNESS: &str = "Skewness";
pub const MEASURE_KURTOSIS: &str = "Kurtosis";

const BASIC_MEASURES: [&str; 7] = [
    MEASURE_ROW_COUNT,
    MEASURE_NULL_COUNT,
    MEASURE_HIGHEST_DATE,
    MEASURE_LOWEST_DATE,
    MEASURE_HIGHEST_TIME,
    MEASURE_LOWEST_TIME,
    MEASURE_MEAN,
];

const DESCRIPTIVE_MEASURES: [&str; 5] = [
    MEASURE_MEDIAN,
    MEASURE_PERCENTILE_25,
    MEASURE_PERCENTILE_75,
    MEASURE_SKEWNESS,
    MEASURE_KURTOSIS,
];

pub(crate) fn measures(descriptive_statistics: bool) -> Vec<&'static str> {
    let mut measures = BASIC_MEASURES.to_vec();
    if descriptive_statistics {
        measures.extend(DESCRIPTIVE_MEASURES);
    }
    measures
}

/// Profiles date/time columns: date and time-of-day extremes, the mean
/// instant and optionally order statistics over the date axis.
#[derive(Debug)]
pub struct DateTimeAnalyzer {
    columns: Vec<InputColumn>,
    descriptive_statistics: bool,
    factory: Arc<dyn RowAnnotationFactory>,
    delegates: Vec<DateTimeColumnDelegate>,
    lifecycle: Lifecycle,
}

impl DateTimeAnalyzer {
    pub fn new(columns: Vec<InputColumn>, factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self {
            columns,
            descriptive_statistics: false,
            factory,
            delegates: Vec::new(),
            lifecycle: Lifecycle::default(),
        }
    }

    /// Enables median, percentiles, skewness and kurtosis of the dates.
    pub fn with_descriptive_statistics(mut self, enabled: bool) -> Self {
        self.descriptive_statistics = enabled;
        self
    }

    pub fn builder() -> DateTimeAnalyzerBuilder {
        DateTimeAnalyzerBuilder::default()
    }

    pub fn delegate(&self, column: &InputColumn) -> Option<&DateTimeColumnDelegate> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.delegates.get(index)
    }
}

impl Analyzer for DateTimeAnalyzer {
    type Result = DateTimeResult;

    fn name(&self) -> &str {
        "DateTimeAnalyzer"
    }

    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }

    fn lifecycle(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    fn initialize(&mut self) -> Result<()> {
        validate_columns(self.name(), &self.columns, Some(ValueFamily::DateTime))?;
        self.lifecycle.initialize(self.name())?;
        self.delegates = self
            .columns
            .iter()
            .map(|_| DateTimeColumnDelegate::new(self.factory.clone(), self.descriptive_statistics))
            .collect();
        debug!(
            columns = self.columns.len(),
            descriptive_statistics = self.descriptive_statistics,
            "Initialized date/time analyzer"
        );
        Ok(())
    }

    fn run(&self, row: &dyn InputRow, distinct_count: u64) -> Result<()> {
        check_distinct_count(distinct_count)?;
        self.lifecycle.enter_run(self.name())?;
        for (column, delegate) in self.columns.iter().zip(&self.delegates) {
            delegate.run(row, row.value(column).as_date_time(), distinct_count);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(analyzer = "date_time", columns = self.columns.len()))]
    fn result(&self) -> Result<DateTimeResult> {
        self.lifecycle.finalize(self.name())?;
        let delegates: Vec<&DateTimeColumnDelegate> = self.delegates.iter().collect();
        let result = materialize(
            &self.columns,
            &delegates,
            self.descriptive_statistics,
            self.factory.as_ref(),
        )?;
        info!(columns = self.columns.len(), "Date/time analysis finalized");
        Ok(result)
    }
}

/// Writes the measures of the given delegates into a fresh result.
pub(crate) fn materialize(
    columns: &[InputColumn],
    delegates: &[&DateTimeColumnDelegate],
    descriptive_statistics: bool,
    factory: &dyn RowAnnotationFactory,
) -> Result<DateTimeResult> {
    let measures = measures(descriptive_statistics);
    let mut crosstab = measure_crosstab(columns, DIMENSION_MEASURE, &measures)?;
    {
        let mut writer = MeasureWriter::new(&mut crosstab, DIMENSION_MEASURE, factory);
        for (column, delegate) in columns.iter().zip(delegates) {
            let order = delegate
                .descriptive_statistics()
                .filter(|d| d.n() > 0)
                .map(|d| DateOrderStatistics::from_descriptive(&d));
            DateTimeColumnMeasures {
                statistics: delegate.statistics(),
                order,
                evidence: DateTimeEvidence::from(delegate.annotations()),
            }
            .write(&mut writer, column)?;
        }
    }
    Ok(DateTimeResult::new(
        columns.to_vec(),
        crosstab,
        descriptive_statistics,
    ))
}

/// Builder for [`DateTimeAnalyzer`].
#[derive(Debug, Default)]
pub struct DateTimeAnalyzerBuilder {
    columns: Vec<InputColumn>,
    descriptive_statistics: bool,
    factory: Option<Arc<dyn RowAnnotationFactory>>,
}

impl DateTimeAnalyzerBuilder {
    pub fn column(mut self, column: InputColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = InputColumn>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn descriptive_statistics(mut self, enabled: bool) -> Self {
        self.descriptive_statistics = enabled;
        self
    }

    pub fn annotation_factory(mut self, factory: Arc<dyn RowAnnotationFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn build(self) -> Result<DateTimeAnalyzer> {
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(InMemoryRowAnnotationFactory::new()));
        let mut analyzer = DateTimeAnalyzer::new(self.columns, factory)
            .with_descriptive_statistics(self.descriptive_statistics);
        analyzer.initialize()?;
        Ok(analyzer)
    }
}
