//! Result of a [`NumberAnalyzer`](super::NumberAnalyzer) run.

use serde::{Deserialize, Serialize};

use super::*;
use crate::analyzers::measures::{read_evidence, read_measure};
use crate::analyzers::traits::AnalyzerResult;
use crate::crosstab::Crosstab;
use crate::stats::{DescriptiveStatistics, SummaryStatistics};
use crate::storage::{AnnotatedRows, RowAnnotation};
use crate::types::MetricValue;

/// Exact order statistics of one column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct OrderStatistics {
    pub(crate) median: Option<f64>,
    pub(crate) percentile_25: Option<f64>,
    pub(crate) percentile_75: Option<f64>,
    pub(crate) skewness: Option<f64>,
    pub(crate) kurtosis: Option<f64>,
}

impl OrderStatistics {
    pub(crate) fn from_descriptive(d: &DescriptiveStatistics) -> Self {
        Self {
            median: d.median(),
            percentile_25: d.percentile(25.0),
            percentile_75: d.percentile(75.0),
            skewness: d.skewness(),
            kurtosis: d.kurtosis(),
        }
    }
}

/// Everything written for one numeric column, shared by the analyzer and
/// the reducer.
#[derive(Debug, Default)]
pub(crate) struct NumberColumnMeasures {
    pub(crate) row_count: u64,
    pub(crate) null_count: u64,
    pub(crate) summary: SummaryStatistics,
    pub(crate) order: Option<OrderStatistics>,
    pub(crate) null_annotation: Option<RowAnnotation>,
    pub(crate) max_annotation: Option<RowAnnotation>,
    pub(crate) min_annotation: Option<RowAnnotation>,
}

impl NumberColumnMeasures {
    pub(crate) fn write(&self, writer: &mut MeasureWriter<'_>, column: &InputColumn) -> Result<()> {
        writer.select_column(column)?;
        writer.put(MEASURE_ROW_COUNT, self.row_count)?;
        writer.put(MEASURE_NULL_COUNT, self.null_count)?;
        if self.null_count > 0 {
            if let Some(annotation) = &self.null_annotation {
                writer.attach(MEASURE_NULL_COUNT, annotation, &[column])?;
            }
        }

        let s = &self.summary;
        if s.n() == 0 {
            return Ok(());
        }
        writer.put_opt(MEASURE_HIGHEST_VALUE, s.max())?;
        if let Some(annotation) = &self.max_annotation {
            writer.attach(MEASURE_HIGHEST_VALUE, annotation, &[column])?;
        }
        writer.put_opt(MEASURE_LOWEST_VALUE, s.min())?;
        if let Some(annotation) = &self.min_annotation {
            writer.attach(MEASURE_LOWEST_VALUE, annotation, &[column])?;
        }
        writer.put(MEASURE_SUM, s.sum())?;
        writer.put_opt(MEASURE_MEAN, s.mean())?;
        writer.put_opt(MEASURE_GEOMETRIC_MEAN, s.geometric_mean())?;
        writer.put_opt(MEASURE_STANDARD_DEVIATION, s.standard_deviation())?;
        writer.put_opt(MEASURE_VARIANCE, s.variance())?;
        writer.put_opt(MEASURE_SECOND_MOMENT, s.second_moment())?;
        writer.put(MEASURE_SUM_OF_SQUARES, s.sum_of_squares())?;

        if let Some(order) = &self.order {
            writer.put_opt(MEASURE_MEDIAN, order.median)?;
            writer.put_opt(MEASURE_PERCENTILE_25, order.percentile_25)?;
            writer.put_opt(MEASURE_PERCENTILE_75, order.percentile_75)?;
            writer.put_opt(MEASURE_SKEWNESS, order.skewness)?;
            writer.put_opt(MEASURE_KURTOSIS, order.kurtosis)?;
        }
        Ok(())
    }
}

/// Per-column numeric measures, laid out as a `Column x Measure` crosstab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberResult {
    columns: Vec<InputColumn>,
    crosstab: Crosstab<MetricValue>,
    descriptive_statistics: bool,
}

impl NumberResult {
    pub(crate) fn new(
        columns: Vec<InputColumn>,
        crosstab: Crosstab<MetricValue>,
        descriptive_statistics: bool,
    ) -> Self {
        Self {
            columns,
            crosstab,
            descriptive_statistics,
        }
    }

    /// The underlying crosstab.
    pub fn crosstab(&self) -> &Crosstab<MetricValue> {
        &self.crosstab
    }

    /// True if order-statistic measures were requested.
    pub fn descriptive_statistics(&self) -> bool {
        self.descriptive_statistics
    }

    /// Reads any measure by name.
    pub fn measure(&self, column: &InputColumn, measure: &str) -> Option<&MetricValue> {
        read_measure(&self.crosstab, DIMENSION_MEASURE, column.name(), measure)
    }

    /// Reads the evidence attached to a measure.
    pub fn evidence(&self, column: &InputColumn, measure: &str) -> Option<&AnnotatedRows> {
        read_evidence(&self.crosstab, DIMENSION_MEASURE, column.name(), measure)
    }

    fn f64_measure(&self, column: &InputColumn, measure: &str) -> Option<f64> {
        self.measure(column, measure).and_then(MetricValue::as_f64)
    }

    pub fn row_count(&self, column: &InputColumn) -> Option<u64> {
        self.measure(column, MEASURE_ROW_COUNT)
            .and_then(MetricValue::as_u64)
    }

    pub fn null_count(&self, column: &InputColumn) -> Option<u64> {
        self.measure(column, MEASURE_NULL_COUNT)
            .and_then(MetricValue::as_u64)
    }

    pub fn highest_value(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_HIGHEST_VALUE)
    }

    pub fn lowest_value(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_LOWEST_VALUE)
    }

    pub fn sum(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_SUM)
    }

    pub fn mean(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_MEAN)
    }

    pub fn geometric_mean(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_GEOMETRIC_MEAN)
    }

    pub fn standard_deviation(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_STANDARD_DEVIATION)
    }

    pub fn variance(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_VARIANCE)
    }

    pub fn second_moment(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_SECOND_MOMENT)
    }

    pub fn sum_of_squares(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_SUM_OF_SQUARES)
    }

    pub fn median(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_MEDIAN)
    }

    pub fn percentile_25(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_PERCENTILE_25)
    }

    pub fn percentile_75(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_PERCENTILE_75)
    }

    pub fn skewness(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_SKEWNESS)
    }

    pub fn kurtosis(&self, column: &InputColumn) -> Option<f64> {
        self.f64_measure(column, MEASURE_KURTOSIS)
    }

    /// Rows holding the highest value.
    pub fn highest_value_rows(&self, column: &InputColumn) -> Option<&AnnotatedRows> {
        self.evidence(column, MEASURE_HIGHEST_VALUE)
    }

    /// Rows holding the lowest value.
    pub fn lowest_value_rows(&self, column: &InputColumn) -> Option<&AnnotatedRows> {
        self.evidence(column, MEASURE_LOWEST_VALUE)
    }

    /// Rows that were null.
    pub fn null_rows(&self, column: &InputColumn) -> Option<&AnnotatedRows> {
        self.evidence(column, MEASURE_NULL_COUNT)
    }

    /// Reassembles the moment summary of a column from its measures.
    pub(crate) fn summary(&self, column: &InputColumn) -> SummaryStatistics {
        let n = self
            .row_count(column)
            .unwrap_or(0)
            .saturating_sub(self.null_count(column).unwrap_or(0));
        match (self.lowest_value(column), self.highest_value(column)) {
            (Some(min), Some(max)) if n > 0 => SummaryStatistics::from_parts(
                n,
                min,
                max,
                self.sum(column).unwrap_or(0.0),
                self.sum_of_squares(column).unwrap_or(0.0),
                self.second_moment(column).unwrap_or(0.0),
                self.geometric_mean(column).unwrap_or(f64::NAN),
            ),
            _ => SummaryStatistics::default(),
        }
    }

    pub(crate) fn order_statistics(&self, column: &InputColumn) -> OrderStatistics {
        OrderStatistics {
            median: self.median(column),
            percentile_25: self.percentile_25(column),
            percentile_75: self.percentile_75(column),
            skewness: self.skewness(column),
            kurtosis: self.kurtosis(column),
        }
    }
}

impl AnalyzerResult for NumberResult {
    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }
}
