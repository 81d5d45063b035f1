//! Result of a [`DateTimeAnalyzer`](super::DateTimeAnalyzer) run.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::delegate::date_from_epoch_days;
use super::*;
use crate::analyzers::measures::{read_evidence, read_measure};
use crate::analyzers::traits::AnalyzerResult;
use crate::crosstab::Crosstab;
use crate::stats::DescriptiveStatistics;
use crate::storage::{AnnotatedRows, RowAnnotation};
use crate::types::MetricValue;

/// Exact order statistics over the date axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct DateOrderStatistics {
    pub(crate) median: Option<NaiveDate>,
    pub(crate) percentile_25: Option<NaiveDate>,
    pub(crate) percentile_75: Option<NaiveDate>,
    pub(crate) skewness: Option<f64>,
    pub(crate) kurtosis: Option<f64>,
}

impl DateOrderStatistics {
    pub(crate) fn from_descriptive(d: &DescriptiveStatistics) -> Self {
        Self {
            median: d.median().and_then(date_from_epoch_days),
            percentile_25: d.percentile(25.0).and_then(date_from_epoch_days),
            percentile_75: d.percentile(75.0).and_then(date_from_epoch_days),
            skewness: d.skewness(),
            kurtosis: d.kurtosis(),
        }
    }
}

/// Evidence handles, each optional so reducers can omit what no partial had.
#[derive(Debug, Clone, Default)]
pub(crate) struct DateTimeEvidence {
    pub(crate) null: Option<RowAnnotation>,
    pub(crate) max_date: Option<RowAnnotation>,
    pub(crate) min_date: Option<RowAnnotation>,
    pub(crate) max_time: Option<RowAnnotation>,
    pub(crate) min_time: Option<RowAnnotation>,
}

impl From<&DateTimeAnnotations> for DateTimeEvidence {
    fn from(a: &DateTimeAnnotations) -> Self {
        Self {
            null: Some(a.null.clone()),
            max_date: Some(a.max_date.clone()),
            min_date: Some(a.min_date.clone()),
            max_time: Some(a.max_time.clone()),
            min_time: Some(a.min_time.clone()),
        }
    }
}

/// Everything written for one date/time column.
#[derive(Debug, Default)]
pub(crate) struct DateTimeColumnMeasures {
    pub(crate) statistics: DateTimeStatistics,
    pub(crate) order: Option<DateOrderStatistics>,
    pub(crate) evidence: DateTimeEvidence,
}

impl DateTimeColumnMeasures {
    pub(crate) fn write(&self, writer: &mut MeasureWriter<'_>, column: &InputColumn) -> Result<()> {
        let s = &self.statistics;
        let e = &self.evidence;
        writer.select_column(column)?;
        writer.put(MEASURE_ROW_COUNT, s.row_count)?;
        writer.put(MEASURE_NULL_COUNT, s.null_count)?;
        match &e.null {
            Some(annotation) if s.null_count > 0 => {
                writer.attach(MEASURE_NULL_COUNT, annotation, &[column])?
            }
            _ => {}
        }

        let extremes = [
            (MEASURE_HIGHEST_DATE, s.max_date.map(MetricValue::from), &e.max_date),
            (MEASURE_LOWEST_DATE, s.min_date.map(MetricValue::from), &e.min_date),
            (MEASURE_HIGHEST_TIME, s.max_time.map(MetricValue::from), &e.max_time),
            (MEASURE_LOWEST_TIME, s.min_time.map(MetricValue::from), &e.min_time),
        ];
        for (measure, value, annotation) in extremes {
            let Some(value) = value else { continue };
            writer.put(measure, value)?;
            if let Some(annotation) = annotation {
                writer.attach(measure, annotation, &[column])?;
            }
        }
        writer.put_opt(MEASURE_MEAN, s.mean)?;

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

/// Per-column temporal measures, laid out as a `Column x Measure` crosstab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateTimeResult {
    columns: Vec<InputColumn>,
    crosstab: Crosstab<MetricValue>,
    descriptive_statistics: bool,
}

impl DateTimeResult {
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

    pub fn crosstab(&self) -> &Crosstab<MetricValue> {
        &self.crosstab
    }

    pub fn descriptive_statistics(&self) -> bool {
        self.descriptive_statistics
    }

    pub fn measure(&self, column: &InputColumn, measure: &str) -> Option<&MetricValue> {
        read_measure(&self.crosstab, DIMENSION_MEASURE, column.name(), measure)
    }

    pub fn evidence(&self, column: &InputColumn, measure: &str) -> Option<&AnnotatedRows> {
        read_evidence(&self.crosstab, DIMENSION_MEASURE, column.name(), measure)
    }

    pub fn row_count(&self, column: &InputColumn) -> Option<u64> {
        self.measure(column, MEASURE_ROW_COUNT)
            .and_then(MetricValue::as_u64)
    }

    pub fn null_count(&self, column: &InputColumn) -> Option<u64> {
        self.measure(column, MEASURE_NULL_COUNT)
            .and_then(MetricValue::as_u64)
    }

    pub fn highest_date(&self, column: &InputColumn) -> Option<NaiveDate> {
        self.measure(column, MEASURE_HIGHEST_DATE)
            .and_then(MetricValue::as_date)
    }

    pub fn lowest_date(&self, column: &InputColumn) -> Option<NaiveDate> {
        self.measure(column, MEASURE_LOWEST_DATE)
            .and_then(MetricValue::as_date)
    }

    pub fn highest_time(&self, column: &InputColumn) -> Option<NaiveTime> {
        self.measure(column, MEASURE_HIGHEST_TIME)
            .and_then(MetricValue::as_time)
    }

    pub fn lowest_time(&self, column: &InputColumn) -> Option<NaiveTime> {
        self.measure(column, MEASURE_LOWEST_TIME)
            .and_then(MetricValue::as_time)
    }

    /// Mean instant, floored to the millisecond.
    ///
    /// A reduced result recombines the floored partial means, so it can lie
    /// up to one millisecond before the mean of a single pass over the same
    /// rows.
    pub fn mean(&self, column: &InputColumn) -> Option<NaiveDateTime> {
        self.measure(column, MEASURE_MEAN)
            .and_then(MetricValue::as_date_time)
    }

    pub fn median(&self, column: &InputColumn) -> Option<NaiveDate> {
        self.measure(column, MEASURE_MEDIAN)
            .and_then(MetricValue::as_date)
    }

    pub fn percentile_25(&self, column: &InputColumn) -> Option<NaiveDate> {
        self.measure(column, MEASURE_PERCENTILE_25)
            .and_then(MetricValue::as_date)
    }

    pub fn percentile_75(&self, column: &InputColumn) -> Option<NaiveDate> {
        self.measure(column, MEASURE_PERCENTILE_75)
            .and_then(MetricValue::as_date)
    }

    pub fn skewness(&self, column: &InputColumn) -> Option<f64> {
        self.measure(column, MEASURE_SKEWNESS)
            .and_then(MetricValue::as_f64)
    }

    pub fn kurtosis(&self, column: &InputColumn) -> Option<f64> {
        self.measure(column, MEASURE_KURTOSIS)
            .and_then(MetricValue::as_f64)
    }

    pub(crate) fn statistics(&self, column: &InputColumn) -> DateTimeStatistics {
        DateTimeStatistics {
            row_count: self.row_count(column).unwrap_or(0),
            null_count: self.null_count(column).unwrap_or(0),
            max_date: self.highest_date(column),
            min_date: self.lowest_date(column),
            max_time: self.highest_time(column),
            min_time: self.lowest_time(column),
            mean: self.mean(column),
        }
    }

    pub(crate) fn order_statistics(&self, column: &InputColumn) -> DateOrderStatistics {
        DateOrderStatistics {
            median: self.median(column),
            percentile_25: self.percentile_25(column),
            percentile_75: self.percentile_75(column),
            skewness: self.skewness(column),
            kurtosis: self.kurtosis(column),
        }
    }
}

impl AnalyzerResult for DateTimeResult {
    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }
}
