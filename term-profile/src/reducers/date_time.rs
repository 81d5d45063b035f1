use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{merge_columns, merge_evidence, ResultReducer};
use crate::analyzers::date_time::*;
use crate::analyzers::measures::{measure_crosstab, MeasureWriter};
use crate::analyzers::AnalyzerResult;
use crate::data::InputColumn;
use crate::error::Result;
use crate::storage::{
    AnnotatedRows, InMemoryRowAnnotationFactory, RowAnnotation, RowAnnotationFactory,
};
use crate::types::MetricValue;

/// Reduces [`DateTimeResult`]s.
///
/// The mean instant is recombined from each partial's mean weighted by its
/// value count, so it is exact up to the millisecond rounding of the partial
/// means.
#[derive(Debug, Clone)]
pub struct DateTimeResultReducer {
    factory: Arc<dyn RowAnnotationFactory>,
}

impl DateTimeResultReducer {
    pub fn new(factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self { factory }
    }

    pub(crate) fn reduce_refs(
        &self,
        partials: &[&DateTimeResult],
    ) -> Result<Option<DateTimeResult>> {
        if partials.is_empty() {
            return Ok(None);
        }
        let columns = merge_columns(partials.iter().copied());
        let descriptive_statistics = partials.iter().any(|p| p.descriptive_statistics());

        let measures = measures(descriptive_statistics);
        let mut crosstab = measure_crosstab(&columns, DIMENSION_MEASURE, &measures)?;
        {
            let mut writer =
                MeasureWriter::new(&mut crosstab, DIMENSION_MEASURE, self.factory.as_ref());
            for column in &columns {
                self.reduce_column(partials, column, descriptive_statistics)
                    .write(&mut writer, column)?;
            }
        }
        info!(
            columns = columns.len(),
            partials = partials.len(),
            "Reduced date/time results"
        );
        Ok(Some(DateTimeResult::new(
            columns,
            crosstab,
            descriptive_statistics,
        )))
    }

    fn reduce_column(
        &self,
        partials: &[&DateTimeResult],
        column: &InputColumn,
        descriptive_statistics: bool,
    ) -> DateTimeColumnMeasures {
        let contributing: Vec<&DateTimeResult> = partials
            .iter()
            .copied()
            .filter(|p| p.columns().contains(column))
            .collect();
        let parts: Vec<DateTimeStatistics> =
            contributing.iter().map(|p| p.statistics(column)).collect();

        let mut millis_sum: i128 = 0;
        let mut value_count: u64 = 0;
        for part in &parts {
            let values = part.row_count.saturating_sub(part.null_count);
            if let Some(mean) = part.mean {
                millis_sum += i128::from(instant_millis(mean)) * i128::from(values);
                value_count += values;
            }
        }

        let statistics = DateTimeStatistics {
            row_count: parts.iter().map(|s| s.row_count).sum(),
            null_count: parts.iter().map(|s| s.null_count).sum(),
            max_date: parts.iter().filter_map(|s| s.max_date).max(),
            min_date: parts.iter().filter_map(|s| s.min_date).min(),
            max_time: parts.iter().filter_map(|s| s.max_time).max(),
            min_time: parts.iter().filter_map(|s| s.min_time).min(),
            mean: mean_instant(millis_sum, value_count),
        };

        let evidence = DateTimeEvidence {
            null: self.evidence(&contributing, column, MEASURE_NULL_COUNT, None),
            max_date: self.evidence(
                &contributing,
                column,
                MEASURE_HIGHEST_DATE,
                statistics.max_date.map(MetricValue::from),
            ),
            min_date: self.evidence(
                &contributing,
                column,
                MEASURE_LOWEST_DATE,
                statistics.min_date.map(MetricValue::from),
            ),
            max_time: self.evidence(
                &contributing,
                column,
                MEASURE_HIGHEST_TIME,
                statistics.max_time.map(MetricValue::from),
            ),
            min_time: self.evidence(
                &contributing,
                column,
                MEASURE_LOWEST_TIME,
                statistics.min_time.map(MetricValue::from),
            ),
        };

        let with_values: Vec<&DateTimeResult> = contributing
            .iter()
            .copied()
            .filter(|p| {
                let s = p.statistics(column);
                s.row_count > s.null_count
            })
            .collect();
        let order = match with_values.as_slice() {
            _ if !descriptive_statistics => None,
            [] => None,
            [single] => Some(single.order_statistics(column)),
            several => {
                warn!(
                    column = column.name(),
                    partials = several.len(),
                    "Order statistics cannot be recombined across partials, leaving them absent"
                );
                None
            }
        };

        DateTimeColumnMeasures {
            statistics,
            order,
            evidence,
        }
    }

    /// Merges the evidence of a measure. With `attained` set, only partials
    /// whose own value equals it contribute.
    fn evidence(
        &self,
        partials: &[&DateTimeResult],
        column: &InputColumn,
        measure: &str,
        attained: Option<MetricValue>,
    ) -> Option<RowAnnotation> {
        let sources: Vec<&AnnotatedRows> = partials
            .iter()
            .filter(|p| match &attained {
                Some(value) => p.measure(column, measure) == Some(value),
                None => true,
            })
            .filter_map(|p| p.evidence(column, measure))
            .collect();
        merge_evidence(self.factory.as_ref(), sources)
    }
}

impl Default for DateTimeResultReducer {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryRowAnnotationFactory::new()))
    }
}

impl ResultReducer for DateTimeResultReducer {
    type Result = DateTimeResult;

    #[instrument(skip(self, partials), fields(reducer = "date_time", partials = partials.len()))]
    fn reduce(&self, partials: &[DateTimeResult]) -> Result<Option<DateTimeResult>> {
        let partials: Vec<&DateTimeResult> = partials.iter().collect();
        self.reduce_refs(&partials)
    }
}
