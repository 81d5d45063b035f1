use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{merge_columns, merge_evidence, ResultReducer};
use crate::analyzers::measures::{measure_crosstab, MeasureWriter};
use crate::analyzers::number::{measures, NumberColumnMeasures, NumberResult, DIMENSION_MEASURE};
use crate::analyzers::AnalyzerResult;
use crate::data::InputColumn;
use crate::error::Result;
use crate::stats::SummaryStatistics;
use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotationFactory};

/// Reduces [`NumberResult`]s.
#[derive(Debug, Clone)]
pub struct NumberResultReducer {
    factory: Arc<dyn RowAnnotationFactory>,
}

impl NumberResultReducer {
    /// Creates a reducer that merges evidence with `factory`.
    pub fn new(factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self { factory }
    }

    /// Reduces borrowed partials, as collected from mixed-family results.
    pub(crate) fn reduce_refs(&self, partials: &[&NumberResult]) -> Result<Option<NumberResult>> {
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
            "Reduced number results"
        );
        Ok(Some(NumberResult::new(
            columns,
            crosstab,
            descriptive_statistics,
        )))
    }

    fn reduce_column(
        &self,
        partials: &[&NumberResult],
        column: &InputColumn,
        descriptive_statistics: bool,
    ) -> NumberColumnMeasures {
        let factory = self.factory.as_ref();
        let contributing: Vec<&NumberResult> = partials
            .iter()
            .copied()
            .filter(|p| p.columns().contains(column))
            .collect();

        let mut summaries: Vec<SummaryStatistics> =
            contributing.iter().map(|p| p.summary(column)).collect();
        summaries.sort_by(SummaryStatistics::canonical_cmp);
        let summary = summaries.iter().fold(SummaryStatistics::new(), |mut acc, s| {
            acc.merge(s);
            acc
        });

        let max = summary.max();
        let min = summary.min();
        let max_annotation = merge_evidence(
            factory,
            contributing
                .iter()
                .filter(|p| max.is_some() && p.highest_value(column) == max)
                .filter_map(|p| p.highest_value_rows(column)),
        );
        let min_annotation = merge_evidence(
            factory,
            contributing
                .iter()
                .filter(|p| min.is_some() && p.lowest_value(column) == min)
                .filter_map(|p| p.lowest_value_rows(column)),
        );
        let null_annotation = merge_evidence(
            factory,
            contributing.iter().filter_map(|p| p.null_rows(column)),
        );

        let with_values: Vec<&NumberResult> = contributing
            .iter()
            .copied()
            .filter(|p| p.summary(column).n() > 0)
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

        NumberColumnMeasures {
            row_count: contributing.iter().filter_map(|p| p.row_count(column)).sum(),
            null_count: contributing.iter().filter_map(|p| p.null_count(column)).sum(),
            summary,
            order,
            null_annotation,
            max_annotation,
            min_annotation,
        }
    }
}

impl Default for NumberResultReducer {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryRowAnnotationFactory::new()))
    }
}

impl ResultReducer for NumberResultReducer {
    type Result = NumberResult;

    #[instrument(skip(self, partials), fields(reducer = "number", partials = partials.len()))]
    fn reduce(&self, partials: &[NumberResult]) -> Result<Option<NumberResult>> {
        let partials: Vec<&NumberResult> = partials.iter().collect();
        self.reduce_refs(&partials)
    }
}
