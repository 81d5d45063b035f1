use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{merge_columns, merge_evidence, ResultReducer};
use crate::analyzers::boolean::*;
use crate::analyzers::measures::{measure_crosstab, MeasureWriter};
use crate::analyzers::AnalyzerResult;
use crate::data::InputColumn;
use crate::error::Result;
use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotation, RowAnnotationFactory};

/// Reduces [`BooleanResult`]s, including their value-combination tallies.
#[derive(Debug, Clone)]
pub struct BooleanResultReducer {
    factory: Arc<dyn RowAnnotationFactory>,
}

impl BooleanResultReducer {
    pub fn new(factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self { factory }
    }

    pub(crate) fn reduce_refs(
        &self,
        partials: &[&BooleanResult],
    ) -> Result<Option<BooleanResult>> {
        if partials.is_empty() {
            return Ok(None);
        }
        let factory = self.factory.as_ref();
        let columns = merge_columns(partials.iter().copied());

        let mut column_statistics = measure_crosstab(&columns, DIMENSION_MEASURE, &MEASURES)?;
        {
            let mut writer = MeasureWriter::new(&mut column_statistics, DIMENSION_MEASURE, factory);
            for column in &columns {
                self.reduce_column(partials, column)
                    .write(&mut writer, column)?;
            }
        }

        let value_combinations = if columns.len() > 1 {
            let tallies = self.reduce_combinations(partials, &columns);
            debug!(combinations = tallies.len(), "Merged value combinations");
            Some(combination_crosstab(&columns, tallies, factory)?)
        } else {
            None
        };

        info!(
            columns = columns.len(),
            partials = partials.len(),
            "Reduced boolean results"
        );
        Ok(Some(BooleanResult::new(
            columns,
            column_statistics,
            value_combinations,
        )))
    }

    fn reduce_column(
        &self,
        partials: &[&BooleanResult],
        column: &InputColumn,
    ) -> BooleanColumnMeasures {
        let factory = self.factory.as_ref();
        let contributing: Vec<&BooleanResult> = partials
            .iter()
            .copied()
            .filter(|p| p.columns().contains(column))
            .collect();
        let sum = |count: fn(&BooleanResult, &InputColumn) -> Option<u64>| {
            contributing
                .iter()
                .filter_map(|p| count(*p, column))
                .sum::<u64>()
        };
        let evidence = |measure: &str| {
            merge_evidence(
                factory,
                contributing.iter().filter_map(|p| p.evidence(column, measure)),
            )
        };

        BooleanColumnMeasures {
            row_count: sum(BooleanResult::row_count),
            null_count: sum(BooleanResult::null_count),
            true_count: sum(BooleanResult::true_count),
            false_count: sum(BooleanResult::false_count),
            null_annotation: evidence(MEASURE_NULL_COUNT),
            true_annotation: evidence(MEASURE_TRUE_COUNT),
            false_annotation: evidence(MEASURE_FALSE_COUNT),
        }
    }

    /// Sums tuple frequencies across partials, with each tuple laid out in
    /// the merged column order. Columns a partial did not analyze read as
    /// null.
    fn reduce_combinations(
        &self,
        partials: &[&BooleanResult],
        columns: &[InputColumn],
    ) -> Vec<CombinationTally> {
        let factory = self.factory.as_ref();
        let mut merged: BTreeMap<Vec<Option<bool>>, (u64, Option<RowAnnotation>)> =
            BTreeMap::new();

        for partial in partials {
            let positions: Vec<Option<usize>> = columns
                .iter()
                .map(|column| partial.columns().iter().position(|c| c == column))
                .collect();
            for combination in partial.value_combinations() {
                let values = positions
                    .iter()
                    .map(|position| {
                        position.and_then(|i| combination.values.get(i).copied().flatten())
                    })
                    .collect();
                let (frequency, annotation) = merged.entry(values).or_default();
                *frequency += combination.frequency;
                if let Some(evidence) = &combination.evidence {
                    let target = annotation.get_or_insert_with(|| factory.create_annotation());
                    factory.transfer_annotations(evidence.annotation(), target);
                }
            }
        }

        merged
            .into_iter()
            .map(|(values, (frequency, annotation))| CombinationTally {
                values,
                frequency,
                annotation,
            })
            .collect()
    }
}

impl Default for BooleanResultReducer {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryRowAnnotationFactory::new()))
    }
}

impl ResultReducer for BooleanResultReducer {
    type Result = BooleanResult;

    #[instrument(skip(self, partials), fields(reducer = "boolean", partials = partials.len()))]
    fn reduce(&self, partials: &[BooleanResult]) -> Result<Option<BooleanResult>> {
        let partials: Vec<&BooleanResult> = partials.iter().collect();
        self.reduce_refs(&partials)
    }
}
