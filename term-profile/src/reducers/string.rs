use std::sync::Arc;
use tracing::{info, instrument};

use super::{merge_columns, transfer_evidence, ResultReducer};
use crate::analyzers::measures::{measure_crosstab, MeasureWriter};
use crate::analyzers::string::*;
use crate::analyzers::AnalyzerResult;
use crate::data::InputColumn;
use crate::error::Result;
use crate::stats::AverageBuilder;
use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotationFactory};
use crate::types::MetricValue;

/// Reduces [`StringResult`]s.
#[derive(Debug, Clone)]
pub struct StringResultReducer {
    factory: Arc<dyn RowAnnotationFactory>,
}

impl StringResultReducer {
    pub fn new(factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self { factory }
    }

    pub(crate) fn reduce_refs(&self, partials: &[&StringResult]) -> Result<Option<StringResult>> {
        if partials.is_empty() {
            return Ok(None);
        }
        let columns = merge_columns(partials.iter().copied());
        let mut crosstab = measure_crosstab(&columns, DIMENSION_MEASURES, &MEASURES)?;
        {
            let mut writer =
                MeasureWriter::new(&mut crosstab, DIMENSION_MEASURES, self.factory.as_ref());
            for column in &columns {
                self.reduce_column(partials, column)
                    .write(&mut writer, column)?;
            }
        }
        info!(
            columns = columns.len(),
            partials = partials.len(),
            "Reduced string results"
        );
        Ok(Some(StringResult::new(columns, crosstab)))
    }

    fn reduce_column(
        &self,
        partials: &[&StringResult],
        column: &InputColumn,
    ) -> StringColumnMeasures {
        let factory = self.factory.as_ref();
        let contributing: Vec<&StringResult> = partials
            .iter()
            .copied()
            .filter(|p| p.columns().contains(column))
            .collect();
        let tallies: Vec<StringStatistics> =
            contributing.iter().map(|p| p.statistics(column)).collect();

        let sum = |pick: fn(&StringStatistics) -> u64| tallies.iter().map(pick).sum::<u64>();
        let max =
            |pick: fn(&StringStatistics) -> Option<u64>| tallies.iter().filter_map(pick).max();
        let min =
            |pick: fn(&StringStatistics) -> Option<u64>| tallies.iter().filter_map(pick).min();
        let average = |pick: fn(&StringStatistics) -> Option<f64>| {
            let mut builders: Vec<AverageBuilder> = tallies
                .iter()
                .filter_map(|s| {
                    let values = s.row_count.saturating_sub(s.null_count);
                    pick(s).map(|avg| AverageBuilder::from_average(avg, values))
                })
                .collect();
            builders.sort_by(AverageBuilder::canonical_cmp);
            builders
                .iter()
                .fold(AverageBuilder::new(), |mut acc, b| {
                    acc.merge(b);
                    acc
                })
                .average()
        };

        let statistics = StringStatistics {
            row_count: sum(|s| s.row_count),
            null_count: sum(|s| s.null_count),
            blank_count: sum(|s| s.blank_count),
            entirely_uppercase: sum(|s| s.entirely_uppercase),
            entirely_lowercase: sum(|s| s.entirely_lowercase),
            total_chars: sum(|s| s.total_chars),
            total_words: sum(|s| s.total_words),
            uppercase: sum(|s| s.uppercase),
            uppercase_excl_first_letters: sum(|s| s.uppercase_excl_first_letters),
            lowercase: sum(|s| s.lowercase),
            digits: sum(|s| s.digits),
            diacritics: sum(|s| s.diacritics),
            non_letters: sum(|s| s.non_letters),
            max_chars: max(|s| s.max_chars),
            min_chars: min(|s| s.min_chars),
            max_words: max(|s| s.max_words),
            min_words: min(|s| s.min_words),
            max_whitespace: max(|s| s.max_whitespace),
            min_whitespace: min(|s| s.min_whitespace),
            avg_chars: average(|s| s.avg_chars),
            avg_words: average(|s| s.avg_words),
            avg_whitespace: average(|s| s.avg_whitespace),
        };

        let annotations = StringAnnotations::new(factory);
        let counted = [
            (MEASURE_NULL_COUNT, &annotations.null),
            (MEASURE_BLANK_COUNT, &annotations.blank),
            (MEASURE_ENTIRELY_UPPERCASE_COUNT, &annotations.entirely_uppercase),
            (MEASURE_ENTIRELY_LOWERCASE_COUNT, &annotations.entirely_lowercase),
            (
                MEASURE_UPPERCASE_CHARS_EXCL_FIRST_LETTERS,
                &annotations.uppercase_excl_first_letters,
            ),
            (MEASURE_DIGIT_CHARS, &annotations.digits),
            (MEASURE_DIACRITIC_CHARS, &annotations.diacritics),
        ];
        for (measure, target) in counted {
            let sources = contributing.iter().filter_map(|p| p.evidence(column, measure));
            transfer_evidence(factory, sources, target);
        }

        let extremes = [
            (MEASURE_MAX_CHARS, statistics.max_chars, &annotations.max_chars),
            (MEASURE_MIN_CHARS, statistics.min_chars, &annotations.min_chars),
            (MEASURE_MAX_WORDS, statistics.max_words, &annotations.max_words),
            (MEASURE_MIN_WORDS, statistics.min_words, &annotations.min_words),
            (MEASURE_MAX_WHITE_SPACES, statistics.max_whitespace, &annotations.max_whitespace),
            (MEASURE_MIN_WHITE_SPACES, statistics.min_whitespace, &annotations.min_whitespace),
        ];
        for (measure, extreme, target) in extremes {
            let Some(extreme) = extreme else { continue };
            let sources = contributing
                .iter()
                .filter(|p| {
                    p.measure(column, measure).and_then(MetricValue::as_u64) == Some(extreme)
                })
                .filter_map(|p| p.evidence(column, measure));
            transfer_evidence(factory, sources, target);
        }

        StringColumnMeasures {
            statistics,
            annotations: Some(annotations),
        }
    }
}

impl Default for StringResultReducer {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryRowAnnotationFactory::new()))
    }
}

impl ResultReducer for StringResultReducer {
    type Result = StringResult;

    #[instrument(skip(self, partials), fields(reducer = "string", partials = partials.len()))]
    fn reduce(&self, partials: &[StringResult]) -> Result<Option<StringResult>> {
        let partials: Vec<&StringResult> = partials.iter().collect();
        self.reduce_refs(&partials)
    }
}
