//! Result of a [`StringAnalyzer`](super::StringAnalyzer) run.

use serde::{Deserialize, Serialize};

use super::*;
use crate::analyzers::measures::{read_evidence, read_measure};
use crate::analyzers::traits::AnalyzerResult;
use crate::crosstab::Crosstab;
use crate::storage::{AnnotatedRows, RowAnnotation};
use crate::types::MetricValue;

/// Everything written for one text column.
#[derive(Debug, Default)]
pub(crate) struct StringColumnMeasures {
    pub(crate) statistics: StringStatistics,
    pub(crate) annotations: Option<StringAnnotations>,
}

impl StringColumnMeasures {
    pub(crate) fn write(&self, writer: &mut MeasureWriter<'_>, column: &InputColumn) -> Result<()> {
        let s = &self.statistics;
        let a = self.annotations.as_ref();
        writer.select_column(column)?;

        write_count(writer, column, MEASURE_ROW_COUNT, s.row_count, None)?;
        write_count(writer, column, MEASURE_NULL_COUNT, s.null_count, a.map(|a| &a.null))?;
        write_count(writer, column, MEASURE_BLANK_COUNT, s.blank_count, a.map(|a| &a.blank))?;
        write_count(
            writer,
            column,
            MEASURE_ENTIRELY_UPPERCASE_COUNT,
            s.entirely_uppercase,
            a.map(|a| &a.entirely_uppercase),
        )?;
        write_count(
            writer,
            column,
            MEASURE_ENTIRELY_LOWERCASE_COUNT,
            s.entirely_lowercase,
            a.map(|a| &a.entirely_lowercase),
        )?;
        write_count(writer, column, MEASURE_TOTAL_CHAR_COUNT, s.total_chars, None)?;
        write_count(writer, column, MEASURE_UPPERCASE_CHARS, s.uppercase, None)?;
        write_count(
            writer,
            column,
            MEASURE_UPPERCASE_CHARS_EXCL_FIRST_LETTERS,
            s.uppercase_excl_first_letters,
            a.map(|a| &a.uppercase_excl_first_letters),
        )?;
        write_count(writer, column, MEASURE_LOWERCASE_CHARS, s.lowercase, None)?;
        write_count(writer, column, MEASURE_DIGIT_CHARS, s.digits, a.map(|a| &a.digits))?;
        write_count(
            writer,
            column,
            MEASURE_DIACRITIC_CHARS,
            s.diacritics,
            a.map(|a| &a.diacritics),
        )?;
        write_count(writer, column, MEASURE_NON_LETTER_CHARS, s.non_letters, None)?;
        write_count(writer, column, MEASURE_WORD_COUNT, s.total_words, None)?;

        let extremes = [
            (MEASURE_MAX_CHARS, s.max_chars, a.map(|a| &a.max_chars)),
            (MEASURE_MIN_CHARS, s.min_chars, a.map(|a| &a.min_chars)),
            (MEASURE_MAX_WHITE_SPACES, s.max_whitespace, a.map(|a| &a.max_whitespace)),
            (MEASURE_MIN_WHITE_SPACES, s.min_whitespace, a.map(|a| &a.min_whitespace)),
            (MEASURE_MAX_WORDS, s.max_words, a.map(|a| &a.max_words)),
            (MEASURE_MIN_WORDS, s.min_words, a.map(|a| &a.min_words)),
        ];
        for (measure, value, annotation) in extremes {
            let Some(value) = value else { continue };
            writer.put(measure, value)?;
            if let Some(annotation) = annotation {
                writer.attach(measure, annotation, &[column])?;
            }
        }

        writer.put_opt(MEASURE_AVG_CHARS, s.avg_chars)?;
        writer.put_opt(MEASURE_AVG_WHITE_SPACES, s.avg_whitespace)?;
        writer.put_opt(MEASURE_AVG_WORDS, s.avg_words)?;
        Ok(())
    }
}

fn write_count(
    writer: &mut MeasureWriter<'_>,
    column: &InputColumn,
    measure: &str,
    value: u64,
    annotation: Option<&RowAnnotation>,
) -> Result<()> {
    writer.put(measure, value)?;
    match annotation {
        Some(annotation) if value > 0 => writer.attach(measure, annotation, &[column]),
        _ => Ok(()),
    }
}

/// Per-column text measures, laid out as a `Column x Measures` crosstab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringResult {
    columns: Vec<InputColumn>,
    crosstab: Crosstab<MetricValue>,
}

impl StringResult {
    pub(crate) fn new(columns: Vec<InputColumn>, crosstab: Crosstab<MetricValue>) -> Self {
        Self { columns, crosstab }
    }

    /// The underlying crosstab.
    pub fn crosstab(&self) -> &Crosstab<MetricValue> {
        &self.crosstab
    }

    /// Reads any measure by name.
    pub fn measure(&self, column: &InputColumn, measure: &str) -> Option<&MetricValue> {
        read_measure(&self.crosstab, DIMENSION_MEASURES, column.name(), measure)
    }

    /// Reads the evidence attached to a measure.
    pub fn evidence(&self, column: &InputColumn, measure: &str) -> Option<&AnnotatedRows> {
        read_evidence(&self.crosstab, DIMENSION_MEASURES, column.name(), measure)
    }

    fn count(&self, column: &InputColumn, measure: &str) -> Option<u64> {
        self.measure(column, measure).and_then(MetricValue::as_u64)
    }

    pub fn row_count(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_ROW_COUNT)
    }

    pub fn null_count(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_NULL_COUNT)
    }

    pub fn blank_count(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_BLANK_COUNT)
    }

    pub fn entirely_uppercase_count(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_ENTIRELY_UPPERCASE_COUNT)
    }

    pub fn entirely_lowercase_count(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_ENTIRELY_LOWERCASE_COUNT)
    }

    pub fn total_char_count(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_TOTAL_CHAR_COUNT)
    }

    pub fn max_chars(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_MAX_CHARS)
    }

    pub fn min_chars(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_MIN_CHARS)
    }

    pub fn avg_chars(&self, column: &InputColumn) -> Option<f64> {
        self.measure(column, MEASURE_AVG_CHARS)
            .and_then(MetricValue::as_f64)
    }

    pub fn max_white_spaces(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_MAX_WHITE_SPACES)
    }

    pub fn min_white_spaces(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_MIN_WHITE_SPACES)
    }

    pub fn avg_white_spaces(&self, column: &InputColumn) -> Option<f64> {
        self.measure(column, MEASURE_AVG_WHITE_SPACES)
            .and_then(MetricValue::as_f64)
    }

    pub fn uppercase_chars(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_UPPERCASE_CHARS)
    }

    pub fn uppercase_chars_excl_first_letters(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_UPPERCASE_CHARS_EXCL_FIRST_LETTERS)
    }

    pub fn lowercase_chars(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_LOWERCASE_CHARS)
    }

    pub fn digit_chars(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_DIGIT_CHARS)
    }

    pub fn diacritic_chars(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_DIACRITIC_CHARS)
    }

    pub fn non_letter_chars(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_NON_LETTER_CHARS)
    }

    pub fn word_count(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_WORD_COUNT)
    }

    pub fn max_words(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_MAX_WORDS)
    }

    pub fn min_words(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_MIN_WORDS)
    }

    pub fn avg_words(&self, column: &InputColumn) -> Option<f64> {
        self.measure(column, MEASURE_AVG_WORDS)
            .and_then(MetricValue::as_f64)
    }

    /// Reassembles the tallies of a column from its measures.
    pub(crate) fn statistics(&self, column: &InputColumn) -> StringStatistics {
        let count = |measure| self.count(column, measure).unwrap_or(0);
        StringStatistics {
            row_count: count(MEASURE_ROW_COUNT),
            null_count: count(MEASURE_NULL_COUNT),
            blank_count: count(MEASURE_BLANK_COUNT),
            entirely_uppercase: count(MEASURE_ENTIRELY_UPPERCASE_COUNT),
            entirely_lowercase: count(MEASURE_ENTIRELY_LOWERCASE_COUNT),
            total_chars: count(MEASURE_TOTAL_CHAR_COUNT),
            total_words: count(MEASURE_WORD_COUNT),
            uppercase: count(MEASURE_UPPERCASE_CHARS),
            uppercase_excl_first_letters: count(MEASURE_UPPERCASE_CHARS_EXCL_FIRST_LETTERS),
            lowercase: count(MEASURE_LOWERCASE_CHARS),
            digits: count(MEASURE_DIGIT_CHARS),
            diacritics: count(MEASURE_DIACRITIC_CHARS),
            non_letters: count(MEASURE_NON_LETTER_CHARS),
            max_chars: self.max_chars(column),
            min_chars: self.min_chars(column),
            max_words: self.max_words(column),
            min_words: self.min_words(column),
            max_whitespace: self.max_white_spaces(column),
            min_whitespace: self.min_white_spaces(column),
            avg_chars: self.avg_chars(column),
            avg_words: self.avg_words(column),
            avg_whitespace: self.avg_white_spaces(column),
        }
    }
}

impl AnalyzerResult for StringResult {
    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }
}
