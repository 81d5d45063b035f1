//! Result of a [`BooleanAnalyzer`](super::BooleanAnalyzer) run.

use serde::{Deserialize, Serialize};

use super::*;
use crate::analyzers::measures::{read_evidence, read_measure};
use crate::analyzers::traits::AnalyzerResult;
use crate::crosstab::{Crosstab, CrosstabDimension, DIMENSION_COLUMN};
use crate::storage::{AnnotatedRows, RowAnnotation};
use crate::types::MetricValue;

/// Everything written for one boolean column.
#[derive(Debug, Default)]
pub(crate) struct BooleanColumnMeasures {
    pub(crate) row_count: u64,
    pub(crate) null_count: u64,
    pub(crate) true_count: u64,
    pub(crate) false_count: u64,
    pub(crate) null_annotation: Option<RowAnnotation>,
    pub(crate) true_annotation: Option<RowAnnotation>,
    pub(crate) false_annotation: Option<RowAnnotation>,
}

impl BooleanColumnMeasures {
    pub(crate) fn write(&self, writer: &mut MeasureWriter<'_>, column: &InputColumn) -> Result<()> {
        writer.select_column(column)?;
        writer.put(MEASURE_ROW_COUNT, self.row_count)?;
        let counts = [
            (MEASURE_NULL_COUNT, self.null_count, &self.null_annotation),
            (MEASURE_TRUE_COUNT, self.true_count, &self.true_annotation),
            (MEASURE_FALSE_COUNT, self.false_count, &self.false_annotation),
        ];
        for (measure, count, annotation) in counts {
            writer.put(measure, count)?;
            match annotation {
                Some(annotation) if count > 0 => writer.attach(measure, annotation, &[column])?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// One tallied tuple of values across all analyzed columns.
#[derive(Debug, Clone)]
pub(crate) struct CombinationTally {
    pub(crate) values: Vec<Option<bool>>,
    pub(crate) frequency: u64,
    pub(crate) annotation: Option<RowAnnotation>,
}

/// Label of the `index`-th combination once sorted by frequency.
fn combination_label(index: usize, len: usize) -> String {
    if index == 0 {
        MEASURE_MOST_FREQUENT.to_string()
    } else if index + 1 == len {
        MEASURE_LEAST_FREQUENT.to_string()
    } else {
        format!("{COMBINATION_PREFIX}{index}")
    }
}

/// Builds the `Column (+ Frequency) x Measure` crosstab of value tuples.
///
/// Tuples are ordered by descending frequency, ties by descending tuple
/// (`None < false < true`). Values are written as 1/0; nulls leave the cell
/// empty.
pub(crate) fn combination_crosstab(
    columns: &[InputColumn],
    mut tallies: Vec<CombinationTally>,
    factory: &dyn RowAnnotationFactory,
) -> Result<Crosstab<MetricValue>> {
    tallies.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| b.values.cmp(&a.values))
    });

    let mut crosstab = Crosstab::new(vec![
        CrosstabDimension::new(DIMENSION_COLUMN).with_categories(
            columns
                .iter()
                .map(|c| c.name())
                .chain([COLUMN_FREQUENCY]),
        ),
        CrosstabDimension::new(DIMENSION_MEASURE),
    ])?;

    let len = tallies.len();
    for (index, tally) in tallies.into_iter().enumerate() {
        let label = combination_label(index, len);
        crosstab.add_category(DIMENSION_MEASURE, label.as_str())?;

        let mut nav = crosstab.navigate();
        nav.at(DIMENSION_MEASURE, &label)?;
        nav.at(DIMENSION_COLUMN, COLUMN_FREQUENCY)?
            .put(tally.frequency)?;
        if let Some(annotation) = &tally.annotation {
            if let Some(rows) =
                AnnotatedRows::create_if_sample_rows_available(annotation, factory, columns)
            {
                nav.attach(rows)?;
            }
        }
        for (column, value) in columns.iter().zip(&tally.values) {
            if let Some(value) = value {
                nav.at(DIMENSION_COLUMN, column.name())?
                    .put(i64::from(*value))?;
            }
        }
    }
    Ok(crosstab)
}

/// A tuple of values observed across the analyzed columns.
#[derive(Debug, Clone)]
pub struct ValueCombination {
    /// The crosstab label: "Most frequent", "Least frequent" or "Combination N".
    pub label: String,
    /// One value per analyzed column, in column order; `None` for null.
    pub values: Vec<Option<bool>>,
    /// Number of logical rows holding this tuple.
    pub frequency: u64,
    /// Sample rows holding this tuple.
    pub evidence: Option<AnnotatedRows>,
}

/// Per-column boolean counts, plus a tally of value tuples when more than
/// one column was analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooleanResult {
    columns: Vec<InputColumn>,
    column_statistics: Crosstab<MetricValue>,
    value_combinations: Option<Crosstab<MetricValue>>,
}

impl BooleanResult {
    pub(crate) fn new(
        columns: Vec<InputColumn>,
        column_statistics: Crosstab<MetricValue>,
        value_combinations: Option<Crosstab<MetricValue>>,
    ) -> Self {
        Self {
            columns,
            column_statistics,
            value_combinations,
        }
    }

    /// The `Column x Measure` crosstab of counts.
    pub fn column_statistics(&self) -> &Crosstab<MetricValue> {
        &self.column_statistics
    }

    /// The crosstab of value tuples, absent for a single column.
    pub fn value_combination_crosstab(&self) -> Option<&Crosstab<MetricValue>> {
        self.value_combinations.as_ref()
    }

    pub fn measure(&self, column: &InputColumn, measure: &str) -> Option<&MetricValue> {
        read_measure(&self.column_statistics, DIMENSION_MEASURE, column.name(), measure)
    }

    pub fn evidence(&self, column: &InputColumn, measure: &str) -> Option<&AnnotatedRows> {
        read_evidence(&self.column_statistics, DIMENSION_MEASURE, column.name(), measure)
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

    pub fn true_count(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_TRUE_COUNT)
    }

    pub fn false_count(&self, column: &InputColumn) -> Option<u64> {
        self.count(column, MEASURE_FALSE_COUNT)
    }

    /// The tallied tuples, most frequent first.
    pub fn value_combinations(&self) -> Vec<ValueCombination> {
        let Some(crosstab) = &self.value_combinations else {
            return Vec::new();
        };
        let Ok(labels) = crosstab.dimension(DIMENSION_MEASURE) else {
            return Vec::new();
        };
        labels
            .categories()
            .iter()
            .filter_map(|label| {
                let row = crosstab.view().at(DIMENSION_MEASURE, label).ok()?;
                let frequency_cell = row.clone().at(DIMENSION_COLUMN, COLUMN_FREQUENCY).ok()?;
                let frequency = frequency_cell.value().and_then(MetricValue::as_u64)?;
                let evidence = frequency_cell
                    .attachments()
                    .ok()
                    .and_then(|a| a.first())
                    .cloned();
                let values = self
                    .columns
                    .iter()
                    .map(|column| {
                        row.clone()
                            .at(DIMENSION_COLUMN, column.name())
                            .ok()
                            .and_then(|cell| cell.value())
                            .and_then(MetricValue::as_i64)
                            .map(|v| v == 1)
                    })
                    .collect();
                Some(ValueCombination {
                    label: label.clone(),
                    values,
                    frequency,
                    evidence,
                })
            })
            .collect()
    }

    pub fn most_frequent_combination(&self) -> Option<ValueCombination> {
        self.value_combinations().into_iter().next()
    }

    pub fn least_frequent_combination(&self) -> Option<ValueCombination> {
        self.value_combinations().into_iter().last()
    }
}

impl AnalyzerResult for BooleanResult {
    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }
}
