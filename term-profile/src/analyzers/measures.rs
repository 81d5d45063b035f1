//! Helpers for writing and reading per-column measure crosstabs.

use crate::crosstab::{Crosstab, CrosstabDimension, CrosstabNavigator, DIMENSION_COLUMN};
use crate::data::InputColumn;
use crate::error::Result;
use crate::storage::{AnnotatedRows, RowAnnotation, RowAnnotationFactory};
use crate::types::MetricValue;

/// Builds the standard `Column x <measure dimension>` crosstab.
pub(crate) fn measure_crosstab<'a>(
    columns: impl IntoIterator<Item = &'a InputColumn>,
    measure_dimension: &str,
    measures: &[&str],
) -> Result<Crosstab<MetricValue>> {
    Crosstab::new(vec![
        CrosstabDimension::new(DIMENSION_COLUMN)
            .with_categories(columns.into_iter().map(|c| c.name())),
        CrosstabDimension::new(measure_dimension).with_categories(measures.iter().copied()),
    ])
}

/// Writes one column's measures at a time.
pub(crate) struct MeasureWriter<'a> {
    nav: CrosstabNavigator<'a, MetricValue>,
    measure_dimension: &'a str,
    factory: &'a dyn RowAnnotationFactory,
}

impl<'a> MeasureWriter<'a> {
    pub(crate) fn new(
        crosstab: &'a mut Crosstab<MetricValue>,
        measure_dimension: &'a str,
        factory: &'a dyn RowAnnotationFactory,
    ) -> Self {
        Self {
            nav: crosstab.navigate(),
            measure_dimension,
            factory,
        }
    }

    pub(crate) fn select_column(&mut self, column: &InputColumn) -> Result<()> {
        self.nav.at(DIMENSION_COLUMN, column.name())?;
        Ok(())
    }

    pub(crate) fn put(&mut self, measure: &str, value: impl Into<MetricValue>) -> Result<()> {
        self.nav.at(self.measure_dimension, measure)?.put(value)
    }

    /// Writes the value if present; absent values leave the cell empty.
    pub(crate) fn put_opt<V: Into<MetricValue>>(
        &mut self,
        measure: &str,
        value: Option<V>,
    ) -> Result<()> {
        match value {
            Some(value) => self.put(measure, value),
            None => Ok(()),
        }
    }

    /// Attaches the annotation as evidence when it retained sample rows.
    pub(crate) fn attach(
        &mut self,
        measure: &str,
        annotation: &RowAnnotation,
        columns: &[&InputColumn],
    ) -> Result<()> {
        let Some(rows) = AnnotatedRows::create_if_sample_rows_available(
            annotation,
            self.factory,
            columns.iter().copied(),
        ) else {
            return Ok(());
        };
        self.nav.at(self.measure_dimension, measure)?.attach(rows)
    }
}

/// Reads a measure cell, `None` if the column, measure or value is absent.
pub(crate) fn read_measure<'a>(
    crosstab: &'a Crosstab<MetricValue>,
    measure_dimension: &str,
    column: &str,
    measure: &str,
) -> Option<&'a MetricValue> {
    crosstab
        .view()
        .at(DIMENSION_COLUMN, column)
        .ok()?
        .at(measure_dimension, measure)
        .ok()?
        .value()
}

/// Reads the evidence attached to a measure cell.
pub(crate) fn read_evidence<'a>(
    crosstab: &'a Crosstab<MetricValue>,
    measure_dimension: &str,
    column: &str,
    measure: &str,
) -> Option<&'a AnnotatedRows> {
    crosstab
        .view()
        .at(DIMENSION_COLUMN, column)
        .ok()?
        .at(measure_dimension, measure)
        .ok()?
        .attachments()
        .ok()?
        .first()
}
