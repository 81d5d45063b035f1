//! Mixed-family profiling.
//!
//! [`ProfileAnalyzer`] accepts columns of any value family. The delegate kind
//! of each column is resolved once, at initialization, into a
//! [`ColumnDelegate`] variant; rows are then dispatched without any per-row
//! type inspection. The result groups one per-family result for each family
//! present.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::boolean::{self, BooleanColumnDelegate, BooleanResult, CombinationTallies};
use super::date_time::{self, DateTimeColumnDelegate, DateTimeResult};
use super::number::{self, NumberColumnDelegate, NumberResult};
use super::string::{self, StringColumnDelegate, StringResult};
use super::traits::{check_distinct_count, Analyzer, AnalyzerResult, Lifecycle, LifecycleState};
use super::validate_columns;
use crate::config::ProfileConfig;
use crate::data::{InputColumn, InputRow, Value, ValueFamily};
use crate::error::Result;
use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotationFactory};

/// The accumulator of one column, chosen by its value family.
#[derive(Debug)]
pub enum ColumnDelegate {
    Number(NumberColumnDelegate),
    Text(StringColumnDelegate),
    Boolean(BooleanColumnDelegate),
    DateTime(DateTimeColumnDelegate),
}

impl ColumnDelegate {
    /// Creates the delegate matching the column's family.
    pub fn for_column(
        column: &InputColumn,
        factory: Arc<dyn RowAnnotationFactory>,
        descriptive_statistics: bool,
    ) -> Self {
        match column.family() {
            ValueFamily::Number => {
                Self::Number(NumberColumnDelegate::new(factory, descriptive_statistics))
            }
            ValueFamily::Text => Self::Text(StringColumnDelegate::new(factory)),
            ValueFamily::Boolean => Self::Boolean(BooleanColumnDelegate::new(factory)),
            ValueFamily::DateTime => {
                Self::DateTime(DateTimeColumnDelegate::new(factory, descriptive_statistics))
            }
        }
    }

    pub fn family(&self) -> ValueFamily {
        match self {
            Self::Number(_) => ValueFamily::Number,
            Self::Text(_) => ValueFamily::Text,
            Self::Boolean(_) => ValueFamily::Boolean,
            Self::DateTime(_) => ValueFamily::DateTime,
        }
    }

    /// Feeds one value. Values of another family count as null.
    pub fn run(&self, row: &dyn InputRow, value: &Value, distinct_count: u64) {
        match self {
            Self::Number(d) => d.run(row, value.as_number(), distinct_count),
            Self::Text(d) => d.run(row, value.as_text(), distinct_count),
            Self::Boolean(d) => d.run(row, value.as_boolean(), distinct_count),
            Self::DateTime(d) => d.run(row, value.as_date_time(), distinct_count),
        }
    }
}

/// Profiles columns of any value family in one pass.
#[derive(Debug)]
pub struct ProfileAnalyzer {
    columns: Vec<InputColumn>,
    descriptive_statistics: bool,
    factory: Arc<dyn RowAnnotationFactory>,
    delegates: Vec<ColumnDelegate>,
    boolean_columns: usize,
    combinations: CombinationTallies,
    lifecycle: Lifecycle,
}

impl ProfileAnalyzer {
    pub fn new(columns: Vec<InputColumn>, factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self {
            columns,
            descriptive_statistics: false,
            factory,
            delegates: Vec::new(),
            boolean_columns: 0,
            combinations: CombinationTallies::default(),
            lifecycle: Lifecycle::default(),
        }
    }

    /// Enables order statistics for numeric and date/time columns.
    pub fn with_descriptive_statistics(mut self, enabled: bool) -> Self {
        self.descriptive_statistics = enabled;
        self
    }

    pub fn builder() -> ProfileAnalyzerBuilder {
        ProfileAnalyzerBuilder::default()
    }

    pub fn delegate(&self, column: &InputColumn) -> Option<&ColumnDelegate> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.delegates.get(index)
    }

    /// Columns and delegates of the variant selected by `pick`.
    fn family<'a, T>(
        &'a self,
        pick: impl Fn(&'a ColumnDelegate) -> Option<&'a T>,
    ) -> (Vec<InputColumn>, Vec<&'a T>) {
        self.columns
            .iter()
            .zip(&self.delegates)
            .filter_map(|(column, delegate)| pick(delegate).map(|d| (column.clone(), d)))
            .unzip()
    }
}

impl Analyzer for ProfileAnalyzer {
    type Result = ProfileResult;

    fn name(&self) -> &str {
        "ProfileAnalyzer"
    }

    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }

    fn lifecycle(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    fn initialize(&mut self) -> Result<()> {
        validate_columns(self.name(), &self.columns, None)?;
        self.lifecycle.initialize(self.name())?;
        self.delegates = self
            .columns
            .iter()
            .map(|c| {
                ColumnDelegate::for_column(c, self.factory.clone(), self.descriptive_statistics)
            })
            .collect();
        self.boolean_columns = self
            .columns
            .iter()
            .filter(|c| c.family() == ValueFamily::Boolean)
            .count();
        debug!(
            columns = self.columns.len(),
            boolean_columns = self.boolean_columns,
            descriptive_statistics = self.descriptive_statistics,
            "Initialized profile analyzer"
        );
        Ok(())
    }

    fn run(&self, row: &dyn InputRow, distinct_count: u64) -> Result<()> {
        check_distinct_count(distinct_count)?;
        self.lifecycle.enter_run(self.name())?;
        let mut booleans = Vec::with_capacity(self.boolean_columns);
        for (column, delegate) in self.columns.iter().zip(&self.delegates) {
            let value = row.value(column);
            delegate.run(row, value, distinct_count);
            if let ColumnDelegate::Boolean(_) = delegate {
                booleans.push(value.as_boolean());
            }
        }
        if self.boolean_columns > 1 {
            self.combinations
                .record(self.factory.as_ref(), row, booleans, distinct_count);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(analyzer = "profile", columns = self.columns.len()))]
    fn result(&self) -> Result<ProfileResult> {
        self.lifecycle.finalize(self.name())?;
        let factory = self.factory.as_ref();
        let descriptive = self.descriptive_statistics;

        let (columns, delegates) = self.family(|d| match d {
            ColumnDelegate::Number(d) => Some(d),
            _ => None,
        });
        let number = (!columns.is_empty())
            .then(|| number::materialize(&columns, &delegates, descriptive, factory))
            .transpose()?;

        let (columns, delegates) = self.family(|d| match d {
            ColumnDelegate::Text(d) => Some(d),
            _ => None,
        });
        let string = (!columns.is_empty())
            .then(|| string::materialize(&columns, &delegates, factory))
            .transpose()?;

        let (columns, delegates) = self.family(|d| match d {
            ColumnDelegate::Boolean(d) => Some(d),
            _ => None,
        });
        let boolean = (!columns.is_empty())
            .then(|| boolean::materialize(&columns, &delegates, &self.combinations, factory))
            .transpose()?;

        let (columns, delegates) = self.family(|d| match d {
            ColumnDelegate::DateTime(d) => Some(d),
            _ => None,
        });
        let date_time = (!columns.is_empty())
            .then(|| date_time::materialize(&columns, &delegates, descriptive, factory))
            .transpose()?;

        info!(columns = self.columns.len(), "Profile analysis finalized");
        Ok(ProfileResult::new(
            self.columns.clone(),
            number,
            string,
            boolean,
            date_time,
        ))
    }
}

/// Builder for [`ProfileAnalyzer`].
#[derive(Debug, Default)]
pub struct ProfileAnalyzerBuilder {
    columns: Vec<InputColumn>,
    descriptive_statistics: bool,
    factory: Option<Arc<dyn RowAnnotationFactory>>,
}

impl ProfileAnalyzerBuilder {
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

    /// Applies the analysis settings of a [`ProfileConfig`].
    pub fn config(self, config: &ProfileConfig) -> Self {
        self.descriptive_statistics(config.descriptive_statistics)
            .annotation_factory(config.annotation_factory())
    }

    pub fn build(self) -> Result<ProfileAnalyzer> {
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(InMemoryRowAnnotationFactory::new()));
        let mut analyzer = ProfileAnalyzer::new(self.columns, factory)
            .with_descriptive_statistics(self.descriptive_statistics);
        analyzer.initialize()?;
        Ok(analyzer)
    }
}

/// Results of a [`ProfileAnalyzer`], one per value family present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResult {
    columns: Vec<InputColumn>,
    number: Option<NumberResult>,
    string: Option<StringResult>,
    boolean: Option<BooleanResult>,
    date_time: Option<DateTimeResult>,
}

impl ProfileResult {
    pub(crate) fn new(
        columns: Vec<InputColumn>,
        number: Option<NumberResult>,
        string: Option<StringResult>,
        boolean: Option<BooleanResult>,
        date_time: Option<DateTimeResult>,
    ) -> Self {
        Self {
            columns,
            number,
            string,
            boolean,
            date_time,
        }
    }

    pub fn number(&self) -> Option<&NumberResult> {
        self.number.as_ref()
    }

    pub fn string(&self) -> Option<&StringResult> {
        self.string.as_ref()
    }

    pub fn boolean(&self) -> Option<&BooleanResult> {
        self.boolean.as_ref()
    }

    pub fn date_time(&self) -> Option<&DateTimeResult> {
        self.date_time.as_ref()
    }

    /// Row count of any column, whatever its family.
    pub fn row_count(&self, column: &InputColumn) -> Option<u64> {
        match column.family() {
            ValueFamily::Number => self.number.as_ref()?.row_count(column),
            ValueFamily::Text => self.string.as_ref()?.row_count(column),
            ValueFamily::Boolean => self.boolean.as_ref()?.row_count(column),
            ValueFamily::DateTime => self.date_time.as_ref()?.row_count(column),
        }
    }

    /// Null count of any column, whatever its family.
    pub fn null_count(&self, column: &InputColumn) -> Option<u64> {
        match column.family() {
            ValueFamily::Number => self.number.as_ref()?.null_count(column),
            ValueFamily::Text => self.string.as_ref()?.null_count(column),
            ValueFamily::Boolean => self.boolean.as_ref()?.null_count(column),
            ValueFamily::DateTime => self.date_time.as_ref()?.null_count(column),
        }
    }
}

impl AnalyzerResult for ProfileResult {
    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }
}
