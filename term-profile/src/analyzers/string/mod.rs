//! Text column profiling.

mod delegate;
mod result;

pub use delegate::{StringColumnDelegate, StringStatistics};
pub(crate) use delegate::StringAnnotations;
pub use result::StringResult;
pub(crate) use result::StringColumnMeasures;

use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::measures::{measure_crosstab, MeasureWriter};
use super::traits::{check_distinct_count, Analyzer, Lifecycle, LifecycleState};
use super::validate_columns;
use crate::data::{InputColumn, InputRow, ValueFamily};
use crate::error::Result;
use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotationFactory};

/// Name of the measure dimension.
pub const DIMENSION_MEASURES: &str = "Measures";

pub const MEASURE_ROW_COUNT: &str = "Row count";
pub const MEASURE_NULL_COUNT: &str = "Null count";
pub const MEASURE_BLANK_COUNT: &str = "Blank count";
pub const MEASURE_ENTIRELY_UPPERCASE_COUNT: &str = "Entirely uppercase count";
pub const MEASURE_ENTIRELY_LOWERCASE_COUNT: &str = "Entirely lowercase count";
pub const MEASURE_TOTAL_CHAR_COUNT: &str = "Total char count";
pub const MEASURE_MAX_CHARS: &str = "Max chars";
pub const MEASURE_MIN_CHARS: &str = "Min chars";
pub const MEASURE_AVG_CHARS: &str = "Avg chars";
pub const MEASURE_MAX_WHITE_SPACES: &str = "Max white spaces";
pub const MEASURE_MIN_WHITE_SPACES: &str = "Min white spaces";
pub const MEASURE_AVG_WHITE_SPACES: &str = "Avg white spaces";
pub const MEASURE_UPPERCASE_CHARS: &str = "Uppercase chars";
pub const MEASURE_UPPERCASE_CHARS_EXCL_FIRST_LETTERS: &str =
    "Uppercase chars (excl. first letters)";
pub const MEASURE_LOWERCASE_CHARS: &str = "Lowercase chars";
pub const MEASURE_DIGIT_CHARS: &str = "Digit chars";
pub const MEASURE_DIACRITIC_CHARS: &str = "Diacritic chars";
pub const MEASURE_NON_LETTER_CHARS: &str = "Non-letter chars";
pub const MEASURE_WORD_COUNT: &str = "Word count";
pub const MEASURE_MAX_WORDS: &str = "Max words";
pub const MEASURE_MIN_WORDS: &str = "Min words";
pub const MEASURE_AVG_WORDS: &str = "Avg words";

pub(crate) const MEASURES: [&str; 22] = [
    MEASURE_ROW_COUNT,
    MEASURE_NULL_COUNT,
    MEASURE_BLANK_COUNT,
    MEASURE_ENTIRELY_UPPERCASE_COUNT,
    MEASURE_ENTIRELY_LOWERCASE_COUNT,
    MEASURE_TOTAL_CHAR_COUNT,
    MEASURE_MAX_CHARS,
    MEASURE_MIN_CHARS,
    MEASURE_AVG_CHARS,
    MEASURE_MAX_WHITE_SPACES,
    MEASURE_MIN_WHITE_SPACES,
    MEASURE_AVG_WHITE_SPACES,
    MEASURE_UPPERCASE_CHARS,
    MEASURE_UPPERCASE_CHARS_EXCL_FIRST_LETTERS,
    MEASURE_LOWERCASE_CHARS,
    MEASURE_DIGIT_CHARS,
    MEASURE_DIACRITIC_CHARS,
    MEASURE_NON_LETTER_CHARS,
    MEASURE_WORD_COUNT,
    MEASURE_MAX_WORDS,
    MEASURE_MIN_WORDS,
    MEASURE_AVG_WORDS,
];

/// Profiles text columns: null/blank counts, casing, character classes,
/// and length, word and whitespace distributions.
#[derive(Debug)]
pub struct StringAnalyzer {
    columns: Vec<InputColumn>,
    factory: Arc<dyn RowAnnotationFactory>,
    delegates: Vec<StringColumnDelegate>,
    lifecycle: Lifecycle,
}

impl StringAnalyzer {
    /// Creates an uninitialized analyzer.
    pub fn new(columns: Vec<InputColumn>, factory: Arc<dyn RowAnnotationFactory>) -> Self {
        Self {
            columns,
            factory,
            delegates: Vec::new(),
            lifecycle: Lifecycle::default(),
        }
    }

    /// Returns a builder that initializes the analyzer on `build()`.
    pub fn builder() -> StringAnalyzerBuilder {
        StringAnalyzerBuilder::default()
    }

    /// Returns the delegate of a column, once initialized.
    pub fn delegate(&self, column: &InputColumn) -> Option<&StringColumnDelegate> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.delegates.get(index)
    }
}

impl Analyzer for StringAnalyzer {
    type Result = StringResult;

    fn name(&self) -> &str {
        "StringAnalyzer"
    }

    fn columns(&self) -> &[InputColumn] {
        &self.columns
    }

    fn lifecycle(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    fn initialize(&mut self) -> Result<()> {
        validate_columns(self.name(), &self.columns, Some(ValueFamily::Text))?;
        self.lifecycle.initialize(self.name())?;
        self.delegates = self
            .columns
            .iter()
            .map(|_| StringColumnDelegate::new(self.factory.clone()))
            .collect();
        debug!(columns = self.columns.len(), "Initialized string analyzer");
        Ok(())
    }

    fn run(&self, row: &dyn InputRow, distinct_count: u64) -> Result<()> {
        check_distinct_count(distinct_count)?;
        self.lifecycle.enter_run(self.name())?;
        for (column, delegate) in self.columns.iter().zip(&self.delegates) {
            delegate.run(row, row.value(column).as_text(), distinct_count);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(analyzer = "string", columns = self.columns.len()))]
    fn result(&self) -> Result<StringResult> {
        self.lifecycle.finalize(self.name())?;
        let delegates: Vec<&StringColumnDelegate> = self.delegates.iter().collect();
        let result = materialize(&self.columns, &delegates, self.factory.as_ref())?;
        info!(columns = self.columns.len(), "String analysis finalized");
        Ok(result)
    }
}

/// Writes the measures of the given delegates into a fresh result.
pub(crate) fn materialize(
    columns: &[InputColumn],
    delegates: &[&StringColumnDelegate],
    factory: &dyn RowAnnotationFactory,
) -> Result<StringResult> {
    let mut crosstab = measure_crosstab(columns, DIMENSION_MEASURES, &MEASURES)?;
    {
        let mut writer = MeasureWriter::new(&mut crosstab, DIMENSION_MEASURES, factory);
        for (column, delegate) in columns.iter().zip(delegates) {
            StringColumnMeasures {
                statistics: delegate.statistics(),
                annotations: Some(delegate.annotations().clone()),
            }
            .write(&mut writer, column)?;
        }
    }
    Ok(StringResult::new(columns.to_vec(), crosstab))
}

/// Builder for [`StringAnalyzer`].
#[derive(Debug, Default)]
pub struct StringAnalyzerBuilder {
    columns: Vec<InputColumn>,
    factory: Option<Arc<dyn RowAnnotationFactory>>,
}

impl StringAnalyzerBuilder {
    /// Adds a column.
    pub fn column(mut self, column: InputColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds several columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = InputColumn>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Sets the annotation factory; defaults to an in-memory factory.
    pub fn annotation_factory(mut self, factory: Arc<dyn RowAnnotationFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Builds and initializes the analyzer.
    pub fn build(self) -> Result<StringAnalyzer> {
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(InMemoryRowAnnotationFactory::new()));
        let mut analyzer = StringAnalyzer::new(self.columns, factory);
        analyzer.initialize()?;
        Ok(analyzer)
    }
}
