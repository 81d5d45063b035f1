//! Single-pass column analyzers.
//!
//! Each analyzer owns one column delegate per configured column. Rows are
//! pushed through [`Analyzer::run`], possibly from many threads at once, and
//! [`Analyzer::result`] materializes a crosstab-based result at end of
//! stream. Results of analyzers run over disjoint partitions can be merged
//! with the matching reducer in [`crate::reducers`].
//!
//! | Analyzer | Value family | Result |
//! |----------|--------------|--------|
//! | [`NumberAnalyzer`] | number | [`NumberResult`] |
//! | [`StringAnalyzer`] | text | [`StringResult`] |
//! | [`BooleanAnalyzer`] | boolean | [`BooleanResult`] |
//! | [`DateTimeAnalyzer`] | date/time | [`DateTimeResult`] |
//! | [`ProfileAnalyzer`] | any | [`ProfileResult`] |

pub mod boolean;
pub mod date_time;
pub(crate) mod measures;
pub mod number;
pub mod profile;
pub mod string;
mod traits;

pub use boolean::{BooleanAnalyzer, BooleanColumnDelegate, BooleanResult};
pub use date_time::{DateTimeAnalyzer, DateTimeColumnDelegate, DateTimeResult};
pub use number::{NumberAnalyzer, NumberColumnDelegate, NumberResult};
pub use profile::{ColumnDelegate, ProfileAnalyzer, ProfileResult};
pub use string::{StringAnalyzer, StringColumnDelegate, StringResult};
pub use traits::{Analyzer, AnalyzerResult, LifecycleState};

use crate::data::{InputColumn, InputRow, ValueFamily};
use crate::error::{ProfileError, Result};
use crate::storage::{RowAnnotation, RowAnnotationFactory};

/// Checks the configured columns of an analyzer.
///
/// `family` restricts the columns to one value family; `None` accepts any.
pub(crate) fn validate_columns(
    analyzer: &str,
    columns: &[InputColumn],
    family: Option<ValueFamily>,
) -> Result<()> {
    if columns.is_empty() {
        return Err(ProfileError::invalid_config(format!(
            "{analyzer} requires at least one column"
        )));
    }
    for (i, column) in columns.iter().enumerate() {
        if let Some(family) = family {
            if column.family() != family {
                return Err(ProfileError::invalid_config(format!(
                    "{analyzer} only accepts {family} columns, got {column}"
                )));
            }
        }
        if columns[..i].iter().any(|c| c.name() == column.name()) {
            return Err(ProfileError::invalid_config(format!(
                "column '{}' is configured more than once",
                column.name()
            )));
        }
    }
    Ok(())
}

/// Which end of the range an extreme tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extreme {
    Min,
    Max,
}

/// Updates a running extreme and its evidence.
///
/// A strictly better value replaces the extreme and resets the annotation;
/// an equal value only adds the row to the annotation. Callers hold their
/// delegate lock so both changes are observed together.
pub(crate) fn track_extreme<T: PartialOrd + Copy>(
    extreme: Extreme,
    current: &mut Option<T>,
    value: T,
    factory: &dyn RowAnnotationFactory,
    annotation: &RowAnnotation,
    row: &dyn InputRow,
    distinct_count: u64,
) {
    let replaces = match *current {
        None => true,
        Some(existing) => match extreme {
            Extreme::Min => value < existing,
            Extreme::Max => value > existing,
        },
    };
    if replaces {
        factory.reset_annotation(annotation);
        *current = Some(value);
    } else if *current != Some(value) {
        return;
    }
    factory.annotate(row, distinct_count, annotation);
}
