//! Re-aggregation of partial results.
//!
//! When a scan is split into disjoint partitions, each partition runs its own
//! analyzer and produces a partial result. A [`ResultReducer`] folds the
//! partials into one result that is, up to floating point rounding, the
//! result a single pass over all rows would have produced.
//!
//! Combination rules, per kind of measure:
//!
//! - counts and tallies are summed;
//! - extremes take the min/max, and their evidence is transferred only from
//!   the partials that attained the global extreme;
//! - means, variances and averages are recombined from counts, sums and
//!   second moments, never averaged;
//! - order statistics (median, percentiles, skewness, kurtosis) cannot be
//!   recombined. They are carried over when exactly one partial saw values
//!   for the column, and are otherwise left absent with a warning.
//!
//! Every reducer is independent of the order in which partials are supplied:
//! floating point accumulators are folded in a canonical order.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use term_profile::prelude::*;
//!
//! let age = InputColumn::number("age");
//! let partial = |rows: &[(u64, f64)]| {
//!     let analyzer = NumberAnalyzer::builder().column(age.clone()).build().unwrap();
//!     for (id, value) in rows {
//!         analyzer.run(&MemoryRow::new(*id).with("age", *value), 1).unwrap();
//!     }
//!     analyzer.result().unwrap()
//! };
//!
//! let reducer = NumberResultReducer::new(Arc::new(InMemoryRowAnnotationFactory::new()));
//! let merged = reducer
//!     .reduce(&[partial(&[(0, 30.0), (1, 50.0)]), partial(&[(2, 40.0)])])
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(merged.row_count(&age), Some(3));
//! assert_eq!(merged.mean(&age), Some(40.0));
//! assert_eq!(merged.highest_value_rows(&age).unwrap().sample_rows()[0].id, 1);
//! ```

mod boolean;
mod date_time;
mod number;
mod profile;
mod string;

pub use boolean::BooleanResultReducer;
pub use date_time::DateTimeResultReducer;
pub use number::NumberResultReducer;
pub use profile::ProfileResultReducer;
pub use string::StringResultReducer;

use std::fmt::Debug;

use crate::analyzers::AnalyzerResult;
use crate::data::InputColumn;
use crate::error::Result;
use crate::storage::{AnnotatedRows, RowAnnotation, RowAnnotationFactory};

/// Combines partial results computed over disjoint row subsets.
pub trait ResultReducer: Send + Sync + Debug {
    /// The result type being reduced.
    type Result: AnalyzerResult;

    /// Folds the partials into one result; `None` when there are no partials.
    fn reduce(&self, partials: &[Self::Result]) -> Result<Option<Self::Result>>;
}

/// The columns of the merged result.
///
/// Partials of one scan normally share their column list, which is kept as
/// is. Otherwise the union is returned in sorted order, so that the outcome
/// does not depend on the order of the partials.
pub(crate) fn merge_columns<'a, R: AnalyzerResult>(
    partials: impl IntoIterator<Item = &'a R>,
) -> Vec<InputColumn> {
    let mut partials = partials.into_iter();
    let Some(first) = partials.next() else {
        return Vec::new();
    };
    let mut columns = first.columns().to_vec();
    let mut identical = true;
    for partial in partials {
        if partial.columns() != columns.as_slice() {
            identical = false;
        }
        for column in partial.columns() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }
    if !identical {
        columns.sort();
    }
    columns
}

/// Transfers the evidence of every source into one fresh annotation.
///
/// Returns `None` when there is nothing to transfer.
pub(crate) fn merge_evidence<'a>(
    factory: &dyn RowAnnotationFactory,
    sources: impl IntoIterator<Item = &'a AnnotatedRows>,
) -> Option<RowAnnotation> {
    let mut merged: Option<RowAnnotation> = None;
    for source in sources {
        let target = merged.get_or_insert_with(|| factory.create_annotation());
        factory.transfer_annotations(source.annotation(), target);
    }
    merged
}

/// Transfers the evidence of every source into an existing annotation.
pub(crate) fn transfer_evidence<'a>(
    factory: &dyn RowAnnotationFactory,
    sources: impl IntoIterator<Item = &'a AnnotatedRows>,
    target: &RowAnnotation,
) {
    for source in sources {
        factory.transfer_annotations(source.annotation(), target);
    }
}

#[cfg(test)]
mod tests;
