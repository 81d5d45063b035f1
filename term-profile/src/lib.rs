//! # Term Profile - Column Profiling for Rust
//!
//! Term Profile computes descriptive statistics for the columns of a dataset
//! in a single pass. Rows are streamed through analyzers, one column delegate
//! per column, and the results are stored in a crosstab of
//! `(column, measure)` cells. Each cell may carry *evidence*: a handle to the
//! rows that produced the value, such as every row holding the maximum.
//!
//! ## Overview
//!
//! - **Number columns**: count, nulls, extremes, sum, mean, geometric mean,
//!   standard deviation, variance, second moment, sum of squares and,
//!   optionally, median, quartiles, skewness and kurtosis.
//! - **Text columns**: blanks, case, character classes, lengths, white
//!   spaces and word counts.
//! - **Boolean columns**: true/false/null tallies and the frequency of each
//!   combination of values across columns.
//! - **Date/time columns**: extreme dates and times of day, mean instant and,
//!   optionally, order statistics.
//!
//! Analyzers may be run over disjoint partitions of the rows; the partial
//! results are merged by [`reducers`] into the result a single pass would
//! have produced.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_profile::prelude::*;
//! use term_profile::sources::MemorySource;
//! use arrow::array::{Float64Array, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use std::sync::Arc;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("price", DataType::Float64, true),
//!     Field::new("sku", DataType::Utf8, true),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(Float64Array::from(vec![Some(9.5), None, Some(12.0)])),
//!         Arc::new(StringArray::from(vec![Some("A-1"), Some("B-22"), None])),
//!     ],
//! )?;
//!
//! let runner = ProfileRunner::profile(ProfileConfig::default().with_partitions(2));
//! let result = runner.run(&MemorySource::from_batch(batch)).await?;
//!
//! let price = InputColumn::number("price");
//! assert_eq!(result.row_count(&price), Some(3));
//! assert_eq!(result.number().unwrap().highest_value(&price), Some(12.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`storage`**: row annotations, the evidence behind measure values
//! - **`crosstab`**: the multi-dimensional result store
//! - **`analyzers`**: column delegates and the analyzers driving them
//! - **`reducers`**: merging of partial results
//! - **`sources`**: Arrow/DataFusion record batches as analyzer rows
//! - **`runner`**: partitioned execution on the tokio blocking pool
//! - **`config`** and **`logging`**: run settings and `tracing` setup

pub mod analyzers;
pub mod config;
pub mod crosstab;
pub mod data;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod reducers;
pub mod runner;
pub mod sources;
pub mod stats;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;
