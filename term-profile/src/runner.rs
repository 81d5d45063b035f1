//! Partitioned execution of an analyzer over a batch source.
//!
//! The runner is the execution harness around the synchronous core: it loads
//! the batches of a [`BatchSource`], numbers the rows, optionally collapses
//! identical rows into weighted rows, splits them into disjoint partitions,
//! runs one analyzer per partition on the blocking thread pool and reduces the
//! partial results.
//!
//! ```rust,no_run
//! use datafusion::prelude::SessionContext;
//! use term_profile::prelude::*;
//! use term_profile::sources::TableSource;
//!
//! # async fn example(ctx: SessionContext) -> term_profile::error::Result<()> {
//! let runner = ProfileRunner::profile(ProfileConfig::default().with_partitions(4));
//! let result = runner.run(&TableSource::new(ctx, "customers")).await?;
//! println!("{:?}", result.row_count(&InputColumn::number("age")));
//! # Ok(())
//! # }
//! ```

use futures::future::join_all;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::analyzers::{Analyzer, AnalyzerResult, ProfileAnalyzer};
use crate::config::ProfileConfig;
use crate::data::{InputColumn, InputRow};
use crate::error::{ProfileError, Result};
use crate::logging::{truncate_field, LogConfig};
use crate::reducers::{ProfileResultReducer, ResultReducer};
use crate::sources::{group_identical_rows, rows_from_batch, BatchSource, WeightedRow};

/// Progress of a run, reported once per finished partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    pub completed_partitions: usize,
    pub total_partitions: usize,
    /// Rows fed by the partition that just finished.
    pub partition_rows: usize,
}

/// Callback receiving [`RunProgress`] updates.
pub type ProgressCallback = Arc<dyn Fn(RunProgress) + Send + Sync>;

type AnalyzerConstructor<A> = dyn Fn(&[InputColumn], &ProfileConfig) -> Result<A> + Send + Sync;

/// Runs analyzer `A` over a source and reduces the partials with `R`.
pub struct ProfileRunner<A, R>
where
    A: Analyzer + 'static,
    R: ResultReducer<Result = A::Result>,
{
    build_analyzer: Arc<AnalyzerConstructor<A>>,
    reducer: R,
    config: ProfileConfig,
    log_config: LogConfig,
    progress: Option<ProgressCallback>,
}

impl ProfileRunner<ProfileAnalyzer, ProfileResultReducer> {
    /// Profiles every column of the source, whatever its family.
    pub fn profile(config: ProfileConfig) -> Self {
        let reducer = ProfileResultReducer::new(config.annotation_factory());
        Self::new(
            |columns, config| {
                ProfileAnalyzer::builder()
                    .columns(columns.iter().cloned())
                    .config(config)
                    .build()
            },
            reducer,
            config,
        )
    }
}

impl<A, R> ProfileRunner<A, R>
where
    A: Analyzer + 'static,
    R: ResultReducer<Result = A::Result>,
{
    /// Creates a runner; `build_analyzer` is called once per partition with
    /// the source's columns and must return an initialized analyzer.
    pub fn new(
        build_analyzer: impl Fn(&[InputColumn], &ProfileConfig) -> Result<A>
            + Send
            + Sync
            + 'static,
        reducer: R,
        config: ProfileConfig,
    ) -> Self {
        Self {
            build_analyzer: Arc::new(build_analyzer),
            reducer,
            config,
            log_config: LogConfig::default(),
            progress: None,
        }
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn on_progress(mut self, progress: impl Fn(RunProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Loads the source, analyzes it partition by partition and reduces the
    /// partial results.
    #[instrument(
        skip(self, source),
        fields(source = %source.description(), partitions = self.config.partitions)
    )]
    pub async fn run(&self, source: &dyn BatchSource) -> Result<A::Result> {
        self.config.validate()?;
        let schema = source.schema().await?;
        let columns = InputColumn::from_schema(&schema)?;

        let mut rows = Vec::new();
        let mut next_id = 0u64;
        for batch in source.batches().await? {
            rows.extend(rows_from_batch(&batch, next_id)?);
            next_id += batch.num_rows() as u64;
        }
        let weighted: Vec<WeightedRow> = if self.config.group_identical_rows {
            group_identical_rows(rows)
        } else {
            rows.into_iter()
                .map(|row| WeightedRow { row, weight: 1 })
                .collect()
        };

        let partitions = split(weighted, self.config.partitions);
        let total_partitions = partitions.len();
        crate::perf_debug!(
            self.log_config,
            rows = next_id,
            partitions = total_partitions,
            "Partitioned rows"
        );

        let completed = Arc::new(AtomicUsize::new(0));
        let tasks = partitions.into_iter().enumerate().map(|(index, rows)| {
            let analyzer = (self.build_analyzer)(&columns, &self.config);
            let completed = completed.clone();
            let progress = self.progress.clone();
            let log_config = self.log_config.clone();
            async move {
                let analyzer = analyzer?;
                let partition_rows = rows.len();
                let worker_log = log_config.clone();
                let partial = tokio::task::spawn_blocking(move || {
                    let limit = worker_log.max_field_length;
                    for WeightedRow { row, weight } in &rows {
                        crate::log_row!(
                            worker_log,
                            partition = index,
                            row_id = row.id(),
                            weight,
                            values = %truncate_field(&format!("{:?}", row.values()), limit),
                            "Feeding row"
                        );
                        analyzer.run(row, *weight)?;
                    }
                    analyzer.result()
                })
                .await
                .map_err(|e| ProfileError::execution(format!("partition {index} failed: {e}")))??;

                let completed_partitions = completed.fetch_add(1, Ordering::SeqCst) + 1;
                crate::log_partition!(
                    log_config,
                    partition = index,
                    rows = partition_rows,
                    completed = completed_partitions,
                    total = total_partitions,
                    "Partition finished"
                );
                if let Some(progress) = &progress {
                    progress(RunProgress {
                        completed_partitions,
                        total_partitions,
                        partition_rows,
                    });
                }
                Ok::<_, ProfileError>(partial)
            }
        });

        let partials = join_all(tasks)
            .await
            .into_iter()
            .collect::<Result<Vec<A::Result>>>()?;
        let result = self
            .reducer
            .reduce(&partials)?
            .ok_or_else(|| ProfileError::execution("no partial results to reduce"))?;
        if self.log_config.log_reductions {
            let columns = format!("{:?}", result.columns());
            debug!(
                partials = partials.len(),
                columns = %truncate_field(&columns, self.log_config.max_field_length),
                "Reduced partial results"
            );
        }
        info!(
            rows = next_id,
            partitions = total_partitions,
            "Profiling run finished"
        );
        Ok(result)
    }
}

impl<A, R> fmt::Debug for ProfileRunner<A, R>
where
    A: Analyzer + 'static,
    R: ResultReducer<Result = A::Result>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileRunner")
            .field("reducer", &self.reducer)
            .field("config", &self.config)
            .field("log_config", &self.log_config)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

/// Splits rows into at most `partitions` contiguous, non-empty chunks.
///
/// An empty input still yields one (empty) partition so that the run
/// produces a result.
fn split(rows: Vec<WeightedRow>, partitions: usize) -> Vec<Vec<WeightedRow>> {
    if rows.is_empty() {
        return vec![Vec::new()];
    }
    let chunk = rows.len().div_ceil(partitions.max(1));
    let mut chunks = Vec::new();
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        chunks.push(rows.by_ref().take(chunk).collect());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryRow;

    fn weighted(n: u64) -> Vec<WeightedRow> {
        (0..n)
            .map(|id| WeightedRow {
                row: MemoryRow::new(id),
                weight: 1,
            })
            .collect()
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let chunks = split(weighted(10), 3);
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![4, 4, 2]
        );
        let ids: Vec<u64> = chunks.iter().flatten().map(|w| w.row.id()).collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_never_yields_empty_chunks() {
        assert_eq!(split(weighted(2), 8).len(), 2);
        assert_eq!(split(weighted(5), 1).len(), 1);
        let empty = split(Vec::new(), 4);
        assert_eq!(empty.len(), 1);
        assert!(empty[0].is_empty());
    }
}
