//! Row sources for profiling runs.
//!
//! The analyzers consume [`InputRow`](crate::data::InputRow)s; this module
//! turns Arrow record batches, either held in memory or read from a table
//! registered with a DataFusion [`SessionContext`], into such rows.

mod convert;

pub use convert::{group_identical_rows, rows_from_batch, value_family, WeightedRow};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::fmt::{self, Debug};
use tracing::{debug, instrument};

use crate::error::{ProfileError, Result};

/// A source of record batches.
///
/// # Examples
///
/// ```rust,ignore
/// use datafusion::prelude::SessionContext;
/// use term_profile::sources::{BatchSource, TableSource};
///
/// # async fn example(ctx: SessionContext) -> term_profile::error::Result<()> {
/// let source = TableSource::new(ctx, "customers");
/// let schema = source.schema().await?;
/// let batches = source.batches().await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait BatchSource: Debug + Send + Sync {
    /// The schema every batch conforms to.
    async fn schema(&self) -> Result<SchemaRef>;

    /// Loads all batches.
    async fn batches(&self) -> Result<Vec<RecordBatch>>;

    /// A human-readable description of this source.
    fn description(&self) -> String;
}

/// Batches already held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl MemorySource {
    /// Creates a source; every batch must match `schema`.
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        if let Some(batch) = batches.iter().find(|b| b.schema() != schema) {
            return Err(ProfileError::invalid_data(format!(
                "Batch schema {:?} does not match source schema {:?}",
                batch.schema(),
                schema
            )));
        }
        Ok(Self { schema, batches })
    }

    /// Creates a source from a single batch.
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self {
            schema: batch.schema(),
            batches: vec![batch],
        }
    }
}

#[async_trait]
impl BatchSource for MemorySource {
    async fn schema(&self) -> Result<SchemaRef> {
        Ok(self.schema.clone())
    }

    async fn batches(&self) -> Result<Vec<RecordBatch>> {
        Ok(self.batches.clone())
    }

    fn description(&self) -> String {
        format!("memory source ({} batches)", self.batches.len())
    }
}

/// A table registered with a DataFusion session.
#[derive(Clone)]
pub struct TableSource {
    ctx: SessionContext,
    table_name: String,
}

impl TableSource {
    pub fn new(ctx: SessionContext, table_name: impl Into<String>) -> Self {
        Self {
            ctx,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl Debug for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSource")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BatchSource for TableSource {
    async fn schema(&self) -> Result<SchemaRef> {
        let df = self.ctx.table(self.table_name.as_str()).await?;
        Ok(df.schema().inner().clone())
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn batches(&self) -> Result<Vec<RecordBatch>> {
        let df = self.ctx.table(self.table_name.as_str()).await?;
        let batches = df.collect().await?;
        debug!(batches = batches.len(), "Loaded table batches");
        Ok(batches)
    }

    fn description(&self) -> String {
        format!("table '{}'", self.table_name)
    }
}
