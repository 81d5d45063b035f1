//! Core analyzer traits.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::data::{InputColumn, InputRow};
use crate::error::{ProfileError, Result};

/// A single-pass analyzer over a stream of weighted rows.
///
/// The lifecycle is `Created -> Initialized -> Running -> Finalized`:
///
/// - [`initialize`](Analyzer::initialize) validates the configuration and
///   builds one column delegate per configured column.
/// - [`run`](Analyzer::run) may be called concurrently from many threads.
///   Each call feeds one row that stands for `distinct_count` identical
///   logical rows.
/// - [`result`](Analyzer::result) finalizes the analyzer and materializes the
///   result. It may be called again and re-materializes the same result.
///
/// # Example
///
/// ```rust
/// use term_profile::prelude::*;
///
/// let analyzer = NumberAnalyzer::builder()
///     .column(InputColumn::number("age"))
///     .build()
///     .unwrap();
///
/// analyzer.run(&MemoryRow::new(0).with("age", 31.0), 2).unwrap();
/// analyzer.run(&MemoryRow::new(1).with("age", 40.0), 1).unwrap();
///
/// let result = analyzer.result().unwrap();
/// let age = InputColumn::number("age");
/// assert_eq!(result.row_count(&age), Some(3));
/// assert_eq!(result.highest_value(&age), Some(40.0));
/// ```
pub trait Analyzer: Send + Sync + Debug {
    /// The result type produced at end of stream.
    type Result: AnalyzerResult;

    /// Returns the name of this analyzer.
    fn name(&self) -> &str;

    /// Returns the configured columns.
    fn columns(&self) -> &[InputColumn];

    /// Returns the current lifecycle state.
    fn lifecycle(&self) -> LifecycleState;

    /// Validates the configuration and prepares the column delegates.
    fn initialize(&mut self) -> Result<()>;

    /// Feeds one row standing for `distinct_count` identical rows.
    fn run(&self, row: &dyn InputRow, distinct_count: u64) -> Result<()>;

    /// Finalizes the analyzer and materializes its result.
    fn result(&self) -> Result<Self::Result>;
}

/// Common behaviour of analyzer results.
pub trait AnalyzerResult:
    Debug + Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Returns the analyzed columns.
    fn columns(&self) -> &[InputColumn];
}

/// Lifecycle states of an analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    /// Constructed, not yet initialized.
    Created = 0,
    /// Initialized, no rows seen yet.
    Initialized = 1,
    /// At least one row has been processed.
    Running = 2,
    /// The result has been materialized.
    Finalized = 3,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Initialized,
            2 => Self::Running,
            _ => Self::Finalized,
        }
    }
}

/// Lock-free lifecycle tracker shared by all analyzers.
#[derive(Debug)]
pub(crate) struct Lifecycle(AtomicU8);

impl Default for Lifecycle {
    fn default() -> Self {
        Self(AtomicU8::new(LifecycleState::Created as u8))
    }
}

impl Lifecycle {
    pub(crate) fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Created -> Initialized.
    pub(crate) fn initialize(&self, analyzer: &str) -> Result<()> {
        self.0
            .compare_exchange(
                LifecycleState::Created as u8,
                LifecycleState::Initialized as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|current| {
                ProfileError::invalid_state(format!(
                    "{analyzer} cannot be initialized in state {:?}",
                    LifecycleState::from_u8(current)
                ))
            })
    }

    /// Initialized -> Running; Running stays Running.
    pub(crate) fn enter_run(&self, analyzer: &str) -> Result<()> {
        match self.state() {
            LifecycleState::Running => Ok(()),
            LifecycleState::Initialized => {
                // losing this race to another run() is fine, to result() is not
                let _ = self.0.compare_exchange(
                    LifecycleState::Initialized as u8,
                    LifecycleState::Running as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                match self.state() {
                    LifecycleState::Finalized => Err(finalized(analyzer)),
                    _ => Ok(()),
                }
            }
            LifecycleState::Created => Err(ProfileError::invalid_state(format!(
                "{analyzer} must be initialized before run()"
            ))),
            LifecycleState::Finalized => Err(finalized(analyzer)),
        }
    }

    /// Any initialized state -> Finalized.
    pub(crate) fn finalize(&self, analyzer: &str) -> Result<()> {
        if self.state() == LifecycleState::Created {
            return Err(ProfileError::invalid_state(format!(
                "{analyzer} must be initialized before result()"
            )));
        }
        self.0
            .store(LifecycleState::Finalized as u8, Ordering::Release);
        Ok(())
    }
}

fn finalized(analyzer: &str) -> ProfileError {
    ProfileError::invalid_state(format!("{analyzer} is finalized; run() is no longer allowed"))
}

/// Rejects a zero distinct count.
pub(crate) fn check_distinct_count(distinct_count: u64) -> Result<()> {
    if distinct_count == 0 {
        return Err(ProfileError::invalid_data(
            "distinct count must be at least 1",
        ));
    }
    Ok(())
}
