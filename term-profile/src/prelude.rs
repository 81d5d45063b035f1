//! Prelude for commonly used types and traits in term-profile.

pub use crate::analyzers::{
    Analyzer, AnalyzerResult, BooleanAnalyzer, BooleanResult, DateTimeAnalyzer, DateTimeResult,
    NumberAnalyzer, NumberResult, ProfileAnalyzer, ProfileResult, StringAnalyzer, StringResult,
};
pub use crate::config::ProfileConfig;
pub use crate::data::{InputColumn, InputRow, MemoryRow, Value, ValueFamily};
pub use crate::error::{ProfileError, Result};
pub use crate::logging::LogConfig;
pub use crate::reducers::{
    BooleanResultReducer, DateTimeResultReducer, NumberResultReducer, ProfileResultReducer,
    ResultReducer, StringResultReducer,
};
pub use crate::runner::{ProfileRunner, RunProgress};
pub use crate::sources::{BatchSource, MemorySource, TableSource};
pub use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotationFactory};
pub use crate::types::MetricValue;
