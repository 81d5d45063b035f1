//! Error types for the profiling engine.

use thiserror::Error;

/// Result type for profiling operations.
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Errors that can occur while configuring, running or reducing analyzers.
///
/// Null values are never errors; they are counted. Errors are reserved for
/// configuration mistakes, misuse of the analyzer lifecycle, and programming
/// errors such as reading a crosstab cell that was never written.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Invalid configuration or parameters, detected at initialization.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid input handed to the engine by the row source.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An operation was invoked in a lifecycle state that does not allow it.
    #[error("Invalid analyzer state: {0}")]
    InvalidState(String),

    /// A crosstab dimension that does not exist was addressed.
    #[error("Unknown crosstab dimension: {0}")]
    UnknownDimension(String),

    /// A crosstab category that is not part of its dimension was addressed.
    #[error("Unknown category '{category}' in dimension '{dimension}'")]
    UnknownCategory {
        /// The dimension that was navigated.
        dimension: String,
        /// The category that was requested.
        category: String,
    },

    /// A crosstab cell was read or written without selecting every dimension.
    #[error("Crosstab navigation is missing a category for dimension '{0}'")]
    IncompleteSelection(String),

    /// A crosstab cell was read strictly but never written.
    #[error("Crosstab cell {0:?} has no value")]
    EmptyCell(Vec<String>),

    /// A source column type that cannot be mapped to a value family.
    #[error("Unsupported data type for column '{column}': {data_type}")]
    UnsupportedType {
        /// Name of the offending column.
        column: String,
        /// Display form of the source data type.
        data_type: String,
    },

    /// Failure while executing partitioned work.
    #[error("Execution error: {0}")]
    Execution(String),

    /// DataFusion query execution error.
    #[error("Query execution failed: {0}")]
    QueryExecution(#[from] datafusion::error::DataFusionError),

    /// Arrow computation error.
    #[error("Arrow computation failed: {0}")]
    ArrowComputation(#[from] arrow::error::ArrowError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProfileError {
    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates an invalid data error with the given message.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Creates an invalid state error with the given message.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates an unknown category error.
    pub fn unknown_category(dimension: impl Into<String>, category: impl Into<String>) -> Self {
        Self::UnknownCategory {
            dimension: dimension.into(),
            category: category.into(),
        }
    }

    /// Returns true for errors raised by initialization checks.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::UnsupportedType { .. }
        )
    }
}

/// Converts serde_json errors to ProfileError.
impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProfileError::unknown_category("Measure", "Bogus");
        assert_eq!(
            err.to_string(),
            "Unknown category 'Bogus' in dimension 'Measure'"
        );

        let err = ProfileError::invalid_config("no columns configured");
        assert_eq!(err.to_string(), "Invalid configuration: no columns configured");
        assert!(err.is_configuration_error());
        assert!(!ProfileError::invalid_state("finalized").is_configuration_error());
    }

    #[test]
    fn test_serde_json_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: ProfileError = parse.unwrap_err().into();
        assert!(matches!(err, ProfileError::Serialization(_)));
    }
}
