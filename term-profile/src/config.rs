//! Run configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ProfileError, Result};
use crate::storage::{InMemoryRowAnnotationFactory, RowAnnotationFactory, DEFAULT_MAX_SAMPLE_ROWS};

/// Settings of a profiling run, loadable from JSON.
///
/// ```rust
/// use term_profile::config::ProfileConfig;
///
/// let json = r#"{ "partitions": 4, "max_sample_rows": 50 }"#;
/// let config = ProfileConfig::from_json_str(json).unwrap();
/// assert_eq!(config.partitions, 4);
/// assert!(!config.descriptive_statistics);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Retain values for median, percentiles, skewness and kurtosis.
    pub descriptive_statistics: bool,
    /// Sample rows kept per evidence annotation; 0 keeps counts only.
    pub max_sample_rows: usize,
    /// Number of disjoint partitions rows are split into.
    pub partitions: usize,
    /// Collapse identical rows into one row carrying a repetition count.
    pub group_identical_rows: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            descriptive_statistics: false,
            max_sample_rows: DEFAULT_MAX_SAMPLE_ROWS,
            partitions: num_cpus::get(),
            group_identical_rows: false,
        }
    }
}

impl ProfileConfig {
    pub fn with_descriptive_statistics(mut self, enabled: bool) -> Self {
        self.descriptive_statistics = enabled;
        self
    }

    pub fn with_max_sample_rows(mut self, max_sample_rows: usize) -> Self {
        self.max_sample_rows = max_sample_rows;
        self
    }

    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_group_identical_rows(mut self, enabled: bool) -> Self {
        self.group_identical_rows = enabled;
        self
    }

    /// Checks the settings for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(ProfileError::invalid_config(
                "partitions must be greater than 0",
            ));
        }
        if self.partitions > 4096 {
            return Err(ProfileError::invalid_config(format!(
                "partitions too large (max: 4096), got {}",
                self.partitions
            )));
        }
        Ok(())
    }

    /// Parses and validates a JSON document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), ?config, "Loaded profile configuration");
        Ok(config)
    }

    /// An in-memory annotation factory honoring `max_sample_rows`.
    pub fn annotation_factory(&self) -> Arc<dyn RowAnnotationFactory> {
        Arc::new(InMemoryRowAnnotationFactory::with_max_sample_rows(
            self.max_sample_rows,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProfileConfig::default();
        assert!(!config.descriptive_statistics);
        assert_eq!(config.max_sample_rows, 1000);
        assert!(config.partitions >= 1);
        assert!(!config.group_identical_rows);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = ProfileConfig::default()
            .with_descriptive_statistics(true)
            .with_max_sample_rows(0)
            .with_partitions(3)
            .with_group_identical_rows(true);
        assert!(config.descriptive_statistics);
        assert_eq!(config.max_sample_rows, 0);
        assert_eq!(config.partitions, 3);
        assert!(config.group_identical_rows);
    }

    #[test]
    fn test_validate_rejects_zero_partitions() {
        let err = ProfileConfig::default()
            .with_partitions(0)
            .validate()
            .unwrap_err();
        assert!(err.is_configuration_error());

        let err = ProfileConfig::from_json_str(r#"{"partitions": 0}"#).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_malformed_json() {
        let err = ProfileConfig::from_json_str("{ partitions: ").unwrap_err();
        assert!(matches!(err, ProfileError::Serialization(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ProfileConfig::default()
            .with_partitions(2)
            .with_descriptive_statistics(true);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ProfileConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_annotation_factory_honors_sample_cap() {
        let factory = ProfileConfig::default()
            .with_max_sample_rows(0)
            .annotation_factory();
        let annotation = factory.create_annotation();
        let row = crate::data::MemoryRow::new(1);
        factory.annotate(&row, 2, &annotation);
        assert_eq!(annotation.row_count(), 2);
        assert!(!factory.has_sample_rows(&annotation));
    }
}
