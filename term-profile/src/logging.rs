//! Logging utilities and configuration for profiling runs.
//!
//! Analyzers and reducers log through `tracing` unconditionally at `debug`
//! and `info` level. The [`LogConfig`] flags gate the chattier logging of the
//! runner, which would otherwise emit one event per partition or per row.

use tracing::Level;

/// Logging configuration for profiling runs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for profiling components
    pub base_level: Level,
    /// Whether to log every row handed to an analyzer
    pub log_row_details: bool,
    /// Whether to log partition scheduling and completion
    pub log_partitions: bool,
    /// Whether to log the reduction of partial results
    pub log_reductions: bool,
    /// Longest logged rendering of a row or column list, in bytes
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_row_details: false,
            log_partitions: true,
            log_reductions: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Logs every partition, row and reduction.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_row_details: true,
            log_partitions: true,
            log_reductions: true,
            max_field_length: 1024,
        }
    }

    /// Warnings only; no per-partition or per-row events.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_row_details: false,
            log_partitions: false,
            log_reductions: false,
            max_field_length: 128,
        }
    }

    /// Same as [`LogConfig::default`].
    pub fn balanced() -> Self {
        Self::default()
    }
}

/// Emits a `debug!` event when the config's base level admits debug.
///
/// Arguments are not evaluated otherwise.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional per-row logging.
#[macro_export]
macro_rules! log_row {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_row_details {
            tracing::trace!($($arg)*);
        }
    };
}

/// Macro for conditional partition logging.
#[macro_export]
macro_rules! log_partition {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_partitions {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, on a char boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let end = value
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max_length)
        .last()
        .unwrap_or(0);
    format!("{}...(truncated)", &value[..end])
}

/// Utilities for setting up structured logging.
pub mod setup {
    use tracing::Level;

    /// Configuration for the global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for every target but this crate
        pub level: Level,
        /// Log level for the profiling crate specifically
        pub profile_level: Level,
        /// Emit JSON lines instead of the human-readable format
        pub json_format: bool,
        /// Full filter directive, replacing the level pair
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                profile_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON output, warnings globally and info for this crate.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                profile_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Debug everywhere, human-readable.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                profile_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_profile_level(mut self, level: Level) -> Self {
            self.profile_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// The filter directive, e.g. `warn,term_profile=info`.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},term_profile={}",
                    self.level.as_str().to_lowercase(),
                    self.profile_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global `tracing` subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_profile::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_presets() {
        let config = LogConfig::default();
        assert_eq!(config.base_level, Level::INFO);
        assert!(!config.log_row_details);
        assert!(config.log_partitions);
        assert_eq!(config.max_field_length, 256);

        let verbose = LogConfig::verbose();
        assert_eq!(verbose.base_level, Level::DEBUG);
        assert!(verbose.log_row_details);

        let production = LogConfig::production();
        assert_eq!(production.base_level, Level::WARN);
        assert!(!production.log_partitions);
        assert!(!production.log_reductions);
        assert_eq!(production.max_field_length, 128);
    }

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("hello", 10), "hello");
        assert_eq!(
            truncate_field("this is a very long text that should be truncated", 10),
            "this is a ...(truncated)"
        );
        // Never splits a multi-byte character.
        assert_eq!(truncate_field("ééééé", 3), "é...(truncated)");
    }

    #[test]
    fn test_env_filter() {
        let config = setup::LoggingConfig::production();
        assert_eq!(config.env_filter(), "warn,term_profile=info");
        let custom = config.with_env_filter("term_profile=trace");
        assert_eq!(custom.env_filter(), "term_profile=trace");
    }
}
