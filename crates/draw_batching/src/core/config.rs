//! # Unified Configuration System
//!
//! Configuration for the batching pass and for logging, grouped under a
//! single [`ApplicationConfig`] that hosts can load from TOML or RON.
//!
//! ## Configuration Categories
//!
//! - **Batching Config**: culling and diagnostics for flatten/restore
//! - **Logging Config**: default log filter for binaries

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// # Batching Configuration
///
/// Controls the per-frame flatten pass. None of these settings change what
/// restore does: restore always undoes exactly what flatten changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchingConfig {
    /// Run the bounding-box culling pre-pass for roots that have a culling node
    pub culling_enabled: bool,
    /// Warn when a non-root draw layer carries a mask (it forfeits batching)
    pub warn_on_masked_layers: bool,
    /// Log a [`FrameStats`](crate::batching::FrameStats) summary after every before-draw pass
    pub log_frame_stats: bool,
}

impl BatchingConfig {
    /// Create a new batching configuration
    pub fn new() -> Self {
        Self {
            culling_enabled: true,
            warn_on_masked_layers: cfg!(debug_assertions),
            log_frame_stats: false,
        }
    }

    /// Enable or disable culling
    pub fn with_culling(mut self, enabled: bool) -> Self {
        self.culling_enabled = enabled;
        self
    }

    /// Enable or disable masked-layer warnings
    pub fn with_mask_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_masked_layers = enabled;
        self
    }

    /// Enable or disable per-frame statistics logging
    pub fn with_frame_stats(mut self, enabled: bool) -> Self {
        self.log_frame_stats = enabled;
        self
    }
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for BatchingConfig {}

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter string, e.g. `"info"` or `"draw_batching=trace"`
    pub log_level: String,
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that hosts should load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Batching pass configuration
    pub batching: BatchingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log level cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Load and validate configuration from a `.toml` or `.ron` file
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batching_config_defaults() {
        let config = BatchingConfig::default();
        assert!(config.culling_enabled);
        assert!(!config.log_frame_stats);
    }

    #[test]
    fn test_application_config_from_toml() {
        let text = r#"
            [batching]
            culling_enabled = false
            log_frame_stats = true

            [logging]
            log_level = "draw_batching=debug"
        "#;

        let config = ApplicationConfig::from_str_with_format(text, "app.toml").unwrap();
        assert!(!config.batching.culling_enabled);
        assert!(config.batching.log_frame_stats);
        assert_eq!(
            config.batching.warn_on_masked_layers,
            BatchingConfig::default().warn_on_masked_layers
        );
        assert_eq!(config.logging.log_level, "draw_batching=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_application_config_ron_round_trip() {
        let config = ApplicationConfig {
            batching: BatchingConfig::new().with_culling(false).with_frame_stats(true),
            logging: LoggingConfig::new().with_log_level("warn"),
        };

        let text = config.to_string_with_format("app.ron").unwrap();
        let parsed = ApplicationConfig::from_str_with_format(&text, "app.ron").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unsupported_format() {
        let result = ApplicationConfig::from_str_with_format("", "app.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_empty_log_level_is_invalid() {
        let config = ApplicationConfig {
            logging: LoggingConfig::new().with_log_level("  "),
            ..ApplicationConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = ApplicationConfig::load_from_file("/nonexistent/draw_batching.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
