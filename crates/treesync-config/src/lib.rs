//! Configuration management for treesync
//!
//! Settings are layered: built-in defaults, then an optional configuration
//! file (YAML, TOML or JSON), then environment variables prefixed with
//! `TREESYNC`. Command line flags are applied on top by the binary.
//!
//! # Examples
//!
//! ```rust
//! use treesync_config::{Config, ConfigBuilder};
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("treesync.yaml")
//!     .add_env_prefix("TREESYNC")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Delete missing: {}", config.sync.delete_missing);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use treesync_types::CompareMode;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Log levels accepted in `logging.level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for treesync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sync behaviour defaults
    pub sync: SyncSettings,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Sync behaviour defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Delete destination files that have no source counterpart
    pub delete_missing: bool,
    /// How existing destination files are compared
    pub compare_mode: CompareMode,
    /// Report what would happen without touching the destination
    pub dry_run: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            colored_output: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.sync.delete_missing);
        assert!(!config.sync.dry_run);
        assert_eq!(config.sync.compare_mode, CompareMode::Fast);
        assert_eq!(config.logging.level, "warn");
        assert!(LOG_LEVELS.contains(&config.logging.level.as_str()));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("sync:\n  compare_mode: verify\n").unwrap();
        assert_eq!(config.sync.compare_mode, CompareMode::Verify);
        assert!(!config.sync.delete_missing);
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
