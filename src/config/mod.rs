//! Configuration management for windowcount
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use windowcount::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Counting events within {}", config.window.threshold);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `WINDOWCOUNT__<section>__<key>`
//!
//! Examples:
//! - `WINDOWCOUNT__SERVER__BIND_ADDR=127.0.0.1:9000`
//! - `WINDOWCOUNT__WINDOW__THRESHOLD=5m`
//! - `WINDOWCOUNT__WINDOW__ON_MALFORMED=skip`
//!
//! The flat variables `FILENAME`, `THRESHOLD`, `PORT` and `ROUTE` are applied
//! last when set.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/windowcount.toml`.
//! This can be overridden using the `WINDOWCOUNT_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, ServerConfig, WindowConfig};
pub use sources::apply_legacy_env;
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - A legacy variable does not parse
    /// - Validation fails (zero threshold, bad route, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Like [`Config::load`], with an explicit file taking precedence over
    /// `WINDOWCOUNT_CONFIG`
    pub fn load_with(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(&path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
