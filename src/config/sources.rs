use super::models::Config;
use crate::humanize::HumanDuration;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "WINDOWCOUNT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/windowcount.toml";
const ENV_PREFIX: &str = "WINDOWCOUNT";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. `WINDOWCOUNT__*` environment variables
/// 5. Flat legacy variables (`FILENAME`, `THRESHOLD`, `PORT`, `ROUTE`)
pub fn load(config_path: Option<PathBuf>) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = config_path
        .or_else(|| env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(&config_path)?;
    apply_legacy_env(&mut config, |key| env::var(key).ok())?;

    Ok(config)
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: &Path) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // WINDOWCOUNT__WINDOW__THRESHOLD -> window.threshold
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

/// Apply the flat variables understood by earlier deployments
///
/// Unset or empty variables are ignored.
pub fn apply_legacy_env<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(file) = get("FILENAME") {
        config.window.file = PathBuf::from(file);
    }

    if let Some(threshold) = get("THRESHOLD") {
        config.window.threshold = threshold
            .parse::<HumanDuration>()
            .map_err(|e| ConfigError::Message(format!("invalid THRESHOLD '{threshold}': {e}")))?;
    }

    if let Some(port) = get("PORT") {
        let port = port
            .parse::<u16>()
            .map_err(|e| ConfigError::Message(format!("invalid PORT '{port}': {e}")))?;
        config.server.bind_addr.set_port(port);
    }

    if let Some(route) = get("ROUTE") {
        config.server.route = route;
    }

    Ok(())
}
