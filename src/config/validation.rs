use super::models::Config;
use thiserror::Error;

const HEALTH_ROUTE: &str = "/health";

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Window threshold must be at least 1 second")]
    ZeroThreshold,

    #[error("Route must be a literal path starting with '/': {route}")]
    InvalidRoute { route: String },

    #[error("Route '{route}' collides with the health endpoint")]
    ReservedRoute { route: String },

    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: &'static str },

    #[error("Timestamp file path is empty")]
    EmptyFilePath,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_window(config)?;
    validate_server(config)?;
    Ok(())
}

fn validate_window(config: &Config) -> Result<(), ValidationError> {
    if config.window.threshold.as_secs() == 0 {
        return Err(ValidationError::ZeroThreshold);
    }

    if config.window.file.as_os_str().is_empty() {
        return Err(ValidationError::EmptyFilePath);
    }

    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    let route = &config.server.route;
    if !route.starts_with('/') || !is_static_path(route) {
        return Err(ValidationError::InvalidRoute {
            route: route.clone(),
        });
    }
    if route == HEALTH_ROUTE {
        return Err(ValidationError::ReservedRoute {
            route: route.clone(),
        });
    }

    if config.server.request_timeout.as_secs() == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "server.request_timeout",
        });
    }
    if config.server.init_timeout.as_secs() == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "server.init_timeout",
        });
    }

    Ok(())
}

/// The record route is a literal path: no captures, wildcards or `:` segments
fn is_static_path(route: &str) -> bool {
    !route.contains(['{', '}', '*']) && !route.split('/').any(|segment| segment.starts_with(':'))
}
