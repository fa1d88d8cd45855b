use crate::humanize::HumanDuration;
use crate::window::MalformedLines;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Path that records an event on GET
    #[serde(default = "default_route")]
    pub route: String,
    /// Deadline for one record request
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    /// Deadline for the startup load/prune/sync
    #[serde(default = "default_init_timeout")]
    pub init_timeout: HumanDuration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            route: default_route(),
            request_timeout: default_request_timeout(),
            init_timeout: default_init_timeout(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_route() -> String {
    "/".to_string()
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(5)
}

fn default_init_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

/// Sliding window and its backing file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    #[serde(default = "default_file")]
    pub file: PathBuf,
    /// Window length; `t` is active while `now - t < threshold`
    #[serde(default = "default_threshold")]
    pub threshold: HumanDuration,
    #[serde(default)]
    pub on_malformed: MalformedLines,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            threshold: default_threshold(),
            on_malformed: MalformedLines::default(),
        }
    }
}

impl WindowConfig {
    /// Threshold in seconds as used by the eviction rule
    pub fn threshold_secs(&self) -> i64 {
        i64::try_from(self.threshold.as_secs()).unwrap_or(i64::MAX)
    }
}

fn default_file() -> PathBuf {
    PathBuf::from("timestamps.log")
}

fn default_threshold() -> HumanDuration {
    HumanDuration::from_secs(60)
}
