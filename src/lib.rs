pub mod api;
pub mod error;
pub mod forwarder;
pub mod logging;
pub mod reporter;
pub mod status;
pub mod utils;
pub mod webhook;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use error::{ForwarderError, Result};
pub use forwarder::Forwarder;

const DEFAULT_STATUS_FUNCTION: &str = "gitlab-status";

/// Top level layout of the optional TOML config file
#[derive(Debug, Deserialize, Clone)]
pub struct FileConfig {
    pub forwarder: ForwarderConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ForwarderConfig {
    #[serde(default)]
    pub gateway_url: String,
    #[serde(default)]
    pub report_status: bool,
    #[serde(default = "default_status_function")]
    pub status_function: String,
    pub status_token: Option<String>,
    pub payload_secret: Option<String>,
}

fn default_status_function() -> String {
    DEFAULT_STATUS_FUNCTION.to_string()
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            gateway_url: String::new(),
            report_status: false,
            status_function: default_status_function(),
            status_token: None,
            payload_secret: None,
        }
    }
}

impl ForwarderConfig {
    /// Builds the config from environment variables.
    /// Only the exact value `"true"` enables status reporting.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            gateway_url: lookup("gateway_url").unwrap_or_default(),
            report_status: lookup("report_status").as_deref() == Some("true"),
            status_function: non_empty("status_function").unwrap_or_else(default_status_function),
            status_token: non_empty("status_token"),
            payload_secret: non_empty("payload_secret"),
        }
    }

    /// Returns true if a gateway URL is set
    pub fn has_gateway(&self) -> bool {
        !self.gateway_url.is_empty()
    }
}

/// Load and parse the configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<ForwarderConfig> {
    let path = path.as_ref();
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        ForwarderError::ConfigError(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let config: FileConfig = toml::from_str(&config_str).map_err(|e| {
        ForwarderError::ConfigError(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(config.forwarder)
}

pub struct AppState {
    pub forwarder: Forwarder,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(forwarder: Forwarder) -> Self {
        Self {
            forwarder,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;
