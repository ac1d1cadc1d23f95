//! Configuration loading for pathbench.
//!
//! Supports loading configuration from TOML files, with sensible defaults
//! for all settings.

use anyhow::{Context, Result};
use pathbench_core::series::Side;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::probe::Endpoint;

/// A configuration value that cannot be used for a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ConfigError {
    pub reason: String,
}

impl ConfigError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Top-level configuration for pathbench.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for the sampling run.
    pub run: RunConfig,
    /// The two endpoints being compared.
    pub endpoints: EndpointsConfig,
    /// Settings for probe requests.
    pub network: NetworkConfig,
}

/// Configuration for a sampling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of rounds to issue, warm-up rounds included.
    pub rounds: usize,
    /// Number of leading rounds discarded before computing statistics.
    pub warmup_rounds: usize,
}

/// The two compared endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub a: EndpointConfig,
    pub b: EndpointConfig,
}

/// A single probe endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub label: String,
    pub url: String,
}

/// Configuration for probe requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Timeout in milliseconds for a single probe request.
    pub request_timeout_ms: u64,
    /// User-Agent sent with every probe request.
    pub user_agent: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rounds: 11,
            warmup_rounds: 1,
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            a: EndpointConfig {
                label: "private".to_string(),
                url: "http://127.0.0.1:9200/probe".to_string(),
            },
            b: EndpointConfig {
                label: "public".to_string(),
                url: "http://127.0.0.1:9201/probe".to_string(),
            },
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000, // 30 seconds
            user_agent: format!("pathbench/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = ".pathbench.toml";

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from `path` if it exists, or use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_or_default(path: &Path) -> Result<Config> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// The configured endpoint for one side.
    pub fn endpoint(&self, side: Side) -> Endpoint {
        let cfg = match side {
            Side::A => &self.endpoints.a,
            Side::B => &self.endpoints.b,
        };
        Endpoint::new(cfg.label.clone(), cfg.url.clone())
    }

    /// Check that a run can be started with this configuration.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_rounds(self.run.rounds)?;
        validate_endpoints(&self.endpoint(Side::A), &self.endpoint(Side::B))?;
        if self.network.request_timeout_ms == 0 {
            return Err(ConfigError::new("request_timeout_ms must be greater than 0"));
        }
        Ok(())
    }
}

/// At least one round must be requested.
pub fn validate_rounds(rounds: usize) -> Result<(), ConfigError> {
    if rounds < 1 {
        return Err(ConfigError::new(format!(
            "round count must be at least 1, got {}",
            rounds
        )));
    }
    Ok(())
}

/// Both endpoints need a label and an http(s) URL, and the labels must differ.
pub fn validate_endpoints(a: &Endpoint, b: &Endpoint) -> Result<(), ConfigError> {
    for endpoint in [a, b] {
        if endpoint.label.trim().is_empty() {
            return Err(ConfigError::new(format!(
                "endpoint {} has an empty label",
                endpoint.url
            )));
        }
        if !endpoint.url.starts_with("http://") && !endpoint.url.starts_with("https://") {
            return Err(ConfigError::new(format!(
                "URL of endpoint '{}' must start with http:// or https://: {}",
                endpoint.label, endpoint.url
            )));
        }
    }
    if a.label == b.label {
        return Err(ConfigError::new(format!(
            "both endpoints are labelled '{}'",
            a.label
        )));
    }
    Ok(())
}
