//! Finder configuration
//!
//! Values come from an optional TOML file and from `DUPFINDER_*` environment
//! variables, the latter taking precedence. Nested keys use `__`, for example
//! `DUPFINDER_HTTP__TIMEOUT_SECS=60`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use dupfinder_http::HttpConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{FinderError, Result};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DUPFINDER";

/// Snyk REST API base URL (EU region)
pub const DEFAULT_BASE_URL: &str = "https://api.eu.snyk.io/rest";

/// Snyk REST API version sent with every first-page request
pub const DEFAULT_API_VERSION: &str = "2025-11-05";

/// Finder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// REST API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// REST API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Projects per page; the API accepts multiples of 10 from 10 to 100
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Scheme placed before the token in the Authorization header
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,

    /// Transport settings
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_page_limit() -> u32 {
    100
}

fn default_auth_scheme() -> String {
    "token".to_string()
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            page_limit: default_page_limit(),
            auth_scheme: default_auth_scheme(),
            http: HttpConfig::default(),
        }
    }
}

impl FinderConfig {
    /// Load configuration from `path` (or the default location) plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load configuration with an explicit environment map instead of the process environment
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        let builder = Config::builder()
            .add_source(File::from(file).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            );

        let config = builder
            .build()
            .map_err(|e| FinderError::config_error(e.to_string()))?;
        let finder_config: FinderConfig = config
            .try_deserialize()
            .map_err(|e| FinderError::config_error(e.to_string()))?;

        finder_config.validate()?;
        Ok(finder_config)
    }

    /// Default config file location
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dupfinder")
            .join("config.toml")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            FinderError::config_error(format!("invalid base URL '{}': {e}", self.base_url))
        })?;
        if url.cannot_be_a_base() {
            return Err(FinderError::config_error(format!(
                "base URL '{}' cannot carry a path",
                self.base_url
            )));
        }
        if self.api_version.trim().is_empty() {
            return Err(FinderError::config_error("API version is required"));
        }
        if !(10..=100).contains(&self.page_limit) || self.page_limit % 10 != 0 {
            return Err(FinderError::config_error(format!(
                "page limit must be a multiple of 10 between 10 and 100, got {}",
                self.page_limit
            )));
        }
        if self.auth_scheme.trim().is_empty() {
            return Err(FinderError::config_error("auth scheme is required"));
        }
        if self.http.max_attempts == 0 {
            return Err(FinderError::config_error("max attempts must be at least 1"));
        }
        if self.http.timeout_secs == 0 {
            return Err(FinderError::config_error("timeout must be greater than 0"));
        }
        Ok(())
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the API version
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Override the transport settings
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }
}
