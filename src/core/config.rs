use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

/// Key holding the REST endpoint base URL
pub const ENDPOINT_KEY: &str = "rest.api.endpoint";
/// Key holding the API version path segment
pub const VERSION_KEY: &str = "rest.api.version";
/// Key holding the trace flag (`true`/`false`, any case)
pub const TRACE_KEY: &str = "api.trace";

/// Read-only key/value configuration lookup
pub trait ConfigSource {
    fn get_val(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get_val(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Configuration source backed by process environment variables.
///
/// A dotted key maps to an upper-cased, underscore-separated variable name,
/// so `rest.api.endpoint` is read from `REST_API_ENDPOINT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl EnvSource {
    pub fn var_name(key: &str) -> String {
        key.replace('.', "_").to_uppercase()
    }
}

impl ConfigSource for EnvSource {
    fn get_val(&self, key: &str) -> Option<String> {
        env::var(Self::var_name(key)).ok()
    }
}

/// Typed client configuration, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    pub version: String,
    #[serde(default)]
    pub trace: bool,
}

impl ApiConfig {
    /// Create a configuration with tracing disabled
    #[must_use]
    pub fn new(endpoint: String, version: String) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            version: version.trim_matches('/').to_string(),
            trace: false,
        }
    }

    /// Enable or disable request/response tracing
    #[must_use]
    pub const fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Resolve the configuration from any key/value source
    ///
    /// Expected keys:
    /// - `rest.api.endpoint` (required)
    /// - `rest.api.version` (required)
    /// - `api.trace` (optional, defaults to false)
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let endpoint = source
            .get_val(ENDPOINT_KEY)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey(ENDPOINT_KEY.to_string()))?;

        let version = source
            .get_val(VERSION_KEY)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey(VERSION_KEY.to_string()))?;

        let trace = match source.get_val(TRACE_KEY) {
            Some(raw) => parse_flag(TRACE_KEY, &raw)?,
            None => false,
        };

        Ok(Self::new(endpoint, version).trace(trace))
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `REST_API_ENDPOINT`
    /// - `REST_API_VERSION`
    /// - `API_TRACE` (optional, defaults to false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource)
    }

    /// Create configuration from a .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file() -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(".env")
    }

    /// Create configuration from a specific .env file path
    ///
    /// A missing file is not an error; the process environment is used as-is.
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(env_file_path: &str) -> Result<Self, ConfigError> {
        load_env_file(env_file_path)?;
        Self::from_env()
    }
}

/// Load variables from a .env file, ignoring a missing file
#[cfg(feature = "env-file")]
pub fn load_env_file(env_file_path: &str) -> Result<(), ConfigError> {
    match dotenv::from_path(env_file_path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::InvalidConfiguration(format!(
            "Failed to load .env file '{}': {}",
            env_file_path, e
        ))),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    raw.trim()
        .to_lowercase()
        .parse::<bool>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
