use crate::core::kernel::request::HttpMethod;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Fatal error in executing HTTP {method} {url}: {source}")]
    Execution {
        method: HttpMethod,
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("Connection credentials have already been set for this client")]
    CredentialsAlreadySet,

    #[error("Mass update to {0} requires params")]
    MissingParams(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

impl ApiError {
    /// Full error chain, outermost first, one cause per line
    pub fn chain(&self) -> String {
        let mut lines = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            lines.push(format!("caused by: {}", cause));
            source = std::error::Error::source(cause);
        }
        lines.join("\n")
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Malformed URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}
