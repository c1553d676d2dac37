use crate::core::errors::TransportError;
use crate::core::kernel::request::{FormPart, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::Method;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, instrument};

/// Executes fully built requests
///
/// Implementations own the connection pool. `execute` blocks the calling
/// thread for one round trip and returns the response with its body fully
/// read, so the underlying connection is free for reuse once it returns.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Configuration for the HTTP transport
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub use_system_proxy: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("restlink/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

impl TransportConfig {
    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Connect directly, ignoring proxy environment variables
    pub fn without_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }
}

/// `Transport` backed by a blocking reqwest client
///
/// The reqwest client (and its connection pool) is created on the first
/// `execute` and reused for every later call.
pub struct ReqwestTransport {
    config: TransportConfig,
    client: OnceLock<Client>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.config)
            .field("initialized", &self.client.get().is_some())
            .finish()
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    /// Shared client, built on first use
    fn pipe(&self) -> Result<&Client, TransportError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        debug!(user_agent = %self.config.user_agent, "Creating HTTP connection pool");
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .http1_only();
        if !self.config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        // A concurrent first call may have won the race; keep whichever landed
        Ok(self.client.get_or_init(|| client))
    }

    fn build(client: &Client, request: HttpRequest) -> Result<RequestBuilder, TransportError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        };
        let url = reqwest::Url::parse(&request.url)?;

        let mut builder = client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        Ok(match request.body {
            RequestBody::Empty => builder,
            RequestBody::Text(text) => builder.body(text),
            RequestBody::Multipart(parts) => builder.multipart(form(parts)?),
        })
    }
}

fn form(parts: Vec<FormPart>) -> Result<multipart::Form, TransportError> {
    let mut form = multipart::Form::new();
    for part in parts {
        let mut body = multipart::Part::bytes(part.content);
        if let Some(file_name) = part.file_name {
            body = body.file_name(file_name);
        }
        if let Some(content_type) = part.content_type {
            body = body.mime_str(&content_type).map_err(|e| {
                TransportError::EncodingError(format!(
                    "Invalid content type '{}' for part '{}': {}",
                    content_type, part.name, e
                ))
            })?;
        }
        form = form.part(part.name, body);
    }
    Ok(form)
}

impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let client = self.pipe()?;
        let response = Self::build(client, request)?.send()?;

        let status = response.status();
        let version = format!("{:?}", response.version());
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        // Reading the whole body hands the connection back to the pool
        let body = response
            .bytes()
            .map_err(|e| TransportError::NetworkError(format!("Failed to read response body: {}", e)))?
            .to_vec();

        debug!(status = status.as_u16(), bytes = body.len(), "Response received");

        Ok(HttpResponse {
            status: status.as_u16(),
            // Server-sent phrase is not available from hyper
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            version,
            headers,
            body,
        })
    }
}
