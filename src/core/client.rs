//! Blocking REST API client.
//!
//! `ApiClient` turns a verb, a resource path and a payload into a fully
//! addressed [`HttpRequest`], runs it through its [`Transport`], traces both
//! sides of the exchange when tracing is enabled, and wraps the reply in an
//! [`ApiResponse`].
//!
//! Path rules:
//! - a target starting with `http` is used verbatim (next-page links),
//! - a path containing `/connections` resolves against the bare endpoint,
//! - anything else resolves to `{endpoint}/{version}{path}`.

use crate::core::config::{ApiConfig, ConfigSource};
use crate::core::errors::{ApiError, TransportError};
use crate::core::kernel::credentials::{ConnectOverride, CredentialPair, Credentials};
use crate::core::kernel::request::{FormPart, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::core::kernel::tracer::{TraceCategory, Tracer, TracingTracer};
use crate::core::kernel::transport::{ReqwestTransport, Transport, TransportConfig};
use crate::core::pagination::Pages;
use crate::core::response::ApiResponse;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

/// Path segment of the session-establishing endpoint (not versioned)
pub const CONNECTION_SEGMENT: &str = "/connections";
/// Path segment of the usage upload endpoint (multipart)
pub const USAGE_UPLOAD_SEGMENT: &str = "/usage";
/// Path segment of the mass update endpoint (multipart with `params`)
pub const MASS_UPDATE_SEGMENT: &str = "/bulk";

/// Name of the multipart part carrying mass update parameters
pub const PARAMS_PART: &str = "params";

const JSON: &str = "application/json";

/// Client for a versioned REST endpoint
pub struct ApiClient<T: Transport = ReqwestTransport> {
    config: ApiConfig,
    credentials: Credentials,
    transport: T,
    tracer: Arc<dyn Tracer>,
}

impl<T: Transport> std::fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl ApiClient<ReqwestTransport> {
    /// Create a client over a reqwest transport with default settings
    pub fn new(config: ApiConfig, credentials: CredentialPair) -> Self {
        Self::with_transport(config, credentials, ReqwestTransport::default())
    }

    /// Create a client over a reqwest transport with custom settings
    pub fn with_transport_config(
        config: ApiConfig,
        credentials: CredentialPair,
        transport_config: TransportConfig,
    ) -> Self {
        Self::with_transport(config, credentials, ReqwestTransport::new(transport_config))
    }

    /// Create a client from a key/value configuration source
    pub fn from_source(
        source: &impl ConfigSource,
        credentials: CredentialPair,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(ApiConfig::from_source(source)?, credentials))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ApiConfig, credentials: CredentialPair, transport: T) -> Self {
        Self {
            config,
            credentials: Credentials::new(credentials),
            transport,
            tracer: Arc::new(TracingTracer),
        }
    }

    /// Replace the trace sink
    pub fn with_tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Override the credentials used by connection calls
    ///
    /// Each field overrides the default independently. The override can be
    /// set once per client and is never cleared. Passing `None` for both
    /// fields is a no-op and leaves the override unset.
    pub fn set_connect_credentials(
        &self,
        user_id: Option<String>,
        password: Option<String>,
    ) -> Result<(), ApiError> {
        if self
            .credentials
            .set_override(ConnectOverride::new(user_id, password))
        {
            Ok(())
        } else {
            Err(ApiError::CredentialsAlreadySet)
        }
    }

    /// Resolve a path or absolute URL to the request target
    pub fn resolve_url(&self, path: &str) -> String {
        if is_absolute(path) {
            path.to_string()
        } else if is_connection(path) {
            format!("{}{}", self.config.endpoint, path)
        } else {
            format!("{}/{}{}", self.config.endpoint, self.config.version, path)
        }
    }

    #[instrument(skip(self, query), fields(path = %path, param_count = query.len()))]
    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse, ApiError> {
        self.send(Call {
            method: HttpMethod::Get,
            path,
            query,
            body: RequestBody::Empty,
            trace_line: format!("Query String = {}", encode_query(query)),
        })
    }

    #[instrument(skip(self, body), fields(path = %path))]
    pub fn put(&self, path: &str, body: &str) -> Result<ApiResponse, ApiError> {
        self.send(Call {
            method: HttpMethod::Put,
            path,
            query: &[],
            body: RequestBody::Text(body.to_string()),
            trace_line: format!("Request Body = {}", body),
        })
    }

    /// POST a body; usage upload and mass update paths are sent as multipart
    /// forms, the latter with `params` attached as a JSON part
    #[instrument(skip(self, body, params), fields(path = %path))]
    pub fn post(
        &self,
        path: &str,
        body: &str,
        params: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let entity = if is_multipart(path) {
            self.multipart(path, None, params)?
        } else {
            RequestBody::Text(body.to_string())
        };

        self.send(Call {
            method: HttpMethod::Post,
            path,
            query: &[],
            body: entity,
            trace_line: format!("Request Body = {}", body),
        })
    }

    /// POST a file as a multipart form, e.g. a usage upload
    #[instrument(skip(self, file, params), fields(path = %path, file_name = ?file.file_name))]
    pub fn post_file(
        &self,
        path: &str,
        file: FormPart,
        params: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let trace_line = format!(
            "Request Body = <multipart {} ({} bytes)>",
            file.file_name.as_deref().unwrap_or(&file.name),
            file.content.len()
        );

        self.send(Call {
            method: HttpMethod::Post,
            path,
            query: &[],
            body: self.multipart(path, Some(file), params)?,
            trace_line,
        })
    }

    #[instrument(skip(self, query), fields(path = %path, param_count = query.len()))]
    pub fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse, ApiError> {
        self.send(Call {
            method: HttpMethod::Delete,
            path,
            query,
            body: RequestBody::Empty,
            trace_line: format!("Query String = {}", encode_query(query)),
        })
    }

    /// Establish a session with the resolved credentials
    pub fn connect(&self) -> Result<ApiResponse, ApiError> {
        self.post(CONNECTION_SEGMENT, "", None)
    }

    /// Set the connection override and establish a session with it
    pub fn connect_as(&self, user_id: String, password: String) -> Result<ApiResponse, ApiError> {
        self.set_connect_credentials(Some(user_id), Some(password))?;
        self.connect()
    }

    /// Iterate over every page of a listing, following `nextPage` links
    pub fn pages(&self, path: &str, query: &[(&str, &str)]) -> Pages<'_, T> {
        Pages::new(self, path, query)
    }

    fn multipart(
        &self,
        path: &str,
        file: Option<FormPart>,
        params: Option<&str>,
    ) -> Result<RequestBody, ApiError> {
        form_parts(path, file, params)
            .map(RequestBody::Multipart)
            .map_err(|err| {
                self.tracer.log(&err.to_string(), TraceCategory::Both);
                err
            })
    }

    fn headers(&self, call: &Call<'_>) -> Vec<(String, String)> {
        let mut headers = vec![("Accept".to_string(), JSON.to_string())];

        match call.method {
            HttpMethod::Get => headers.push(("follow_redirect".to_string(), "true".to_string())),
            HttpMethod::Put | HttpMethod::Post if !call.body.is_multipart() => {
                headers.push(("Content-Type".to_string(), JSON.to_string()));
            }
            _ => {}
        }

        if call.method == HttpMethod::Post && is_connection(call.path) {
            headers.extend(self.credentials.auth_headers());
        }

        headers
    }

    fn send(&self, call: Call<'_>) -> Result<ApiResponse, ApiError> {
        let trace = self.config.trace;
        let method = call.method;
        let url = self.resolve_url(call.path);
        let headers = self.headers(&call);

        if trace {
            self.trace_request(method, &url, &call.trace_line, &headers);
        }

        let address = match with_query(&url, call.query) {
            Ok(address) => address,
            Err(e) => return Err(self.fail(method, &url, e.into())),
        };

        let request = HttpRequest {
            method,
            url: address.clone(),
            headers,
            body: call.body,
        };

        // On failure the request has already been consumed and dropped
        let response = match self.transport.execute(request) {
            Ok(response) => response,
            Err(e) => return Err(self.fail(method, &url, e)),
        };

        let wrapped = ApiResponse::new(response.status, &response.reason, &response.body);
        debug!(method = %method, url = %address, status = response.status, "API call completed");

        if trace {
            self.trace_response(method, &address, &response, &wrapped);
        }

        Ok(wrapped)
    }

    fn fail(&self, method: HttpMethod, url: &str, source: TransportError) -> ApiError {
        let err = ApiError::Execution {
            method,
            url: url.to_string(),
            source,
        };
        self.tracer.log(&err.to_string(), TraceCategory::Both);
        self.tracer.log(&err.chain(), TraceCategory::Both);
        err
    }

    fn trace_request(
        &self,
        method: HttpMethod,
        url: &str,
        payload: &str,
        headers: &[(String, String)],
    ) {
        let api = |line: &str| self.tracer.log(line, TraceCategory::Api);
        api("***** PRE-API TRACE *****");
        api(&format!("HTTP method = {}", method));
        api(&format!("URL = {}", url));
        api(payload);
        for (name, value) in headers {
            api(&format!("Header = {}: {}", name, value));
        }
    }

    fn trace_response(
        &self,
        method: HttpMethod,
        url: &str,
        response: &HttpResponse,
        wrapped: &ApiResponse,
    ) {
        let api = |line: &str| self.tracer.log(line, TraceCategory::Api);
        api("***** POST-API RESPONSE TRACE *****");
        api(&format!("HTTP method = {}", method));
        api(&format!("URL = {}", url));
        for (name, value) in &response.headers {
            api(&format!("Header = {}: {}", name, value));
        }
        api(&format!("HTTP status = {}", response.status));
        api(&format!("HTTP reason = {}", response.reason));
        api(&format!("HTTP version = {}", response.version));
        api(&format!("API Response = {}", wrapped.to_pretty_string()));
    }
}

struct Call<'a> {
    method: HttpMethod,
    path: &'a str,
    query: &'a [(&'a str, &'a str)],
    body: RequestBody,
    trace_line: String,
}

fn is_absolute(path: &str) -> bool {
    path.get(..4)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http"))
}

fn is_connection(path: &str) -> bool {
    path.to_lowercase().contains(CONNECTION_SEGMENT)
}

fn is_mass_update(path: &str) -> bool {
    path.to_lowercase().contains(MASS_UPDATE_SEGMENT)
}

fn is_multipart(path: &str) -> bool {
    path.to_lowercase().contains(USAGE_UPLOAD_SEGMENT) || is_mass_update(path)
}

fn form_parts(
    path: &str,
    file: Option<FormPart>,
    params: Option<&str>,
) -> Result<Vec<FormPart>, ApiError> {
    let mut parts: Vec<FormPart> = file.into_iter().collect();
    if is_mass_update(path) {
        let params = params.ok_or_else(|| ApiError::MissingParams(path.to_string()))?;
        parts.push(FormPart::json(PARAMS_PART, params));
    }
    Ok(parts)
}

fn encode_query(query: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish()
}

/// Validate the target and append query pairs in caller order
fn with_query(url: &str, query: &[(&str, &str)]) -> Result<String, url::ParseError> {
    let mut parsed = Url::parse(url)?;
    if query.is_empty() {
        return Ok(url.to_string());
    }
    parsed.query_pairs_mut().extend_pairs(query.iter());
    Ok(parsed.into())
}
