//! Transport layer for the REST client
//!
//! The kernel holds everything that sits below the API client: plain-data
//! request and response types, the pluggable `Transport`, credential
//! resolution and the trace sink. It knows nothing about URL rules or
//! response wrapping.
//!
//! # Components
//!
//! - `Transport`: executes one `HttpRequest`; `ReqwestTransport` is the
//!   blocking reqwest implementation with a lazily created pool
//! - `Credentials`: default pair plus a set-once, per-field override
//! - `Tracer`: `(message, category)` sink; `TracingTracer` forwards to
//!   `tracing`
//!
//! # Custom transport
//! ```rust
//! use restlink::core::errors::TransportError;
//! use restlink::core::kernel::*;
//!
//! struct Canned;
//!
//! impl Transport for Canned {
//!     fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
//!         Ok(HttpResponse {
//!             status: 200,
//!             reason: "OK".to_string(),
//!             version: "HTTP/1.1".to_string(),
//!             headers: Vec::new(),
//!             body: br#"{"success":true}"#.to_vec(),
//!         })
//!     }
//! }
//! ```

pub mod credentials;
pub mod request;
pub mod tracer;
pub mod transport;

// Re-export key types for convenience
pub use credentials::{ConnectOverride, CredentialPair, Credentials};
pub use request::{FormPart, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use tracer::{TraceCategory, Tracer, TracingTracer};
pub use transport::{ReqwestTransport, Transport, TransportConfig};
