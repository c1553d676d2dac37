pub mod core;

pub use crate::core::{
    client::ApiClient,
    config::{ApiConfig, ConfigError, ConfigSource},
    errors::{ApiError, TransportError},
    kernel::{CredentialPair, FormPart, TraceCategory, Tracer, Transport},
    pagination::Pages,
    response::ApiResponse,
};
