#![allow(dead_code)]

use restlink::core::kernel::{HttpRequest, HttpResponse, TraceCategory, Tracer, Transport};
use restlink::{ApiClient, ApiConfig, CredentialPair, TransportError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const ENDPOINT: &str = "https://rest.example.com";
pub const VERSION: &str = "v1";

/// Transport that replays queued responses and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    requests: Mutex<Vec<HttpRequest>>,
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, status: u16, reason: &str, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(response(status, reason, body)));
    }

    pub fn fail(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::NetworkError("no scripted reply".to_string())))
    }
}

pub fn response(status: u16, reason: &str, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        reason: reason.to_string(),
        version: "HTTP/1.1".to_string(),
        headers: vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-Request-Id".to_string(), "req-42".to_string()),
        ],
        body: body.as_bytes().to_vec(),
    }
}

/// Tracer that keeps every line in memory
#[derive(Default)]
pub struct RecordingTracer {
    lines: Mutex<Vec<(String, TraceCategory)>>,
}

impl RecordingTracer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(String, TraceCategory)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|(m, _)| m).collect()
    }
}

impl Tracer for RecordingTracer {
    fn log(&self, message: &str, category: TraceCategory) {
        self.lines
            .lock()
            .unwrap()
            .push((message.to_string(), category));
    }
}

pub fn config(trace: bool) -> ApiConfig {
    ApiConfig::new(ENDPOINT.to_string(), VERSION.to_string()).trace(trace)
}

pub fn client(
    trace: bool,
) -> (
    ApiClient<Arc<ScriptedTransport>>,
    Arc<ScriptedTransport>,
    Arc<RecordingTracer>,
) {
    let transport = ScriptedTransport::new();
    let tracer = RecordingTracer::new();
    let client = ApiClient::with_transport(
        config(trace),
        CredentialPair::new("default_user".to_string(), "default_pass".to_string()),
        Arc::clone(&transport),
    )
    .with_tracer(tracer.clone());
    (client, transport, tracer)
}
