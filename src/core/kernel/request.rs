//! Plain-data HTTP request and response types.
//!
//! The client builds an `HttpRequest` per call and hands it to a `Transport`,
//! which answers with an `HttpResponse`. Neither type holds a connection, so
//! both can be built and inspected in tests without any network.

use std::fmt;

/// HTTP method for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a multipart form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub content: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl FormPart {
    /// A JSON text part, e.g. the `params` part of a mass update
    pub fn json(name: &str, json: &str) -> Self {
        Self {
            name: name.to_string(),
            content: json.as_bytes().to_vec(),
            content_type: Some("application/json".to_string()),
            file_name: None,
        }
    }

    /// A file part carrying raw bytes
    pub fn file(name: &str, file_name: &str, content: Vec<u8>, content_type: &str) -> Self {
        Self {
            name: name.to_string(),
            content,
            content_type: Some(content_type.to_string()),
            file_name: Some(file_name.to_string()),
        }
    }
}

/// Request entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Sent verbatim
    Text(String),
    /// Form-data entity; the transport sets the boundary content type
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// Find a multipart part by name
    pub fn part(&self, name: &str) -> Option<&FormPart> {
        match self {
            Self::Multipart(parts) => parts.iter().find(|p| p.name == name),
            _ => None,
        }
    }
}

/// A fully addressed HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including any query string
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A response as returned by the transport, body fully read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase for `status`
    ///
    /// `ReqwestTransport` fills in the canonical phrase for the status code
    /// (empty for unregistered codes such as 499). hyper does not expose the
    /// phrase the server actually sent, so a custom status line like
    /// `200 Everything Fine` still reads `OK` here.
    pub reason: String,
    /// Protocol version as reported by the server, e.g. `HTTP/1.1`
    pub version: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Put,
            url: "https://rest.example.com/v1/accounts/A1".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: RequestBody::Text("{}".to_string()),
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn test_part_lookup() {
        let body = RequestBody::Multipart(vec![FormPart::json("params", r#"{"a":1}"#)]);
        let part = body.part("params").unwrap();
        assert_eq!(part.content_type.as_deref(), Some("application/json"));
        assert!(body.part("file").is_none());
        assert!(RequestBody::Empty.part("params").is_none());
    }
}
