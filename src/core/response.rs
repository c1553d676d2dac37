//! Wrapped API responses.
//!
//! Every successful round trip produces an [`ApiResponse`]: the body parsed as
//! a JSON object (or an empty object when the body is empty or not a JSON
//! object) with the HTTP status code and reason phrase injected as
//! `httpStatusCode` and `httpReasonPhrase`.

use crate::core::errors::ApiError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Synthetic field holding the HTTP status code
pub const STATUS_CODE_FIELD: &str = "httpStatusCode";
/// Synthetic field holding the HTTP reason phrase
pub const REASON_PHRASE_FIELD: &str = "httpReasonPhrase";
/// Field holding the absolute URL of the next result page
pub const NEXT_PAGE_FIELD: &str = "nextPage";

/// JSON document returned by every client call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    document: Value,
}

impl ApiResponse {
    /// Wrap a raw body with its status line
    pub fn new(status: u16, reason: &str, body: &[u8]) -> Self {
        let mut fields = parse_object(body);
        fields.insert(STATUS_CODE_FIELD.to_string(), Value::from(status));
        fields.insert(REASON_PHRASE_FIELD.to_string(), Value::from(reason));
        Self {
            document: Value::Object(fields),
        }
    }

    /// Look up a dotted path such as `basicInfo.accountNumber`
    ///
    /// Returns `None` when any segment is missing or an intermediate value
    /// is not an object.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.document, |current, segment| current.as_object()?.get(segment))
    }

    /// Deserialize the value at a dotted path
    ///
    /// `Ok(None)` when the path does not resolve.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        self.get(path)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(ApiError::from)
    }

    /// Absolute URL of the next page, `None` once the result set is exhausted
    pub fn next_page(&self) -> Option<&str> {
        self.get(NEXT_PAGE_FIELD).and_then(Value::as_str)
    }

    pub fn status_code(&self) -> u16 {
        self.get(STATUS_CODE_FIELD)
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or_default()
    }

    pub fn reason_phrase(&self) -> &str {
        self.get(REASON_PHRASE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Whether the HTTP status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code())
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    pub fn into_value(self) -> Value {
        self.document
    }

    /// The document as JSON with 2-space indentation
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.document).unwrap_or_else(|_| self.document.to_string())
    }
}

impl std::fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_pretty_string())
    }
}

// Empty, non-JSON and non-object bodies all become an empty document
fn parse_object(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_nested_lookup_and_synthetic_fields() {
        let resp = ApiResponse::new(200, "OK", br#"{"a":{"b":1}}"#);
        assert_eq!(resp.get("a.b"), Some(&json!(1)));
        assert_eq!(resp.get("httpStatusCode"), Some(&json!(200)));
        assert_eq!(resp.get("httpReasonPhrase"), Some(&json!("OK")));
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.reason_phrase(), "OK");
        assert!(resp.is_success());
    }

    #[test]
    fn test_empty_body_yields_only_status_fields() {
        let resp = ApiResponse::new(404, "Not Found", b"");
        assert_eq!(
            resp.as_value(),
            &json!({"httpStatusCode": 404, "httpReasonPhrase": "Not Found"})
        );
        assert!(!resp.is_success());
    }

    #[test]
    fn test_non_json_body_yields_only_status_fields() {
        let resp = ApiResponse::new(502, "Bad Gateway", b"<html>gateway</html>");
        assert_eq!(resp.as_value().as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_non_object_json_body_is_discarded() {
        let resp = ApiResponse::new(200, "OK", b"[1,2,3]");
        assert_eq!(resp.as_value().as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_paths_return_none() {
        let resp = ApiResponse::new(200, "OK", br#"{"a":{"b":1},"s":"text"}"#);
        assert!(resp.get("x.y").is_none());
        assert!(resp.get("a.c").is_none());
        // intermediate value is not an object
        assert!(resp.get("a.b.c").is_none());
        assert!(resp.get("s.len").is_none());
    }

    #[test]
    fn test_next_page() {
        let resp = ApiResponse::new(
            200,
            "OK",
            br#"{"products":[],"nextPage":"https://host/v1/next?page=2"}"#,
        );
        assert_eq!(resp.next_page(), Some("https://host/v1/next?page=2"));

        let resp = ApiResponse::new(200, "OK", br#"{"products":[],"nextPage":null}"#);
        assert!(resp.next_page().is_none());

        let resp = ApiResponse::new(200, "OK", br#"{"products":[]}"#);
        assert!(resp.next_page().is_none());
    }

    #[test]
    fn test_server_fields_are_overwritten_by_status_line() {
        let resp = ApiResponse::new(201, "Created", br#"{"httpStatusCode":999}"#);
        assert_eq!(resp.status_code(), 201);
    }

    #[test]
    fn test_get_as() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Info {
            name: String,
            balance: f64,
        }

        let resp = ApiResponse::new(
            200,
            "OK",
            br#"{"basicInfo":{"name":"Acme","balance":12.5}}"#,
        );
        let info: Option<Info> = resp.get_as("basicInfo").unwrap();
        assert_eq!(
            info,
            Some(Info {
                name: "Acme".to_string(),
                balance: 12.5
            })
        );

        let missing: Option<Info> = resp.get_as("billTo").unwrap();
        assert!(missing.is_none());

        assert!(resp.get_as::<Info>("basicInfo.name").is_err());
    }

    #[test]
    fn test_pretty_string_uses_two_space_indent() {
        let resp = ApiResponse::new(200, "OK", br#"{"a":1}"#);
        let pretty = resp.to_pretty_string();
        assert!(pretty.contains("\n  \"a\": 1"));
    }
}
