//! Request capture: method, path, raw JSON body, and route captures.

use crate::error::AppError;
use crate::escape::sanitize_map;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request as HttpRequest, Uri};
use serde_json::{Map, Value};

/// Bodies larger than this are rejected at capture time.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// A captured HTTP request. Path parameters are filled in by the router when
/// a pattern with `{name}` placeholders matches.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    body: Vec<u8>,
    params: Vec<String>,
}

impl Request {
    /// Capture an incoming request: reads the full body, splits the query
    /// string off the path.
    pub async fn capture(req: HttpRequest<Body>) -> Result<Self, AppError> {
        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| AppError::BadRequest(format!("could not read request body: {}", e)))?;
        Ok(Self::from_parts(parts.method, &parts.uri, bytes.to_vec()))
    }

    /// Build a request from already-read parts. Used by `capture` and by tests.
    pub fn from_parts(method: Method, uri: &Uri, body: Vec<u8>) -> Self {
        Request {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            body,
            params: Vec::new(),
        }
    }

    /// The request path with the query string stripped.
    pub fn uri(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Raw query string, if any (not decoded; the framework routes on path only).
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Positional captures from the matched route pattern.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Single positional capture by index.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: Vec<String>) {
        self.params = params;
    }

    /// Decode the body as a JSON object and sanitize it: string leaves are
    /// trimmed and HTML-escaped (recursively). Invalid JSON and non-object
    /// bodies yield a 400 `bad_request`.
    pub fn input(&self) -> Result<Map<String, Value>, AppError> {
        let value: Value = serde_json::from_slice(&self.body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {}", e)))?;
        let mut map = match value {
            Value::Object(m) => m,
            _ => return Err(AppError::BadRequest("Invalid JSON: body must be a JSON object".into())),
        };
        sanitize_map(&mut map);
        Ok(map)
    }

    /// Sanitized value of one body key, or None when absent.
    pub fn input_key(&self, key: &str) -> Result<Option<Value>, AppError> {
        Ok(self.input()?.remove(key))
    }

    /// Check that every required field is present in the input map. The first
    /// missing field fails the request with a 400 `bad_request`.
    pub fn validate_fields(
        required: &[&str],
        input: &Map<String, Value>,
    ) -> Result<(), AppError> {
        for field in required {
            if !input.contains_key(*field) {
                return Err(AppError::BadRequest(format!(
                    "Required field '{}' was not sent.",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_body(body: &str) -> Request {
        let uri: Uri = "/users?page=2".parse().unwrap();
        Request::from_parts(Method::POST, &uri, body.as_bytes().to_vec())
    }

    #[test]
    fn uri_strips_query_string() {
        let req = request_with_body("{}");
        assert_eq!(req.uri(), "/users");
        assert_eq!(req.query(), Some("page=2"));
    }

    #[test]
    fn input_decodes_and_sanitizes() {
        let req = request_with_body(r#"{"name": "  <John>  ", "age": 19}"#);
        let input = req.input().unwrap();
        assert_eq!(input["name"], "&lt;John&gt;");
        assert_eq!(input["age"], 19);
    }

    #[test]
    fn invalid_json_is_bad_request() {
        let req = request_with_body("{not json");
        let err = req.input().unwrap_err();
        let (code, status) = err.status_parts();
        assert_eq!(code, 400);
        assert_eq!(status, "bad_request");
        assert!(err.to_string().starts_with("Invalid JSON:"));
    }

    #[test]
    fn non_object_body_is_rejected() {
        let req = request_with_body("[1, 2, 3]");
        assert!(req.input().is_err());
    }

    #[test]
    fn input_key_returns_one_value_or_none() {
        let req = request_with_body(r#"{"email": "a@b.com"}"#);
        assert_eq!(req.input_key("email").unwrap(), Some("a@b.com".into()));
        assert_eq!(req.input_key("missing").unwrap(), None);
    }

    #[test]
    fn validate_fields_reports_first_missing_field() {
        let req = request_with_body(r#"{"name": "John", "email": "a@b.com"}"#);
        let input = req.input().unwrap();
        assert!(Request::validate_fields(&["name", "email"], &input).is_ok());
        let err = Request::validate_fields(&["name", "password", "email"], &input).unwrap_err();
        assert_eq!(err.to_string(), "Required field 'password' was not sent.");
    }
}
