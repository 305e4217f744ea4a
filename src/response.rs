//! Fixed response envelope: every reply is `{status_code, status, data}`.

use crate::escape::unescape_value;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// The envelope sent to the client. `status` is a short machine tag
/// ("success", "bad_request", "not_found", ...).
#[derive(Serialize, Debug, Clone)]
pub struct ApiResponse {
    pub status_code: u16,
    pub status: String,
    pub data: Value,
}

impl ApiResponse {
    pub fn new(status_code: u16, status: impl Into<String>, data: Value) -> Self {
        ApiResponse {
            status_code,
            status: status.into(),
            data,
        }
    }

    /// 200 / "success" with a data payload.
    pub fn success<T: Serialize>(data: T) -> Self {
        Self::new(200, "success", serde_json::to_value(data).unwrap_or(Value::Null))
    }

    /// Error envelope with an explicit status code and tag.
    pub fn error(status_code: u16, status: impl Into<String>, data: Value) -> Self {
        Self::new(status_code, status, data)
    }

    /// Error envelope carrying a human message in `data.message`.
    pub fn fail(status_code: u16, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            status_code,
            status,
            serde_json::json!({ "message": message.into() }),
        )
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut envelope = self;
        // Request capture escapes string input; decode before it leaves.
        unescape_value(&mut envelope.data);
        let status = StatusCode::from_u16(envelope.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_string(&envelope).unwrap_or_else(|_| {
            r#"{"status_code":500,"status":"internal_server_error","data":{}}"#.into()
        });
        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_has_fixed_shape() {
        let r = ApiResponse::success(json!({"name": "John Smith", "age": 19}));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status_code"], 200);
        assert_eq!(v["status"], "success");
        assert_eq!(v["data"]["age"], 19);
    }

    #[test]
    fn fail_puts_message_in_data() {
        let r = ApiResponse::fail(400, "bad_request", "Required field 'name' was not sent.");
        assert_eq!(r.status_code, 400);
        assert_eq!(r.data["message"], "Required field 'name' was not sent.");
    }

    #[test]
    fn serializes_in_envelope_key_order() {
        let r = ApiResponse::success(Value::Null);
        let s = serde_json::to_string(&r).unwrap();
        assert_eq!(s, r#"{"status_code":200,"status":"success","data":null}"#);
    }
}
