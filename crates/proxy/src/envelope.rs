//! Request and response envelopes for one proxied call.

use crate::cookies::collect_set_cookies;
use crate::upstream::UpstreamError;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Value};

pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const DELETED_MESSAGE: &str = "Deleted successfully";

/// The body to send upstream.
#[derive(Clone, Debug, Default)]
pub enum ProxyBody {
    #[default]
    Empty,
    /// JSON bytes, sent with `Content-Type: application/json`.
    Json(Bytes),
    /// Raw multipart bytes with the inbound `Content-Type` (boundary included) passed through.
    Multipart { content_type: HeaderValue, bytes: Bytes },
    /// Any other declared media type (form-encoded, plain text), sent as received.
    Raw { content_type: HeaderValue, bytes: Bytes },
}

fn media_type(content_type: &HeaderValue) -> Option<String> {
    let value = content_type.to_str().ok()?;
    let essence = value.split(';').next()?.trim().to_ascii_lowercase();
    (!essence.is_empty()).then_some(essence)
}

impl ProxyBody {
    /// Choose the body kind from the inbound `Content-Type`.
    ///
    /// Bodies without a content type, or with a JSON one, are sent as JSON.
    pub fn from_inbound(content_type: Option<&HeaderValue>, bytes: Bytes) -> Self {
        let media = content_type.and_then(media_type);
        match (content_type, media.as_deref()) {
            (Some(ct), Some("multipart/form-data")) => ProxyBody::Multipart {
                content_type: ct.clone(),
                bytes,
            },
            _ if bytes.iter().all(u8::is_ascii_whitespace) => ProxyBody::Empty,
            (_, None) | (_, Some("application/json")) => ProxyBody::Json(bytes),
            (_, Some(m)) if m.ends_with("+json") => ProxyBody::Json(bytes),
            (Some(ct), Some(_)) => ProxyBody::Raw {
                content_type: ct.clone(),
                bytes,
            },
            (None, Some(_)) => ProxyBody::Json(bytes),
        }
    }

    pub fn json(value: &Value) -> Self {
        ProxyBody::Json(Bytes::from(value.to_string()))
    }
}

/// An outbound call to the backend.
#[derive(Clone, Debug)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path under the backend origin, starting with `/`.
    pub backend_path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<HeaderValue>,
    pub cookie: Option<HeaderValue>,
    pub body: ProxyBody,
}

impl ProxyRequest {
    pub fn new(method: Method, backend_path: impl Into<String>) -> Self {
        Self {
            method,
            backend_path: backend_path.into(),
            query: Vec::new(),
            authorization: None,
            cookie: None,
            body: ProxyBody::Empty,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_authorization(mut self, authorization: Option<HeaderValue>) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn with_cookie(mut self, cookie: Option<HeaderValue>) -> Self {
        self.cookie = cookie;
        self
    }

    pub fn with_body(mut self, body: ProxyBody) -> Self {
        self.body = body;
        self
    }
}

/// The normalised answer relayed to the browser.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookies: Vec<String>,
}

impl ProxyResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            set_cookies: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 400 naming the missing field.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            json!({ "error": format!("{field} is required"), "field": field }),
        )
    }

    /// 500 for a transport failure. `details` is only included in development mode.
    pub fn internal_error(dev_mode: bool, details: &str) -> Self {
        let mut body = json!({ "error": INTERNAL_ERROR_MESSAGE, "message": INTERNAL_ERROR_MESSAGE });
        if dev_mode {
            body["details"] = Value::String(details.to_string());
        }
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    fn invalid_response(status: StatusCode) -> Self {
        // 204/205/304 cannot carry the JSON error body.
        let status = if matches!(
            status,
            StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
        ) {
            StatusCode::BAD_GATEWAY
        } else {
            status
        };
        Self::new(status, json!({ "error": INVALID_RESPONSE_MESSAGE }))
    }

    pub fn with_set_cookies(mut self, cookies: Vec<String>) -> Self {
        self.set_cookies = cookies;
        self
    }
}

/// Build the error body for a non-2xx backend answer.
///
/// Keeps every field the backend sent, sets `error` to the extracted message and fills in
/// `message` when the backend had none.
fn error_body(status: StatusCode, payload: Value) -> Value {
    let message = UpstreamError::classify(&payload)
        .message()
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    match payload {
        Value::Object(mut map) => {
            map.insert("error".into(), Value::String(message.clone()));
            map.entry("message").or_insert(Value::String(message));
            Value::Object(map)
        }
        other => json!({ "error": message, "message": message, "data": other }),
    }
}

/// Normalise a raw backend answer.
///
/// `set_cookie_values` are the raw `Set-Cookie` header values; they are only relayed on
/// success.
pub fn normalise<'a>(
    method: &Method,
    status: StatusCode,
    body: &[u8],
    set_cookie_values: impl IntoIterator<Item = &'a str>,
) -> ProxyResponse {
    let empty = body.iter().all(u8::is_ascii_whitespace);

    if status.is_success() {
        let cookies = collect_set_cookies(set_cookie_values);
        if empty && *method == Method::DELETE {
            return ProxyResponse::new(
                StatusCode::OK,
                json!({ "status": "success", "message": DELETED_MESSAGE }),
            )
            .with_set_cookies(cookies);
        }
        return match serde_json::from_slice::<Value>(body) {
            Ok(value) => ProxyResponse::new(status, value).with_set_cookies(cookies),
            Err(e) => {
                tracing::error!("Invalid JSON from backend ({}): {:?}", status, e);
                ProxyResponse::invalid_response(status)
            }
        };
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(payload) => ProxyResponse::new(status, error_body(status, payload)),
        Err(e) => {
            tracing::error!("Invalid JSON in backend error ({}): {:?}", status, e);
            ProxyResponse::invalid_response(status)
        }
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        for cookie in &self.set_cookies {
            match HeaderValue::from_str(cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => tracing::warn!("dropping unrepresentable Set-Cookie: {:?}", e),
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_COOKIES: [&str; 0] = [];

    #[test]
    fn success_relays_body_status_and_cookies() {
        let resp = normalise(
            &Method::POST,
            StatusCode::CREATED,
            br#"{"id": 7}"#,
            ["access_token=a; Expires=Wed, 09 Jun 2021 10:18:14 GMT, role=doctor"],
        );
        assert_eq!(resp.status, StatusCode::CREATED);
        assert_eq!(resp.body, json!({ "id": 7 }));
        assert_eq!(resp.set_cookies.len(), 2);
    }

    #[test]
    fn empty_delete_is_success() {
        let resp = normalise(&Method::DELETE, StatusCode::NO_CONTENT, b"", NO_COOKIES);
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["message"], DELETED_MESSAGE);
    }

    #[test]
    fn empty_non_delete_success_is_invalid_response() {
        let resp = normalise(&Method::GET, StatusCode::OK, b"", NO_COOKIES);
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["error"], INVALID_RESPONSE_MESSAGE);
    }

    #[test]
    fn html_error_page_is_invalid_response_with_backend_status() {
        let resp = normalise(&Method::GET, StatusCode::BAD_GATEWAY, b"<html>502</html>", NO_COOKIES);
        assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
        assert_eq!(resp.body, json!({ "error": INVALID_RESPONSE_MESSAGE }));
    }

    #[test]
    fn error_keeps_backend_fields_and_adds_error() {
        let resp = normalise(
            &Method::POST,
            StatusCode::BAD_REQUEST,
            br#"{"errors": {"phone": ["Invalid"]}, "code": "validation"}"#,
            ["ignored=1"],
        );
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body["error"], "phone: Invalid");
        assert_eq!(resp.body["message"], "phone: Invalid");
        assert_eq!(resp.body["code"], "validation");
        assert!(resp.set_cookies.is_empty());
    }

    #[test]
    fn error_without_known_shape_uses_status_text() {
        let resp = normalise(&Method::GET, StatusCode::NOT_FOUND, br#"{"status": "error"}"#, NO_COOKIES);
        assert_eq!(resp.body["error"], "Not Found");
    }

    #[test]
    fn error_keeps_backend_message_field() {
        let resp = normalise(
            &Method::GET,
            StatusCode::UNAUTHORIZED,
            br#"{"detail": "Token expired", "message": "Please log in"}"#,
            NO_COOKIES,
        );
        assert_eq!(resp.body["error"], "Token expired");
        assert_eq!(resp.body["message"], "Please log in");
    }

    #[test]
    fn internal_error_hides_details_outside_dev_mode() {
        let prod = ProxyResponse::internal_error(false, "connection refused");
        assert!(prod.body.get("details").is_none());
        let dev = ProxyResponse::internal_error(true, "connection refused");
        assert_eq!(dev.body["details"], "connection refused");
    }

    #[test]
    fn multipart_body_keeps_boundary() {
        let ct = HeaderValue::from_static("multipart/form-data; boundary=----x");
        match ProxyBody::from_inbound(Some(&ct), Bytes::from_static(b"------x--")) {
            ProxyBody::Multipart { content_type, .. } => assert_eq!(content_type, ct),
            other => panic!("expected multipart, got {other:?}"),
        }
        assert!(matches!(
            ProxyBody::from_inbound(None, Bytes::new()),
            ProxyBody::Empty
        ));
    }

    #[test]
    fn non_json_bodies_keep_their_content_type() {
        let form = HeaderValue::from_static("application/x-www-form-urlencoded");
        match ProxyBody::from_inbound(Some(&form), Bytes::from_static(b"phone=9876543210")) {
            ProxyBody::Raw { content_type, bytes } => {
                assert_eq!(content_type, form);
                assert_eq!(&bytes[..], b"phone=9876543210");
            }
            other => panic!("expected raw body, got {other:?}"),
        }

        let json_ct = HeaderValue::from_static("application/json; charset=utf-8");
        assert!(matches!(
            ProxyBody::from_inbound(Some(&json_ct), Bytes::from_static(b"{}")),
            ProxyBody::Json(_)
        ));
        assert!(matches!(
            ProxyBody::from_inbound(None, Bytes::from_static(b"{}")),
            ProxyBody::Json(_)
        ));
    }
}
