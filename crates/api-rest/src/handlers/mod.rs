//! `/api/*` handlers.
//!
//! Each handler checks its required parameters, builds one [`ProxyRequest`] and relays the
//! normalised backend answer. Nothing is sent upstream when a check fails.

pub mod auth;
pub mod clinic;
pub mod consultations;
pub mod doctor;
pub mod health;
pub mod patients;
pub mod support;
pub mod tasks;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum_extra::extract::CookieJar;
use bytes::Bytes;
use clinicdesk_core::constants::ACCESS_TOKEN_COOKIE;
use clinicdesk_proxy::{ProxyBody, ProxyError, ProxyRequest, ProxyResponse};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Start an outbound request carrying the caller's credentials.
///
/// `Authorization` is forwarded verbatim. Without one, the `access_token` cookie is sent as a
/// bearer token.
pub(crate) fn outbound(method: Method, backend_path: impl Into<String>, headers: &HeaderMap) -> ProxyRequest {
    let authorization = headers.get(AUTHORIZATION).cloned().or_else(|| {
        CookieJar::from_headers(headers)
            .get(ACCESS_TOKEN_COOKIE)
            .and_then(|c| HeaderValue::from_str(&format!("Bearer {}", c.value())).ok())
    });
    ProxyRequest::new(method, backend_path)
        .with_authorization(authorization)
        .with_cookie(headers.get(COOKIE).cloned())
}

/// Forward a request whose body and query need no inspection.
pub(crate) async fn relay(
    state: &AppState,
    method: Method,
    backend_path: impl Into<String>,
    headers: &HeaderMap,
    query: Vec<(String, String)>,
    body: Bytes,
) -> ProxyResponse {
    let req = outbound(method, backend_path, headers)
        .with_query(query)
        .with_body(ProxyBody::from_inbound(headers.get(CONTENT_TYPE), body));
    state.proxy.forward(req).await
}

/// Parse a JSON request body. An empty body reads as `{}`.
pub(crate) fn json_body(bytes: &Bytes) -> ApiResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::Proxy(ProxyError::InvalidJson(e)))
}

pub(crate) fn path_params<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
