//! Wire access for the client.
//!
//! [`Transport`] is the seam the refresh state machine is tested through; [`HttpTransport`] is
//! the real implementation over `reqwest` with a cookie store, so cookie-based sessions set by
//! the gateway survive between calls.

use crate::{ClientError, ClientResult};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::future::Future;

/// One gateway call, reusable for the retry after a refresh.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// The human-readable error carried by an error envelope.
    pub fn error_message(&self) -> String {
        ["error", "message", "detail"]
            .iter()
            .find_map(|k| self.body.get(*k).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {}", self.status.as_u16()))
    }

    /// Turn a non-2xx response into [`ClientError::Api`].
    pub fn into_success(self) -> ClientResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Api {
                status: self.status.as_u16(),
                message: self.error_message(),
            })
        }
    }
}

pub trait Transport: Send + Sync {
    /// Send `req`, with `bearer` as the access token when present.
    fn send(
        &self,
        req: &ApiRequest,
        bearer: Option<String>,
    ) -> impl Future<Output = ClientResult<ApiResponse>> + Send;
}

/// `reqwest` transport bound to the gateway origin.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(ClientError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, req: &ApiRequest, bearer: Option<String>) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, req.path);
        let mut builder = self.client.request(req.method.clone(), &url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(ClientError::Transport)?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(ClientError::Transport)?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|_| ClientError::InvalidResponse {
                status: status.as_u16(),
            })?
        };
        Ok(ApiResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_prefers_error_field() {
        let resp = ApiResponse::new(
            StatusCode::BAD_REQUEST,
            json!({ "error": "patient_id is required", "message": "x" }),
        );
        assert_eq!(resp.error_message(), "patient_id is required");

        let bare = ApiResponse::new(StatusCode::BAD_GATEWAY, Value::Null);
        assert_eq!(bare.error_message(), "request failed with status 502");
    }

    #[test]
    fn into_success_rejects_error_status() {
        let err = ApiResponse::new(StatusCode::NOT_FOUND, json!({ "error": "Not found" }))
            .into_success()
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, message } if message == "Not found"));
    }
}
