//! Gateway errors and their JSON responses.
//!
//! Every error leaves the gateway as a JSON body with an `error` string, the same envelope the
//! proxy uses for backend failures.

use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinicdesk_proxy::ProxyError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    #[error("Not found")]
    NotFound,
    /// An extractor could not read the request (bad path segment, oversized body, ...).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

macro_rules! rejection_into_api_error {
    ($($rejection:ty),+) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    ApiError::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

rejection_into_api_error!(BytesRejection, PathRejection, QueryRejection);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Proxy(ProxyError::MissingField(field)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "field": field }),
            ),
            ApiError::Proxy(ProxyError::InvalidField { field, .. }) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "field": field }),
            ),
            ApiError::Proxy(ProxyError::Validation(errors)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "errors": errors }),
            ),
            ApiError::Proxy(ProxyError::InvalidJson(_)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Request body must be valid JSON" }),
            ),
            ApiError::Proxy(e) => {
                tracing::error!("Gateway internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Not found" })),
            ApiError::Rejected { status, message } => (*status, json!({ "error": message })),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::collections::BTreeMap;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_field_names_the_field() {
        let (status, body) = body_of(ProxyError::MissingField("clinic_id".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "clinic_id is required");
        assert_eq!(body["field"], "clinic_id");
    }

    #[tokio::test]
    async fn validation_errors_are_listed_per_field() {
        let mut errors = BTreeMap::new();
        errors.insert("phone".to_string(), "Invalid phone number".to_string());
        let (status, body) = body_of(ProxyError::Validation(errors).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["phone"], "Invalid phone number");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) =
            body_of(ProxyError::InvalidTemplate("/api/{id".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }
}
