//! Doctor profile, documents, availability and the onboarding template.

use super::{outbound, relay};
use crate::error::ApiResult;
use crate::extract::{ApiQuery, RawBody};
use crate::schema::ProfileCompletionRes;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use clinicdesk_core::profile_completion;
use clinicdesk_proxy::backend::{self, require_query};
use clinicdesk_proxy::envelope::INVALID_RESPONSE_MESSAGE;
use clinicdesk_proxy::ProxyResponse;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/doctor/profile",
    responses((status = 200, description = "The signed-in doctor's profile"))
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ProxyResponse {
    relay(&state, Method::GET, backend::DOCTOR_PROFILE, &headers, query, Bytes::new()).await
}

/// Largest document upload accepted; multipart overhead included.
pub const MAX_DOCUMENT_BYTES: usize = 25 * 1024 * 1024;

/// Serves both PUT and PATCH.
#[utoipa::path(
    put,
    path = "/api/doctor/profile",
    responses((status = 200, description = "Profile updated (PATCH accepted too)"))
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    method: Method,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ProxyResponse {
    relay(&state, method, backend::DOCTOR_PROFILE, &headers, query, body).await
}

#[utoipa::path(
    get,
    path = "/api/doctor/profile/completion",
    responses(
        (status = 200, description = "Weighted completion score", body = ProfileCompletionRes),
        (status = 502, description = "Profile payload was not an object", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn profile_completion_score(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let resp = state
        .proxy
        .forward(outbound(Method::GET, backend::DOCTOR_PROFILE, &headers).with_query(query))
        .await;
    if !resp.is_success() {
        return resp.into_response();
    }
    match profile_completion(&resp.body) {
        Ok(completion) => Json(ProfileCompletionRes::from(completion)).into_response(),
        Err(e) => {
            tracing::error!("Profile completion error: {:?}", e);
            ProxyResponse::new(StatusCode::BAD_GATEWAY, json!({ "error": INVALID_RESPONSE_MESSAGE }))
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/doctor/documents",
    request_body(content = String, content_type = "multipart/form-data"),
    responses((status = 201, description = "Document uploaded"))
)]
#[axum::debug_handler]
pub async fn upload_document(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ProxyResponse {
    relay(&state, Method::POST, backend::DOCTOR_DOCUMENTS, &headers, query, body).await
}

#[utoipa::path(
    get,
    path = "/api/doctor/availability",
    params(
        ("doctor_id" = String, Query, description = "Doctor identifier"),
        ("clinic_id" = String, Query, description = "Clinic identifier")
    ),
    responses(
        (status = 200, description = "Availability slots"),
        (status = 400, description = "Missing doctor_id or clinic_id", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn availability(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ApiResult<ProxyResponse> {
    require_query(&query, &["doctor_id", "clinic_id"])?;
    Ok(relay(&state, Method::GET, backend::DOCTOR_AVAILABILITY, &headers, query, Bytes::new()).await)
}

#[utoipa::path(
    get,
    path = "/api/onboarding/template",
    responses((status = 200, description = "Onboarding form template with its version tag"))
)]
#[axum::debug_handler]
pub async fn onboarding_template(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ProxyResponse {
    relay(&state, Method::GET, backend::ONBOARDING_TEMPLATE, &headers, query, Bytes::new()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{call, echo_state, get, hits, spawn_backend, state_for};
    use axum::body::Body;
    use axum::extract::DefaultBodyLimit;
    use axum::http::Request;
    use axum::routing::{get as get_route, post};
    use axum::Router;
    use serde_json::Value;

    #[tokio::test]
    async fn availability_requires_both_ids_before_any_call() {
        let (state, counter) = echo_state().await;
        let (status, _, body) = call(state.clone(), get("/api/doctor/availability?doctor_id=d-1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "clinic_id");

        let (status, _, body) = call(state, get("/api/doctor/availability?clinic_id=c-1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "doctor_id");
        assert_eq!(hits(&counter), 0);
    }

    #[tokio::test]
    async fn availability_forwards_query() {
        let (state, counter) = echo_state().await;
        let (status, _, body) = call(
            state,
            get("/api/doctor/availability?doctor_id=d-1&clinic_id=c-1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "/api/doctor/availability/");
        assert_eq!(body["query"], "doctor_id=d-1&clinic_id=c-1");
        assert_eq!(hits(&counter), 1);
    }

    #[tokio::test]
    async fn access_token_cookie_becomes_bearer() {
        let (state, _) = echo_state().await;
        let req = Request::builder()
            .uri("/api/doctor/profile")
            .header("cookie", "access_token=tok123; role=doctor")
            .body(Body::empty())
            .unwrap();
        let (_, _, body) = call(state, req).await;
        assert_eq!(body["authorization"], "Bearer tok123");
    }

    #[tokio::test]
    async fn patch_profile_keeps_method() {
        let (state, _) = echo_state().await;
        let req = Request::builder()
            .method("PATCH")
            .uri("/api/doctor/profile")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"specialization":"ENT"}"#))
            .unwrap();
        let (_, _, body) = call(state, req).await;
        assert_eq!(body["method"], "PATCH");
        assert_eq!(body["body"]["specialization"], "ENT");
    }

    #[tokio::test]
    async fn completion_is_scored_from_backend_profile() {
        let backend = Router::new().route(
            "/api/doctor/profile/",
            get_route(|| async {
                Json(json!({ "data": {
                    "first_name": "Meera",
                    "availability": [{ "day": "mon" }]
                }}))
            }),
        );
        let state = state_for(&spawn_backend(backend).await);

        let (status, _, body) = call(state, get("/api/doctor/profile/completion")).await;
        assert_eq!(status, StatusCode::OK);
        let pct = body["percentage"].as_u64().unwrap();
        assert!(pct > 0 && pct < 100);
        assert_eq!(body["sections"].as_array().map(Vec::len), Some(8));
        let availability = body["sections"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["key"] == "availability")
            .cloned()
            .unwrap_or(Value::Null);
        assert_eq!(availability["complete"], true);
    }

    #[tokio::test]
    async fn completion_relays_backend_errors() {
        let backend = Router::new().route(
            "/api/doctor/profile/",
            get_route(|| async {
                (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Not authenticated" })))
            }),
        );
        let state = state_for(&spawn_backend(backend).await);
        let (status, _, body) = call(state, get("/api/doctor/profile/completion")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Not authenticated");
    }

    #[tokio::test]
    async fn large_document_upload_reaches_backend() {
        let backend = Router::new()
            .route(
                "/api/doctor/documents/",
                post(|headers: HeaderMap, body: Bytes| async move {
                    Json(json!({
                        "content_type": headers.get("content-type").and_then(|v| v.to_str().ok()),
                        "len": body.len(),
                    }))
                }),
            )
            .layer(DefaultBodyLimit::disable());
        let state = state_for(&spawn_backend(backend).await);

        let mut payload = b"--XyZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"degree.pdf\"\r\n\r\n".to_vec();
        payload.extend(std::iter::repeat(b'x').take(3 * 1024 * 1024));
        payload.extend_from_slice(b"\r\n--XyZ--\r\n");
        let len = payload.len();
        let req = Request::builder()
            .method("POST")
            .uri("/api/doctor/documents")
            .header("content-type", "multipart/form-data; boundary=XyZ")
            .body(Body::from(payload))
            .unwrap();

        let (status, _, body) = call(state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["len"], json!(len));
        assert_eq!(body["content_type"], "multipart/form-data; boundary=XyZ");
    }

    #[tokio::test]
    async fn profile_forwards_query() {
        let (state, _) = echo_state().await;
        let (_, _, body) = call(state, get("/api/doctor/profile?expand=clinics")).await;
        assert_eq!(body["query"], "expand=clinics");
    }
}
