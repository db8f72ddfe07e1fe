//! Patient records.

use super::{json_body, path_params, relay};
use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery, RawBody};
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use clinicdesk_core::validation::{validate_form, FormSchema, Rule};
use clinicdesk_proxy::backend::{self, render_path, require_query};
use clinicdesk_proxy::{ProxyError, ProxyResponse};
use std::sync::LazyLock;

static NEW_PATIENT_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new()
        .field("name", [Rule::Required, Rule::MinLength(2), Rule::MaxLength(100)])
        .field("phone", [Rule::Required, Rule::Phone])
        .field("email", [Rule::Email])
        .field("pincode", [Rule::Pincode])
});

#[utoipa::path(
    get,
    path = "/api/patients",
    responses((status = 200, description = "Patients of the signed-in clinic"))
)]
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ProxyResponse {
    relay(&state, Method::GET, backend::PATIENTS, &headers, query, Bytes::new()).await
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = crate::schema::PatientReq,
    responses(
        (status = 201, description = "Patient created"),
        (status = 400, description = "Field validation failed", body = crate::schema::ValidationErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    let errors = validate_form(&json_body(&body)?, &NEW_PATIENT_SCHEMA);
    if !errors.is_empty() {
        return Err(ProxyError::Validation(errors).into());
    }
    Ok(relay(&state, Method::POST, backend::PATIENTS, &headers, query, body).await)
}

#[utoipa::path(
    get,
    path = "/api/patients/search",
    params(("query" = String, Query, description = "Name or phone fragment")),
    responses(
        (status = 200, description = "Matching patients"),
        (status = 400, description = "Missing query", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn search_patients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ApiResult<ProxyResponse> {
    require_query(&query, &["query"])?;
    Ok(relay(&state, Method::GET, backend::PATIENT_SEARCH, &headers, query, Bytes::new()).await)
}

async fn patient_call(
    state: &AppState,
    method: Method,
    id: &str,
    query: Vec<(String, String)>,
    headers: &HeaderMap,
    body: Bytes,
) -> ApiResult<ProxyResponse> {
    let path = render_path(backend::PATIENT_DETAIL, &path_params([("id", id)]))?;
    Ok(relay(state, method, path, headers, query, body).await)
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    responses((status = 200, description = "Patient record"))
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ApiResult<ProxyResponse> {
    patient_call(&state, Method::GET, &id, query, &headers, Bytes::new()).await
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    request_body = crate::schema::PatientReq,
    responses((status = 200, description = "Patient updated"))
)]
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    patient_call(&state, Method::PUT, &id, query, &headers, body).await
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    responses((status = 200, description = "Patient deleted"))
)]
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ApiResult<ProxyResponse> {
    patient_call(&state, Method::DELETE, &id, query, &headers, Bytes::new()).await
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::{call, echo_state, get, hits, json_request};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn invalid_patient_is_rejected_with_field_map() {
        let (state, counter) = echo_state().await;
        let (status, _, body) = call(
            state,
            json_request(
                "POST",
                "/api/patients",
                json!({ "name": "Asha Rao", "phone": "12345", "pincode": "012345" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["phone"].is_string());
        assert!(body["errors"]["pincode"].is_string());
        assert!(body["errors"].get("name").is_none());
        assert_eq!(hits(&counter), 0);
    }

    #[tokio::test]
    async fn valid_patient_is_forwarded_untouched() {
        let (state, counter) = echo_state().await;
        let patient = json!({ "name": "Asha Rao", "phone": "9876543210", "age": 34 });
        let (status, _, body) =
            call(state, json_request("POST", "/api/patients", patient.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "/api/patients/");
        assert_eq!(body["body"], patient);
        assert_eq!(hits(&counter), 1);
    }

    #[tokio::test]
    async fn search_requires_query() {
        let (state, counter) = echo_state().await;
        let (status, _, body) = call(state, get("/api/patients/search")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "query is required");
        assert_eq!(hits(&counter), 0);
    }

    #[tokio::test]
    async fn detail_renders_backend_path() {
        let (state, _) = echo_state().await;
        let (_, _, body) = call(state, get("/api/patients/p-42")).await;
        assert_eq!(body["path"], "/api/patients/p-42/");
        assert_eq!(body["method"], "GET");
    }

    #[tokio::test]
    async fn detail_forwards_query() {
        let (state, _) = echo_state().await;
        let (status, _, body) = call(state, get("/api/patients/p-1?include=visits")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "/api/patients/p-1/");
        assert_eq!(body["query"], "include=visits");
    }

    #[tokio::test]
    async fn undecodable_id_is_a_json_error() {
        let (state, counter) = echo_state().await;
        let (status, headers, body) = call(state, get("/api/patients/%FF")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(headers["content-type"].to_str().unwrap().starts_with("application/json"));
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert_eq!(hits(&counter), 0);
    }

    #[tokio::test]
    async fn malformed_id_never_reaches_backend() {
        let (state, counter) = echo_state().await;
        let (status, _, body) = call(state, get("/api/patients/a%2F..")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "id");
        assert_eq!(hits(&counter), 0);
    }
}
