//! Clinic task board.

use super::{json_body, path_params, relay};
use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery, RawBody};
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use clinicdesk_proxy::backend::{self, render_path, require_body};
use clinicdesk_proxy::ProxyResponse;

#[utoipa::path(
    get,
    path = "/api/tasks",
    responses((status = 200, description = "Tasks in board order"))
)]
#[axum::debug_handler]
pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ProxyResponse {
    relay(&state, Method::GET, backend::TASKS, &headers, query, Bytes::new()).await
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    responses((status = 201, description = "Task created"))
)]
#[axum::debug_handler]
pub async fn create_task(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ProxyResponse {
    relay(&state, Method::POST, backend::TASKS, &headers, query, body).await
}

#[utoipa::path(
    post,
    path = "/api/tasks/reorder",
    request_body = crate::schema::ReorderReq,
    responses(
        (status = 200, description = "Board order saved"),
        (status = 400, description = "Missing order", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn reorder_tasks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    require_body(&json_body(&body)?, &["order"])?;
    Ok(relay(&state, Method::POST, backend::TASK_REORDER, &headers, query, body).await)
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier")),
    responses((status = 200, description = "Task updated"))
)]
#[axum::debug_handler]
pub async fn update_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    let path = render_path(backend::TASK_DETAIL, &path_params([("id", id.as_str())]))?;
    Ok(relay(&state, Method::PATCH, path, &headers, query, body).await)
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier")),
    responses((status = 200, description = "Task deleted"))
)]
#[axum::debug_handler]
pub async fn delete_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ApiResult<ProxyResponse> {
    let path = render_path(backend::TASK_DETAIL, &path_params([("id", id.as_str())]))?;
    Ok(relay(&state, Method::DELETE, path, &headers, query, Bytes::new()).await)
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::{call, echo_state, hits, json_request};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn reorder_requires_non_empty_order() {
        let (state, counter) = echo_state().await;
        let (status, _, body) =
            call(state, json_request("POST", "/api/tasks/reorder", json!({ "order": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "order");
        assert_eq!(hits(&counter), 0);
    }

    #[tokio::test]
    async fn patch_goes_to_task_detail() {
        let (state, _) = echo_state().await;
        let (status, _, body) =
            call(state, json_request("PATCH", "/api/tasks/t-3", json!({ "done": true }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["method"], "PATCH");
        assert_eq!(body["path"], "/api/tasks/t-3/");
        assert_eq!(body["body"]["done"], true);
    }

    #[tokio::test]
    async fn oversized_body_is_a_json_error() {
        let (state, counter) = echo_state().await;
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/tasks")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(vec![b' '; 3 * 1024 * 1024]))
            .unwrap();
        let (status, headers, body) = call(state, req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(headers["content-type"].to_str().unwrap().starts_with("application/json"));
        assert!(body["error"].is_string());
        assert_eq!(hits(&counter), 0);
    }

    #[tokio::test]
    async fn delete_forwards_query() {
        let (state, _) = echo_state().await;
        let req = axum::http::Request::builder()
            .method("DELETE")
            .uri("/api/tasks/t-3?archive=true")
            .body(axum::body::Body::empty())
            .unwrap();
        let (_, _, body) = call(state, req).await;
        assert_eq!(body["path"], "/api/tasks/t-3/");
        assert_eq!(body["query"], "archive=true");
    }
}
