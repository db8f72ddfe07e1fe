//! Support tickets.

use super::{path_params, relay};
use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery, RawBody};
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use clinicdesk_proxy::backend::{self, render_path};
use clinicdesk_proxy::ProxyResponse;

#[utoipa::path(
    get,
    path = "/api/tickets",
    responses((status = 200, description = "Support tickets raised by the caller"))
)]
#[axum::debug_handler]
pub async fn list_tickets(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ProxyResponse {
    relay(&state, Method::GET, backend::TICKETS, &headers, query, Bytes::new()).await
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    responses((status = 201, description = "Ticket raised"))
)]
#[axum::debug_handler]
pub async fn create_ticket(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ProxyResponse {
    relay(&state, Method::POST, backend::TICKETS, &headers, query, body).await
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(("id" = String, Path, description = "Ticket identifier")),
    responses((status = 200, description = "Ticket with its conversation"))
)]
#[axum::debug_handler]
pub async fn get_ticket(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ApiResult<ProxyResponse> {
    let path = render_path(backend::TICKET_DETAIL, &path_params([("id", id.as_str())]))?;
    Ok(relay(&state, Method::GET, path, &headers, query, Bytes::new()).await)
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::{call, echo_state, get, spawn_backend, state_for};
    use axum::http::StatusCode;
    use axum::routing::get as get_route;
    use axum::{Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn ticket_detail_maps_to_support_path() {
        let (state, _) = echo_state().await;
        let (_, _, body) = call(state, get("/api/tickets/42?include=messages")).await;
        assert_eq!(body["path"], "/api/support/tickets/42/");
        assert_eq!(body["query"], "include=messages");
    }

    #[tokio::test]
    async fn field_errors_are_flattened_into_error() {
        let backend = Router::new().route(
            "/api/support/tickets/",
            get_route(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "errors": { "subject": ["This field is required."] } })),
                )
            }),
        );
        let state = state_for(&spawn_backend(backend).await);
        let (status, _, body) = call(state, get("/api/tickets")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "subject: This field is required.");
        assert_eq!(body["errors"]["subject"][0], "This field is required.");
    }
}
