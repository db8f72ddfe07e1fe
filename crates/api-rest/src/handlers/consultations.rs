use super::{json_body, relay};
use crate::error::ApiResult;
use crate::extract::{ApiQuery, RawBody};
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use clinicdesk_proxy::backend::{self, require_body};
use clinicdesk_proxy::ProxyResponse;

#[utoipa::path(
    post,
    path = "/api/consultations",
    request_body = crate::schema::ConsultationReq,
    responses(
        (status = 201, description = "Consultation recorded"),
        (status = 400, description = "Missing patient_id", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_consultation(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    require_body(&json_body(&body)?, &["patient_id"])?;
    Ok(relay(&state, Method::POST, backend::CONSULTATIONS, &headers, query, body).await)
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::{call, echo_state, hits, json_request};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn missing_patient_is_rejected_locally() {
        let (state, counter) = echo_state().await;
        let (status, _, body) = call(
            state,
            json_request("POST", "/api/consultations", json!({ "symptoms": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "patient_id");
        assert_eq!(hits(&counter), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_locally() {
        let (state, counter) = echo_state().await;
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/consultations")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let (status, _, _) = call(state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(hits(&counter), 0);
    }

    #[tokio::test]
    async fn submission_is_forwarded() {
        let (state, counter) = echo_state().await;
        let (status, _, body) = call(
            state,
            json_request(
                "POST",
                "/api/consultations",
                json!({ "patient_id": "p-1", "diagnosis": "Viral fever" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "/api/consultations/");
        assert_eq!(body["body"]["diagnosis"], "Viral fever");
        assert_eq!(hits(&counter), 1);
    }
}
