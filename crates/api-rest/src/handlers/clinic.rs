//! Clinic holidays.
//!
//! The backend nests holidays under the clinic, so `clinic_id` is lifted out of the query (or,
//! on create, the body) into the path.

use super::{json_body, path_params, relay};
use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery, RawBody};
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use clinicdesk_proxy::backend::{self, render_path, take_query};
use clinicdesk_proxy::{ProxyError, ProxyResponse};
use serde_json::Value;

fn clinic_id_from(query: &mut Vec<(String, String)>) -> ApiResult<String> {
    take_query(query, "clinic_id")
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ProxyError::MissingField("clinic_id".into()).into())
}

#[utoipa::path(
    get,
    path = "/api/clinic/holidays",
    params(("clinic_id" = String, Query, description = "Clinic identifier")),
    responses(
        (status = 200, description = "Holidays of the clinic"),
        (status = 400, description = "Missing clinic_id", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn list_holidays(
    State(state): State<AppState>,
    ApiQuery(mut query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ApiResult<ProxyResponse> {
    let clinic_id = clinic_id_from(&mut query)?;
    let path = render_path(backend::CLINIC_HOLIDAYS, &path_params([("clinic_id", clinic_id.as_str())]))?;
    Ok(relay(&state, Method::GET, path, &headers, query, Bytes::new()).await)
}

#[utoipa::path(
    post,
    path = "/api/clinic/holidays",
    request_body = crate::schema::HolidayReq,
    responses(
        (status = 201, description = "Holiday created"),
        (status = 400, description = "Missing clinic_id", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn create_holiday(
    State(state): State<AppState>,
    ApiQuery(mut query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    let payload = json_body(&body)?;
    let from_body = payload
        .get("clinic_id")
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.trim().is_empty());
    let clinic_id = match from_body {
        Some(id) => {
            take_query(&mut query, "clinic_id");
            id
        }
        None => clinic_id_from(&mut query)?,
    };
    let path = render_path(backend::CLINIC_HOLIDAYS, &path_params([("clinic_id", clinic_id.as_str())]))?;
    Ok(relay(&state, Method::POST, path, &headers, query, body).await)
}

#[utoipa::path(
    delete,
    path = "/api/clinic/holidays/{holiday_id}",
    params(
        ("holiday_id" = String, Path, description = "Holiday identifier"),
        ("clinic_id" = String, Query, description = "Clinic identifier")
    ),
    responses(
        (status = 200, description = "Holiday deleted"),
        (status = 400, description = "Missing clinic_id", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_holiday(
    State(state): State<AppState>,
    ApiPath(holiday_id): ApiPath<String>,
    ApiQuery(mut query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ApiResult<ProxyResponse> {
    let clinic_id = clinic_id_from(&mut query)?;
    let path = render_path(
        backend::CLINIC_HOLIDAY_DETAIL,
        &path_params([("clinic_id", clinic_id.as_str()), ("holiday_id", holiday_id.as_str())]),
    )?;
    Ok(relay(&state, Method::DELETE, path, &headers, query, Bytes::new()).await)
}
