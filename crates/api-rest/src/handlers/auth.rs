//! Login, registration, OTP, token refresh and logout.

use super::{json_body, outbound, relay};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiQuery, RawBody};
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum_extra::extract::CookieJar;
use bytes::Bytes;
use clinicdesk_core::constants::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, ROLE_COOKIE};
use clinicdesk_core::SessionTokens;
use clinicdesk_proxy::backend::{self, require_body};
use clinicdesk_proxy::cookies::{expire_cookie, session_cookie, sets_cookie};
use clinicdesk_proxy::{ProxyBody, ProxyError, ProxyResponse};
use serde_json::{json, Value};

/// Set the session cookies from a successful auth response unless the backend already did.
fn with_session_cookies(mut resp: ProxyResponse) -> ProxyResponse {
    if !resp.is_success() {
        return resp;
    }
    let tokens = SessionTokens::from_body(&resp.body);
    let pairs = [
        (ACCESS_TOKEN_COOKIE, tokens.access),
        (REFRESH_TOKEN_COOKIE, tokens.refresh),
        (ROLE_COOKIE, tokens.role.map(|r| r.as_str().to_string())),
    ];
    for (name, value) in pairs {
        if let Some(value) = value {
            if !sets_cookie(&resp.set_cookies, name) {
                resp.set_cookies.push(session_cookie(name, &value));
            }
        }
    }
    resp
}

async fn forward_json(
    state: &AppState,
    backend_path: &str,
    headers: &HeaderMap,
    query: Vec<(String, String)>,
    body: Bytes,
) -> ProxyResponse {
    let req = outbound(Method::POST, backend_path, headers)
        .with_query(query)
        .with_body(ProxyBody::Json(body));
    state.proxy.forward(req).await
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = crate::schema::LoginReq,
    responses(
        (status = 200, description = "Logged in; session cookies set"),
        (status = 400, description = "Neither phone nor email given", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    let payload = json_body(&body)?;
    if require_body(&payload, &["phone"]).is_err() && require_body(&payload, &["email"]).is_err() {
        return Err(ProxyError::MissingField("phone or email".into()).into());
    }
    let resp = forward_json(&state, backend::AUTH_LOGIN, &headers, query, body).await;
    Ok(with_session_cookies(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    responses((status = 201, description = "Account created"))
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ProxyResponse {
    relay(&state, Method::POST, backend::AUTH_REGISTER, &headers, query, body).await
}

#[utoipa::path(
    post,
    path = "/api/auth/send-otp",
    request_body = crate::schema::OtpReq,
    responses(
        (status = 200, description = "OTP sent"),
        (status = 400, description = "Missing phone", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn send_otp(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    require_body(&json_body(&body)?, &["phone"])?;
    Ok(forward_json(&state, backend::AUTH_SEND_OTP, &headers, query, body).await)
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    request_body = crate::schema::OtpReq,
    responses(
        (status = 200, description = "OTP verified; session cookies set"),
        (status = 400, description = "Missing phone or otp", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    require_body(&json_body(&body)?, &["phone", "otp"])?;
    let resp = forward_json(&state, backend::AUTH_VERIFY_OTP, &headers, query, body).await;
    Ok(with_session_cookies(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = crate::schema::RefreshReq,
    responses(
        (status = 200, description = "New access token issued"),
        (status = 400, description = "No refresh token in body or cookie", body = crate::schema::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ApiResult<ProxyResponse> {
    let payload = json_body(&body)?;
    let token = ["refresh", "refresh_token"]
        .iter()
        .find_map(|k| {
            payload
                .get(*k)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        })
        .or_else(|| jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| ApiError::from(ProxyError::MissingField("refresh".into())))?;

    let req = outbound(Method::POST, backend::AUTH_REFRESH, &headers)
        .with_query(query)
        .with_body(ProxyBody::json(&json!({ "refresh": token })));
    Ok(with_session_cookies(state.proxy.forward(req).await))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Logged out; session cookies cleared"))
)]
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> ProxyResponse {
    let mut resp = relay(&state, Method::POST, backend::AUTH_LOGOUT, &headers, query, body).await;
    if !resp.is_success() {
        // The local session ends regardless of what the backend says.
        tracing::warn!("Backend logout failed with {}; clearing cookies anyway", resp.status);
        resp = ProxyResponse::new(
            StatusCode::OK,
            json!({ "status": "success", "message": "Logged out" }),
        );
    }
    resp.set_cookies.extend(
        [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, ROLE_COOKIE]
            .into_iter()
            .map(expire_cookie),
    );
    resp
}
