//! Page route protection.
//!
//! Browser page requests need both the `access_token` and `role` cookies. The cookies are only
//! checked for presence; the backend validates the token on every API call.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use clinicdesk_core::constants::{ACCESS_TOKEN_COOKIE, ROLE_COOKIE};

const LOGIN_PAGE: &str = "/login";
const HOME_AFTER_LOGIN: &str = "/dashboard";

/// Pages reachable without a session.
const PUBLIC_PAGES: &[&str] = &["/", "/login", "/register", "/verify-otp", "/forgot-password"];

/// Pages a signed-in user is bounced away from.
const AUTH_PAGES: &[&str] = &["/login", "/register"];

const ASSET_PREFIXES: &[&str] = &["/_next/", "/static/", "/assets/", "/swagger-ui", "/api-docs/"];

fn normalise(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    }
}

/// API calls, health checks and static files are never redirected.
fn passes_through(path: &str) -> bool {
    path == "/api"
        || path.starts_with("/api/")
        || path == "/health"
        || ASSET_PREFIXES.iter().any(|p| path.starts_with(p))
        || path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}

pub async fn protect_pages(jar: CookieJar, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if passes_through(&path) {
        return next.run(req).await;
    }

    let page = normalise(&path);
    let signed_in = jar.get(ACCESS_TOKEN_COOKIE).is_some() && jar.get(ROLE_COOKIE).is_some();

    if signed_in && AUTH_PAGES.contains(&page) {
        return Redirect::to(HOME_AFTER_LOGIN).into_response();
    }
    if !signed_in && !PUBLIC_PAGES.contains(&page) {
        tracing::debug!(page, "redirecting unauthenticated page request");
        let target = req
            .uri()
            .path_and_query()
            .map_or(page, |pq| pq.as_str());
        return Redirect::to(&login_redirect(target)).into_response();
    }
    next.run(req).await
}

/// `/login?next=<target>`, with `target` percent-encoded.
fn login_redirect(target: &str) -> String {
    match serde_urlencoded::to_string([("next", target)]) {
        Ok(query) => format!("{LOGIN_PAGE}?{query}"),
        Err(e) => {
            tracing::warn!("Failed to encode login redirect target: {:?}", e);
            LOGIN_PAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{call, echo_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    fn page(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header("cookie", c);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn assets_and_api_pass_through() {
        assert!(passes_through("/api/tasks"));
        assert!(passes_through("/_next/static/chunk.js"));
        assert!(passes_through("/favicon.ico"));
        assert!(passes_through("/health"));
        assert!(!passes_through("/dashboard"));
        assert!(!passes_through("/patients/p-1"));
    }

    #[tokio::test]
    async fn anonymous_page_request_is_sent_to_login() {
        let (state, _) = echo_state().await;
        let (status, headers, _) = call(state, page("/patients/p-1", None)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers["location"], "/login?next=%2Fpatients%2Fp-1");
    }

    #[tokio::test]
    async fn login_redirect_keeps_the_query_string() {
        let (state, _) = echo_state().await;
        let (status, headers, _) =
            call(state, page("/patients/p-1?tab=visits&from=2024-01-01", None)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(
            headers["location"],
            "/login?next=%2Fpatients%2Fp-1%3Ftab%3Dvisits%26from%3D2024-01-01"
        );
    }

    #[tokio::test]
    async fn access_token_alone_is_not_a_session() {
        let (state, _) = echo_state().await;
        let (status, _, _) = call(state, page("/dashboard", Some("access_token=t"))).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn signed_in_user_skips_login_page() {
        let (state, _) = echo_state().await;
        let (status, headers, _) =
            call(state, page("/login", Some("access_token=t; role=doctor"))).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers["location"], "/dashboard");
    }

    #[tokio::test]
    async fn signed_in_page_request_reaches_fallback() {
        let (state, _) = echo_state().await;
        let (status, _, body) =
            call(state, page("/dashboard", Some("access_token=t; role=doctor"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn api_calls_are_never_redirected() {
        let (state, _) = echo_state().await;
        let (status, _, _) = call(state, page("/api/tasks", None)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
