//! # API REST
//!
//! HTTP gateway for ClinicDesk.
//!
//! Handles:
//! - `/api/*` routes proxied to the backend through `clinicdesk-proxy`
//! - page route protection based on the session cookies
//! - serving the built front-end from the configured static directory
//! - OpenAPI/Swagger documentation and request tracing

#![warn(rust_2018_idioms)]

pub mod error;
pub mod extract;
pub mod guard;
pub mod handlers;
pub mod schema;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use handlers::{auth, clinic, consultations, doctor, health, patients, support, tasks};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login,
        auth::register,
        auth::send_otp,
        auth::verify_otp,
        auth::refresh,
        auth::logout,
        doctor::get_profile,
        doctor::update_profile,
        doctor::profile_completion_score,
        doctor::upload_document,
        doctor::availability,
        doctor::onboarding_template,
        patients::list_patients,
        patients::create_patient,
        patients::search_patients,
        patients::get_patient,
        patients::update_patient,
        patients::delete_patient,
        clinic::list_holidays,
        clinic::create_holiday,
        clinic::delete_holiday,
        consultations::create_consultation,
        tasks::list_tasks,
        tasks::create_task,
        tasks::reorder_tasks,
        tasks::update_task,
        tasks::delete_task,
        support::list_tickets,
        support::create_ticket,
        support::get_ticket,
    ),
    components(schemas(
        schema::HealthRes,
        schema::ErrorRes,
        schema::ValidationErrorRes,
        schema::LoginReq,
        schema::OtpReq,
        schema::RefreshReq,
        schema::PatientReq,
        schema::HolidayReq,
        schema::ConsultationReq,
        schema::ReorderReq,
        schema::SectionCompletionRes,
        schema::ProfileCompletionRes,
    ))
)]
pub struct ApiDoc;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/send-otp", post(auth::send_otp))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/doctor/profile",
            get(doctor::get_profile)
                .put(doctor::update_profile)
                .patch(doctor::update_profile),
        )
        .route(
            "/api/doctor/profile/completion",
            get(doctor::profile_completion_score),
        )
        .route(
            "/api/doctor/documents",
            post(doctor::upload_document).layer(DefaultBodyLimit::max(doctor::MAX_DOCUMENT_BYTES)),
        )
        .route("/api/doctor/availability", get(doctor::availability))
        .route("/api/onboarding/template", get(doctor::onboarding_template))
        .route(
            "/api/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route("/api/patients/search", get(patients::search_patients))
        .route(
            "/api/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/api/clinic/holidays",
            get(clinic::list_holidays).post(clinic::create_holiday),
        )
        .route(
            "/api/clinic/holidays/:holiday_id",
            delete(clinic::delete_holiday),
        )
        .route("/api/consultations", post(consultations::create_consultation))
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/api/tasks/reorder", post(tasks::reorder_tasks))
        .route(
            "/api/tasks/:id",
            patch(tasks::update_task).delete(tasks::delete_task),
        )
        .route(
            "/api/tickets",
            get(support::list_tickets).post(support::create_ticket),
        )
        .route("/api/tickets/:id", get(support::get_ticket))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Build the gateway router.
///
/// Unknown paths fall back to the static front-end when `CLINICDESK_STATIC_DIR` is set
/// (unknown pages get its `index.html`), otherwise to a JSON 404.
pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .route("/health", get(health::health))
        .merge(api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let app = match state.cfg.static_dir() {
        Some(dir) => app.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => app.fallback(not_found),
    };

    app.layer(axum::middleware::from_fn(guard::protect_pages))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{call, get as get_req, state_for};
    use axum::http::StatusCode;
    use clinicdesk_core::GatewayConfig;

    #[tokio::test]
    async fn health_needs_no_backend() {
        let state = state_for("http://127.0.0.1:9");
        let (status, _, body) = call(state, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn openapi_document_lists_proxy_routes() {
        let state = state_for("http://127.0.0.1:9");
        let (status, _, body) = call(state, get_req("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/clinic/holidays"].is_object());
        assert!(body["paths"]["/api/patients/{id}"].is_object());
    }

    #[tokio::test]
    async fn static_directory_serves_pages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>home</html>").unwrap();
        let cfg = GatewayConfig::for_backend("http://127.0.0.1:9")
            .unwrap()
            .with_static_dir(Some(dir.path().to_path_buf()));
        let state = AppState::new(cfg).unwrap();

        let app = router(state.clone());
        let resp = tower::ServiceExt::oneshot(app, get_req("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // Unknown page with a session falls back to index.html.
        let req = axum::http::Request::builder()
            .uri("/settings")
            .header("cookie", "access_token=t; role=doctor")
            .body(axum::body::Body::empty())
            .unwrap();
        let resp = tower::ServiceExt::oneshot(router(state), req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
