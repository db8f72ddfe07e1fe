use crate::schema::HealthRes;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Liveness check for monitoring and load balancers. Does not contact the backend.
pub async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "ClinicDesk gateway is alive".into(),
    })
}
