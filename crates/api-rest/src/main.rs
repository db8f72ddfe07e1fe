//! Standalone REST gateway binary.
//!
//! ## Purpose
//! Runs the gateway router on its own, without the workspace's `clinicdesk-run` wrapper.
//!
//! ## Intended use
//! Useful during front-end development when you want to point a local build at a backend with
//! verbose request tracing.

use api_rest::{router, AppState};
use clinicdesk_core::GatewayConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Start the gateway on `CLINICDESK_REST_ADDR` (default `0.0.0.0:3000`).
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the environment holds an invalid backend URL or timeout,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=debug".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = GatewayConfig::from_env()?;
    let addr = cfg.rest_addr().to_string();

    tracing::info!("-- Starting ClinicDesk REST gateway on {}", addr);
    tracing::info!("-- Proxying /api to {}", cfg.backend_origin());

    let app = router(AppState::new(cfg)?);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
