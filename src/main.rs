use clinicdesk_core::GatewayConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the ClinicDesk gateway
///
/// Serves the REST gateway: `/api/*` is proxied to the backend, page routes are guarded by the
/// session cookies and everything else comes from the static front-end build.
///
/// # Environment Variables
/// - `BACKEND_API_URL`: backend origin (fallback `NEXT_PUBLIC_API_URL`, then
///   `http://localhost:8000`)
/// - `CLINICDESK_REST_ADDR`: listen address (default: "0.0.0.0:3000")
/// - `CLINICDESK_DEV_MODE`: include error details in 500 responses
/// - `CLINICDESK_STATIC_DIR`: built front-end directory
/// - `CLINICDESK_STATE_DIR`: local state directory (default: ".clinicdesk")
/// - `CLINICDESK_UPSTREAM_TIMEOUT_SECS`: backend request timeout (default: 30)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinicdesk=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = GatewayConfig::from_env()?;
    let addr = cfg.rest_addr().to_string();

    tracing::info!("++ Starting ClinicDesk gateway on {}", addr);
    tracing::info!("++ Backend origin {}", cfg.backend_origin());
    if cfg.dev_mode() {
        tracing::warn!("++ Development mode: error details are exposed in responses");
    }

    let app = api_rest::router(api_rest::AppState::new(cfg)?);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ClinicDesk gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
}
