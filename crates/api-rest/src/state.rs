use clinicdesk_core::GatewayConfig;
use clinicdesk_proxy::{BackendProxy, ProxyResult};
use std::sync::Arc;

/// Application state shared by every handler.
///
/// Configuration is resolved once at startup; handlers never read the environment.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<GatewayConfig>,
    pub proxy: BackendProxy,
}

impl AppState {
    pub fn new(cfg: GatewayConfig) -> ProxyResult<Self> {
        let cfg = Arc::new(cfg);
        let proxy = BackendProxy::new(cfg.clone())?;
        Ok(Self { cfg, proxy })
    }
}
