//! Forwarding calls to the backend origin.

use crate::envelope::{normalise, ProxyBody, ProxyRequest, ProxyResponse};
use crate::{ProxyError, ProxyResult};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use clinicdesk_core::GatewayConfig;
use std::sync::Arc;

/// HTTP client bound to the configured backend origin.
///
/// Cheap to clone; every inbound request is forwarded independently.
#[derive(Clone)]
pub struct BackendProxy {
    client: reqwest::Client,
    cfg: Arc<GatewayConfig>,
}

impl BackendProxy {
    pub fn new(cfg: Arc<GatewayConfig>) -> ProxyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.upstream_timeout())
            .build()
            .map_err(ProxyError::ClientBuild)?;
        Ok(Self { client, cfg })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.cfg
    }

    /// Send `req` upstream and normalise the answer.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Transport`] when the backend could not be reached or the response
    /// body could not be read.
    pub async fn send(&self, req: ProxyRequest) -> ProxyResult<ProxyResponse> {
        let url = self.cfg.backend_url(&req.backend_path);
        let mut builder = self.client.request(req.method.clone(), &url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(auth) = req.authorization {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(cookie) = req.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder = match req.body {
            ProxyBody::Empty => builder.header(CONTENT_TYPE, "application/json"),
            ProxyBody::Json(bytes) => builder.header(CONTENT_TYPE, "application/json").body(bytes),
            ProxyBody::Multipart {
                content_type,
                bytes,
            }
            | ProxyBody::Raw {
                content_type,
                bytes,
            } => builder.header(CONTENT_TYPE, content_type).body(bytes),
        };

        tracing::debug!(method = %req.method, %url, "forwarding to backend");
        let resp = builder.send().await.map_err(ProxyError::Transport)?;
        let status = resp.status();
        let set_cookies: Vec<String> = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = resp.bytes().await.map_err(ProxyError::Transport)?;

        Ok(normalise(
            &req.method,
            status,
            &body,
            set_cookies.iter().map(String::as_str),
        ))
    }

    /// Like [`BackendProxy::send`], but a transport failure becomes a structured 500.
    pub async fn forward(&self, req: ProxyRequest) -> ProxyResponse {
        let target = req.backend_path.clone();
        match self.send(req).await {
            Ok(resp) => {
                if !resp.is_success() {
                    tracing::error!("Backend error on {}: {} {}", target, resp.status, resp.body);
                }
                resp
            }
            Err(e) => {
                tracing::error!("Backend transport error on {}: {:?}", target, e);
                ProxyResponse::internal_error(self.cfg.dev_mode(), &e.to_string())
            }
        }
    }
}
