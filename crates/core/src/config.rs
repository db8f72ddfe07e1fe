//! Gateway runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the proxy and the
//! router. Request handlers never read process-wide environment variables; tests construct a
//! `GatewayConfig` directly.

use crate::constants::{
    BACKEND_URL_ENV, BACKEND_URL_FALLBACK_ENV, DEFAULT_BACKEND_URL, DEFAULT_REST_ADDR,
    DEFAULT_STATE_DIR, DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Gateway configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    backend_origin: String,
    rest_addr: String,
    dev_mode: bool,
    static_dir: Option<PathBuf>,
    state_dir: PathBuf,
    upstream_timeout: Duration,
}

impl GatewayConfig {
    /// Create a new `GatewayConfig`.
    ///
    /// The backend origin must be an absolute `http`/`https` URL; a trailing `/` is dropped so
    /// backend paths can be appended verbatim.
    pub fn new(
        backend_origin: impl Into<String>,
        rest_addr: impl Into<String>,
        dev_mode: bool,
        static_dir: Option<PathBuf>,
        state_dir: PathBuf,
        upstream_timeout: Duration,
    ) -> CoreResult<Self> {
        let backend_origin = normalise_origin(&backend_origin.into())?;
        let rest_addr = rest_addr.into();
        if rest_addr.trim().is_empty() {
            return Err(CoreError::InvalidConfig("rest_addr cannot be empty".into()));
        }
        if upstream_timeout.is_zero() {
            return Err(CoreError::InvalidConfig(
                "upstream timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            backend_origin,
            rest_addr,
            dev_mode,
            static_dir,
            state_dir,
            upstream_timeout,
        })
    }

    /// Build a config pointing at `backend_origin` with every other setting at its default.
    pub fn for_backend(backend_origin: impl Into<String>) -> CoreResult<Self> {
        Self::new(
            backend_origin,
            DEFAULT_REST_ADDR,
            false,
            None,
            PathBuf::from(DEFAULT_STATE_DIR),
            Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        )
    }

    /// Resolve the configuration from the process environment.
    ///
    /// Only binaries call this, once, before any server or client is built.
    pub fn from_env() -> CoreResult<Self> {
        let backend_origin = backend_origin_from_env_values(
            std::env::var(BACKEND_URL_ENV).ok(),
            std::env::var(BACKEND_URL_FALLBACK_ENV).ok(),
        );
        let rest_addr =
            std::env::var("CLINICDESK_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
        let dev_mode = flag_from_env_value(std::env::var("CLINICDESK_DEV_MODE").ok());
        let static_dir = std::env::var("CLINICDESK_STATIC_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let state_dir = std::env::var("CLINICDESK_STATE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));
        let upstream_timeout =
            timeout_from_env_value(std::env::var("CLINICDESK_UPSTREAM_TIMEOUT_SECS").ok())?;

        Self::new(
            backend_origin,
            rest_addr,
            dev_mode,
            static_dir,
            state_dir,
            upstream_timeout,
        )
    }

    pub fn backend_origin(&self) -> &str {
        &self.backend_origin
    }

    /// Join a backend path (which must start with `/`) onto the origin.
    pub fn backend_url(&self, path: &str) -> String {
        format!("{}{}", self.backend_origin, path)
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn static_dir(&self) -> Option<&Path> {
        self.static_dir.as_deref()
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }

    /// Toggle development mode (error details in 500 bodies).
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn with_state_dir(mut self, state_dir: PathBuf) -> Self {
        self.state_dir = state_dir;
        self
    }

    pub fn with_static_dir(mut self, static_dir: Option<PathBuf>) -> Self {
        self.static_dir = static_dir;
        self
    }
}

/// Pick the backend origin from the primary and fallback variables.
///
/// Empty or whitespace-only values count as unset.
pub fn backend_origin_from_env_values(primary: Option<String>, fallback: Option<String>) -> String {
    primary
        .into_iter()
        .chain(fallback)
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}

/// Parse a boolean flag. `1`, `true`, `yes` and `on` (any case) enable it.
pub fn flag_from_env_value(value: Option<String>) -> bool {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes" | "on"))
}

/// Parse the upstream timeout in whole seconds, defaulting when unset or empty.
pub fn timeout_from_env_value(value: Option<String>) -> CoreResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let secs = match value {
        Some(v) => v.parse::<u64>().map_err(|_| {
            CoreError::InvalidConfig(format!("upstream timeout is not a whole number: {v}"))
        })?,
        None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs))
}

fn normalise_origin(origin: &str) -> CoreResult<String> {
    let origin = origin.trim().trim_end_matches('/');
    let host = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
        .ok_or_else(|| {
            CoreError::InvalidConfig(format!(
                "backend origin must start with http:// or https://: {origin}"
            ))
        })?;
    if host.is_empty() {
        return Err(CoreError::InvalidConfig("backend origin has no host".into()));
    }
    Ok(origin.to_string())
}
