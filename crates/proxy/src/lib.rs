//! # ClinicDesk Proxy
//!
//! Forwards browser requests to the backend origin and normalises the answers.
//!
//! Handles:
//! - backend path templates and required-parameter checks (before any outbound call)
//! - forwarding `Authorization`, cookies and JSON or multipart bodies over `reqwest`
//! - classifying backend error payloads into a closed set of shapes
//! - relaying `Set-Cookie` headers, including comma-joined values
//!
//! The HTTP routes themselves live in `api-rest`.

#![warn(rust_2018_idioms)]

pub mod backend;
pub mod cookies;
pub mod envelope;
pub mod forward;
pub mod upstream;

use std::collections::BTreeMap;

pub use envelope::{normalise, ProxyBody, ProxyRequest, ProxyResponse};
pub use forward::BackendProxy;
pub use upstream::{FieldError, UpstreamError};

/// Errors raised while preparing or sending a proxied call.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0} is required")]
    MissingField(String),
    #[error("{field}: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(serde_json::Error),
    #[error("invalid path template: {0}")]
    InvalidTemplate(String),
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("backend request failed: {0}")]
    Transport(reqwest::Error),
}

pub type ProxyResult<T> = std::result::Result<T, ProxyError>;
