//! # ClinicDesk Client
//!
//! API client used by workstation front-ends to talk to the gateway.
//!
//! Every call goes through [`AuthClient::execute`], which drives the refresh-on-401 state
//! machine in [`refresh`]: a 401 on a protected path triggers exactly one token refresh and one
//! retry. Higher-level helpers submit consultations and fetch the onboarding template.

#![warn(rust_2018_idioms)]

pub mod client;
pub mod credentials;
pub mod refresh;
pub mod transport;

pub use client::AuthClient;
pub use credentials::SessionCredentials;
pub use refresh::{is_public_path, transition, Event, Phase};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

use clinicdesk_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("session expired, please log in again")]
    SessionExpired,
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("invalid response from server (status {status})")]
    InvalidResponse { status: u16 },
    #[error("request rejected ({status}): {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("credential lock poisoned")]
    LockPoisoned,
    #[error("illegal auth-refresh transition from {0:?}")]
    IllegalTransition(Phase),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
