//! The refresh-on-401 state machine.
//!
//! ```text
//! Idle --Call--> InFlight --401 on protected path--> Refreshing --ok--> Retrying --> Completed
//!                   |                                    |                  |
//!                   +--any other response--> Completed   +--fail--> Failed  +--401/transport--> Failed
//! ```
//!
//! `Retrying` has no edge back to `Refreshing`, so one call refreshes at most once and retries
//! at most once.

/// Where a call currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InFlight,
    Refreshing,
    Retrying,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

/// What happened while in the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Call,
    /// A response arrived. `protected` is false for public paths.
    Responded { unauthorized: bool, protected: bool },
    TransportFailed,
    RefreshSucceeded,
    RefreshFailed,
}

/// The transition function. `None` marks an event that cannot happen in `phase`.
pub fn transition(phase: Phase, event: Event) -> Option<Phase> {
    use Event::*;
    use Phase::*;
    match (phase, event) {
        (Idle, Call) => Some(InFlight),
        (
            InFlight,
            Responded {
                unauthorized: true,
                protected: true,
            },
        ) => Some(Refreshing),
        (InFlight, Responded { .. }) => Some(Completed),
        (InFlight, TransportFailed) => Some(Failed),
        (Refreshing, RefreshSucceeded) => Some(Retrying),
        (Refreshing, RefreshFailed) => Some(Failed),
        (Retrying, Responded { unauthorized: true, .. }) => Some(Failed),
        (Retrying, Responded { .. }) => Some(Completed),
        (Retrying, TransportFailed) => Some(Failed),
        _ => None,
    }
}

/// Paths that never trigger a refresh: home, login, register, the OTP endpoints and the
/// refresh endpoint itself.
const PUBLIC_PATHS: &[&str] = &[
    "",
    "/login",
    "/register",
    "/auth/login",
    "/auth/register",
    "/auth/send-otp",
    "/auth/verify-otp",
    "/auth/resend-otp",
    "/auth/refresh",
];

/// True if a 401 on `path` must be returned as-is.
///
/// The `/api` prefix, query string and trailing `/` are ignored.
pub fn is_public_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.strip_prefix("/api").unwrap_or(path);
    let path = path.trim_end_matches('/');
    PUBLIC_PATHS.contains(&path)
}
