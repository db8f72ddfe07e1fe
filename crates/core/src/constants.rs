//! Constants used throughout the ClinicDesk core crate.
//!
//! Environment variable names, defaults and local state filenames live here so the binaries and
//! the tests agree on them.

/// Primary environment variable naming the backend origin.
pub const BACKEND_URL_ENV: &str = "BACKEND_API_URL";

/// Legacy front-end variable, consulted when `BACKEND_API_URL` is unset.
pub const BACKEND_URL_FALLBACK_ENV: &str = "NEXT_PUBLIC_API_URL";

/// Backend origin used when no environment variable is set.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default listen address for the REST gateway.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default directory for locally persisted state (selected patient, template cache).
pub const DEFAULT_STATE_DIR: &str = ".clinicdesk";

/// Default upstream request timeout in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Filename for the persisted selected patient.
pub const SELECTED_PATIENT_FILENAME: &str = "selected_patient.json";

/// Filename for the cached onboarding template.
pub const ONBOARDING_TEMPLATE_FILENAME: &str = "onboarding_template.json";

/// Cookie carrying the bearer access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Cookie carrying the role tag.
pub const ROLE_COOKIE: &str = "role";
