//! Backend paths and path-template rendering.
//!
//! Every inbound `/api/...` route maps to one backend path. Paths with identifiers are
//! templates (`/api/patients/{id}/`) rendered from request parameters; a missing parameter is
//! reported before any backend call is made.

use crate::{ProxyError, ProxyResult};
use serde_json::Value;
use std::collections::HashMap;

pub const AUTH_LOGIN: &str = "/api/auth/login/";
pub const AUTH_REGISTER: &str = "/api/auth/register/";
pub const AUTH_SEND_OTP: &str = "/api/auth/send-otp/";
pub const AUTH_VERIFY_OTP: &str = "/api/auth/verify-otp/";
pub const AUTH_REFRESH: &str = "/api/auth/token/refresh/";
pub const AUTH_LOGOUT: &str = "/api/auth/logout/";
pub const DOCTOR_PROFILE: &str = "/api/doctor/profile/";
pub const DOCTOR_DOCUMENTS: &str = "/api/doctor/documents/";
pub const DOCTOR_AVAILABILITY: &str = "/api/doctor/availability/";
pub const ONBOARDING_TEMPLATE: &str = "/api/doctor/onboarding/template/";
pub const PATIENTS: &str = "/api/patients/";
pub const PATIENT_SEARCH: &str = "/api/patients/search/";
pub const PATIENT_DETAIL: &str = "/api/patients/{id}/";
pub const CLINIC_HOLIDAYS: &str = "/api/clinic/clinics/{clinic_id}/holidays/";
pub const CLINIC_HOLIDAY_DETAIL: &str = "/api/clinic/clinics/{clinic_id}/holidays/{holiday_id}/";
pub const CONSULTATIONS: &str = "/api/consultations/";
pub const TASKS: &str = "/api/tasks/";
pub const TASK_REORDER: &str = "/api/tasks/reorder/";
pub const TASK_DETAIL: &str = "/api/tasks/{id}/";
pub const TICKETS: &str = "/api/support/tickets/";
pub const TICKET_DETAIL: &str = "/api/support/tickets/{id}/";

/// Identifiers spliced into a backend path must be a single, plain path segment.
fn check_segment(name: &str, value: &str) -> ProxyResult<()> {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !plain || value == "." || value == ".." {
        return Err(ProxyError::InvalidField {
            field: name.to_string(),
            reason: "must be a plain identifier".into(),
        });
    }
    Ok(())
}

/// Render `template`, replacing each `{name}` with `params[name]`.
///
/// # Errors
///
/// [`ProxyError::MissingField`] if a placeholder has no (or an empty) value,
/// [`ProxyError::InvalidField`] if the value is not a plain path segment.
pub fn render_path(template: &str, params: &HashMap<String, String>) -> ProxyResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|c| open + c)
            .ok_or_else(|| ProxyError::InvalidTemplate(template.to_string()))?;
        let name = &rest[open + 1..close];
        let value = params
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ProxyError::MissingField(name.to_string()))?;
        check_segment(name, value)?;
        out.push_str(&rest[..open]);
        out.push_str(value);
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Check that every name in `required` is present and non-empty in the query.
pub fn require_query(query: &[(String, String)], required: &[&str]) -> ProxyResult<()> {
    for name in required {
        let present = query
            .iter()
            .any(|(k, v)| k == name && !v.trim().is_empty());
        if !present {
            return Err(ProxyError::MissingField((*name).to_string()));
        }
    }
    Ok(())
}

/// Check that every name in `required` is present and non-empty in a JSON body.
pub fn require_body(body: &Value, required: &[&str]) -> ProxyResult<()> {
    for name in required {
        let present = match body.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(ProxyError::MissingField((*name).to_string()));
        }
    }
    Ok(())
}

/// Remove `name` from the query and return its value.
pub fn take_query(query: &mut Vec<(String, String)>, name: &str) -> Option<String> {
    let idx = query.iter().position(|(k, _)| k == name)?;
    Some(query.remove(idx).1)
}
