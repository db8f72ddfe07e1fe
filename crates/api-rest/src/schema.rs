//! Request and response shapes published in the OpenAPI document.
//!
//! Proxied bodies are passed through as JSON; these types describe the fields the gateway
//! itself reads or writes.

use clinicdesk_core::profile::SectionCompletion;
use clinicdesk_core::ProfileCompletion;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error envelope returned for gateway and backend failures.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    pub message: Option<String>,
    /// Set when a required parameter is missing.
    pub field: Option<String>,
    /// Only present in development mode.
    pub details: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorRes {
    pub error: String,
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginReq {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OtpReq {
    pub phone: String,
    pub otp: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshReq {
    /// Falls back to the `refresh_token` cookie.
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientReq {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub pincode: Option<String>,
    pub age: Option<u16>,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HolidayReq {
    /// May also be given as a query parameter.
    pub clinic_id: Option<String>,
    pub date: String,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConsultationReq {
    pub patient_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReorderReq {
    pub order: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SectionCompletionRes {
    pub key: String,
    pub label: String,
    pub weight: u32,
    pub filled: usize,
    pub total: usize,
    pub complete: bool,
    pub missing: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileCompletionRes {
    pub percentage: u32,
    pub sections: Vec<SectionCompletionRes>,
}

impl From<SectionCompletion> for SectionCompletionRes {
    fn from(s: SectionCompletion) -> Self {
        Self {
            key: s.key.to_string(),
            label: s.label.to_string(),
            weight: s.weight,
            filled: s.filled,
            total: s.total,
            complete: s.complete,
            missing: s.missing.into_iter().map(str::to_string).collect(),
        }
    }
}

impl From<ProfileCompletion> for ProfileCompletionRes {
    fn from(p: ProfileCompletion) -> Self {
        Self {
            percentage: p.percentage,
            sections: p.sections.into_iter().map(Into::into).collect(),
        }
    }
}
