//! # ClinicDesk Core
//!
//! Core logic for the ClinicDesk clinic-administration gateway and its clients.
//!
//! This crate contains pure domain operations and small local state files:
//! - Field validation rules and form validation
//! - Follow-up (revisit) date calculation
//! - The in-progress consultation store
//! - The selected-patient context and its consultation lock
//! - Doctor profile completion scoring
//! - The onboarding template cache
//! - Gateway configuration resolved at startup
//!
//! **No transport concerns**: proxying to the backend lives in `clinicdesk-proxy`, the
//! auth-refresh client in `clinicdesk-client` and the HTTP server in `api-rest`.

pub mod config;
pub mod constants;
pub mod consultation;
pub mod error;
pub mod followup;
pub mod ids;
pub mod onboarding;
pub mod patient_context;
pub mod profile;
pub mod session;
pub mod storage;
pub mod validation;

pub use clinicdesk_types::{NonEmptyText, PatientRef, Role, TextError};
pub use config::GatewayConfig;
pub use consultation::{
    ConsultationAction, ConsultationSession, ConsultationStore, ConsultationSubmission,
    MedicineDraft, SymptomDraft, TextSection, Vitals,
};
pub use error::{CoreError, CoreResult};
pub use followup::{follow_up_date, preset_date, FollowUp, FollowUpPatch, FollowUpPreset, FollowUpUnit};
pub use ids::LocalId;
pub use onboarding::TemplateCache;
pub use patient_context::{
    FilePatientStore, MemoryPatientStore, PatientContext, PatientContextState, PatientStore,
};
pub use profile::{profile_completion, ProfileCompletion};
pub use session::SessionTokens;
