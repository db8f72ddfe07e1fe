//! Doctor profile completion scoring.
//!
//! The score is derived on demand from the backend's profile payload; nothing is stored. The
//! profile is split into eight weighted sections whose weights sum to 100. Each section
//! contributes its weight scaled by the share of its fields that are filled in.

use crate::{CoreError, CoreResult};
use serde_json::Value;

/// A weighted group of profile fields. Field paths use `.` to reach into nested objects.
#[derive(Clone, Copy, Debug)]
pub struct ProfileSection {
    pub key: &'static str,
    pub label: &'static str,
    pub weight: u32,
    pub fields: &'static [&'static str],
}

pub const PROFILE_SECTIONS: [ProfileSection; 8] = [
    ProfileSection {
        key: "personal",
        label: "Personal details",
        weight: 15,
        fields: &["first_name", "last_name", "gender", "date_of_birth", "profile_photo"],
    },
    ProfileSection {
        key: "contact",
        label: "Contact",
        weight: 10,
        fields: &["email", "phone", "address.line1", "address.city", "address.pincode"],
    },
    ProfileSection {
        key: "qualifications",
        label: "Qualifications",
        weight: 15,
        fields: &["qualifications", "specialization", "experience_years"],
    },
    ProfileSection {
        key: "registration",
        label: "Medical registration",
        weight: 15,
        fields: &[
            "registration.number",
            "registration.council",
            "registration.year",
        ],
    },
    ProfileSection {
        key: "clinic",
        label: "Clinic association",
        weight: 10,
        fields: &["clinics"],
    },
    ProfileSection {
        key: "kyc",
        label: "Identity (KYC)",
        weight: 15,
        fields: &["kyc.pan", "kyc.aadhaar"],
    },
    ProfileSection {
        key: "bank",
        label: "Bank details",
        weight: 10,
        fields: &["bank.account_holder", "bank.account_number", "bank.ifsc"],
    },
    ProfileSection {
        key: "availability",
        label: "Availability",
        weight: 10,
        fields: &["availability"],
    },
];

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SectionCompletion {
    pub key: &'static str,
    pub label: &'static str,
    pub weight: u32,
    pub filled: usize,
    pub total: usize,
    pub complete: bool,
    pub missing: Vec<&'static str>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ProfileCompletion {
    pub percentage: u32,
    pub sections: Vec<SectionCompletion>,
}

fn lookup<'a>(profile: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(profile, |node, key| node.get(key))
}

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
    }
}

/// Score a profile payload.
///
/// Accepts either the bare profile object or the backend's `{ "data": { ... } }` envelope.
///
/// # Errors
///
/// Returns [`CoreError::ProfileNotObject`] if the payload is not a JSON object.
pub fn profile_completion(payload: &Value) -> CoreResult<ProfileCompletion> {
    let profile = match payload.get("data") {
        Some(inner @ Value::Object(_)) => inner,
        _ => payload,
    };
    if !profile.is_object() {
        return Err(CoreError::ProfileNotObject);
    }

    let mut score = 0.0_f64;
    let sections = PROFILE_SECTIONS
        .iter()
        .map(|section| {
            let missing: Vec<&'static str> = section
                .fields
                .iter()
                .copied()
                .filter(|path| !is_filled(lookup(profile, path)))
                .collect();
            let total = section.fields.len();
            let filled = total - missing.len();
            score += f64::from(section.weight) * filled as f64 / total as f64;
            SectionCompletion {
                key: section.key,
                label: section.label,
                weight: section.weight,
                filled,
                total,
                complete: missing.is_empty(),
                missing,
            }
        })
        .collect();

    Ok(ProfileCompletion {
        percentage: (score.round() as u32).min(100),
        sections,
    })
}
