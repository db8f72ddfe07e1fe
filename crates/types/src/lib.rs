//! Validated primitives shared by every ClinicDesk crate.
//!
//! These types sit at the boundary between raw JSON (browser forms, backend payloads) and the
//! domain logic in `clinicdesk-core`. Once constructed they are known to be well-formed, so the
//! rest of the workspace never re-checks them.

use std::{fmt, str::FromStr};

/// Errors that can occur when creating validated primitives.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The role tag is not one the backend issues
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed on construction; whitespace-only input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Role tag carried in the `role` cookie and in login responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    ClinicAdmin,
    Receptionist,
    Helpdesk,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::ClinicAdmin => "clinic_admin",
            Role::Receptionist => "receptionist",
            Role::Helpdesk => "helpdesk",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TextError;

    /// Accepts the backend's tags case-insensitively, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "doctor" => Ok(Role::Doctor),
            "clinic_admin" | "admin" => Ok(Role::ClinicAdmin),
            "receptionist" => Ok(Role::Receptionist),
            "helpdesk" | "support" => Ok(Role::Helpdesk),
            _ => Err(TextError::UnknownRole(s.to_string())),
        }
    }
}

/// The patient currently in context on a workstation.
///
/// Only the fields the UI needs to show "who is selected" are kept; the full record stays with
/// the backend.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatientRef {
    pub id: NonEmptyText,
    pub name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl PatientRef {
    pub fn new(id: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self, TextError> {
        Ok(Self {
            id: NonEmptyText::new(id)?,
            name: NonEmptyText::new(name)?,
            phone: None,
            age: None,
            gender: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  fever  ").unwrap();
        assert_eq!(text.as_str(), "fever");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   ").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn role_parses_backend_variants() {
        assert_eq!("Doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!("clinic-admin".parse::<Role>().unwrap(), Role::ClinicAdmin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::ClinicAdmin);
        assert!(matches!(
            "janitor".parse::<Role>(),
            Err(TextError::UnknownRole(r)) if r == "janitor"
        ));
    }

    #[test]
    fn patient_ref_round_trips_without_optional_fields() {
        let patient = PatientRef::new("p-1", "Asha Rao").unwrap();
        let json = serde_json::to_string(&patient).unwrap();
        assert_eq!(json, r#"{"id":"p-1","name":"Asha Rao"}"#);
        let back: PatientRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, patient);
    }
}
