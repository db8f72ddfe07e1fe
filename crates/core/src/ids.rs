//! Locally generated row identifiers.
//!
//! Symptom and medicine rows need a key before the backend has ever seen them. The id is the
//! creation time in milliseconds followed by a short random suffix:
//!
//! `1704067200000-k3x9qz`
//!
//! Uniqueness is best-effort. Two ids can only collide when generated in the same millisecond
//! and drawing the same suffix, which a single consultation being edited by one person does not
//! produce in practice.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

const SUFFIX_LEN: usize = 6;

/// A locally unique row id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LocalId(String);

impl LocalId {
    /// Generate a new id stamped with the current time.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generate an id stamped with `at`.
    pub fn generate_at(at: DateTime<Utc>) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        Self(format!("{}-{}", at.timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LocalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn generated_id_starts_with_millisecond_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let id = LocalId::generate_at(at);
        let (millis, suffix) = id.as_str().split_once('-').unwrap();
        assert_eq!(millis, "1704067200000");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn consecutive_ids_differ() {
        let a = LocalId::generate();
        let b = LocalId::generate();
        assert_ne!(a, b);
    }
}
