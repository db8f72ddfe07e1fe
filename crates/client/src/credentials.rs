//! Session credentials held by the client between calls.

use clinicdesk_core::{Role, SessionTokens};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub role: Option<Role>,
}

impl SessionCredentials {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Credentials carried by a successful login response.
    ///
    /// Cookie-only backends yield empty credentials, which is fine because the transport keeps
    /// the cookies.
    pub fn from_login_body(body: &Value) -> Self {
        let tokens = SessionTokens::from_body(body);
        Self {
            access_token: tokens.access,
            refresh_token: tokens.refresh,
            role: tokens.role,
        }
    }

    /// Apply a refresh response: the access token is replaced, a rotated refresh token is kept.
    pub fn apply_refresh(&mut self, body: &Value) {
        let tokens = SessionTokens::from_body(body);
        if let Some(access) = tokens.access {
            self.access_token = Some(access);
        }
        if let Some(refresh) = tokens.refresh {
            self.refresh_token = Some(refresh);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_body_populates_everything() {
        let creds = SessionCredentials::from_login_body(&json!({
            "access": "a1", "refresh": "r1", "role": "doctor"
        }));
        assert!(creds.is_authenticated());
        assert_eq!(creds.refresh_token.as_deref(), Some("r1"));
        assert_eq!(creds.role, Some(Role::Doctor));
    }

    #[test]
    fn refresh_keeps_old_refresh_token_when_not_rotated() {
        let mut creds = SessionCredentials {
            access_token: Some("old".into()),
            refresh_token: Some("r".into()),
            role: Some(Role::Doctor),
        };
        creds.apply_refresh(&json!({ "access": "new" }));
        assert_eq!(creds.access_token.as_deref(), Some("new"));
        assert_eq!(creds.refresh_token.as_deref(), Some("r"));
        creds.clear();
        assert!(!creds.is_authenticated());
        assert_eq!(creds.role, None);
    }
}
