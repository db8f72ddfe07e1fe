//! Session tokens carried in backend auth responses.

use clinicdesk_types::Role;
use serde_json::Value;

/// Tokens and role found in a login or refresh response body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub role: Option<Role>,
}

impl SessionTokens {
    /// Tokens may sit at the top level, under `data` or under `tokens`. The role may also sit
    /// under `user`. Unknown role strings are ignored.
    pub fn from_body(body: &Value) -> Self {
        let role = find_str(body, &["role"])
            .or_else(|| body.get("user").and_then(|u| find_str(u, &["role"])))
            .or_else(|| {
                body.get("data")
                    .and_then(|d| d.get("user"))
                    .and_then(|u| find_str(u, &["role"]))
            })
            .and_then(|r| r.parse().ok());
        Self {
            access: find_str(body, &["access", "access_token"]),
            refresh: find_str(body, &["refresh", "refresh_token"]),
            role,
        }
    }
}

fn find_str(body: &Value, keys: &[&str]) -> Option<String> {
    let scopes = [Some(body), body.get("data"), body.get("tokens")];
    scopes.into_iter().flatten().find_map(|scope| {
        keys.iter().find_map(|k| {
            scope
                .get(*k)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    })
}
