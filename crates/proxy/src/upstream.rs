//! Classification of backend error payloads.
//!
//! The backend reports failures in several shapes (`{"detail": ...}`, `{"message": ...}`,
//! per-field maps under `errors` or `data`). Each payload is classified once into
//! [`UpstreamError`] and the user-facing message is derived from the variant, with priority
//! `detail`, then `message`, then field errors.

use serde_json::{Map, Value};

/// One `field: reason` validation message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    fn render(&self) -> String {
        if self.field.is_empty() {
            self.reason.clone()
        } else {
            format!("{}: {}", self.field, self.reason)
        }
    }
}

/// The closed set of error payload shapes the gateway understands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpstreamError {
    Detail(String),
    Message(String),
    FieldErrors(Vec<FieldError>),
    Unknown,
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Flatten a field-error value found under `field` into `out`.
///
/// Strings and scalars are one reason; arrays of scalars are joined with `, `; objects (and
/// objects inside arrays) are flattened with `.`-joined keys.
fn collect_field(field: &str, value: &Value, out: &mut Vec<FieldError>) {
    match value {
        Value::Array(items) => {
            let reasons: Vec<String> = items.iter().filter_map(scalar_text).collect();
            if !reasons.is_empty() {
                out.push(FieldError {
                    field: field.to_string(),
                    reason: reasons.join(", "),
                });
            }
            for item in items.iter().filter(|v| v.is_object()) {
                collect_field(field, item, out);
            }
        }
        Value::Object(map) => collect_map(field, map, out),
        other => {
            if let Some(reason) = scalar_text(other) {
                out.push(FieldError {
                    field: field.to_string(),
                    reason,
                });
            }
        }
    }
}

fn collect_map(prefix: &str, map: &Map<String, Value>, out: &mut Vec<FieldError>) {
    for (key, value) in map {
        collect_field(&join_key(prefix, key), value, out);
    }
}

fn field_errors(value: Option<&Value>) -> Option<Vec<FieldError>> {
    let mut out = Vec::new();
    match value? {
        Value::Object(map) => collect_map("", map, &mut out),
        Value::Array(_) => collect_field("", value?, &mut out),
        _ => {}
    }
    (!out.is_empty()).then_some(out)
}

impl UpstreamError {
    pub fn classify(payload: &Value) -> Self {
        if !payload.is_object() {
            return UpstreamError::Unknown;
        }
        if let Some(detail) = non_empty_str(payload.get("detail")) {
            return UpstreamError::Detail(detail);
        }
        if let Some(message) = non_empty_str(payload.get("message")) {
            return UpstreamError::Message(message);
        }
        if let Some(errors) =
            field_errors(payload.get("errors")).or_else(|| field_errors(payload.get("data")))
        {
            return UpstreamError::FieldErrors(errors);
        }
        UpstreamError::Unknown
    }

    /// The human-readable message, if the shape carries one.
    pub fn message(&self) -> Option<String> {
        match self {
            UpstreamError::Detail(s) | UpstreamError::Message(s) => Some(s.clone()),
            UpstreamError::FieldErrors(errors) => Some(
                errors
                    .iter()
                    .map(FieldError::render)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            UpstreamError::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_wins_over_everything() {
        let payload = json!({
            "detail": "Token is invalid or expired",
            "message": "ignored",
            "errors": { "phone": ["bad"] }
        });
        assert_eq!(
            UpstreamError::classify(&payload),
            UpstreamError::Detail("Token is invalid or expired".into())
        );
    }

    #[test]
    fn message_used_when_detail_absent_or_blank() {
        let payload = json!({ "detail": "  ", "message": "Clinic not found" });
        assert_eq!(
            UpstreamError::classify(&payload).message().as_deref(),
            Some("Clinic not found")
        );
    }

    #[test]
    fn field_errors_are_formatted_and_joined() {
        let payload = json!({
            "status": "error",
            "errors": {
                "phone": ["Enter a valid phone number."],
                "email": ["This field is required.", "Must be unique."]
            }
        });
        let message = UpstreamError::classify(&payload).message().unwrap();
        let mut parts: Vec<&str> = message.split("; ").collect();
        parts.sort_unstable();
        assert_eq!(
            parts,
            vec![
                "email: This field is required., Must be unique.",
                "phone: Enter a valid phone number."
            ]
        );
    }

    #[test]
    fn data_consulted_when_errors_missing() {
        let payload = json!({ "data": { "pan": "Invalid PAN" } });
        assert_eq!(
            UpstreamError::classify(&payload),
            UpstreamError::FieldErrors(vec![FieldError {
                field: "pan".into(),
                reason: "Invalid PAN".into()
            }])
        );
    }

    #[test]
    fn nested_field_errors_use_dotted_keys() {
        let payload = json!({ "errors": { "address": { "pincode": ["Invalid pincode"] } } });
        assert_eq!(
            UpstreamError::classify(&payload).message().as_deref(),
            Some("address.pincode: Invalid pincode")
        );
    }

    #[test]
    fn unknown_shapes() {
        assert_eq!(UpstreamError::classify(&json!("oops")), UpstreamError::Unknown);
        assert_eq!(
            UpstreamError::classify(&json!({ "errors": {} })),
            UpstreamError::Unknown
        );
        assert_eq!(UpstreamError::Unknown.message(), None);
    }
}
