//! Field validation rules.
//!
//! Each validator is a pure predicate over a trimmed string: `None` means valid, `Some(message)`
//! carries the user-facing error. Format validators accept an empty value so optional fields can
//! share them; pair them with [`Rule::Required`] when the field is mandatory.
//!
//! [`validate_form`] runs an ordered rule list per field and stops at the first failure for that
//! field, so each field reports at most one message.

use crate::CoreError;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("static regex"));
static PAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("static regex"));
static AADHAAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{12}$").expect("static regex"));
static IFSC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("static regex"));
static PINCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("static regex"));
static UPI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]{2,256}@[a-zA-Z]{2,64}$").expect("static regex"));

fn check(re: &Regex, value: &str, message: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || re.is_match(value) {
        None
    } else {
        Some(message.to_string())
    }
}

pub fn required(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some("This field is required".to_string())
    } else {
        None
    }
}

pub fn email(value: &str) -> Option<String> {
    check(&EMAIL_RE, value, "Please enter a valid email address")
}

/// Ten-digit Indian mobile number starting with 6-9, no country prefix.
pub fn phone(value: &str) -> Option<String> {
    check(&PHONE_RE, value, "Please enter a valid 10-digit mobile number")
}

/// Case-sensitive: `abcde1234f` is rejected.
pub fn pan(value: &str) -> Option<String> {
    check(&PAN_RE, value, "Invalid PAN format (e.g. ABCDE1234F)")
}

pub fn aadhaar(value: &str) -> Option<String> {
    check(&AADHAAR_RE, value, "Aadhaar number must be exactly 12 digits")
}

pub fn ifsc(value: &str) -> Option<String> {
    check(&IFSC_RE, value, "Invalid IFSC code (e.g. SBIN0001234)")
}

pub fn pincode(value: &str) -> Option<String> {
    check(&PINCODE_RE, value, "Please enter a valid 6-digit pincode")
}

pub fn upi(value: &str) -> Option<String> {
    check(&UPI_RE, value, "Invalid UPI ID (e.g. name@bank)")
}

pub fn min_length(value: &str, min: usize) -> Option<String> {
    let len = value.trim().chars().count();
    if len == 0 || len >= min {
        None
    } else {
        Some(format!("Must be at least {min} characters"))
    }
}

pub fn max_length(value: &str, max: usize) -> Option<String> {
    if value.trim().chars().count() <= max {
        None
    } else {
        Some(format!("Must be at most {max} characters"))
    }
}

/// A single rule applied to one form field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    Phone,
    Pan,
    Aadhaar,
    Ifsc,
    Pincode,
    Upi,
    MinLength(usize),
    MaxLength(usize),
}

impl Rule {
    pub fn apply(&self, value: &str) -> Option<String> {
        match *self {
            Rule::Required => required(value),
            Rule::Email => email(value),
            Rule::Phone => phone(value),
            Rule::Pan => pan(value),
            Rule::Aadhaar => aadhaar(value),
            Rule::Ifsc => ifsc(value),
            Rule::Pincode => pincode(value),
            Rule::Upi => upi(value),
            Rule::MinLength(min) => min_length(value, min),
            Rule::MaxLength(max) => max_length(value, max),
        }
    }
}

impl FromStr for Rule {
    type Err = CoreError;

    /// Rule names as written on the command line: `phone`, `pan`, `min:3`, `max:100`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let bounded = |arg: &str| {
            arg.parse::<usize>()
                .map_err(|_| CoreError::InvalidInput(format!("invalid length in rule '{s}'")))
        };
        match s.split_once(':') {
            Some(("min", n)) => return Ok(Rule::MinLength(bounded(n)?)),
            Some(("max", n)) => return Ok(Rule::MaxLength(bounded(n)?)),
            _ => {}
        }
        match s.as_str() {
            "required" => Ok(Rule::Required),
            "email" => Ok(Rule::Email),
            "phone" => Ok(Rule::Phone),
            "pan" => Ok(Rule::Pan),
            "aadhaar" => Ok(Rule::Aadhaar),
            "ifsc" => Ok(Rule::Ifsc),
            "pincode" => Ok(Rule::Pincode),
            "upi" => Ok(Rule::Upi),
            other => Err(CoreError::InvalidInput(format!("unknown validation rule '{other}'"))),
        }
    }
}

/// Ordered rules for a set of fields.
#[derive(Clone, Debug, Default)]
pub struct FormSchema {
    fields: Vec<(String, Vec<Rule>)>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name.into(), rules.into_iter().collect()));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields.iter().map(|(n, r)| (n.as_str(), r.as_slice()))
    }
}

/// Render a JSON field as the string a form input would hold.
///
/// Missing and `null` fields are empty; numbers and booleans use their JSON text.
fn field_text(values: &Value, name: &str) -> String {
    match values.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Validate a JSON object against `schema`.
///
/// Returns a `field -> message` map holding the first failing rule's message per field. An
/// empty map means the form is valid. A non-object `values` is treated as having no fields.
pub fn validate_form(values: &Value, schema: &FormSchema) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    for (name, rules) in schema.fields() {
        let text = field_text(values, name);
        if let Some(message) = rules.iter().find_map(|rule| rule.apply(&text)) {
            errors.insert(name.to_string(), message);
        }
    }
    errors
}
