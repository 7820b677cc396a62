//! Hand-maintained validation contracts for every entity.
//!
//! Each validator takes the raw request body and returns either a normalized,
//! fully-typed insert/patch struct or the complete list of field errors.
//! Ownership fields (`userId`, `orgId`, `id`) are never accepted from the
//! client; they are injected server-side from the authenticated identity.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

pub mod business_cards;
pub mod contacts;
pub mod emails;
pub mod events;
pub mod lead_groups;

pub use business_cards::*;
pub use contacts::*;
pub use emails::*;
pub use events::*;
pub use lead_groups::*;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub code: &'static str,
    pub message: String,
}

/// Accumulates every failing field for a payload, not just the first.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn push(&mut self, field: &str, code: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            code,
            message: message.into(),
        });
    }

    pub fn required(&mut self, field: &str) {
        self.push(field, "required", format!("{field} is required"));
    }

    pub fn wrong_type(&mut self, field: &str, expected: &str) {
        self.push(field, "type", format!("{field} must be {expected}"));
    }

    pub fn format(&mut self, field: &str, message: impl Into<String>) {
        self.push(field, "format", message);
    }

    pub fn unknown(&mut self, field: &str) {
        self.push(field, "unknown", format!("{field} is not an accepted field"));
    }

    pub fn reference(&mut self, field: &str, message: impl Into<String>) {
        self.push(field, "reference", message);
    }
}

/// The request body must be a JSON object.
pub(crate) fn object_body(body: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    body.as_object().ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.wrong_type("body", "a JSON object");
        errors
    })
}

pub(crate) fn check_unknown_fields(
    map: &Map<String, Value>,
    allowed: &[&str],
    errors: &mut ValidationErrors,
) {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.unknown(key);
        }
    }
}

/// Present-and-valid string; records a type error on anything non-string
/// (explicit null included) and a required error on an empty string.
pub(crate) fn optional_string(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match map.get(key) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.wrong_type(key, "a string");
            None
        }
    }
}

pub(crate) fn required_string(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match map.get(key) {
        None => {
            errors.required(key);
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.required(key);
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.wrong_type(key, "a string");
            None
        }
    }
}

pub(crate) fn optional_bool(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<bool> {
    match map.get(key) {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            errors.wrong_type(key, "a boolean");
            None
        }
    }
}

pub(crate) fn optional_id(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<i64> {
    match map.get(key) {
        None => None,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(id) if id > 0 => Some(id),
            _ => {
                errors.wrong_type(key, "a positive integer id");
                None
            }
        },
        Some(_) => {
            errors.wrong_type(key, "a positive integer id");
            None
        }
    }
}

pub(crate) fn required_id(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<i64> {
    if !map.contains_key(key) {
        errors.required(key);
        return None;
    }
    optional_id(map, key, errors)
}

/// Coerce a date-like string: plain `YYYY-MM-DD` or an RFC 3339 date-time.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

pub(crate) fn optional_date(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let raw = optional_string(map, key, errors)?;
    match parse_date(&raw) {
        Some(date) => Some(date),
        None => {
            errors.format(key, format!("{key} must be a date (YYYY-MM-DD)"));
            None
        }
    }
}

pub(crate) fn optional_datetime(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<DateTime<Utc>> {
    let raw = optional_string(map, key, errors)?;
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            errors.format(key, format!("{key} must be an RFC 3339 date-time"));
            None
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

pub(crate) fn optional_email(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let raw = optional_string(map, key, errors)?;
    if is_valid_email(&raw) {
        Some(raw)
    } else {
        errors.format(key, format!("{key} must be a valid email address"));
        None
    }
}

pub fn is_valid_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

pub(crate) fn optional_color(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let raw = optional_string(map, key, errors)?;
    if is_valid_hex_color(&raw) {
        Some(raw)
    } else {
        errors.format(key, format!("{key} must be a hex color like #3B82F6"));
        None
    }
}

/// Confidence scores are 0-100 with two decimal places.
pub(crate) fn optional_confidence(
    map: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<Decimal> {
    let number = match map.get(key) {
        None => return None,
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string()).ok(),
        Some(_) => None,
    };
    match number {
        Some(score) if score >= Decimal::ZERO && score <= Decimal::from(100) => Some(score),
        _ => {
            errors.wrong_type(key, "a number between 0 and 100");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        assert_eq!(
            parse_date("2024-03-15"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(
            parse_date("2024-03-15T09:30:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(parse_date("03/15/2024"), None);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("ada@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada smith@example.com"));
    }

    #[test]
    fn hex_color_is_case_insensitive() {
        assert!(is_valid_hex_color("#3B82F6"));
        assert!(is_valid_hex_color("#3b82f6"));
        assert!(!is_valid_hex_color("3B82F6"));
        assert!(!is_valid_hex_color("#3B82F"));
        assert!(!is_valid_hex_color("#GGGGGG"));
    }

    #[test]
    fn explicit_null_is_a_type_error() {
        let mut errors = ValidationErrors::new();
        let body = map(json!({ "name": null }));
        assert_eq!(optional_string(&body, "name", &mut errors), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.into_errors()[0].code, "type");
    }

    #[test]
    fn unknown_fields_are_all_reported() {
        let mut errors = ValidationErrors::new();
        let body = map(json!({ "name": "x", "userId": "u_1", "bogus": 1 }));
        check_unknown_fields(&body, &["name"], &mut errors);
        let fields: Vec<String> = errors.into_errors().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"userId".to_string()));
        assert!(fields.contains(&"bogus".to_string()));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn confidence_bounds() {
        let mut errors = ValidationErrors::new();
        let body = map(json!({ "ok": 87.5, "low": -1, "high": 100.01 }));
        assert!(optional_confidence(&body, "ok", &mut errors).is_some());
        assert!(optional_confidence(&body, "low", &mut errors).is_none());
        assert!(optional_confidence(&body, "high", &mut errors).is_none());
        assert_eq!(errors.len(), 2);
    }
}
