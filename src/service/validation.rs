//! Request validation from descriptor rules. Collects every violation instead of stopping at the first.

use crate::error::{AppError, ErrorMessage};
use crate::model::{EntityDescriptor, FieldDescriptor, Format, ValidationRule};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Validator {
    descriptor: Arc<EntityDescriptor>,
}

impl Validator {
    pub fn new(descriptor: Arc<EntityDescriptor>) -> Self {
        Validator { descriptor }
    }

    /// Validate a full body against every writable field's rule. Required fields must be present and non-blank.
    pub fn validate(&self, body: &Map<String, Value>) -> Result<(), AppError> {
        let mut errors = Vec::new();
        for f in self.descriptor.writable() {
            check_field(f, body.get(f.json), &mut errors);
        }
        finish(errors)
    }

    /// Validate only the fields present in body (for PATCH). Required is not enforced for missing fields.
    pub fn validate_partial(&self, body: &Map<String, Value>) -> Result<(), AppError> {
        let mut errors = Vec::new();
        for f in self.descriptor.writable() {
            if let Some(v) = body.get(f.json) {
                check_field(f, Some(v), &mut errors);
            }
        }
        finish(errors)
    }
}

fn finish(errors: Vec<ErrorMessage>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn is_blank(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn check_field(f: &FieldDescriptor, v: Option<&Value>, errors: &mut Vec<ErrorMessage>) {
    let rule = &f.rule;
    if is_blank(v) {
        if rule.required {
            errors.push(ErrorMessage::new(f.json, "required", None, format!("{} is required", f.json)));
        }
        return;
    }
    if let Some(Value::String(s)) = v {
        check_string(f.json, s, rule, errors);
    }
}

fn check_string(name: &str, s: &str, rule: &ValidationRule, errors: &mut Vec<ErrorMessage>) {
    let len = s.chars().count();
    if let Some(max) = rule.max_length {
        if len > max {
            errors.push(ErrorMessage::new(
                name,
                "max",
                Some(max.to_string()),
                format!("{} must be at most {} characters", name, max),
            ));
        }
    }
    if let Some(min) = rule.min_length {
        if len < min {
            errors.push(ErrorMessage::new(
                name,
                "min",
                Some(min.to_string()),
                format!("{} must be at least {} characters", name, min),
            ));
        }
    }
    if let Some(ref re) = rule.pattern {
        if !re.is_match(s) {
            errors.push(ErrorMessage::new(
                name,
                "pattern",
                Some(re.as_str().to_string()),
                format!("{} does not match required pattern", name),
            ));
        }
    }
    if let Some(format) = rule.format {
        let (ok, code) = match format {
            Format::Email => (is_valid_email(s), "email"),
            Format::Phone => (is_valid_phone(s), "phone"),
        };
        if !ok {
            errors.push(ErrorMessage::new(name, code, None, format!("{} must be a valid {}", name, code)));
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| a == s) {
            errors.push(ErrorMessage::new(
                name,
                "allowed",
                Some(allowed.join(",")),
                format!("{} must be one of: {}", name, allowed.join(", ")),
            ));
        }
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return false;
    }
    !value.contains(char::is_whitespace)
}

/// Digits with optional leading `+` and separators (space, dash, parentheses); at least six digits.
fn is_valid_phone(value: &str) -> bool {
    let rest = value.strip_prefix('+').unwrap_or(value);
    let separators_ok = rest
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
    separators_ok && rest.chars().filter(char::is_ascii_digit).count() >= 6
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, User};
    use serde_json::json;

    fn validator() -> Validator {
        Validator::new(Arc::new(User::descriptor().unwrap()))
    }

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    fn codes(err: AppError) -> Vec<(String, String)> {
        match err {
            AppError::Validation(errs) => errs.into_iter().map(|e| (e.field, e.code)).collect(),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_user() {
        let body = object(json!({
            "id": "u1", "username": "ann.lee", "email": "ann@example.com",
            "phone": "+1 (555) 123-4567", "status": "A", "dateOfBirth": "1990-01-01"
        }));
        assert!(validator().validate(&body).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let body = object(json!({
            "id": "", "username": "ann lee", "email": "nope", "phone": "12", "status": "Z"
        }));
        let got = codes(validator().validate(&body).unwrap_err());
        let want: Vec<(String, String)> = [
            ("id", "required"),
            ("username", "pattern"),
            ("email", "email"),
            ("phone", "min"),
            ("phone", "phone"),
            ("status", "allowed"),
        ]
        .iter()
        .map(|(f, c)| (f.to_string(), c.to_string()))
        .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn max_length_counts_characters() {
        let body = object(json!({ "id": "x".repeat(41), "username": "ann", "phone": "0123456789" }));
        let got = codes(validator().validate(&body).unwrap_err());
        assert_eq!(got, vec![("id".to_string(), "max".to_string())]);
    }

    #[test]
    fn partial_ignores_missing_required_fields() {
        let body = object(json!({ "email": "bob@example.com" }));
        assert!(validator().validate_partial(&body).is_ok());
    }

    #[test]
    fn partial_checks_present_fields() {
        let body = object(json!({ "username": "" }));
        let got = codes(validator().validate_partial(&body).unwrap_err());
        assert_eq!(got, vec![("username".to_string(), "required".to_string())]);
    }

    #[test]
    fn nullable_field_accepts_null() {
        let body = object(json!({ "email": null, "status": null }));
        assert!(validator().validate_partial(&body).is_ok());
    }
}
