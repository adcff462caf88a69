//! Submission validation against field constraints.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::form::{FieldType, FormDefinition, FormField};
use crate::value::Value;
use crate::values::FormValues;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    NotANumber,
    NotADate,
    TooShort,
    TooLong,
    PatternMismatch,
    UnknownOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field_id: String,
    pub field_name: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_name, self.message)
    }
}

/// Check every visible field's value against its constraints.
///
/// Hidden fields are skipped. Absent optional fields are valid.
pub fn validate_values(form: &FormDefinition, values: &FormValues) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for field in form.fields.iter().filter(|f| !f.hidden) {
        validate_field(field, values.get(field.name.as_str()), &mut violations);
    }
    violations
}

fn validate_field(field: &FormField, value: Option<&Value>, out: &mut Vec<FieldViolation>) {
    let mut violation = |kind, message: String| {
        out.push(FieldViolation {
            field_id: field.id.clone(),
            field_name: field.name.clone(),
            kind,
            message,
        })
    };

    let value = match value {
        Some(v) if !v.is_blank() => v,
        _ => {
            if field.required {
                violation(ViolationKind::Required, "a value is required".to_string());
            }
            return;
        }
    };

    match field.field_type {
        FieldType::Number => {
            if let Err(e) = value.to_decimal() {
                violation(ViolationKind::NotANumber, e.to_string());
                return;
            }
        }
        FieldType::Date => {
            if let Err(e) = value.to_datetime() {
                violation(ViolationKind::NotADate, e.to_string());
                return;
            }
        }
        _ => {}
    }

    let text = value.to_text();
    let length = text.chars().count();
    if let Some(min) = field.min_length {
        if length < min {
            violation(
                ViolationKind::TooShort,
                format!("must be at least {} characters", min),
            );
        }
    }
    if let Some(max) = field.max_length {
        if length > max {
            violation(
                ViolationKind::TooLong,
                format!("must be at most {} characters", max),
            );
        }
    }

    if let Some(pattern) = &field.regex_pattern {
        // Invalid patterns are reported by `check_definition`.
        if let Ok(re) = Regex::new(&format!("^(?:{})$", pattern)) {
            if !re.is_match(&text) {
                violation(
                    ViolationKind::PatternMismatch,
                    format!("does not match pattern '{}'", pattern),
                );
            }
        }
    }

    if field.field_type.has_options() && !field.options.is_empty() && !field.offers(&text) {
        violation(
            ViolationKind::UnknownOption,
            format!("'{}' is not one of the offered options", text),
        );
    }
}
