//! Runtime field values and the per-type conversions used by condition
//! evaluation.
//!
//! Values arrive as loosely-typed JSON. They are kept close to their wire
//! shape (a string stays `Text` even if it looks like a date) and are only
//! interpreted when a comparison needs a specific representation. All
//! numbers use `rust_decimal::Decimal` -- never `f64`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::ConversionError;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Number(Decimal),
    Bool(bool),
    Date(PrimitiveDateTime),
}

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Text(_) => "Text",
            Value::Number(_) => "Number",
            Value::Bool(_) => "Bool",
            Value::Date(_) => "Date",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `Null` and for text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn to_decimal(&self) -> Result<Decimal, ConversionError> {
        match self {
            Value::Number(d) => Ok(*d),
            Value::Text(s) => parse_decimal(s),
            Value::Bool(b) => Ok(if *b { Decimal::ONE } else { Decimal::ZERO }),
            other => Err(ConversionError::Unsupported {
                from: other.type_name(),
                to: "Number",
            }),
        }
    }

    pub fn to_bool(&self) -> Result<bool, ConversionError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Text(s) => parse_bool(s),
            Value::Number(d) => Ok(!d.is_zero()),
            other => Err(ConversionError::Unsupported {
                from: other.type_name(),
                to: "Bool",
            }),
        }
    }

    pub fn to_datetime(&self) -> Result<PrimitiveDateTime, ConversionError> {
        match self {
            Value::Date(dt) => Ok(*dt),
            Value::Text(s) => parse_datetime(s),
            other => Err(ConversionError::Unsupported {
                from: other.type_name(),
                to: "Date",
            }),
        }
    }

    /// Text form of the value. `Null` renders as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Number(d) => d.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Date(dt) => format_datetime(dt),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.clone().into()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                let raw = n.to_string();
                parse_decimal(&raw)
                    .map(Value::Number)
                    .unwrap_or(Value::Text(raw))
            }
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Text(s) => serde_json::Value::String(s),
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(d) => decimal_to_json(d),
            Value::Date(dt) => serde_json::Value::String(format_datetime(&dt)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Decimal::from(i))
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Number(d)
    }
}

// ──────────────────────────────────────────────
// Parsing helpers
// ──────────────────────────────────────────────

fn decimal_to_json(d: Decimal) -> serde_json::Value {
    if d.fract().is_zero() {
        if let Some(i) = d.to_i64() {
            return serde_json::Value::from(i);
        }
    }
    d.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(d.to_string()))
}

/// Parse a decimal in plain (`18.50`) or scientific (`1.5e3`) notation.
pub fn parse_decimal(input: &str) -> Result<Decimal, ConversionError> {
    let s = input.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| ConversionError::InvalidNumber {
            input: input.to_string(),
        })
}

pub fn parse_bool(input: &str) -> Result<bool, ConversionError> {
    let s = input.trim();
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConversionError::InvalidBool {
            input: input.to_string(),
        })
    }
}

/// Parse a calendar date-time.
///
/// Accepts RFC 3339 (normalized to UTC), `YYYY-MM-DDTHH:MM[:SS[.fff]]`,
/// the same with a space separator, and a bare `YYYY-MM-DD` (midnight).
pub fn parse_datetime(input: &str) -> Result<PrimitiveDateTime, ConversionError> {
    let s = input.trim();

    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        let utc = dt.to_offset(UtcOffset::UTC);
        return Ok(PrimitiveDateTime::new(utc.date(), utc.time()));
    }

    let formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];
    for format in formats {
        if let Ok(dt) = PrimitiveDateTime::parse(s, format) {
            return Ok(dt);
        }
    }

    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map(|d| d.midnight())
        .map_err(|_| ConversionError::InvalidDate {
            input: input.to_string(),
        })
}

fn format_datetime(dt: &PrimitiveDateTime) -> String {
    dt.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| dt.to_string())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
