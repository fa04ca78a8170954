//! Per-type value handlers for strict and lax validation
//!
//! Each schema column gets one [`FieldCheck`] function, resolved from its
//! type and the validation mode by [`handler_for`]. Handlers never see the
//! column name; the validator attaches location context to rejections.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::models::{FieldType, Value};
use crate::constants::DEFAULT_MISSING_VALUES;

/// Whether malformed values stop the stream or degrade to `Null`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Strict,
    Lax,
}

impl ValidationMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lax
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, ValidationMode::Strict)
    }
}

/// Set of tokens meaning "no value present"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingValues {
    tokens: Vec<String>,
}

impl Default for MissingValues {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_VALUES.iter().copied())
    }
}

impl MissingValues {
    pub fn new<S: Into<String>>(tokens: impl IntoIterator<Item = S>) -> Self {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// No missing tokens at all
    pub fn none() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if !self.tokens.contains(&token) {
            self.tokens.push(token);
        }
        self
    }

    /// Exact match after trimming surrounding whitespace
    pub fn contains(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        self.tokens.iter().any(|token| token == trimmed)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Result of checking one raw value
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Accepted, possibly as `Null` for a missing token
    Valid(Value),

    /// Malformed, replaced by `Null` (lax mode only)
    Degraded(&'static str),

    /// Malformed and fatal
    Rejected(&'static str),
}

/// Value handler resolved once per schema column
pub type FieldCheck = fn(&str, &MissingValues) -> Verdict;

/// Choose the handler for a column type under a validation mode
pub fn handler_for(field_type: FieldType, mode: ValidationMode) -> FieldCheck {
    match (mode, field_type) {
        (_, FieldType::Time) => check_time,
        (ValidationMode::Strict, FieldType::Text | FieldType::Category) => strict::text,
        (ValidationMode::Strict, FieldType::Float) => strict::float,
        (ValidationMode::Strict, FieldType::Integer) => strict::integer,
        (ValidationMode::Strict, FieldType::Boolean) => strict::boolean,
        (ValidationMode::Lax, FieldType::Text | FieldType::Category) => lax::text,
        (ValidationMode::Lax, FieldType::Float) => lax::float,
        (ValidationMode::Lax, FieldType::Integer) => lax::integer,
        (ValidationMode::Lax, FieldType::Boolean) => lax::boolean,
    }
}

const EMPTY_TEXT: &str = "empty value";
const NOT_A_FLOAT: &str = "expected a finite decimal number";
const NOT_AN_INTEGER: &str = "expected a decimal integer";
const NOT_A_BOOLEAN: &str = "expected TRUE or FALSE";
const NOT_A_TIMESTAMP: &str = "expected a fully specified ISO-8601 timestamp";

mod strict {
    use super::*;

    pub(super) fn text(raw: &str, missing: &MissingValues) -> Verdict {
        if missing.contains(raw) {
            Verdict::Valid(Value::Null)
        } else if raw.is_empty() {
            Verdict::Rejected(EMPTY_TEXT)
        } else {
            Verdict::Valid(Value::Text(raw.to_string()))
        }
    }

    pub(super) fn float(raw: &str, missing: &MissingValues) -> Verdict {
        if missing.contains(raw) {
            return Verdict::Valid(Value::Null);
        }
        match parse_float(raw) {
            Some(n) => Verdict::Valid(Value::Number(n)),
            None => Verdict::Rejected(NOT_A_FLOAT),
        }
    }

    pub(super) fn integer(raw: &str, missing: &MissingValues) -> Verdict {
        if missing.contains(raw) {
            return Verdict::Valid(Value::Null);
        }
        match parse_integer(raw) {
            Some(i) => Verdict::Valid(Value::Integer(i)),
            None => Verdict::Rejected(NOT_AN_INTEGER),
        }
    }

    pub(super) fn boolean(raw: &str, missing: &MissingValues) -> Verdict {
        if missing.contains(raw) {
            return Verdict::Valid(Value::Null);
        }
        match parse_boolean(raw) {
            Some(b) => Verdict::Valid(Value::Boolean(b)),
            None => Verdict::Rejected(NOT_A_BOOLEAN),
        }
    }
}

mod lax {
    use super::*;

    pub(super) fn text(raw: &str, missing: &MissingValues) -> Verdict {
        if missing.contains(raw) {
            Verdict::Valid(Value::Null)
        } else if raw.is_empty() {
            Verdict::Degraded(EMPTY_TEXT)
        } else {
            Verdict::Valid(Value::Text(raw.to_string()))
        }
    }

    pub(super) fn float(raw: &str, missing: &MissingValues) -> Verdict {
        if missing.contains(raw) {
            return Verdict::Valid(Value::Null);
        }
        parse_float(raw)
            .map(|n| Verdict::Valid(Value::Number(n)))
            .unwrap_or(Verdict::Degraded(NOT_A_FLOAT))
    }

    pub(super) fn integer(raw: &str, missing: &MissingValues) -> Verdict {
        if missing.contains(raw) {
            return Verdict::Valid(Value::Null);
        }
        parse_integer(raw)
            .map(|i| Verdict::Valid(Value::Integer(i)))
            .unwrap_or(Verdict::Degraded(NOT_AN_INTEGER))
    }

    pub(super) fn boolean(raw: &str, missing: &MissingValues) -> Verdict {
        if missing.contains(raw) {
            return Verdict::Valid(Value::Null);
        }
        parse_boolean(raw)
            .map(|b| Verdict::Valid(Value::Boolean(b)))
            .unwrap_or(Verdict::Degraded(NOT_A_BOOLEAN))
    }
}

/// Time values are required in both modes; a missing token is rejected too
fn check_time(raw: &str, _missing: &MissingValues) -> Verdict {
    match parse_timestamp(raw) {
        Some(t) => Verdict::Valid(Value::Time(t)),
        None => Verdict::Rejected(NOT_A_TIMESTAMP),
    }
}

/// Parse a finite decimal literal such as `6.0`, `-1e3` or `.5`
pub fn parse_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    // f64::from_str also accepts "inf" and "NaN" spellings
    if trimmed.is_empty()
        || trimmed
            .chars()
            .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a decimal integer literal with optional sign
pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Parse `TRUE`/`FALSE` in any letter case
pub fn parse_boolean(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("TRUE") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("FALSE") {
        Some(false)
    } else {
        None
    }
}

/// Parse a fully specified ISO-8601 date-time and normalize to UTC
///
/// Offsets (`Z`, `+02:00`) are honoured; a date-time without an offset is
/// taken as UTC. Date-only or minute-precision values are rejected.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}
