//! Line protocol text rendering

use std::fmt;

use crate::app::models::{FieldValue, Point};
use crate::constants::MISSING_DATA_FIELD;

impl FieldValue {
    /// Render this value for line protocol
    ///
    /// - Float: shortest round-trip form, always with a decimal point or
    ///   exponent (`6.0`, `1e-7`)
    /// - Integer: suffixed with `i` (`10i`)
    /// - Text: quote-wrapped with embedded quotes doubled (see [`quote_text`])
    /// - Boolean: `TRUE` or `FALSE`
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{:?}", v),
            FieldValue::Integer(v) => format!("{}i", v),
            FieldValue::Text(v) => quote_text(v),
            FieldValue::Boolean(v) => {
                if *v {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line_protocol())
    }
}

impl Point {
    /// One line protocol record, including the trailing newline
    pub fn to_line(&self) -> String {
        let mut line = self.to_string();
        line.push('\n');
        line
    }
}

/// Renders without the trailing newline
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape_key(&self.measurement))?;

        for (key, value) in &self.tags {
            write!(f, ",{}={}", escape_key(key), escape_key(value))?;
        }

        for (i, (key, value)) in self.fields.iter().enumerate() {
            let separator = if i == 0 { ' ' } else { ',' };
            if key == MISSING_DATA_FIELD && *value == FieldValue::Boolean(true) {
                // the sentinel is written lowercase, unlike data booleans
                write!(f, "{}{}=true", separator, key)?;
            } else {
                write!(f, "{}{}={}", separator, escape_key(key), value)?;
            }
        }

        write!(f, " {}", self.timestamp_ns)
    }
}

/// Wrap text in double quotes, doubling embedded quotes
///
/// Text that already starts and ends with a quote is taken as pre-quoted and
/// returned unchanged.
pub fn quote_text(text: &str) -> String {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return text.to_string();
    }
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Backslash-escape commas, equals signs and spaces
///
/// Used for the measurement, tag keys, tag values and field keys.
pub fn escape_key(s: &str) -> String {
    if !s.contains([',', '=', ' ']) {
        return s.to_string();
    }

    let mut escaped = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if matches!(c, ',' | '=' | ' ') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
