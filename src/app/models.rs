//! Core data models for the tsdata pipeline
//!
//! Each stage of the pipeline produces one of these types and hands it
//! downstream without mutating it afterwards:
//!
//! ```text
//! bytes -> Line -> Record -> ValidatedRecord -> Point
//! ```
//!
//! - [`Line`] - a logical line with its physical line index
//! - [`Record`] - a line split into fields, with its emitted-record index
//! - [`TypedDocument`] - schema-typed values keyed by column name
//! - [`Point`] - an encoded line protocol record

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical line of input text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Line text with the terminator removed
    pub text: String,

    /// Zero-based index over every physical line in the stream,
    /// including lines later dropped as blank
    pub line_index: usize,
}

impl Line {
    pub fn new(text: impl Into<String>, line_index: usize) -> Self {
        Self {
            text: text.into(),
            line_index,
        }
    }

    /// A line is blank when nothing remains after terminator removal
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// A line split into ordered string fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub text: String,
    pub line_index: usize,
    pub fields: Vec<String>,

    /// Zero-based index over emitted records only
    pub record_index: usize,
}

/// Semantic column types a schema may assign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Category,
    Float,
    Integer,
    Boolean,
    Time,
}

impl FieldType {
    /// All type variants in canonical order
    pub const ALL: [FieldType; 6] = [
        FieldType::Category,
        FieldType::Text,
        FieldType::Float,
        FieldType::Integer,
        FieldType::Boolean,
        FieldType::Time,
    ];

    /// Resolve a type tag, ignoring case and surrounding whitespace
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field_type| field_type.as_str() == normalized)
    }

    /// Canonical lowercase tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Category => "category",
            FieldType::Float => "float",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Time => "time",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, typed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Explicitly missing
    Null,
    Text(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Time(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null and NaN values are absent from encoded output
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{:?}", n),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// Raw column name -> text mapping for one record, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    entries: Vec<(String, String)>,
}

impl RawDocument {
    /// Pair header names with record fields positionally
    pub fn from_fields(names: &[String], fields: &[String]) -> Self {
        Self {
            entries: names
                .iter()
                .cloned()
                .zip(fields.iter().cloned())
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawDocument {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Column name -> typed value mapping, in schema order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedDocument {
    entries: Vec<(String, Value)>,
}

impl TypedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any earlier value for the same column
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A record paired with header names, before schema validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub line_index: usize,
    pub record_index: usize,
    pub document: RawDocument,
}

/// A record after schema validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub line_index: usize,
    pub record_index: usize,

    /// Typed values for schema columns present in the record
    pub document: TypedDocument,

    /// Pre-validation mapping, kept for diagnostics
    pub original: RawDocument,
}

/// A line protocol field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    Text(String),
    Boolean(bool),
}

/// An encoded time-series record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub measurement: String,

    /// Nanoseconds since the Unix epoch, millisecond precision
    pub timestamp_ns: i64,

    /// Tag pairs in schema order
    pub tags: Vec<(String, String)>,

    /// Field pairs in schema order; never empty
    pub fields: Vec<(String, FieldValue)>,

    /// Source line, when the point came from a tokenized record
    #[serde(skip)]
    pub line_index: Option<usize>,
}

impl Point {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
