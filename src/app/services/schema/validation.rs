//! Raw schema validation and normalization
//!
//! Type tags are accepted case-insensitively and with surrounding whitespace.
//! Validation never modifies its input: on success it returns a new,
//! normalized mapping; on failure it returns the offending tag exactly as the
//! caller wrote it, alongside an unchanged copy of the input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::app::models::FieldType;

/// Ordered column name -> type tag mapping, as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Map<String, JsonValue>",
    into = "Map<String, JsonValue>"
)]
pub struct RawSchema {
    entries: Vec<(String, String)>,
}

impl RawSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a column's type tag, keeping first-insertion order
    pub fn insert(&mut self, column: impl Into<String>, tag: impl Into<String>) {
        let column = column.into();
        let tag = tag.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = tag,
            None => self.entries.push((column, tag)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, tag)| tag.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, tag)| (name.as_str(), tag.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose tag is not a recognized type, as `(column, tag)`
    pub fn first_invalid(&self) -> Option<(&str, &str)> {
        self.iter()
            .find(|(_, tag)| FieldType::from_tag(tag).is_none())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawSchema {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut schema = RawSchema::new();
        for (column, tag) in iter {
            schema.insert(column, tag);
        }
        schema
    }
}

impl TryFrom<Map<String, JsonValue>> for RawSchema {
    type Error = String;

    fn try_from(map: Map<String, JsonValue>) -> std::result::Result<Self, Self::Error> {
        let mut schema = RawSchema::new();
        for (column, tag) in map {
            match tag {
                JsonValue::String(tag) => schema.insert(column, tag),
                other => {
                    return Err(format!(
                        "schema type for column '{}' must be a string, found {}",
                        column, other
                    ));
                }
            }
        }
        Ok(schema)
    }
}

impl From<RawSchema> for Map<String, JsonValue> {
    fn from(schema: RawSchema) -> Self {
        schema
            .entries
            .into_iter()
            .map(|(column, tag)| (column, JsonValue::String(tag)))
            .collect()
    }
}

/// Outcome of [`validate_schema`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCheck {
    /// The first unrecognized tag, verbatim; `None` when every tag is valid
    pub error: Option<String>,

    /// Normalized schema on success, unchanged input on failure
    pub schema: RawSchema,
}

impl SchemaCheck {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Validate every type tag and normalize to trimmed lowercase
pub fn validate_schema(raw: &RawSchema) -> SchemaCheck {
    if let Some((_, tag)) = raw.first_invalid() {
        return SchemaCheck {
            error: Some(tag.to_string()),
            schema: raw.clone(),
        };
    }

    let schema = raw
        .iter()
        .map(|(column, tag)| (column, tag.trim().to_lowercase()))
        .collect();

    SchemaCheck {
        error: None,
        schema,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(pairs: &[(&str, &str)]) -> RawSchema {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_validate_schema_normalizes_case() {
        let raw = schema(&[("prop1", "TeXt"), ("prop2", "text")]);
        let check = validate_schema(&raw);

        assert_eq!(check.error, None);
        assert_eq!(check.schema, schema(&[("prop1", "text"), ("prop2", "text")]));
        // Input untouched
        assert_eq!(raw.get("prop1"), Some("TeXt"));
    }

    #[test]
    fn test_validate_schema_trims_whitespace() {
        let raw = schema(&[("t", "  Time "), ("n", "INTEGER")]);
        let check = validate_schema(&raw);

        assert!(check.is_valid());
        assert_eq!(check.schema.get("t"), Some("time"));
        assert_eq!(check.schema.get("n"), Some("integer"));
    }

    #[test]
    fn test_validate_schema_reports_first_bad_tag_verbatim() {
        let raw = schema(&[("prop1", "text"), ("prop2", "badType"), ("prop3", " Nope ")]);
        let check = validate_schema(&raw);

        assert_eq!(check.error.as_deref(), Some("badType"));
        assert_eq!(check.schema, raw);
    }

    #[test]
    fn test_validate_schema_idempotent() {
        let raw = schema(&[("a", " Category"), ("b", "FLOAT"), ("c", "boolean")]);
        let once = validate_schema(&raw);
        let twice = validate_schema(&once.schema);

        assert_eq!(twice.error, None);
        assert_eq!(twice.schema, once.schema);
    }

    #[test]
    fn test_all_tags_accepted() {
        let raw = schema(&[
            ("a", "category"),
            ("b", "text"),
            ("c", "float"),
            ("d", "integer"),
            ("e", "boolean"),
            ("f", "time"),
        ]);
        assert!(validate_schema(&raw).is_valid());
    }

    #[test]
    fn test_json_preserves_column_order() {
        let raw: RawSchema =
            serde_json::from_str(r#"{"zeta": "float", "alpha": "time", "mid": "Text"}"#).unwrap();
        let columns: Vec<&str> = raw.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&raw).unwrap();
        assert_eq!(json, r#"{"zeta":"float","alpha":"time","mid":"Text"}"#);
    }

    #[test]
    fn test_json_rejects_non_string_tag() {
        let result: Result<RawSchema, _> = serde_json::from_str(r#"{"a": 5}"#);
        assert!(result.is_err());
    }
}
