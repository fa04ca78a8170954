//! Test utilities for document validation

use super::{ColumnCountPolicy, DocumentValidator, HeaderSource, MissingValues, RecordShaper};
use crate::app::models::{FieldType, RawRecord, Record};
use crate::app::services::schema::Schema;


/// Schema from `(name, type)` pairs
pub fn schema_of(fields: &[(&str, FieldType)]) -> Schema {
    Schema::from_fields(fields.iter().map(|(name, ty)| (name.to_string(), *ty)))
}

/// Raw record at `line_index` from `(name, value)` pairs
pub fn raw_record(line_index: usize, pairs: &[(&str, &str)]) -> RawRecord {
    RawRecord {
        line_index,
        record_index: line_index,
        document: pairs.iter().copied().collect(),
    }
}

/// Tokenized record from literal fields
pub fn record(line_index: usize, record_index: usize, fields: &[&str]) -> Record {
    Record {
        text: fields.join(","),
        line_index,
        fields: fields.iter().map(|f| f.to_string()).collect(),
        record_index,
    }
}

/// Schema used by most validator tests
pub fn cruise_schema() -> Schema {
    schema_of(&[
        ("cruise", FieldType::Category),
        ("speed", FieldType::Float),
        ("distance", FieldType::Integer),
        ("notes", FieldType::Text),
        ("flag", FieldType::Boolean),
        ("time", FieldType::Time),
    ])
}

pub fn lax_validator(schema: &Schema) -> DocumentValidator {
    DocumentValidator::new(schema, super::ValidationMode::Lax, MissingValues::default())
}

pub fn first_record_shaper() -> RecordShaper {
    RecordShaper::new(HeaderSource::First, ColumnCountPolicy::Reject)
}
