//! Resolved schema used by the document validator and encoder

use crate::app::models::FieldType;
use crate::{Error, Result};

use super::validation::{RawSchema, validate_schema};

/// One schema column with its resolved type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
}

/// Ordered, validated schema
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<SchemaField>,
}

impl Schema {
    /// Validate a raw schema and resolve each type tag
    ///
    /// Fails with the offending column and verbatim tag on the first
    /// unrecognized type.
    pub fn from_raw(raw: &RawSchema) -> Result<Self> {
        if let Some((column, tag)) = raw.first_invalid() {
            return Err(Error::invalid_schema_type(column, tag));
        }

        let check = validate_schema(raw);
        let mut fields = Vec::with_capacity(check.schema.len());
        for (name, tag) in check.schema.iter() {
            let field_type = FieldType::from_tag(tag)
                .ok_or_else(|| Error::invalid_schema_type(name, tag))?;
            fields.push(SchemaField {
                name: name.to_string(),
                field_type,
            });
        }

        Ok(Self { fields })
    }

    /// Build from already-typed columns
    pub fn from_fields<S: Into<String>>(fields: impl IntoIterator<Item = (S, FieldType)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, field_type)| SchemaField {
                    name: name.into(),
                    field_type,
                })
                .collect(),
        }
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.field_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field_type(name).is_some()
    }

    /// Columns typed `time`, in schema order
    pub fn time_columns(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| field.field_type == FieldType::Time)
            .map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Normalized raw form of this schema
    pub fn to_raw(&self) -> RawSchema {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.field_type.as_str()))
            .collect()
    }
}
