//! Typed document construction

use tracing::{debug, trace};

use super::field_validators::{FieldCheck, MissingValues, ValidationMode, Verdict, handler_for};
use super::stats::ValidationStats;
use crate::app::models::{FieldType, RawRecord, TypedDocument, ValidatedRecord, Value};
use crate::app::services::schema::Schema;
use crate::{Error, Result};

/// One schema column with its resolved handler
#[derive(Debug, Clone)]
struct ColumnCheck {
    name: String,
    field_type: FieldType,
    check: FieldCheck,
}

/// Validates raw records against a schema
///
/// Handlers are resolved once per column at construction. Only schema columns
/// are carried into the typed document, in schema order; a schema column the
/// record does not have is omitted rather than nulled.
#[derive(Debug)]
pub struct DocumentValidator {
    columns: Vec<ColumnCheck>,
    mode: ValidationMode,
    missing: MissingValues,
    stats: ValidationStats,
}

impl DocumentValidator {
    pub fn new(schema: &Schema, mode: ValidationMode, missing: MissingValues) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|field| ColumnCheck {
                name: field.name.clone(),
                field_type: field.field_type,
                check: handler_for(field.field_type, mode),
            })
            .collect();

        Self {
            columns,
            mode,
            missing,
            stats: ValidationStats::default(),
        }
    }

    /// Strict validator with the default missing tokens
    pub fn strict(schema: &Schema) -> Self {
        Self::new(schema, ValidationMode::Strict, MissingValues::default())
    }

    /// Lax validator with the default missing tokens
    pub fn lax(schema: &Schema) -> Self {
        Self::new(schema, ValidationMode::Lax, MissingValues::default())
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    /// Validate one record into a typed document
    pub fn validate(&mut self, record: RawRecord) -> Result<ValidatedRecord> {
        let mut document = TypedDocument::new();
        let mut degraded = 0;

        for column in &self.columns {
            let Some(raw) = record.document.get(&column.name) else {
                continue;
            };

            let value = match (column.check)(raw, &self.missing) {
                Verdict::Valid(value) => value,
                Verdict::Degraded(reason) => {
                    debug!(
                        "Line {}: '{}' value {:?} set to null ({})",
                        record.line_index + 1,
                        column.name,
                        raw,
                        reason
                    );
                    degraded += 1;
                    Value::Null
                }
                Verdict::Rejected(reason) => {
                    return Err(Error::value_validation(
                        record.line_index,
                        &column.name,
                        raw,
                        column.field_type,
                        reason,
                    ));
                }
            };

            if self.missing.contains(raw) && value.is_null() {
                self.stats.missing_values += 1;
            }
            document.insert(column.name.clone(), value);
        }

        self.stats.records_validated += 1;
        if degraded > 0 {
            self.stats.records_degraded += 1;
            self.stats.values_degraded += degraded;
        }
        trace!(
            "Validated record {} with {} columns",
            record.record_index,
            document.len()
        );

        Ok(ValidatedRecord {
            line_index: record.line_index,
            record_index: record.record_index,
            document,
            original: record.document,
        })
    }

    /// Adapt a raw record stream into a validated record stream
    pub fn validate_all<I>(&mut self, records: I) -> Documents<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
    {
        Documents {
            records: records.into_iter(),
            validator: self,
            failed: false,
        }
    }
}

/// Iterator adapter produced by [`DocumentValidator::validate_all`]
pub struct Documents<'a, I> {
    records: I,
    validator: &'a mut DocumentValidator,
    failed: bool,
}

impl<I> Iterator for Documents<'_, I>
where
    I: Iterator<Item = Result<RawRecord>>,
{
    type Item = Result<ValidatedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = self
            .records
            .next()?
            .and_then(|record| self.validator.validate(record));
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}
