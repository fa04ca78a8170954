//! Typed document to point encoding with timestamp order enforcement

use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use tracing::trace;

use crate::app::models::{FieldType, FieldValue, Point, TypedDocument, ValidatedRecord, Value};
use crate::app::services::schema::Schema;
use crate::constants::{MEASUREMENT_PATTERN, MISSING_DATA_FIELD, NANOS_PER_MILLI};
use crate::{Error, Result};

static MEASUREMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MEASUREMENT_PATTERN).expect("Invalid measurement regex"));

/// Check a measurement name against `^[A-Za-z0-9_-]+$`
pub fn validate_measurement(name: &str) -> Result<()> {
    if MEASUREMENT_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(Error::invalid_measurement(name))
    }
}

/// Where a schema column lands in the encoded point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Tag,
    Timestamp,
    Field,
}

#[derive(Debug, Clone)]
struct EncodedColumn {
    name: String,
    role: Role,
}

/// Encodes typed documents into points for one measurement
///
/// Each encoder owns its own previous-timestamp cursor, so independent
/// streams never share ordering state.
#[derive(Debug)]
pub struct LineProtocolEncoder {
    measurement: String,
    columns: Vec<EncodedColumn>,
    check_order: bool,
    previous_ns: Option<i64>,
    points_encoded: usize,
}

impl LineProtocolEncoder {
    /// Create an encoder, rejecting invalid measurement names up front
    pub fn new(measurement: impl Into<String>, schema: &Schema) -> Result<Self> {
        let measurement = measurement.into();
        validate_measurement(&measurement)?;

        let mut timestamp_taken = false;
        let columns = schema
            .fields()
            .iter()
            .map(|field| {
                let role = match field.field_type {
                    FieldType::Category => Role::Tag,
                    FieldType::Time if !timestamp_taken => {
                        timestamp_taken = true;
                        Role::Timestamp
                    }
                    _ => Role::Field,
                };
                EncodedColumn {
                    name: field.name.clone(),
                    role,
                }
            })
            .collect();

        Ok(Self {
            measurement,
            columns,
            check_order: true,
            previous_ns: None,
            points_encoded: 0,
        })
    }

    /// Enable or disable the ascending-timestamp check (on by default)
    pub fn with_order_check(mut self, check_order: bool) -> Self {
        self.check_order = check_order;
        self
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn points_encoded(&self) -> usize {
        self.points_encoded
    }

    /// Encode a validated record, carrying its line index into errors
    pub fn encode(&mut self, record: &ValidatedRecord) -> Result<Point> {
        self.encode_document(&record.document, Some(record.line_index))
    }

    /// Encode a bare typed document
    pub fn encode_document(
        &mut self,
        document: &TypedDocument,
        line_index: Option<usize>,
    ) -> Result<Point> {
        let mut timestamp = None;
        let mut tags = Vec::new();
        let mut fields = Vec::new();

        for column in &self.columns {
            let Some(value) = document.get(&column.name) else {
                continue;
            };
            if value.is_absent() {
                continue;
            }

            match column.role {
                Role::Timestamp => timestamp = value.as_time(),
                Role::Tag => tags.push((column.name.clone(), value.to_string())),
                Role::Field => {
                    if let Some(field) = field_value(value) {
                        fields.push((column.name.clone(), field));
                    }
                }
            }
        }

        let timestamp = timestamp.ok_or_else(|| Error::missing_timestamp(line_index))?;
        let timestamp_ns = to_nanos(timestamp, line_index)?;

        if let Some(previous) = self.previous_ns {
            if self.check_order && timestamp_ns < previous {
                return Err(Error::out_of_order(line_index, previous, timestamp_ns));
            }
        }
        self.previous_ns = Some(timestamp_ns);

        if fields.is_empty() {
            fields.push((MISSING_DATA_FIELD.to_string(), FieldValue::Boolean(true)));
        }

        self.points_encoded += 1;
        trace!(
            "Encoded point at {} ns with {} tags and {} fields",
            timestamp_ns,
            tags.len(),
            fields.len()
        );

        Ok(Point {
            measurement: self.measurement.clone(),
            timestamp_ns,
            tags,
            fields,
            line_index,
        })
    }

    /// Adapt a validated record stream into a point stream
    pub fn encode_all<I>(&mut self, records: I) -> Points<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Result<ValidatedRecord>>,
    {
        Points {
            records: records.into_iter(),
            encoder: self,
            failed: false,
        }
    }
}

fn field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::Text(s) => Some(FieldValue::Text(s.clone())),
        Value::Number(n) => Some(FieldValue::Float(*n)),
        Value::Integer(i) => Some(FieldValue::Integer(*i)),
        Value::Boolean(b) => Some(FieldValue::Boolean(*b)),
        Value::Time(t) => Some(FieldValue::Text(
            t.to_rfc3339_opts(SecondsFormat::Millis, true),
        )),
    }
}

/// Millisecond precision, scaled to nanoseconds
fn to_nanos(timestamp: DateTime<Utc>, line_index: Option<usize>) -> Result<i64> {
    timestamp
        .timestamp_millis()
        .checked_mul(NANOS_PER_MILLI)
        .ok_or_else(|| Error::timestamp_range(line_index, timestamp.to_rfc3339()))
}

/// Iterator adapter produced by [`LineProtocolEncoder::encode_all`]
pub struct Points<'a, I> {
    records: I,
    encoder: &'a mut LineProtocolEncoder,
    failed: bool,
}

impl<I> Iterator for Points<'_, I>
where
    I: Iterator<Item = Result<ValidatedRecord>>,
{
    type Item = Result<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = self
            .records
            .next()?
            .and_then(|record| self.encoder.encode(&record));
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}
