//! Header resolution and record shaping
//!
//! Pairs each tokenized record with the header names and enforces the
//! column-count policy before any value is validated.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::app::models::{RawDocument, RawRecord, Record};
use crate::{Error, Result};

/// Where field names come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderSource {
    /// The first non-empty record of the stream is the header
    #[default]
    First,

    /// Names supplied up front; every record is data
    Names(Vec<String>),
}

/// What to do with a record whose field count differs from the header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCountPolicy {
    /// Fail the stream
    #[default]
    Reject,

    /// Skip the record and count it
    Drop,
}

/// Turns tokenized records into name-keyed raw records
#[derive(Debug)]
pub struct RecordShaper {
    names: Option<Vec<String>>,
    policy: ColumnCountPolicy,
    records_dropped: usize,
    empty_records: usize,
}

impl RecordShaper {
    pub fn new(source: HeaderSource, policy: ColumnCountPolicy) -> Self {
        let names = match source {
            HeaderSource::First => None,
            HeaderSource::Names(names) => Some(names),
        };
        Self {
            names,
            policy,
            records_dropped: 0,
            empty_records: 0,
        }
    }

    /// Header names, once known
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// Records skipped under [`ColumnCountPolicy::Drop`]
    pub fn records_dropped(&self) -> usize {
        self.records_dropped
    }

    /// Retained blank records, which carry no fields and are skipped
    pub fn empty_records(&self) -> usize {
        self.empty_records
    }

    /// Shape one record
    ///
    /// Returns `Ok(None)` when the record was consumed as the header, was
    /// empty, or was dropped for its shape.
    pub fn shape(&mut self, record: Record) -> Result<Option<RawRecord>> {
        if record.fields.is_empty() {
            self.empty_records += 1;
            return Ok(None);
        }

        let Some(names) = &self.names else {
            debug!(
                "Header at line {}: {} columns",
                record.line_index + 1,
                record.fields.len()
            );
            self.names = Some(record.fields);
            return Ok(None);
        };

        if record.fields.len() != names.len() {
            return match self.policy {
                ColumnCountPolicy::Reject => Err(Error::column_count(
                    record.line_index,
                    names.len(),
                    record.fields.len(),
                )),
                ColumnCountPolicy::Drop => {
                    warn!(
                        "Dropping line {}: expected {} fields, found {}",
                        record.line_index + 1,
                        names.len(),
                        record.fields.len()
                    );
                    self.records_dropped += 1;
                    Ok(None)
                }
            };
        }

        Ok(Some(RawRecord {
            line_index: record.line_index,
            record_index: record.record_index,
            document: RawDocument::from_fields(names, &record.fields),
        }))
    }

    /// Adapt a record stream into a raw record stream
    pub fn shape_all<I>(&mut self, records: I) -> RawRecords<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        RawRecords {
            records: records.into_iter(),
            shaper: self,
            failed: false,
        }
    }
}

/// Iterator adapter produced by [`RecordShaper::shape_all`]
pub struct RawRecords<'a, I> {
    records: I,
    shaper: &'a mut RecordShaper,
    failed: bool,
}

impl<I> Iterator for RawRecords<'_, I>
where
    I: Iterator<Item = Result<Record>>,
{
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let shaped = self
                .records
                .next()?
                .and_then(|record| self.shaper.shape(record));

            match shaped {
                Ok(Some(raw)) => return Some(Ok(raw)),
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
