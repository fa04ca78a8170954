//! Field splitting for tokenized lines
//!
//! Single-byte delimiters are split with the `csv` crate so quoting follows a
//! standard CSV reader. Longer delimiters use a small quote-aware splitter
//! with the same double-quote rules. The `whitespace` delimiter splits on runs
//! of whitespace and does not support quoting.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};

use super::line_tokenizer::{LineOptions, LineTokenizer};
use crate::app::models::{Line, Record};
use crate::constants::{DEFAULT_DELIMITER, WHITESPACE_DELIMITER};
use crate::{Error, Result};

/// How a line is split into fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Delimiter {
    /// Split on a literal string with basic quoting
    Literal(String),

    /// Trim, then split on runs of whitespace
    Whitespace,
}

impl Delimiter {
    pub fn comma() -> Self {
        Delimiter::Literal(DEFAULT_DELIMITER.to_string())
    }

    pub fn tab() -> Self {
        Delimiter::Literal("\t".to_string())
    }
}

impl FromStr for Delimiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            WHITESPACE_DELIMITER => Ok(Delimiter::Whitespace),
            "\\t" | "tab" => Ok(Delimiter::tab()),
            "" => Err(Error::configuration("Delimiter cannot be empty")),
            literal => Ok(Delimiter::Literal(literal.to_string())),
        }
    }
}

impl TryFrom<String> for Delimiter {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Delimiter> for String {
    fn from(delimiter: Delimiter) -> Self {
        match delimiter {
            Delimiter::Literal(literal) => literal,
            Delimiter::Whitespace => WHITESPACE_DELIMITER.to_string(),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Literal(literal) => write!(f, "{:?}", literal),
            Delimiter::Whitespace => f.write_str(WHITESPACE_DELIMITER),
        }
    }
}

/// Splitting strategy resolved once from a [`Delimiter`]
#[derive(Debug)]
enum FieldSplitter {
    Csv(ReaderBuilder),
    Quoted(String),
    Whitespace,
}

impl FieldSplitter {
    fn new(delimiter: &Delimiter) -> Self {
        match delimiter {
            Delimiter::Whitespace => FieldSplitter::Whitespace,
            Delimiter::Literal(literal) if literal.len() == 1 => {
                let mut builder = ReaderBuilder::new();
                builder
                    .has_headers(false)
                    .flexible(true)
                    .delimiter(literal.as_bytes()[0]);
                FieldSplitter::Csv(builder)
            }
            Delimiter::Literal(literal) => FieldSplitter::Quoted(literal.clone()),
        }
    }

    fn split(&self, line: &Line) -> Result<Vec<String>> {
        if line.text.is_empty() {
            return Ok(Vec::new());
        }

        match self {
            FieldSplitter::Csv(builder) => {
                let mut reader = builder.from_reader(line.text.as_bytes());
                let mut record = StringRecord::new();
                match reader.read_record(&mut record) {
                    Ok(true) => Ok(record.iter().map(|field| field.to_string()).collect()),
                    Ok(false) => Ok(Vec::new()),
                    Err(e) => Err(Error::csv_parsing(
                        line.line_index,
                        "Failed to split delimited fields",
                        Some(e),
                    )),
                }
            }
            FieldSplitter::Quoted(delimiter) => Ok(split_quoted(&line.text, delimiter)),
            FieldSplitter::Whitespace => Ok(line
                .text
                .split_whitespace()
                .map(|field| field.to_string())
                .collect()),
        }
    }
}

/// Split on a multi-character delimiter, honouring double-quoted fields
///
/// A quote opens a quoted section only at the start of a field; inside a
/// quoted section `""` is a literal quote.
pub fn split_quoted(text: &str, delimiter: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if in_quotes {
            if c == '"' {
                if rest[1..].starts_with('"') {
                    current.push('"');
                    rest = &rest[2..];
                } else {
                    in_quotes = false;
                    rest = &rest[1..];
                }
            } else {
                current.push(c);
                rest = &rest[c.len_utf8()..];
            }
        } else if !delimiter.is_empty() && rest.starts_with(delimiter) {
            fields.push(std::mem::take(&mut current));
            rest = &rest[delimiter.len()..];
        } else if c == '"' && current.is_empty() {
            in_quotes = true;
            rest = &rest[1..];
        } else {
            current.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    fields.push(current);
    fields
}

/// Lazy iterator over the field records of a reader
pub struct FieldTokenizer<R> {
    lines: LineTokenizer<R>,
    splitter: FieldSplitter,
    next_record_index: usize,
    failed: bool,
}

impl<R: BufRead> FieldTokenizer<R> {
    pub fn new(reader: R, options: LineOptions, delimiter: &Delimiter) -> Self {
        Self {
            lines: LineTokenizer::new(reader, options),
            splitter: FieldSplitter::new(delimiter),
            next_record_index: 0,
            failed: false,
        }
    }

    /// Number of physical lines consumed from the reader so far
    pub fn lines_read(&self) -> usize {
        self.lines.lines_read()
    }

    /// Number of blank lines discarded by the blank-line policy so far
    pub fn blank_lines_dropped(&self) -> usize {
        self.lines.blank_lines_dropped()
    }
}

impl<R: BufRead> Iterator for FieldTokenizer<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = self.lines.next()?.and_then(|line| {
            let fields = self.splitter.split(&line)?;
            Ok(Record {
                text: line.text,
                line_index: line.line_index,
                fields,
                record_index: self.next_record_index,
            })
        });

        match result {
            Ok(record) => {
                self.next_record_index += 1;
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
