//! Test utilities for text tokenization
//!
//! Helpers that drive the tokenizers over in-memory input and collect the
//! results for assertions.

use std::io::{BufReader, Cursor};

use super::{Delimiter, FieldTokenizer, LineOptions, LineTokenizer};
use crate::app::models::{Line, Record};

mod line_tokenizer_tests;

/// Tokenize `input` into lines, panicking on error
pub fn collect_lines(input: &str, options: LineOptions) -> Vec<Line> {
    LineTokenizer::new(Cursor::new(input.to_string()), options)
        .collect::<crate::Result<Vec<_>>>()
        .unwrap()
}

/// Tokenize `input` through a one-byte read buffer to exercise chunk boundaries
pub fn collect_lines_chunked(input: &str, options: LineOptions) -> Vec<Line> {
    let reader = BufReader::with_capacity(1, Cursor::new(input.to_string()));
    LineTokenizer::new(reader, options)
        .collect::<crate::Result<Vec<_>>>()
        .unwrap()
}

/// Tokenize `input` into records, panicking on error
pub fn collect_records(input: &str, options: LineOptions, delimiter: &Delimiter) -> Vec<Record> {
    FieldTokenizer::new(Cursor::new(input.to_string()), options, delimiter)
        .collect::<crate::Result<Vec<_>>>()
        .unwrap()
}

/// Project lines to `(text, line_index)` pairs
pub fn texts(lines: &[Line]) -> Vec<(&str, usize)> {
    lines
        .iter()
        .map(|line| (line.text.as_str(), line.line_index))
        .collect()
}
