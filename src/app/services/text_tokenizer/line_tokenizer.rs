//! Line tokenization with blank-line policy and line-index window
//!
//! `\r\n`, `\r` and `\n` all terminate a line. Every terminated segment (and a
//! final unterminated one) counts toward `line_index`, whether or not it is
//! later emitted.

use std::collections::VecDeque;
use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::app::models::Line;
use crate::constants::{DEFAULT_DROP_FINAL_BLANK, DEFAULT_DROP_INTERNAL_BLANK};
use crate::{Error, Result};

/// Line window and blank-line retention options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineOptions {
    /// First physical line index to evaluate (inclusive)
    pub start: usize,

    /// Physical line index to stop at (exclusive); unbounded when `None`
    pub end: Option<usize>,

    /// Discard blank lines that sit between two non-blank lines
    pub drop_internal_blank: bool,

    /// Discard blank lines still buffered when the window closes
    pub drop_final_blank: bool,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
            drop_internal_blank: DEFAULT_DROP_INTERNAL_BLANK,
            drop_final_blank: DEFAULT_DROP_FINAL_BLANK,
        }
    }
}

impl LineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict evaluation to the half-open line window `[start, end)`
    pub fn with_window(mut self, start: usize, end: Option<usize>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_drop_internal_blank(mut self, drop: bool) -> Self {
        self.drop_internal_blank = drop;
        self
    }

    pub fn with_drop_final_blank(mut self, drop: bool) -> Self {
        self.drop_final_blank = drop;
        self
    }
}

/// Lazy iterator over the logical lines of a reader
///
/// Blank lines are held back until the next non-blank line decides their
/// fate, so memory is bounded by the longest run of consecutive blanks.
pub struct LineTokenizer<R> {
    reader: R,
    options: LineOptions,
    buf: Vec<u8>,
    /// Physical lines split from the last read, not yet indexed
    segments: VecDeque<String>,
    next_index: usize,
    pending_blanks: Vec<Line>,
    ready: VecDeque<Line>,
    seen_content: bool,
    eof: bool,
    finished: bool,
    blank_lines_dropped: usize,
}

impl<R: BufRead> LineTokenizer<R> {
    pub fn new(reader: R, options: LineOptions) -> Self {
        Self {
            reader,
            options,
            buf: Vec::new(),
            segments: VecDeque::new(),
            next_index: 0,
            pending_blanks: Vec::new(),
            ready: VecDeque::new(),
            seen_content: false,
            eof: false,
            finished: false,
            blank_lines_dropped: 0,
        }
    }

    /// Number of physical lines consumed from the reader so far
    pub fn lines_read(&self) -> usize {
        self.next_index
    }

    /// Number of blank lines discarded by the blank-line policy so far
    pub fn blank_lines_dropped(&self) -> usize {
        self.blank_lines_dropped
    }

    /// Pull the next physical line from the reader
    fn next_physical(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(segment) = self.segments.pop_front() {
                return Ok(Some(segment));
            }
            if self.eof {
                return Ok(None);
            }

            self.buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .map_err(|e| Error::io("Failed to read input", e))?;

            if read == 0 {
                self.eof = true;
                continue;
            }
            self.split_chunk()?;
        }
    }

    /// Split one `read_until` chunk on the remaining `\r` terminators
    fn split_chunk(&mut self) -> Result<()> {
        let mut bytes = self.buf.as_slice();
        let terminated = bytes.last() == Some(&b'\n');
        if terminated {
            bytes = &bytes[..bytes.len() - 1];
            if bytes.last() == Some(&b'\r') {
                bytes = &bytes[..bytes.len() - 1];
            }
        }

        let text = std::str::from_utf8(bytes).map_err(|e| {
            Error::io(
                format!(
                    "Input is not valid UTF-8 near line {}",
                    self.next_index + self.segments.len() + 1
                ),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        let mut pieces: Vec<&str> = text.split('\r').collect();
        if !terminated {
            // read_until stops short of '\n' only at end of stream; an empty
            // tail after a final '\r' is not a line
            self.eof = true;
            if pieces.len() > 1 && pieces.last() == Some(&"") {
                pieces.pop();
            }
        }

        self.segments
            .extend(pieces.into_iter().map(|piece| piece.to_string()));
        Ok(())
    }

    /// Index the next physical line and apply the blank-line policy
    fn advance(&mut self) -> Result<()> {
        if self.options.end.is_some_and(|end| self.next_index >= end) {
            self.close_window();
            return Ok(());
        }

        let Some(text) = self.next_physical()? else {
            self.close_window();
            return Ok(());
        };

        let line_index = self.next_index;
        self.next_index += 1;
        if line_index < self.options.start {
            return Ok(());
        }

        let line = Line::new(text, line_index);
        if line.is_blank() {
            self.pending_blanks.push(line);
            return Ok(());
        }

        if self.seen_content && self.options.drop_internal_blank {
            if !self.pending_blanks.is_empty() {
                trace!(
                    "Dropping {} internal blank lines before line {}",
                    self.pending_blanks.len(),
                    line_index
                );
                self.blank_lines_dropped += self.pending_blanks.len();
                self.pending_blanks.clear();
            }
        } else {
            self.ready.extend(self.pending_blanks.drain(..));
        }

        self.ready.push_back(line);
        self.seen_content = true;
        Ok(())
    }

    fn close_window(&mut self) {
        self.finished = true;
        if self.options.drop_final_blank {
            self.blank_lines_dropped += self.pending_blanks.len();
            self.pending_blanks.clear();
        } else {
            self.ready.extend(self.pending_blanks.drain(..));
        }
    }
}

impl<R: BufRead> Iterator for LineTokenizer<R> {
    type Item = Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.advance() {
                self.finished = true;
                self.pending_blanks.clear();
                return Some(Err(e));
            }
        }
    }
}
