//! Text tokenization for delimited instrument logs
//!
//! This module turns a raw character stream into records ready for schema
//! validation. Both stages are lazy iterators that pull one physical line at a
//! time from the underlying reader.
//!
//! ## Architecture
//!
//! - [`line_tokenizer`] - line-ending normalization, blank-line policy and the
//!   line-index window
//! - [`field_tokenizer`] - per-line field splitting by literal delimiter or
//!   whitespace runs, with emitted-record numbering
//!
//! ## Usage
//!
//! ```rust
//! use std::io::Cursor;
//! use tsdata::app::services::text_tokenizer::{Delimiter, FieldTokenizer, LineOptions};
//!
//! # fn example() -> tsdata::Result<()> {
//! let input = Cursor::new("a,b\n\n1,2\n");
//! let tokenizer = FieldTokenizer::new(input, LineOptions::default(), &Delimiter::comma());
//!
//! for record in tokenizer {
//!     let record = record?;
//!     println!("{} -> {:?}", record.record_index, record.fields);
//! }
//! # Ok(())
//! # }
//! ```

pub mod field_tokenizer;
pub mod line_tokenizer;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use field_tokenizer::{Delimiter, FieldTokenizer};
pub use line_tokenizer::{LineOptions, LineTokenizer};
