//! Schema-driven document validation
//!
//! This module turns tokenized records into typed documents. Records are first
//! shaped against the header (field names paired positionally, column counts
//! checked), then each schema column is validated by a handler chosen once per
//! column when the validator is built.
//!
//! ## Architecture
//!
//! - [`header`] - header source, column-count policy and record shaping
//! - [`field_validators`] - per-type strict and lax value handlers
//! - [`validator`] - the [`DocumentValidator`] stage and its iterator adapter
//! - [`stats`] - validation counters
//!
//! ## Modes
//!
//! | Input                  | Strict        | Lax           |
//! |------------------------|---------------|---------------|
//! | missing token          | `Null`        | `Null`        |
//! | malformed text/number  | error         | `Null`        |
//! | malformed time         | error         | error         |
//!
//! A strict error stops the stream; a lax degradation is counted and the
//! record continues.

pub mod field_validators;
pub mod header;
pub mod stats;
pub mod validator;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use field_validators::{MissingValues, ValidationMode, Verdict};
pub use header::{ColumnCountPolicy, HeaderSource, RawRecords, RecordShaper};
pub use stats::ValidationStats;
pub use validator::{DocumentValidator, Documents};
