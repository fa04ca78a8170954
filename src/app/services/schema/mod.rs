//! Schema handling for typed document validation
//!
//! A schema maps column names to one of six semantic type tags. Raw schemas
//! arrive from configuration files or the command line as plain strings;
//! [`validate_schema`] checks and normalizes them, and [`Schema`] resolves each
//! entry to a [`FieldType`](crate::app::models::FieldType) once, before any
//! data line is read.
//!
//! - [`validation`] - raw schema type and tag validation/normalization
//! - [`typed`] - the resolved, ordered schema used by the validator and encoder

pub mod typed;
pub mod validation;

pub use typed::{Schema, SchemaField};
pub use validation::{RawSchema, SchemaCheck, validate_schema};
