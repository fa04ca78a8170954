//! tsdata Library
//!
//! A Rust library for converting delimited instrument logs (CSV/TSV exports,
//! whitespace-separated logs) into validated, typed documents and serializing
//! them as time-series line protocol.
//!
//! This library provides tools for:
//! - Tokenizing text streams into lines with blank-line and line-window policy
//! - Splitting lines into fields by delimiter or whitespace
//! - Validating schemas and typing each record against them (strict or lax)
//! - Encoding typed documents as line protocol with timestamp order checks
//! - Batching encoded points for file or database sinks

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod document_validator;
        pub mod line_protocol;
        pub mod pipeline;
        pub mod schema;
        pub mod sink;
        pub mod text_tokenizer;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{FieldType, Line, Point, Record, TypedDocument, Value};
pub use config::PipelineConfig;

/// Result type alias for tsdata
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for tsdata pipeline operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Delimited field splitting failed
    #[error("CSV parsing error at line {}: {message}", .line_index + 1)]
    CsvParsing {
        line_index: usize,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Unrecognized schema type tag
    #[error("Invalid schema type '{value}' for column '{column}'")]
    InvalidSchemaType { column: String, value: String },

    /// Record field count differs from header field count
    #[error("Column count mismatch at line {}: expected {expected} fields, found {found}", .line_index + 1)]
    ColumnCount {
        line_index: usize,
        expected: usize,
        found: usize,
    },

    /// Value failed strict validation
    #[error(
        "Validation error at line {}, column '{column}': value '{value}' is not a valid {expected} ({reason})",
        .line_index + 1
    )]
    ValueValidation {
        line_index: usize,
        column: String,
        value: String,
        expected: FieldType,
        reason: String,
    },

    /// Document has no timestamp to place it on the time axis
    #[error("Missing timestamp{}", located(.line_index))]
    MissingTimestamp { line_index: Option<usize> },

    /// Timestamp went backwards while order checking is enabled
    #[error(
        "Out-of-order timestamp{}: {current} ns precedes previous {previous} ns",
        located(.line_index)
    )]
    OutOfOrder {
        line_index: Option<usize>,
        previous: i64,
        current: i64,
    },

    /// Timestamp cannot be expressed as nanoseconds since the epoch
    #[error("Timestamp {timestamp} is outside the nanosecond range{}", located(.line_index))]
    TimestampRange {
        line_index: Option<usize>,
        timestamp: String,
    },

    /// Measurement name does not match the allowed pattern
    #[error("Invalid measurement name '{name}': must match ^[A-Za-z0-9_-]+$")]
    InvalidMeasurement { name: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Sink write or query failed
    #[error("Sink error: {message}")]
    Sink {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON (de)serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

fn located(line_index: &Option<usize>) -> String {
    match line_index {
        Some(index) => format!(" at line {}", index + 1),
        None => String::new(),
    }
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error for a specific line
    pub fn csv_parsing(
        line_index: usize,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            line_index,
            message: message.into(),
            source,
        }
    }

    /// Create an invalid schema type error
    pub fn invalid_schema_type(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidSchemaType {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a column count mismatch error
    pub fn column_count(line_index: usize, expected: usize, found: usize) -> Self {
        Self::ColumnCount {
            line_index,
            expected,
            found,
        }
    }

    /// Create a value validation error
    pub fn value_validation(
        line_index: usize,
        column: impl Into<String>,
        value: impl Into<String>,
        expected: FieldType,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValueValidation {
            line_index,
            column: column.into(),
            value: value.into(),
            expected,
            reason: reason.into(),
        }
    }

    /// Create a missing timestamp error
    pub fn missing_timestamp(line_index: Option<usize>) -> Self {
        Self::MissingTimestamp { line_index }
    }

    /// Create an out-of-order timestamp error
    pub fn out_of_order(line_index: Option<usize>, previous: i64, current: i64) -> Self {
        Self::OutOfOrder {
            line_index,
            previous,
            current,
        }
    }

    /// Create a timestamp range error
    pub fn timestamp_range(line_index: Option<usize>, timestamp: impl Into<String>) -> Self {
        Self::TimestampRange {
            line_index,
            timestamp: timestamp.into(),
        }
    }

    /// Create an invalid measurement error
    pub fn invalid_measurement(name: impl Into<String>) -> Self {
        Self::InvalidMeasurement { name: name.into() }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a sink error with an optional underlying cause
    pub fn sink(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Sink {
            message: message.into(),
            source,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error came from the data rather than the environment
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::CsvParsing { .. }
                | Self::ColumnCount { .. }
                | Self::ValueValidation { .. }
                | Self::MissingTimestamp { .. }
                | Self::OutOfOrder { .. }
                | Self::TimestampRange { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}
