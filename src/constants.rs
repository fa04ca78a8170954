//! Application constants for tsdata
//!
//! This module contains configuration defaults, wire-format tokens and
//! limits used throughout the pipeline.

// =============================================================================
// Text Tokenization
// =============================================================================

/// Sentinel delimiter name selecting whitespace-run splitting
pub const WHITESPACE_DELIMITER: &str = "whitespace";

/// Default field delimiter
pub const DEFAULT_DELIMITER: &str = ",";

/// Drop blank lines between two non-blank lines by default
pub const DEFAULT_DROP_INTERNAL_BLANK: bool = true;

/// Drop blank lines at the end of the line window by default
pub const DEFAULT_DROP_FINAL_BLANK: bool = true;

// =============================================================================
// Validation
// =============================================================================

/// Tokens meaning "no value present" in raw input
pub const DEFAULT_MISSING_VALUES: &[&str] = &["NA"];

// =============================================================================
// Line Protocol
// =============================================================================

/// Field inserted when a point would otherwise carry no fields
pub const MISSING_DATA_FIELD: &str = "influxMissingData";

/// Allowed measurement name pattern
pub const MEASUREMENT_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

/// Nanoseconds per millisecond; timestamps keep millisecond precision
pub const NANOS_PER_MILLI: i64 = 1_000_000;

/// File extension for line protocol output
pub const LINE_PROTOCOL_EXTENSION: &str = "lp";

// =============================================================================
// Sink Configuration
// =============================================================================

/// Points per batch handed to a sink
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Upper bound on batch size to keep the batch buffer bounded
pub const MAX_BATCH_SIZE: usize = 1_000_000;

/// Finished batches waiting for the sink before tokenizing pauses
pub const BATCH_QUEUE_DEPTH: usize = 2;

/// Buffered writer capacity for file sinks
pub const FILE_SINK_BUFFER_BYTES: usize = 64 * 1024;

// =============================================================================
// Processing Configuration Defaults
// =============================================================================

/// Default number of input files converted concurrently
pub const DEFAULT_PARALLEL_WORKERS: usize = 4;

/// Maximum number of concurrent file conversions
pub const MAX_PARALLEL_WORKERS: usize = 64;

/// Success rate (percent) above which a conversion is reported as clean
pub const CLEAN_RUN_SUCCESS_RATE: f64 = 99.0;
