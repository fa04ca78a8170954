//! Line protocol encoding
//!
//! Typed documents become [`Point`](crate::app::models::Point)s and points
//! render as newline-terminated line protocol text:
//!
//! ```text
//! measurement[,tag=value]* field=value[,field=value]* timestamp_ns
//! ```
//!
//! Category columns become tags, the first time column becomes the timestamp
//! and every other column becomes a field. Tags and fields keep schema order.

pub mod encoder;
pub mod format;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use encoder::{LineProtocolEncoder, Points, validate_measurement};
pub use format::{escape_key, quote_text};
