//! Batched point sinks
//!
//! Encoded points are grouped by [`BatchBuffer`] and each full batch is
//! handed to a [`PointSink`]. Batches are stably sorted by timestamp before
//! handoff. A sink owns persistence and any post-write aggregation.
//!
//! - [`batch`] - bounded batch buffer
//! - [`file_sink`] - line protocol text output over any async writer
//! - [`database`] - time-series database handoff through a caller-supplied client

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::app::models::Point;

pub mod batch;
pub mod database;
pub mod file_sink;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use batch::BatchBuffer;
pub use database::{DatabaseSink, Downsample, TimeSeriesClient};
pub use file_sink::{LineProtocolFileSink, LineProtocolSink};

/// Destination for batches of encoded points
pub trait PointSink: Send {
    /// Persist one batch, sorted ascending by timestamp
    fn write_batch(&mut self, batch: &[Point]) -> impl Future<Output = Result<()>> + Send;

    /// Flush outstanding output and report totals
    fn finish(&mut self) -> impl Future<Output = Result<SinkStats>> + Send;
}

/// Counters kept by every sink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkStats {
    pub points_written: usize,
    pub batches_written: usize,

    /// Bytes of line protocol produced; zero for sinks that do not render text
    pub bytes_written: usize,

    /// Aggregation queries run after batch writes
    pub queries_run: usize,
}

impl SinkStats {
    /// Average points per batch
    pub fn avg_points_per_batch(&self) -> f64 {
        if self.batches_written == 0 {
            0.0
        } else {
            self.points_written as f64 / self.batches_written as f64
        }
    }

    /// Format bytes in human-readable format
    pub fn format_bytes(bytes: usize) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

        let mut size = bytes as f64;
        let mut unit_index = 0;
        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
