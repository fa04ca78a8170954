//! Per-run pipeline statistics

use serde::{Deserialize, Serialize};

use crate::app::services::document_validator::ValidationStats;
use crate::app::services::sink::SinkStats;

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Physical lines consumed from the input
    pub lines_read: usize,

    /// Blank lines discarded by the blank-line policy
    pub blank_lines_dropped: usize,

    /// Records skipped for a field count that did not match the header
    pub records_dropped: usize,

    pub validation: ValidationStats,

    pub points_encoded: usize,

    pub sink: SinkStats,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of data records that reached the sink, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.sink.points_written + self.records_dropped;
        if attempted == 0 {
            100.0
        } else {
            (self.sink.points_written as f64 / attempted as f64) * 100.0
        }
    }

    pub fn has_degradations(&self) -> bool {
        self.validation.values_degraded > 0 || self.records_dropped > 0
    }

    /// Fold another run's counters into this one
    pub fn merge(&mut self, other: &PipelineStats) {
        self.lines_read += other.lines_read;
        self.blank_lines_dropped += other.blank_lines_dropped;
        self.records_dropped += other.records_dropped;
        self.validation.merge(&other.validation);
        self.points_encoded += other.points_encoded;
        self.sink.points_written += other.sink.points_written;
        self.sink.batches_written += other.sink.batches_written;
        self.sink.bytes_written += other.sink.bytes_written;
        self.sink.queries_run += other.sink.queries_run;
    }

    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} lines, {} points in {} batches, {} dropped, {} degraded values, {}",
            self.lines_read,
            self.sink.points_written,
            self.sink.batches_written,
            self.records_dropped,
            self.validation.values_degraded,
            SinkStats::format_bytes(self.sink.bytes_written)
        )
    }
}
