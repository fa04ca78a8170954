//! End-to-end conversion pipeline
//!
//! Chains the stages as explicit pull iterators:
//!
//! ```text
//! FieldTokenizer -> RecordShaper -> DocumentValidator -> LineProtocolEncoder -> BatchBuffer -> PointSink
//! ```
//!
//! The iterator chain up to the batch buffer runs on tokio's blocking pool;
//! finished batches cross a bounded queue to the async sink. Each run builds
//! fresh stage state, so one [`Pipeline`] can convert many inputs
//! concurrently. The first unrecovered error ends the run; the batch
//! being assembled at that point is discarded, while batches already handed
//! to the sink stay written.

pub mod processor;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use processor::Pipeline;
pub use stats::PipelineStats;
