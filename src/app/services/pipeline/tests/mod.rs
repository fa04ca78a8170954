//! Test utilities for the pipeline

use std::io::{self, Cursor, Read};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{Pipeline, PipelineStats};
use crate::app::models::Point;
use crate::app::services::schema::RawSchema;
use crate::app::services::sink::{LineProtocolSink, PointSink, SinkStats};
use crate::config::PipelineConfig;


pub fn survey_schema() -> RawSchema {
    [
        ("group", "category"),
        ("cruise", "category"),
        ("speed", "float"),
        ("distance", "integer"),
        ("notes", "text"),
        ("flag", "boolean"),
        ("time", "time"),
    ]
    .into_iter()
    .collect()
}

pub fn survey_config() -> PipelineConfig {
    PipelineConfig::new("measurement", survey_schema())
}

/// Run over in-memory input, returning the result and whatever reached the sink
pub async fn run_to_string(
    config: PipelineConfig,
    input: &str,
) -> (crate::Result<PipelineStats>, String) {
    let pipeline = Pipeline::new(config).unwrap();
    let mut sink = LineProtocolSink::new(Vec::new());
    let cancel = CancellationToken::new();

    let result = pipeline
        .run(Cursor::new(input.to_string()), &mut sink, &cancel)
        .await;
    let output = String::from_utf8(sink.into_inner()).unwrap();
    (result, output)
}

/// Reader fed in chunks from another task; gives up after a few seconds
/// without input instead of blocking forever
pub struct ChunkReader {
    chunks: Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl ChunkReader {
    pub fn new(chunks: Receiver<Vec<u8>>) -> Self {
        Self {
            chunks,
            pending: Vec::new(),
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.chunks.recv_timeout(Duration::from_secs(5)) {
                Ok(chunk) => self.pending = chunk,
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(io::Error::new(io::ErrorKind::TimedOut, "no input arrived"));
                }
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

/// Sink that refuses every batch
#[derive(Default)]
pub struct FailingSink {
    pub attempts: usize,
}

impl PointSink for FailingSink {
    async fn write_batch(&mut self, _batch: &[Point]) -> crate::Result<()> {
        self.attempts += 1;
        Err(crate::Error::sink("disk full", None))
    }

    async fn finish(&mut self) -> crate::Result<SinkStats> {
        Ok(SinkStats::default())
    }
}
