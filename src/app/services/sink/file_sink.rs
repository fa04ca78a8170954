//! Line protocol text sink

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use super::{PointSink, SinkStats};
use crate::app::models::Point;
use crate::constants::FILE_SINK_BUFFER_BYTES;
use crate::{Error, Result};

/// Writes newline-terminated line protocol to an async writer
///
/// Output is flushed after every batch, so batches written before a failure
/// survive it.
pub struct LineProtocolSink<W> {
    writer: BufWriter<W>,
    path: Option<PathBuf>,
    stats: SinkStats,
}

/// Line protocol sink backed by a file
pub type LineProtocolFileSink = LineProtocolSink<File>;

impl LineProtocolSink<File> {
    /// Create (or truncate) the output file, creating parent directories
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::io(
                    format!("Failed to create output directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = File::create(path)
            .await
            .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;
        info!("Writing line protocol to {}", path.display());

        let mut sink = Self::new(file);
        sink.path = Some(path.to_path_buf());
        Ok(sink)
    }
}

impl<W: AsyncWrite + Unpin + Send> LineProtocolSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(FILE_SINK_BUFFER_BYTES, writer),
            path: None,
            stats: SinkStats::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }

    /// Recover the underlying writer, discarding unflushed output
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "line protocol output".to_string(),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send> PointSink for LineProtocolSink<W> {
    async fn write_batch(&mut self, batch: &[Point]) -> Result<()> {
        let mut bytes = 0;
        for point in batch {
            let line = point.to_line();
            self.writer
                .write_all(line.as_bytes())
                .await
                .map_err(|e| Error::io(format!("Failed to write {}", self.describe()), e))?;
            bytes += line.len();
        }
        self.writer
            .flush()
            .await
            .map_err(|e| Error::io(format!("Failed to flush {}", self.describe()), e))?;

        self.stats.points_written += batch.len();
        self.stats.batches_written += 1;
        self.stats.bytes_written += bytes;
        debug!(
            "Wrote batch of {} points ({} bytes) to {}",
            batch.len(),
            bytes,
            self.describe()
        );
        Ok(())
    }

    async fn finish(&mut self) -> Result<SinkStats> {
        self.writer
            .shutdown()
            .await
            .map_err(|e| Error::io(format!("Failed to close {}", self.describe()), e))?;
        Ok(self.stats.clone())
    }
}
