//! Pipeline construction and execution

use std::io::{BufRead, BufReader};
use std::path::Path;

use tokio::fs::File;
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::stats::PipelineStats;
use crate::app::models::Point;
use crate::app::services::document_validator::{DocumentValidator, RecordShaper};
use crate::app::services::line_protocol::LineProtocolEncoder;
use crate::app::services::schema::Schema;
use crate::app::services::sink::{BatchBuffer, PointSink, SinkStats};
use crate::app::services::text_tokenizer::FieldTokenizer;
use crate::config::PipelineConfig;
use crate::constants::BATCH_QUEUE_DEPTH;
use crate::{Error, Result};

/// A validated conversion setup, reusable across inputs
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    schema: Schema,
}

impl Pipeline {
    /// Validate the configuration and resolve the schema
    ///
    /// Schema and measurement problems surface here, before any input is read.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let schema = config.typed_schema()?;
        debug!(
            "Pipeline for '{}' with {} schema columns",
            config.measurement,
            schema.len()
        );
        Ok(Self { config, schema })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Convert one file
    pub async fn run_file<S: PointSink>(
        &self,
        path: &Path,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<PipelineStats> {
        let file = File::open(path)
            .await
            .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?
            .into_std()
            .await;
        info!("Converting {}", path.display());

        let stats = self.run(BufReader::new(file), sink, cancel).await?;
        info!("Finished {}: {}", path.display(), stats.summary());
        Ok(stats)
    }

    /// Convert one input stream and finish the sink
    ///
    /// Tokenizing, validation and encoding run on the blocking pool and hand
    /// finished batches over a bounded queue, so reads never stall the async
    /// runtime. Cancellation is checked before each batch is queued and again
    /// before it is written.
    pub async fn run<R, S>(
        &self,
        reader: R,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<PipelineStats>
    where
        R: BufRead + Send + 'static,
        S: PointSink,
    {
        let (sender, mut batches) = mpsc::channel(BATCH_QUEUE_DEPTH);
        let producer = {
            let pipeline = self.clone();
            let cancel = cancel.clone();
            task::spawn_blocking(move || pipeline.produce(reader, &sender, &cancel))
        };

        let mut written = Ok(());
        while let Some(batch) = batches.recv().await {
            if let Err(e) = write_batch(sink, &batch, cancel).await {
                written = Err(e);
                break;
            }
        }
        // unblocks a producer waiting on a full queue
        drop(batches);

        let produced = producer.await.map_err(|e| {
            Error::processing_interrupted(format!("Conversion task failed: {}", e))
        })?;
        written?;

        let mut stats = produced?;
        stats.sink = sink.finish().await?;
        Ok(stats)
    }

    /// Pull the stage chain to the end of the input, queueing full batches
    ///
    /// The batch being assembled when an error surfaces is dropped.
    fn produce<R: BufRead>(
        &self,
        reader: R,
        sender: &mpsc::Sender<Vec<Point>>,
        cancel: &CancellationToken,
    ) -> Result<PipelineStats> {
        let config = &self.config;
        let mut tokenizer = FieldTokenizer::new(reader, config.lines.clone(), &config.delimiter);
        let mut shaper = RecordShaper::new(config.header.clone(), config.column_count);
        let mut validator =
            DocumentValidator::new(&self.schema, config.mode, config.missing_values.clone());
        let mut encoder = LineProtocolEncoder::new(config.measurement.as_str(), &self.schema)?
            .with_order_check(config.check_order);
        let mut batch = BatchBuffer::new(config.batch_size);

        {
            let records = shaper.shape_all(tokenizer.by_ref());
            let documents = validator.validate_all(records);
            let points = encoder.encode_all(documents);

            for point in points {
                if let Some(full) = batch.add(point?) {
                    queue_batch(sender, full, cancel)?;
                }
            }
        }

        if !batch.is_empty() {
            queue_batch(sender, batch.flush(), cancel)?;
        }

        Ok(PipelineStats {
            lines_read: tokenizer.lines_read(),
            blank_lines_dropped: tokenizer.blank_lines_dropped(),
            records_dropped: shaper.records_dropped(),
            validation: validator.stats().clone(),
            points_encoded: encoder.points_encoded(),
            sink: SinkStats::default(),
        })
    }
}

fn queue_batch(
    sender: &mpsc::Sender<Vec<Point>>,
    batch: Vec<Point>,
    cancel: &CancellationToken,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::processing_interrupted(
            "Cancelled before queueing the next batch",
        ));
    }
    debug!("Queueing batch of {} points", batch.len());
    sender
        .blocking_send(batch)
        .map_err(|_| Error::processing_interrupted("Sink stopped accepting batches"))
}

async fn write_batch<S: PointSink>(
    sink: &mut S,
    batch: &[Point],
    cancel: &CancellationToken,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::processing_interrupted(
            "Cancelled before writing the next batch",
        ));
    }
    sink.write_batch(batch).await
}
