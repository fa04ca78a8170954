//! Time-series database handoff
//!
//! Network transport is supplied by the caller through [`TimeSeriesClient`];
//! this module owns the batching contract around it and the optional
//! downsampling query run after each write.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PointSink, SinkStats};
use crate::app::models::Point;
use crate::app::services::line_protocol::validate_measurement;
use crate::{Error, Result};

/// Transport to a time-series database
pub trait TimeSeriesClient: Send {
    /// Write points to `database`
    fn write_points(
        &mut self,
        database: &str,
        points: &[Point],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Run an InfluxQL statement against `database`
    fn query(&mut self, database: &str, statement: &str)
    -> impl Future<Output = Result<()>> + Send;
}

/// Aggregation run over the time range of each written batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downsample {
    /// InfluxQL duration literal for the `GROUP BY time(..)` bucket, e.g. `1m`
    pub interval: String,

    /// Measurement receiving the aggregated points
    pub into_measurement: String,
}

impl Downsample {
    pub fn new(interval: impl Into<String>, into_measurement: impl Into<String>) -> Result<Self> {
        let downsample = Self {
            interval: interval.into(),
            into_measurement: into_measurement.into(),
        };
        downsample.validate()?;
        Ok(downsample)
    }

    pub fn validate(&self) -> Result<()> {
        let valid_interval = self
            .interval
            .strip_suffix(|c: char| matches!(c, 's' | 'm' | 'h' | 'd' | 'w'))
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
        if !valid_interval {
            return Err(Error::configuration(format!(
                "Invalid downsample interval '{}': expected a duration such as 30s, 5m or 1h",
                self.interval
            )));
        }
        validate_measurement(&self.into_measurement)
    }

    /// Mean of every field over `[start_ns, end_ns]`, grouped by time and all tags
    pub fn statement(&self, measurement: &str, start_ns: i64, end_ns: i64) -> String {
        format!(
            "SELECT mean(*) INTO \"{}\" FROM \"{}\" WHERE time >= {} AND time <= {} GROUP BY time({}), *",
            self.into_measurement, measurement, start_ns, end_ns, self.interval
        )
    }
}

/// Hands sorted batches to a database client
pub struct DatabaseSink<C> {
    client: C,
    database: String,
    measurement: String,
    downsample: Option<Downsample>,
    stats: SinkStats,
}

impl<C: TimeSeriesClient> DatabaseSink<C> {
    pub fn new(client: C, database: impl Into<String>, measurement: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
            measurement: measurement.into(),
            downsample: None,
            stats: SinkStats::default(),
        }
    }

    pub fn with_downsample(mut self, downsample: Option<Downsample>) -> Self {
        self.downsample = downsample;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }
}

impl<C: TimeSeriesClient> PointSink for DatabaseSink<C> {
    async fn write_batch(&mut self, batch: &[Point]) -> Result<()> {
        let (Some(first), Some(last)) = (batch.first(), batch.last()) else {
            return Ok(());
        };

        self.client.write_points(&self.database, batch).await?;
        self.stats.points_written += batch.len();
        self.stats.batches_written += 1;
        debug!(
            "Wrote batch of {} points to database {}",
            batch.len(),
            self.database
        );

        if let Some(downsample) = &self.downsample {
            let statement = downsample.statement(&self.measurement, first.timestamp_ns, last.timestamp_ns);
            debug!("Downsampling: {}", statement);
            self.client.query(&self.database, &statement).await?;
            self.stats.queries_run += 1;
        }

        Ok(())
    }

    async fn finish(&mut self) -> Result<SinkStats> {
        Ok(self.stats.clone())
    }
}
