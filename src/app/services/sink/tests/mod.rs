//! Test utilities for sinks

use crate::app::models::{FieldValue, Point};
use crate::{Error, Result};

use super::TimeSeriesClient;


/// Point with a single integer field tagging its encoding order
pub fn point_at(timestamp_ns: i64, order: i64) -> Point {
    Point {
        measurement: "m".to_string(),
        timestamp_ns,
        tags: vec![("site".to_string(), "a".to_string())],
        fields: vec![("order".to_string(), FieldValue::Integer(order))],
        line_index: None,
    }
}

pub fn orders(points: &[Point]) -> Vec<i64> {
    points
        .iter()
        .map(|p| match p.field("order") {
            Some(FieldValue::Integer(i)) => *i,
            other => panic!("unexpected order field {:?}", other),
        })
        .collect()
}

/// Client that records every call
#[derive(Debug, Default)]
pub struct RecordingClient {
    pub writes: Vec<(String, Vec<Point>)>,
    pub queries: Vec<(String, String)>,
    pub fail_writes: bool,
}

impl TimeSeriesClient for RecordingClient {
    async fn write_points(&mut self, database: &str, points: &[Point]) -> Result<()> {
        if self.fail_writes {
            return Err(Error::sink("connection refused", None));
        }
        self.writes.push((database.to_string(), points.to_vec()));
        Ok(())
    }

    async fn query(&mut self, database: &str, statement: &str) -> Result<()> {
        self.queries
            .push((database.to_string(), statement.to_string()));
        Ok(())
    }
}
