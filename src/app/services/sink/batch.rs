//! Bounded batching of encoded points

use crate::app::models::Point;

/// Collects points until `max_size` is reached
///
/// Every batch handed out is stably sorted ascending by timestamp, so points
/// sharing a timestamp keep their encoding order.
#[derive(Debug)]
pub struct BatchBuffer {
    points: Vec<Point>,
    max_size: usize,
}

impl BatchBuffer {
    /// Create a buffer; a `max_size` of zero is treated as one
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            points: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Add a point, returning the sorted batch once the buffer is full
    pub fn add(&mut self, point: Point) -> Option<Vec<Point>> {
        self.points.push(point);
        if self.points.len() >= self.max_size {
            Some(self.flush())
        } else {
            None
        }
    }

    /// Take everything buffered so far, sorted
    pub fn flush(&mut self) -> Vec<Point> {
        let mut batch = std::mem::replace(&mut self.points, Vec::with_capacity(self.max_size));
        batch.sort_by_key(|point| point.timestamp_ns);
        batch
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
