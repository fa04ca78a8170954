//! Validation counters

use serde::{Deserialize, Serialize};

/// Counters accumulated by a [`DocumentValidator`](super::DocumentValidator)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStats {
    /// Records that produced a typed document
    pub records_validated: usize,

    /// Records with at least one degraded value
    pub records_degraded: usize,

    /// Values replaced by `Null` after failing lax validation
    pub values_degraded: usize,

    /// Values that matched a missing token
    pub missing_values: usize,
}

impl ValidationStats {
    /// Percentage of validated records that needed no degradation
    pub fn clean_rate(&self) -> f64 {
        if self.records_validated == 0 {
            100.0
        } else {
            let clean = self.records_validated - self.records_degraded;
            (clean as f64 / self.records_validated as f64) * 100.0
        }
    }

    pub fn merge(&mut self, other: &ValidationStats) {
        self.records_validated += other.records_validated;
        self.records_degraded += other.records_degraded;
        self.values_degraded += other.values_degraded;
        self.missing_values += other.missing_values;
    }
}
