//! Metric extraction and records
//!
//! ```text
//! SimulationResult ──ChargeWindow──> (start, end)
//!        │                               │
//!        ├── discharge capacity ──> charge capacity
//!        └── SEI thickness ───────> degradation delta
//!                                        │
//!                                  MetricRecord
//! ```

mod extractor;
mod metric_record;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use extractor::{ChargeWindow, MetricExtractor, SignalNames, SignalTolerance};
pub use metric_record::MetricRecord;

/// Unit for charge time and charge speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Seconds
    Seconds,
    /// Minutes
    Minutes,
    /// Hours (A.h per hour for speed)
    #[default]
    Hours,
}

impl TimeUnit {
    /// Seconds in one unit.
    #[must_use]
    pub const fn seconds(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3600.0,
        }
    }

    /// Convert a duration in seconds into this unit.
    #[must_use]
    pub fn convert_seconds(self, seconds: f64) -> f64 {
        seconds / self.seconds()
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Seconds => "s",
            Self::Minutes => "min",
            Self::Hours => "h",
        })
    }
}
