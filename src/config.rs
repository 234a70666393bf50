//! Driver configuration
//!
//! Every field has a default, so a JSON file only needs the keys it
//! changes:
//!
//! ```json
//! { "time_unit": "Minutes", "tolerance": { "current": 1e-4, "voltage": 1e-4 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::metrics::{MetricExtractor, SignalNames, SignalTolerance, TimeUnit};
use crate::Result;

/// Settings for extraction and artifact persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Unit for charge time and speed
    pub time_unit: TimeUnit,

    /// Matching tolerances for the charge-window locators
    pub tolerance: SignalTolerance,

    /// Names of the signals metrics are read from
    pub signals: SignalNames,

    /// Directory for JSON artifacts; no artifacts when unset
    pub artifact_dir: Option<PathBuf>,
}

impl DriverConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] on malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] or [`crate::Error::Serialization`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Extractor configured from these settings.
    #[must_use]
    pub fn extractor(&self) -> MetricExtractor {
        MetricExtractor::new()
            .with_time_unit(self.time_unit)
            .with_tolerance(self.tolerance)
            .with_signal_names(self.signals.clone())
    }
}
