//! Artifacts - persisted simulation results, one per protocol name

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::simulation::SimulationResult;
use crate::Result;

/// Artifact Record describes one persisted simulation result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    protocol_name: String,
    location: String,
    size_bytes: u64,
    created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    /// Create a new artifact record.
    ///
    /// # Arguments
    ///
    /// * `protocol_name` - Protocol whose result was written
    /// * `location` - Where it was written (path, URL, key)
    /// * `size_bytes` - Size of the artifact in bytes
    ///
    /// # Returns
    ///
    /// A new `ArtifactRecord` with the current timestamp.
    #[must_use]
    pub fn new(protocol_name: impl Into<String>, location: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            protocol_name: protocol_name.into(),
            location: location.into(),
            size_bytes,
            created_at: Utc::now(),
        }
    }

    /// Get the protocol name.
    #[must_use]
    pub fn protocol_name(&self) -> &str {
        &self.protocol_name
    }

    /// Get the artifact location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Get the artifact size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Hook called by the driver after every run, complete or partial.
///
/// The encoding is up to the implementation.
pub trait ArtifactSink {
    /// Persist one result.
    ///
    /// # Errors
    ///
    /// Returns an error if the result cannot be encoded or written.
    fn persist(&mut self, result: &SimulationResult) -> Result<ArtifactRecord>;
}

/// Writes each result as pretty-printed JSON into a directory.
///
/// File names are the protocol name plus `.json`, with every byte outside
/// `[A-Za-z0-9._-]` written as `%XX`. Distinct names never share a file,
/// and re-running a protocol overwrites its own.
#[derive(Debug, Clone)]
pub struct JsonArtifactSink {
    dir: PathBuf,
}

impl JsonArtifactSink {
    /// Create a sink, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Get the output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the artifact for `protocol_name` is written to.
    #[must_use]
    pub fn path_for(&self, protocol_name: &str) -> PathBuf {
        let mut stem = String::with_capacity(protocol_name.len());
        for byte in protocol_name.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
                stem.push(char::from(byte));
            } else {
                stem.push_str(&format!("%{byte:02X}"));
            }
        }
        self.dir.join(format!("{stem}.json"))
    }
}

impl ArtifactSink for JsonArtifactSink {
    fn persist(&mut self, result: &SimulationResult) -> Result<ArtifactRecord> {
        let path = self.path_for(result.protocol_name());
        let bytes = serde_json::to_vec_pretty(result)?;
        fs::write(&path, &bytes)?;
        Ok(ArtifactRecord::new(
            result.protocol_name(),
            path.display().to_string(),
            bytes.len() as u64,
        ))
    }
}

/// Read back a result written by [`JsonArtifactSink`].
///
/// # Errors
///
/// Returns [`crate::Error::Io`] or [`crate::Error::Serialization`].
pub fn load_simulation(path: impl AsRef<Path>) -> Result<SimulationResult> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::TimeSeries;

    #[test]
    fn test_artifact_record_new() {
        let artifact = ArtifactRecord::new("cccv", "/tmp/cccv.json", 1000);
        assert_eq!(artifact.protocol_name(), "cccv");
        assert_eq!(artifact.location(), "/tmp/cccv.json");
        assert_eq!(artifact.size_bytes(), 1000);
    }

    #[test]
    fn test_path_for_escapes_name() {
        let sink = JsonArtifactSink {
            dir: PathBuf::from("out"),
        };
        assert_eq!(
            sink.path_for("6C charge, 2s rest"),
            PathBuf::from("out").join("6C%20charge%2C%202s%20rest.json")
        );
        assert_eq!(
            sink.path_for("cccv_charging"),
            PathBuf::from("out").join("cccv_charging.json")
        );
        assert_eq!(sink.path_for("50%/h"), PathBuf::from("out").join("50%25%2Fh.json"));
    }

    #[test]
    fn test_similar_names_keep_separate_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonArtifactSink::new(dir.path()).unwrap();
        let names = ["6C charge, 2s rest", "6C charge_ 2s rest", "6C charge%2C 2s rest"];

        let records: Vec<ArtifactRecord> = names
            .iter()
            .map(|name| {
                let result = SimulationResult::builder(*name)
                    .signal("Current [A]", TimeSeries::from_samples([(0.0, -6.0)]))
                    .build();
                sink.persist(&result).unwrap()
            })
            .collect();

        for (name, record) in names.iter().zip(&records) {
            let loaded = load_simulation(record.location()).unwrap();
            assert_eq!(loaded.protocol_name(), *name);
        }
    }

    #[test]
    fn test_non_finite_samples_survive_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonArtifactSink::new(dir.path()).unwrap();
        let result = SimulationResult::builder("diverged")
            .signal(
                "Voltage [V]",
                TimeSeries::from_samples([
                    (0.0, 4.0),
                    (1.0, f64::NAN),
                    (2.0, f64::INFINITY),
                    (3.0, f64::NEG_INFINITY),
                ]),
            )
            .build();

        let record = sink.persist(&result).unwrap();
        let loaded = load_simulation(record.location()).unwrap();

        let values = loaded.signal("Voltage [V]").unwrap().values();
        assert_eq!(values[0], 4.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], f64::INFINITY);
        assert_eq!(values[3], f64::NEG_INFINITY);
    }

    #[test]
    fn test_persist_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonArtifactSink::new(dir.path().join("artifacts")).unwrap();
        let result = SimulationResult::builder("cccv_charging")
            .signal("Current [A]", TimeSeries::from_samples([(0.1, -4.0), (0.2, 0.1 + 0.2)]))
            .build();

        let record = sink.persist(&result).unwrap();
        assert!(record.size_bytes() > 0);

        let loaded = load_simulation(record.location()).unwrap();
        assert_eq!(loaded, result);
    }
}
