//! Result Store - in-memory results of a protocol batch
//!
//! Keyed by protocol name; re-running a protocol under the same name
//! replaces everything previously stored for it.

use std::collections::BTreeMap;

use super::{ArtifactRecord, RunRecord};
use crate::metrics::MetricRecord;
use crate::simulation::SimulationResult;

/// In-memory store for metric records, raw results and run handles.
///
/// ## Design
///
/// Each kind of record lives in its own ordered map so iteration is
/// deterministic (sorted by protocol name). A protocol can have a run and
/// a simulation without a metric record when extraction failed.
#[derive(Debug, Default, Clone)]
pub struct ResultStore {
    metrics: BTreeMap<String, MetricRecord>,
    simulations: BTreeMap<String, SimulationResult>,
    runs: BTreeMap<String, RunRecord>,
    artifacts: BTreeMap<String, ArtifactRecord>,
}

impl ResultStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store holds nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
            && self.simulations.is_empty()
            && self.runs.is_empty()
            && self.artifacts.is_empty()
    }

    /// Number of metric records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Store a metric record, overwriting any previous one for `name`.
    pub fn record(&mut self, name: impl Into<String>, record: MetricRecord) {
        self.metrics.insert(name.into(), record);
    }

    /// Get the metric record for a protocol.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricRecord> {
        self.metrics.get(name)
    }

    /// All metric records, sorted by protocol name.
    pub fn all(&self) -> impl Iterator<Item = (&str, &MetricRecord)> {
        self.metrics.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Names of protocols with a metric record.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    /// Store a raw simulation result under its protocol name.
    pub fn record_simulation(&mut self, result: SimulationResult) {
        self.simulations
            .insert(result.protocol_name().to_string(), result);
    }

    /// Get the raw simulation result for a protocol.
    #[must_use]
    pub fn simulation(&self, name: &str) -> Option<&SimulationResult> {
        self.simulations.get(name)
    }

    /// Store a run handle under its protocol name.
    pub fn record_run(&mut self, run: RunRecord) {
        self.runs.insert(run.protocol_name().to_string(), run);
    }

    /// Get the run handle for a protocol.
    #[must_use]
    pub fn run(&self, name: &str) -> Option<&RunRecord> {
        self.runs.get(name)
    }

    /// All run handles, sorted by protocol name.
    pub fn runs(&self) -> impl Iterator<Item = &RunRecord> {
        self.runs.values()
    }

    /// Store an artifact record under its protocol name.
    pub fn record_artifact(&mut self, artifact: ArtifactRecord) {
        self.artifacts
            .insert(artifact.protocol_name().to_string(), artifact);
    }

    /// Get the artifact record for a protocol.
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&ArtifactRecord> {
        self.artifacts.get(name)
    }

    /// Drop everything stored for a protocol.
    pub fn remove(&mut self, name: &str) {
        self.metrics.remove(name);
        self.simulations.remove(name);
        self.runs.remove(name);
        self.artifacts.remove(name);
    }

    /// Merge another store into this one; entries in `other` win.
    pub fn merge(&mut self, other: Self) {
        self.metrics.extend(other.metrics);
        self.simulations.extend(other.simulations);
        self.runs.extend(other.runs);
        self.artifacts.extend(other.artifacts);
    }
}
