//! Simulation Result - signals produced by one protocol run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Segment, TimeSeries};
use crate::{Error, Result};

/// Everything a simulator produced for one protocol.
///
/// `complete == false` means the solver failed partway; the signals then
/// hold whatever was computed up to the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    protocol_name: String,
    signals: BTreeMap<String, TimeSeries>,
    complete: bool,
    steps_completed: usize,
    steps_planned: usize,
    failure: Option<String>,
}

impl SimulationResult {
    /// Create an empty, not yet complete result.
    #[must_use]
    pub fn new(protocol_name: impl Into<String>, steps_planned: usize) -> Self {
        Self {
            protocol_name: protocol_name.into(),
            signals: BTreeMap::new(),
            complete: false,
            steps_completed: 0,
            steps_planned,
            failure: None,
        }
    }

    /// Create a builder, mostly useful for assembling results by hand.
    #[must_use]
    pub fn builder(protocol_name: impl Into<String>) -> SimulationResultBuilder {
        SimulationResultBuilder::new(protocol_name)
    }

    /// Get the protocol name.
    #[must_use]
    pub fn protocol_name(&self) -> &str {
        &self.protocol_name
    }

    /// Whether the run finished without solver failure.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of steps that ran to their stop condition.
    #[must_use]
    pub const fn steps_completed(&self) -> usize {
        self.steps_completed
    }

    /// Number of steps the protocol asked for (upper bound).
    #[must_use]
    pub const fn steps_planned(&self) -> usize {
        self.steps_planned
    }

    /// Solver failure message for partial results.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Get a signal by name.
    #[must_use]
    pub fn signal(&self, name: &str) -> Option<&TimeSeries> {
        self.signals.get(name)
    }

    /// Get a signal that must exist and hold at least one sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSignal`] or [`Error::EmptySignal`].
    pub fn require_signal(&self, name: &str) -> Result<&TimeSeries> {
        let series = self.signals.get(name).ok_or_else(|| Error::MissingSignal {
            protocol: self.protocol_name.clone(),
            signal: name.to_string(),
        })?;
        if series.is_empty() {
            return Err(Error::EmptySignal {
                protocol: self.protocol_name.clone(),
                signal: name.to_string(),
            });
        }
        Ok(series)
    }

    /// Names of all recorded signals, sorted.
    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    /// Time of the latest sample across all signals, 0 before any step ran.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.signals
            .values()
            .filter_map(TimeSeries::last_time)
            .fold(0.0, f64::max)
    }

    /// Append the samples of one step.
    pub(crate) fn append(&mut self, segment: Segment) {
        for (name, series) in segment {
            self.signals.entry(name).or_default().extend_from(&series);
        }
    }

    pub(crate) fn step_completed(&mut self) {
        self.steps_completed += 1;
    }

    /// Mark the run as finished (possibly early, by a termination condition).
    pub(crate) fn finish(&mut self) {
        self.complete = true;
    }

    /// Mark the run as truncated by a solver failure.
    pub(crate) fn truncate(&mut self, reason: impl Into<String>) {
        self.complete = false;
        self.failure = Some(reason.into());
    }
}

/// Builder for `SimulationResult`.
#[derive(Debug)]
pub struct SimulationResultBuilder {
    result: SimulationResult,
}

impl SimulationResultBuilder {
    /// Create a new builder; the result defaults to complete.
    #[must_use]
    pub fn new(protocol_name: impl Into<String>) -> Self {
        let mut result = SimulationResult::new(protocol_name, 0);
        result.complete = true;
        Self { result }
    }

    /// Add (or replace) a signal.
    #[must_use]
    pub fn signal(mut self, name: impl Into<String>, series: TimeSeries) -> Self {
        self.result.signals.insert(name.into(), series);
        self
    }

    /// Set completed and planned step counts.
    #[must_use]
    pub fn steps(mut self, completed: usize, planned: usize) -> Self {
        self.result.steps_completed = completed;
        self.result.steps_planned = planned;
        self
    }

    /// Mark the result as truncated by a solver failure.
    #[must_use]
    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.result.truncate(reason);
        self
    }

    /// Build the `SimulationResult`.
    #[must_use]
    pub fn build(self) -> SimulationResult {
        self.result
    }
}
