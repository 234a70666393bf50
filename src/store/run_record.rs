//! Run Record - execution handle of one protocol run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::simulation::SimulationResult;

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is created but not yet started.
    Pending,
    /// Simulation is in progress.
    Running,
    /// Simulation finished (possibly early, by its termination condition).
    Complete,
    /// Solver diverged; a partial result was kept.
    Partial,
    /// Run was rejected or the simulator failed without a partial result.
    Failed,
}

/// Run Record tracks one protocol execution from start to end.
///
/// This is the inspectable handle the driver keeps for every protocol,
/// whether or not metric extraction later succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    protocol_name: String,
    status: RunStatus,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    steps_planned: usize,
    steps_completed: usize,
    failure: Option<String>,
}

impl RunRecord {
    /// Create a new run record in Pending status.
    ///
    /// # Arguments
    ///
    /// * `protocol_name` - Name of the protocol being run
    /// * `steps_planned` - Upper bound on the number of steps
    #[must_use]
    pub fn new(protocol_name: impl Into<String>, steps_planned: usize) -> Self {
        Self {
            protocol_name: protocol_name.into(),
            status: RunStatus::Pending,
            started_at: None,
            ended_at: None,
            steps_planned,
            steps_completed: 0,
            failure: None,
        }
    }

    /// Get the protocol name.
    #[must_use]
    pub fn protocol_name(&self) -> &str {
        &self.protocol_name
    }

    /// Get the current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Get the start timestamp, if the run has started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the end timestamp, if the run has ended.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Get the planned step count.
    #[must_use]
    pub const fn steps_planned(&self) -> usize {
        self.steps_planned
    }

    /// Get the number of steps that finished.
    #[must_use]
    pub const fn steps_completed(&self) -> usize {
        self.steps_completed
    }

    /// Get the failure reason, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Start the run, transitioning from Pending to Running.
    ///
    /// Sets the `started_at` timestamp to now.
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Close the run from the simulation it produced.
    ///
    /// Status becomes Complete or Partial; sets `ended_at` to now.
    pub fn finish(&mut self, result: &SimulationResult) {
        self.status = if result.is_complete() {
            RunStatus::Complete
        } else {
            RunStatus::Partial
        };
        self.steps_completed = result.steps_completed();
        self.failure = result.failure().map(str::to_string);
        self.ended_at = Some(Utc::now());
    }

    /// Close the run as failed.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.failure = Some(reason.into());
        self.ended_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_default() {
        let run = RunRecord::new("cccv", 5);
        assert_eq!(run.status(), RunStatus::Pending);
        assert!(run.started_at().is_none());
    }

    #[test]
    fn test_run_lifecycle_partial() {
        let mut run = RunRecord::new("cccv", 5);
        run.start();
        assert_eq!(run.status(), RunStatus::Running);

        let result = SimulationResult::builder("cccv")
            .steps(3, 5)
            .failed("diverged")
            .build();
        run.finish(&result);

        assert_eq!(run.status(), RunStatus::Partial);
        assert_eq!(run.steps_completed(), 3);
        assert_eq!(run.failure(), Some("diverged"));
        assert!(run.ended_at().unwrap() >= run.started_at().unwrap());
    }

    #[test]
    fn test_run_fail() {
        let mut run = RunRecord::new("bad", 0);
        run.fail("rejected");
        assert_eq!(run.status(), RunStatus::Failed);
    }
}
