//! Error types for cycle-aging
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! Solver-level failures (`SolverDivergence`) are recoverable: the driver
//! downgrades them to a partial result. Everything else is surfaced to the
//! caller per protocol.

use thiserror::Error;

use crate::simulation::TimeSeries;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// cycle-aging error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed protocol, rejected before any solver invocation
    #[error("Configuration error in protocol '{protocol}': {reason}")]
    Configuration {
        /// Protocol name (may be empty if the name itself is invalid)
        protocol: String,
        /// What is wrong with it
        reason: String,
    },

    /// Directive text does not match the protocol grammar
    #[error("Protocol parse error: {0}")]
    ParseError(String),

    /// Numerical solver failed to converge mid-run
    #[error("Solver diverged at step {step_index}: {reason}")]
    SolverDivergence {
        /// Zero-based index of the step that failed
        step_index: usize,
        /// Solver-provided reason
        reason: String,
        /// Samples produced for the failing step before it diverged
        partial: Vec<(String, TimeSeries)>,
    },

    /// A required signal is absent from the simulation result
    #[error("Signal '{signal}' missing from result of protocol '{protocol}'")]
    MissingSignal {
        /// Protocol name
        protocol: String,
        /// Signal name
        signal: String,
    },

    /// A required signal is present but has no samples
    #[error("Signal '{signal}' of protocol '{protocol}' has no samples")]
    EmptySignal {
        /// Protocol name
        protocol: String,
        /// Signal name
        signal: String,
    },

    /// Locator found no sample matching the target value
    #[error("No sample of '{signal}' matches {target} (tolerance {tolerance}) in protocol '{protocol}'")]
    SignalNotFound {
        /// Protocol name
        protocol: String,
        /// Signal name
        signal: String,
        /// Target value searched for
        target: f64,
        /// Absolute tolerance used for matching
        tolerance: f64,
    },

    /// Metric cannot be computed (non-positive charge time, zero speed)
    #[error("Undefined metric for protocol '{protocol}': {reason}")]
    UndefinedMetric {
        /// Protocol name
        protocol: String,
        /// Why the metric is undefined
        reason: String,
    },

    /// JSON encode/decode failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Configuration`].
    pub(crate) fn configuration(protocol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            protocol: protocol.into(),
            reason: reason.into(),
        }
    }

    /// Whether the driver may downgrade this error to a partial result.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::SolverDivergence { .. })
    }
}
