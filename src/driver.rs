//! Protocol driver
//!
//! Runs protocols one at a time against a shared [`CellSimulator`]:
//!
//! ```text
//! validate ──> preamble ──> block × repeat_count ──> extract ──> store
//!                              │        │
//!                              │        └── termination check after each repetition
//!                              └── SolverDivergence: keep partial samples, stop the protocol
//! ```
//!
//! A configuration error aborts one protocol before the simulator sees it.
//! A solver divergence never aborts anything: the partial result is stored,
//! a warning is logged, and the batch moves on.

use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::metrics::{ChargeWindow, MetricExtractor, MetricRecord};
use crate::protocol::{CcCvParams, ChargeStep, ProtocolSpec, PulsedParams, Termination};
use crate::simulation::{CellSimulator, ParameterSet, SimulationResult};
use crate::store::{ArtifactSink, JsonArtifactSink, ResultStore, RunRecord};
use crate::{Error, Result};

/// A protocol paired with the locator its metrics are extracted with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolRun {
    /// Protocol to simulate
    pub spec: ProtocolSpec,
    /// How the charge interval is found in its result
    pub window: ChargeWindow,
}

impl ProtocolRun {
    /// Pair a protocol with a locator.
    #[must_use]
    pub const fn new(spec: ProtocolSpec, window: ChargeWindow) -> Self {
        Self { spec, window }
    }

    /// CC-CV baseline with its matching window.
    ///
    /// `nominal_capacity` (A.h) converts the charge C-rate into amperes.
    #[must_use]
    pub fn cccv(
        name: impl Into<String>,
        params: &CcCvParams,
        cycles: u32,
        nominal_capacity: f64,
    ) -> Self {
        Self::new(
            ProtocolSpec::cccv(name, params, cycles),
            ChargeWindow::CcCv {
                cc_current: params.charge_rate * nominal_capacity,
                cv_voltage: params.hold_voltage,
            },
        )
    }

    /// Pulsed protocol with its matching window.
    #[must_use]
    pub fn pulsed(
        name: impl Into<String>,
        params: &PulsedParams,
        termination: Option<Termination>,
        nominal_capacity: f64,
    ) -> Self {
        Self::new(
            ProtocolSpec::pulsed(name, params, termination),
            ChargeWindow::Pulsed {
                pulse_current: params.pulse_rate * nominal_capacity,
            },
        )
    }
}

/// Outcome of [`Driver::run_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Protocols with a metric record (complete or partial)
    pub recorded: Vec<String>,
    /// Protocols without one, and why
    pub failed: Vec<(String, Error)>,
}

impl BatchReport {
    /// Whether every protocol produced a metric record.
    #[must_use]
    pub fn all_recorded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sequential protocol driver.
pub struct Driver<S: CellSimulator> {
    simulator: S,
    parameters: ParameterSet,
    extractor: MetricExtractor,
    sink: Option<Box<dyn ArtifactSink>>,
}

impl<S: CellSimulator> Driver<S> {
    /// Create a driver with the default extractor and no artifact sink.
    #[must_use]
    pub fn new(simulator: S, parameters: ParameterSet) -> Self {
        Self {
            simulator,
            parameters,
            extractor: MetricExtractor::new(),
            sink: None,
        }
    }

    /// Create a driver from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the artifact directory cannot be created.
    pub fn from_config(simulator: S, parameters: ParameterSet, config: &DriverConfig) -> Result<Self> {
        let mut driver = Self::new(simulator, parameters).with_extractor(config.extractor());
        if let Some(dir) = &config.artifact_dir {
            driver = driver.with_sink(Box::new(JsonArtifactSink::new(dir)?));
        }
        Ok(driver)
    }

    /// Replace the metric extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: MetricExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Persist every simulation result through `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn ArtifactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Get the simulator.
    #[must_use]
    pub const fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Get the parameter set handed to the simulator.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Get the metric extractor.
    #[must_use]
    pub const fn extractor(&self) -> &MetricExtractor {
        &self.extractor
    }

    /// Simulate one protocol.
    ///
    /// Runs the preamble once, then the block until `repeat_count` is
    /// reached or the protocol's termination holds. A solver divergence
    /// ends the protocol with an incomplete result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] before any simulator call if the
    /// protocol is malformed, or any non-recoverable simulator error.
    pub fn simulate(&mut self, spec: &ProtocolSpec) -> Result<SimulationResult> {
        spec.validate()?;
        let mut result = SimulationResult::new(spec.name(), spec.planned_step_count());

        for step in spec.preamble() {
            if !self.run_step(step, &mut result)? {
                return Ok(result);
            }
        }

        let names = self.extractor.signal_names().clone();
        let capacity_before = result
            .signal(&names.discharge_capacity)
            .and_then(|series| series.last_value());
        for repetition in 1..=spec.repeat_count() {
            let repetition_start = result.end_time();

            for step in spec.steps() {
                if !self.run_step(step, &mut result)? {
                    return Ok(result);
                }
            }

            let Some(termination) = spec.termination() else {
                continue;
            };
            let reached = match termination {
                Termination::ChargeDelivered { amp_hours } => {
                    let capacity = result.signal(&names.discharge_capacity);
                    let before = capacity_before
                        .or_else(|| capacity.and_then(|s| s.values().first().copied()));
                    match (before, capacity.and_then(|s| s.last_value())) {
                        (Some(before), Some(now)) => before - now >= amp_hours,
                        _ => false,
                    }
                }
                Termination::VoltageCeiling { volts } => result
                    .signal(&names.voltage)
                    .and_then(|s| s.max_after(repetition_start))
                    .is_some_and(|v| v >= volts),
            };
            debug!(
                protocol = spec.name(),
                repetition,
                reached,
                "termination check"
            );
            if reached {
                info!(
                    protocol = spec.name(),
                    repetitions = repetition,
                    "termination condition reached"
                );
                break;
            }
        }

        result.finish();
        Ok(result)
    }

    /// Simulate one protocol, extract its metrics and store everything.
    ///
    /// Anything stored under the protocol's name is replaced. The run
    /// record and (if set up) the artifact are stored even when extraction
    /// fails. A malformed protocol is rejected before the store is touched,
    /// so an earlier run under the same name survives it.
    ///
    /// # Errors
    ///
    /// Returns the configuration, simulator or extraction error.
    pub fn run(&mut self, plan: &ProtocolRun, store: &mut ResultStore) -> Result<MetricRecord> {
        let name = plan.spec.name();
        if let Err(e) = plan.spec.validate() {
            warn!(protocol = name, error = %e, "protocol rejected");
            return Err(e);
        }
        store.remove(name);

        let mut run = RunRecord::new(name, plan.spec.planned_step_count());
        run.start();
        info!(
            protocol = name,
            planned_steps = plan.spec.planned_step_count(),
            "running protocol"
        );

        let result = match self.simulate(&plan.spec) {
            Ok(result) => result,
            Err(e) => {
                warn!(protocol = name, error = %e, "protocol failed");
                run.fail(e.to_string());
                store.record_run(run);
                return Err(e);
            }
        };
        run.finish(&result);
        store.record_run(run);

        if let Some(sink) = self.sink.as_mut() {
            match sink.persist(&result) {
                Ok(artifact) => store.record_artifact(artifact),
                Err(e) => warn!(protocol = name, error = %e, "could not persist artifact"),
            }
        }

        let extracted = self.extractor.extract(&result, &plan.window);
        store.record_simulation(result);
        let record = extracted?;

        info!(
            protocol = name,
            charge_time = record.charge_time(),
            charge_speed = record.charge_speed(),
            degradation_per_speed = record.degradation_per_speed(),
            complete = record.is_complete(),
            "metrics recorded"
        );
        store.record(name, record.clone());
        Ok(record)
    }

    /// Run protocols in order; a failing protocol does not stop the rest.
    pub fn run_batch(&mut self, plans: &[ProtocolRun], store: &mut ResultStore) -> BatchReport {
        let mut report = BatchReport::default();
        for plan in plans {
            let name = plan.spec.name().to_string();
            match self.run(plan, store) {
                Ok(_) => report.recorded.push(name),
                Err(e) => report.failed.push((name, e)),
            }
        }
        info!(
            recorded = report.recorded.len(),
            failed = report.failed.len(),
            "batch finished"
        );
        report
    }

    /// Run one step and append its samples.
    ///
    /// Returns `Ok(false)` when the solver diverged and the result was
    /// truncated.
    fn run_step(&mut self, step: &ChargeStep, result: &mut SimulationResult) -> Result<bool> {
        let start_time = result.end_time();
        match self
            .simulator
            .simulate_step(step, &self.parameters, start_time)
        {
            Ok(segment) => {
                result.append(segment);
                result.step_completed();
                Ok(true)
            }
            Err(Error::SolverDivergence {
                reason, partial, ..
            }) => {
                warn!(
                    protocol = result.protocol_name(),
                    step = result.steps_completed(),
                    %reason,
                    "solver diverged, keeping partial result"
                );
                result.append(partial);
                result.truncate(reason);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StopCondition;
    use crate::simulation::{signals, ReferenceCell};

    fn driver() -> Driver<ReferenceCell> {
        Driver::new(ReferenceCell::new(), ParameterSet::new("reference"))
    }

    #[test]
    fn test_zero_repeat_rejected_before_simulation() {
        let mut driver = driver();
        let spec = ProtocolSpec::new(
            "never",
            vec![ChargeStep::charge(1.0).until(StopCondition::voltage(4.0))],
            0,
        );
        assert!(matches!(
            driver.simulate(&spec),
            Err(Error::Configuration { .. })
        ));
        assert_eq!(driver.simulator().steps_run(), 0);
    }

    #[test]
    fn test_simulate_counts_steps() {
        let mut driver = driver();
        let spec = ProtocolSpec::cccv("cccv", &CcCvParams::default(), 1);
        let result = driver.simulate(&spec).unwrap();
        assert!(result.is_complete());
        assert_eq!(result.steps_completed(), 5);
        assert_eq!(result.steps_planned(), 5);

        let times = result.signal(signals::CURRENT).unwrap().times();
        assert!(times.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_divergence_truncates() {
        let mut driver = Driver::new(
            ReferenceCell::new().diverging_at(2),
            ParameterSet::new("reference"),
        );
        let spec = ProtocolSpec::cccv("cccv", &CcCvParams::default(), 1);
        let result = driver.simulate(&spec).unwrap();
        assert!(!result.is_complete());
        assert_eq!(result.steps_completed(), 2);
        assert!(result.failure().is_some());
    }

    #[test]
    fn test_charge_delivered_termination() {
        let mut driver = driver();
        let spec = ProtocolSpec::builder("pulses")
            .preamble(vec![
                ChargeStep::discharge(1.0).until(StopCondition::voltage(2.5)),
            ])
            .steps(vec![
                ChargeStep::charge(6.0).for_at_most(10.0),
                ChargeStep::rest(5.0),
            ])
            .repeat_count(100)
            .terminate_when(Termination::ChargeDelivered { amp_hours: 0.04 })
            .build();

        let result = driver.simulate(&spec).unwrap();
        assert!(result.is_complete());
        // 6 A for 10 s is 1/60 A.h per pulse, so the third pulse crosses 0.04 A.h
        assert_eq!(result.steps_completed(), 1 + 3 * 2);
    }
}
