//! Reference cell - a zero-dimensional stand-in for the real solver
//!
//! Linear open-circuit voltage in state of charge, a series resistance, and
//! SEI growth proportional to charge throughput plus a small calendar term.
//! Integrated with explicit Euler at a fixed step. It exists to exercise the
//! pipeline end to end; it says nothing about real cell chemistry.
//!
//! Parameter keys (defaults in brackets):
//!
//! | key | default |
//! |-----|---------|
//! | `Nominal cell capacity [A.h]` | 1.0 |
//! | `Open-circuit voltage at 0% SOC [V]` | 2.0 |
//! | `Open-circuit voltage at 100% SOC [V]` | 4.2 |
//! | `Internal resistance [Ohm]` | 0.05 |
//! | `Initial state of charge` | 0.5 |
//! | `Initial SEI thickness [m]` | 5e-9 |
//! | `SEI growth per charge throughput [m.A-1.s-1]` | 1e-13 |
//! | `SEI calendar growth [m.s-1]` | 1e-15 |
//! | `Lithium lost per SEI thickness [mol.m-1]` | 0.5 |
//! | `Time step [s]` | 1.0 |
//! | `Maximum step duration [s]` | 86400 |

use super::{signals, CellSimulator, ParameterSet, Segment, TimeSeries};
use crate::protocol::{Action, ChargeStep, Setpoint, StopKind};
use crate::{Error, Result};

/// Parameter keys read by [`ReferenceCell`].
pub mod keys {
    /// Nominal capacity; converts C-rates into amperes.
    pub const NOMINAL_CAPACITY: &str = "Nominal cell capacity [A.h]";
    /// OCV of an empty cell.
    pub const OCV_EMPTY: &str = "Open-circuit voltage at 0% SOC [V]";
    /// OCV of a full cell.
    pub const OCV_FULL: &str = "Open-circuit voltage at 100% SOC [V]";
    /// Series resistance.
    pub const RESISTANCE: &str = "Internal resistance [Ohm]";
    /// SOC the cell starts at the first time it is used.
    pub const INITIAL_SOC: &str = "Initial state of charge";
    /// SEI thickness the cell starts with.
    pub const INITIAL_SEI: &str = "Initial SEI thickness [m]";
    /// SEI growth per ampere of charge current per second.
    pub const SEI_CHARGE_GROWTH: &str = "SEI growth per charge throughput [m.A-1.s-1]";
    /// SEI growth per second regardless of current.
    pub const SEI_CALENDAR_GROWTH: &str = "SEI calendar growth [m.s-1]";
    /// Lithium consumed per metre of SEI.
    pub const LITHIUM_PER_SEI: &str = "Lithium lost per SEI thickness [mol.m-1]";
    /// Integration step.
    pub const TIME_STEP: &str = "Time step [s]";
    /// Steps running longer than this are reported as divergence.
    pub const MAX_STEP_DURATION: &str = "Maximum step duration [s]";
}

/// Samples the failing step emits before a scheduled divergence.
const DIVERGENCE_SAMPLES: usize = 10;

#[derive(Debug, Clone, Copy)]
struct Constants {
    capacity: f64,
    ocv_empty: f64,
    ocv_full: f64,
    resistance: f64,
    sei_charge_growth: f64,
    sei_calendar_growth: f64,
    lithium_per_sei: f64,
    dt: f64,
    max_step: f64,
}

impl Constants {
    fn from_parameters(p: &ParameterSet) -> Self {
        Self {
            capacity: p.get_or(keys::NOMINAL_CAPACITY, 1.0),
            ocv_empty: p.get_or(keys::OCV_EMPTY, 2.0),
            ocv_full: p.get_or(keys::OCV_FULL, 4.2),
            resistance: p.get_or(keys::RESISTANCE, 0.05),
            sei_charge_growth: p.get_or(keys::SEI_CHARGE_GROWTH, 1e-13),
            sei_calendar_growth: p.get_or(keys::SEI_CALENDAR_GROWTH, 1e-15),
            lithium_per_sei: p.get_or(keys::LITHIUM_PER_SEI, 0.5),
            dt: p.get_or(keys::TIME_STEP, 1.0),
            max_step: p.get_or(keys::MAX_STEP_DURATION, 86_400.0),
        }
    }

    fn ocv(&self, soc: f64) -> f64 {
        (self.ocv_full - self.ocv_empty).mul_add(soc, self.ocv_empty)
    }
}

#[derive(Debug, Clone, Copy)]
struct CellState {
    soc: f64,
    sei: f64,
    initial_sei: f64,
    discharged_ah: f64,
}

/// Five output signals of one step.
#[derive(Default)]
struct Recorder {
    current: TimeSeries,
    voltage: TimeSeries,
    capacity: TimeSeries,
    sei: TimeSeries,
    lithium: TimeSeries,
}

impl Recorder {
    fn into_segment(self) -> Segment {
        vec![
            (signals::CURRENT.to_string(), self.current),
            (signals::VOLTAGE.to_string(), self.voltage),
            (signals::DISCHARGE_CAPACITY.to_string(), self.capacity),
            (signals::SEI_THICKNESS.to_string(), self.sei),
            (signals::LITHIUM_LOSS.to_string(), self.lithium),
        ]
    }
}

/// Fixed-step reference simulator.
///
/// State persists across steps and across protocols, like a solver that
/// reuses one model instance.
#[derive(Debug, Default)]
pub struct ReferenceCell {
    state: Option<CellState>,
    steps_run: usize,
    diverge_at: Option<usize>,
}

impl ReferenceCell {
    /// Create a cell that is initialized from the parameters on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail once, partway through the `step`-th step this cell runs
    /// (zero-based, counted across protocols).
    #[must_use]
    pub const fn diverging_at(mut self, step: usize) -> Self {
        self.diverge_at = Some(step);
        self
    }

    /// Total steps attempted so far.
    #[must_use]
    pub const fn steps_run(&self) -> usize {
        self.steps_run
    }

    /// Current state of charge, `None` before the first step.
    #[must_use]
    pub fn state_of_charge(&self) -> Option<f64> {
        self.state.map(|s| s.soc)
    }
}

impl CellSimulator for ReferenceCell {
    fn simulate_step(
        &mut self,
        step: &ChargeStep,
        parameters: &ParameterSet,
        start_time: f64,
    ) -> Result<Segment> {
        let c = Constants::from_parameters(parameters);
        let index = self.steps_run;
        self.steps_run += 1;
        if !(c.dt.is_finite() && c.dt > 0.0) {
            return Err(Error::SolverDivergence {
                step_index: index,
                reason: format!("time step must be positive, got {} s", c.dt),
                partial: Segment::new(),
            });
        }
        let diverge = self.diverge_at == Some(index);
        if diverge {
            self.diverge_at = None;
        }

        let state = self.state.get_or_insert_with(|| {
            let sei = parameters.get_or(keys::INITIAL_SEI, 5e-9);
            CellState {
                soc: parameters.get_or(keys::INITIAL_SOC, 0.5),
                sei,
                initial_sei: sei,
                discharged_ah: 0.0,
            }
        });

        let amps = step
            .setpoint()
            .and_then(|s| s.current_amps(c.capacity))
            .unwrap_or(0.0);
        let hold_voltage = match step.setpoint() {
            Some(Setpoint::Voltage(v)) => Some(v),
            _ => None,
        };
        let deadline = match (step.max_duration(), step.stop()) {
            (Some(d), Some(s)) if s.kind() == StopKind::Time => Some(d.min(s.value())),
            (Some(d), _) => Some(d),
            (None, Some(s)) if s.kind() == StopKind::Time => Some(s.value()),
            (None, _) => None,
        };

        let mut rec = Recorder::default();
        let mut elapsed = 0.0_f64;
        let mut samples = 0_usize;

        loop {
            let dt = deadline.map_or(c.dt, |d| c.dt.min(d - elapsed));
            let current = match step.action() {
                Action::Charge => -amps,
                Action::Discharge => amps,
                Action::Rest => 0.0,
                Action::Hold => (c.ocv(state.soc) - hold_voltage.unwrap_or(c.ocv_full)) / c.resistance,
            };

            state.soc = (state.soc - current * dt / (3600.0 * c.capacity)).clamp(0.0, 1.0);
            state.discharged_ah += current * dt / 3600.0;
            state.sei += c
                .sei_charge_growth
                .mul_add((-current).max(0.0), c.sei_calendar_growth)
                * dt;
            elapsed += dt;
            samples += 1;

            let voltage = hold_voltage.unwrap_or_else(|| current.mul_add(-c.resistance, c.ocv(state.soc)));
            let t = start_time + elapsed;
            rec.current.push(t, current);
            rec.voltage.push(t, voltage);
            rec.capacity.push(t, state.discharged_ah);
            rec.sei.push(t, state.sei);
            rec.lithium
                .push(t, -(state.sei - state.initial_sei) * c.lithium_per_sei);

            let stopped = step.stop().is_some_and(|s| match s.kind() {
                StopKind::Voltage => match step.action() {
                    Action::Charge => voltage >= s.value(),
                    Action::Discharge => voltage <= s.value(),
                    Action::Rest | Action::Hold => false,
                },
                StopKind::Current => current.abs() <= s.value(),
                StopKind::Time => elapsed >= s.value() - 1e-9,
            });
            let timed_out = deadline.is_some_and(|d| elapsed >= d - 1e-9);
            if stopped || timed_out {
                return Ok(rec.into_segment());
            }

            if diverge && samples >= DIVERGENCE_SAMPLES {
                return Err(Error::SolverDivergence {
                    step_index: index,
                    reason: format!("scheduled divergence during '{step}'"),
                    partial: rec.into_segment(),
                });
            }
            if elapsed >= c.max_step {
                return Err(Error::SolverDivergence {
                    step_index: index,
                    reason: format!(
                        "'{step}' did not reach its stop condition within {} s",
                        c.max_step
                    ),
                    partial: rec.into_segment(),
                });
            }
        }
    }
}
