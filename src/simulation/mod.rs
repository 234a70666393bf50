//! Simulation interface
//!
//! The electrochemical solver lives outside this crate. It is reached
//! through the [`CellSimulator`] trait, which runs one [`ChargeStep`] at a
//! time so the driver can stop a repeated block as soon as its termination
//! condition holds.
//!
//! ## Failure contract
//!
//! A simulator that fails to converge returns [`Error::SolverDivergence`]
//! carrying the samples it produced for the failing step. The driver keeps
//! them and marks the [`SimulationResult`] incomplete instead of aborting
//! the batch. Any other error is treated as fatal for that protocol.
//!
//! [`Error::SolverDivergence`]: crate::Error::SolverDivergence

mod parameters;
mod reference;
mod result;
mod series;

pub use parameters::ParameterSet;
pub use reference::ReferenceCell;
pub use result::{SimulationResult, SimulationResultBuilder};
pub use series::TimeSeries;

use crate::protocol::ChargeStep;
use crate::Result;

/// Named signals produced by a single step, in no particular order.
pub type Segment = Vec<(String, TimeSeries)>;

/// Signal names shared by simulators and extractors.
pub mod signals {
    /// Cell current; positive on discharge, negative on charge.
    pub const CURRENT: &str = "Current [A]";
    /// Terminal voltage.
    pub const VOLTAGE: &str = "Terminal voltage [V]";
    /// Cumulative discharged capacity; falls while charging.
    pub const DISCHARGE_CAPACITY: &str = "Discharge capacity [A.h]";
    /// Electrode-averaged SEI thickness.
    pub const SEI_THICKNESS: &str = "X-averaged total negative electrode sei thickness [m]";
    /// Lithium consumed by SEI growth.
    pub const LITHIUM_LOSS: &str = "Loss of lithium to negative electrode sei [mol]";
}

/// Executes protocol steps against a cell model.
///
/// The model instance is shared by every protocol a driver runs and is not
/// reset between them; protocols start with a normalizing step instead.
/// Running protocols in parallel needs one simulator per protocol.
pub trait CellSimulator {
    /// Run one step starting at `start_time` seconds.
    ///
    /// Sample times in the returned segment are absolute (greater than
    /// `start_time`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SolverDivergence`] if the solver fails partway
    /// through the step.
    fn simulate_step(
        &mut self,
        step: &ChargeStep,
        parameters: &ParameterSet,
        start_time: f64,
    ) -> Result<Segment>;
}

impl<S: CellSimulator + ?Sized> CellSimulator for &mut S {
    fn simulate_step(
        &mut self,
        step: &ChargeStep,
        parameters: &ParameterSet,
        start_time: f64,
    ) -> Result<Segment> {
        (**self).simulate_step(step, parameters, start_time)
    }
}

impl<S: CellSimulator + ?Sized> CellSimulator for Box<S> {
    fn simulate_step(
        &mut self,
        step: &ChargeStep,
        parameters: &ParameterSet,
        start_time: f64,
    ) -> Result<Segment> {
        (**self).simulate_step(step, parameters, start_time)
    }
}
