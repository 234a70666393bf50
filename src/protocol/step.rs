//! Charge Step - one instruction of a cycling protocol

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the cell is asked to do during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Drive current into the cell.
    Charge,
    /// Draw current from the cell.
    Discharge,
    /// Open circuit, zero current.
    Rest,
    /// Hold the terminal voltage constant.
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Charge => "Charge",
            Self::Discharge => "Discharge",
            Self::Rest => "Rest",
            Self::Hold => "Hold",
        };
        f.write_str(name)
    }
}

/// The quantity a step is driven at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Setpoint {
    /// Multiple of the nominal capacity per hour.
    CRate(f64),
    /// Absolute current magnitude in amperes.
    Current(f64),
    /// Terminal voltage in volts.
    Voltage(f64),
}

impl Setpoint {
    /// Current magnitude in amperes for a cell of the given nominal capacity.
    ///
    /// Returns `None` for a voltage setpoint.
    #[must_use]
    pub fn current_amps(self, nominal_capacity_ah: f64) -> Option<f64> {
        match self {
            Self::CRate(rate) => Some(rate * nominal_capacity_ah),
            Self::Current(amps) => Some(amps),
            Self::Voltage(_) => None,
        }
    }

    const fn magnitude(self) -> f64 {
        match self {
            Self::CRate(v) | Self::Current(v) | Self::Voltage(v) => v,
        }
    }
}

impl fmt::Display for Setpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CRate(rate) => write!(f, "{rate}C"),
            Self::Current(amps) => write!(f, "{amps}A"),
            Self::Voltage(volts) => write!(f, "{volts}V"),
        }
    }
}

/// Quantity a stop condition watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopKind {
    /// Terminal voltage reaches the value (rising for charge, falling for discharge).
    Voltage,
    /// Elapsed step time in seconds reaches the value.
    Time,
    /// Current magnitude falls to the value (amperes).
    Current,
}

/// Condition that ends a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopCondition {
    kind: StopKind,
    value: f64,
}

impl StopCondition {
    /// Stop when the terminal voltage reaches `volts`.
    #[must_use]
    pub const fn voltage(volts: f64) -> Self {
        Self {
            kind: StopKind::Voltage,
            value: volts,
        }
    }

    /// Stop after `seconds` of step time.
    #[must_use]
    pub const fn time(seconds: f64) -> Self {
        Self {
            kind: StopKind::Time,
            value: seconds,
        }
    }

    /// Stop when the current magnitude drops to `amps`.
    #[must_use]
    pub const fn current(amps: f64) -> Self {
        Self {
            kind: StopKind::Current,
            value: amps,
        }
    }

    /// Get the watched quantity.
    #[must_use]
    pub const fn kind(&self) -> StopKind {
        self.kind
    }

    /// Get the threshold value (V, s or A depending on kind).
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

impl fmt::Display for StopCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StopKind::Voltage => write!(f, "{}V", self.value),
            StopKind::Current => write!(f, "{}A", self.value),
            StopKind::Time => write!(f, "{}", Duration(self.value)),
        }
    }
}

/// A single protocol step.
///
/// Steps are immutable once built; the `until`/`for_at_most` combinators
/// consume the step and return a new one. When both a stop condition and a
/// duration cap are present, whichever is reached first ends the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeStep {
    action: Action,
    setpoint: Option<Setpoint>,
    stop: Option<StopCondition>,
    max_duration: Option<f64>,
}

impl ChargeStep {
    /// Create a step with no termination yet.
    #[must_use]
    pub const fn new(action: Action, setpoint: Option<Setpoint>) -> Self {
        Self {
            action,
            setpoint,
            stop: None,
            max_duration: None,
        }
    }

    /// Charge at a C-rate.
    #[must_use]
    pub const fn charge(c_rate: f64) -> Self {
        Self::new(Action::Charge, Some(Setpoint::CRate(c_rate)))
    }

    /// Discharge at a C-rate.
    #[must_use]
    pub const fn discharge(c_rate: f64) -> Self {
        Self::new(Action::Discharge, Some(Setpoint::CRate(c_rate)))
    }

    /// Hold the terminal voltage.
    #[must_use]
    pub const fn hold(volts: f64) -> Self {
        Self::new(Action::Hold, Some(Setpoint::Voltage(volts)))
    }

    /// Rest for a fixed time.
    #[must_use]
    pub const fn rest(seconds: f64) -> Self {
        Self::new(Action::Rest, None).for_at_most(seconds)
    }

    /// Attach a stop condition.
    #[must_use]
    pub const fn until(mut self, stop: StopCondition) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Attach a duration cap in seconds.
    #[must_use]
    pub const fn for_at_most(mut self, seconds: f64) -> Self {
        self.max_duration = Some(seconds);
        self
    }

    /// Get the action.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Get the setpoint, if any.
    #[must_use]
    pub const fn setpoint(&self) -> Option<Setpoint> {
        self.setpoint
    }

    /// Get the stop condition, if any.
    #[must_use]
    pub const fn stop(&self) -> Option<StopCondition> {
        self.stop
    }

    /// Get the duration cap in seconds, if any.
    #[must_use]
    pub const fn max_duration(&self) -> Option<f64> {
        self.max_duration
    }

    /// Whether this step ends at a voltage threshold, i.e. leaves the cell
    /// in a known state.
    #[must_use]
    pub fn normalizes(&self) -> bool {
        matches!(self.action, Action::Charge | Action::Discharge)
            && self.stop.is_some_and(|s| s.kind == StopKind::Voltage)
    }

    /// Check the step for values and combinations the simulator cannot run.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the step is malformed.
    pub fn check(&self) -> std::result::Result<(), String> {
        if let Some(setpoint) = self.setpoint {
            let v = setpoint.magnitude();
            if !v.is_finite() || v <= 0.0 {
                return Err(format!("{self}: setpoint must be positive and finite"));
            }
        }
        if let Some(stop) = self.stop {
            if !stop.value.is_finite() || stop.value <= 0.0 {
                return Err(format!("{self}: stop threshold must be positive and finite"));
            }
        }
        if let Some(d) = self.max_duration {
            if !d.is_finite() || d <= 0.0 {
                return Err(format!("{self}: duration must be positive and finite"));
            }
        }
        if self.stop.is_none() && self.max_duration.is_none() {
            return Err(format!("{self}: step never terminates (no stop condition or duration)"));
        }

        match self.action {
            Action::Rest => {
                if self.setpoint.is_some() {
                    return Err(format!("{self}: rest takes no setpoint"));
                }
                if self.stop.is_some_and(|s| s.kind != StopKind::Time) {
                    return Err(format!("{self}: rest can only end on time"));
                }
            }
            Action::Hold => {
                if !matches!(self.setpoint, Some(Setpoint::Voltage(_))) {
                    return Err(format!("{self}: hold requires a voltage setpoint"));
                }
                if self.stop.is_some_and(|s| s.kind == StopKind::Voltage) {
                    return Err(format!("{self}: voltage stop is unreachable while holding voltage"));
                }
            }
            Action::Charge | Action::Discharge => {
                match self.setpoint {
                    None => return Err(format!("{self}: missing current or C-rate setpoint")),
                    Some(Setpoint::Voltage(_)) => {
                        return Err(format!("{self}: use Hold for a voltage setpoint"));
                    }
                    Some(_) => {}
                }
                // constant current never tapers
                if self.stop.is_some_and(|s| s.kind == StopKind::Current)
                    && self.max_duration.is_none()
                {
                    return Err(format!(
                        "{self}: current stop is unreachable at constant current"
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ChargeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action)?;
        if let Some(setpoint) = self.setpoint {
            write!(f, " at {setpoint}")?;
        }
        if let Some(d) = self.max_duration {
            write!(f, " for {}", Duration(d))?;
        }
        if let Some(stop) = self.stop {
            let joiner = if self.max_duration.is_some() { " or" } else { "" };
            write!(f, "{joiner} until {stop}")?;
        }
        Ok(())
    }
}

/// Renders seconds in the largest whole unit.
struct Duration(f64);

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        if s >= 3600.0 && (s % 3600.0) == 0.0 {
            write!(f, "{} hours", s / 3600.0)
        } else if s >= 60.0 && (s % 60.0) == 0.0 {
            write!(f, "{} minutes", s / 60.0)
        } else {
            write!(f, "{s} s")
        }
    }
}
