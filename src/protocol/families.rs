//! Protocol families: CC-CV baseline and pulsed charging
//!
//! Defaults reproduce the reference experiments run against a 1 A.h cell:
//! 2C normalize to 4.2V, 2C discharge to 2.1V, then either a CC-CV charge
//! (4C to 3.78V, hold 4.1V to 20mA, 5 minute rest) or 1 s pulses with a
//! 4.15V ceiling.

use serde::{Deserialize, Serialize};

use super::spec::{ProtocolSpec, Termination};
use super::step::{ChargeStep, StopCondition};

/// Parameters of the CC-CV baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CcCvParams {
    /// C-rate of the normalizing charge
    pub normalize_rate: f64,
    /// Voltage the normalizing charge stops at
    pub normalize_voltage: f64,
    /// C-rate of the discharge leg
    pub discharge_rate: f64,
    /// Low-voltage cutoff of the discharge leg
    pub discharge_cutoff: f64,
    /// C-rate of the constant-current leg
    pub charge_rate: f64,
    /// Voltage that ends the constant-current leg
    pub charge_cutoff: f64,
    /// Constant-voltage hold level
    pub hold_voltage: f64,
    /// Current (A) that ends the hold
    pub hold_cutoff_current: f64,
    /// Rest after each cycle, seconds
    pub rest_seconds: f64,
}

impl Default for CcCvParams {
    fn default() -> Self {
        Self {
            normalize_rate: 2.0,
            normalize_voltage: 4.2,
            discharge_rate: 2.0,
            discharge_cutoff: 2.1,
            charge_rate: 4.0,
            charge_cutoff: 3.78,
            hold_voltage: 4.1,
            hold_cutoff_current: 0.02,
            rest_seconds: 300.0,
        }
    }
}

/// Parameters of a pulsed charge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulsedParams {
    /// C-rate of the normalizing charge
    pub normalize_rate: f64,
    /// Voltage the normalizing charge stops at
    pub normalize_voltage: f64,
    /// C-rate of the discharge before pulsing
    pub discharge_rate: f64,
    /// Low-voltage cutoff of that discharge
    pub discharge_cutoff: f64,
    /// C-rate of each pulse
    pub pulse_rate: f64,
    /// Pulse length, seconds
    pub pulse_seconds: f64,
    /// Rest between pulses, seconds
    pub rest_seconds: f64,
    /// Voltage that cuts a pulse short
    pub voltage_ceiling: f64,
    /// Upper bound on the number of pulses
    pub max_pulses: u32,
}

impl Default for PulsedParams {
    fn default() -> Self {
        Self {
            normalize_rate: 2.0,
            normalize_voltage: 4.2,
            discharge_rate: 2.0,
            discharge_cutoff: 2.1,
            pulse_rate: 6.0,
            pulse_seconds: 1.0,
            rest_seconds: 2.0,
            voltage_ceiling: 4.15,
            max_pulses: 1600,
        }
    }
}

impl PulsedParams {
    /// Fraction of each period spent charging.
    #[must_use]
    pub fn duty_cycle(&self) -> f64 {
        self.pulse_seconds / (self.pulse_seconds + self.rest_seconds)
    }
}

impl ProtocolSpec {
    /// CC-CV baseline: normalize, then `cycles` × {discharge, CC charge,
    /// CV hold, rest}.
    #[must_use]
    pub fn cccv(name: impl Into<String>, params: &CcCvParams, cycles: u32) -> Self {
        Self::builder(name)
            .preamble(vec![ChargeStep::charge(params.normalize_rate)
                .until(StopCondition::voltage(params.normalize_voltage))])
            .steps(vec![
                ChargeStep::discharge(params.discharge_rate)
                    .until(StopCondition::voltage(params.discharge_cutoff)),
                ChargeStep::charge(params.charge_rate)
                    .until(StopCondition::voltage(params.charge_cutoff)),
                ChargeStep::hold(params.hold_voltage)
                    .until(StopCondition::current(params.hold_cutoff_current)),
                ChargeStep::rest(params.rest_seconds),
            ])
            .repeat_count(cycles)
            .build()
    }

    /// Pulsed charge: normalize, discharge, then up to `max_pulses` ×
    /// {pulse, rest}, ending early once `termination` holds.
    ///
    /// Without a termination the block runs `max_pulses` times, which is
    /// only an estimate of when the cell is full.
    #[must_use]
    pub fn pulsed(
        name: impl Into<String>,
        params: &PulsedParams,
        termination: Option<Termination>,
    ) -> Self {
        let mut builder = Self::builder(name)
            .preamble(vec![
                ChargeStep::charge(params.normalize_rate)
                    .until(StopCondition::voltage(params.normalize_voltage)),
                ChargeStep::discharge(params.discharge_rate)
                    .until(StopCondition::voltage(params.discharge_cutoff)),
            ])
            .steps(vec![
                ChargeStep::charge(params.pulse_rate)
                    .for_at_most(params.pulse_seconds)
                    .until(StopCondition::voltage(params.voltage_ceiling)),
                ChargeStep::rest(params.rest_seconds),
            ])
            .repeat_count(params.max_pulses);
        if let Some(termination) = termination {
            builder = builder.terminate_when(termination);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Action;

    #[test]
    fn test_cccv_layout() {
        let spec = ProtocolSpec::cccv("cccv_chargingx4", &CcCvParams::default(), 4);
        spec.validate().unwrap();
        assert_eq!(spec.preamble().len(), 1);
        assert_eq!(spec.steps().len(), 4);
        assert_eq!(spec.planned_step_count(), 17);
        assert_eq!(spec.steps()[2].action(), Action::Hold);
        assert_eq!(
            spec.steps()[3].to_string(),
            "Rest for 5 minutes"
        );
    }

    #[test]
    fn test_pulsed_layout() {
        let params = PulsedParams::default();
        let spec = ProtocolSpec::pulsed(
            "6C charge, 2s rest",
            &params,
            Some(Termination::VoltageCeiling { volts: 4.15 }),
        );
        spec.validate().unwrap();
        assert_eq!(spec.repeat_count(), 1600);
        assert_eq!(
            spec.steps()[0].to_string(),
            "Charge at 6C for 1 s or until 4.15V"
        );
        assert!(spec.termination().is_some());
    }

    #[test]
    fn test_duty_cycle() {
        let params = PulsedParams::default();
        assert!((params.duty_cycle() - 1.0 / 3.0).abs() < 1e-12);

        let half = PulsedParams {
            pulse_rate: 4.0,
            rest_seconds: 1.0,
            ..PulsedParams::default()
        };
        assert!((half.duty_cycle() - 0.5).abs() < 1e-12);
    }
}
