//! Metric extraction
//!
//! Both protocol families share one computation; they differ only in how
//! the start and end of the charge are located ([`ChargeWindow`]).
//!
//! Locating a charge boundary by exact float equality against an
//! integrated, unevenly sampled signal is unreliable, so every match here is
//! `|sample - target| <= tolerance`. A locator that finds nothing reports
//! [`Error::SignalNotFound`] rather than guessing an index.

use serde::{Deserialize, Serialize};

use super::{MetricRecord, TimeUnit};
use crate::simulation::{signals, SimulationResult};
use crate::{Error, Result};

/// Absolute tolerances used when matching samples against a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalTolerance {
    /// Amperes
    pub current: f64,
    /// Volts
    pub voltage: f64,
}

impl Default for SignalTolerance {
    fn default() -> Self {
        Self {
            current: 1e-6,
            voltage: 1e-6,
        }
    }
}

/// Names of the signals the extractor reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalNames {
    /// Cell current (negative while charging)
    pub current: String,
    /// Terminal voltage
    pub voltage: String,
    /// Cumulative discharged capacity
    pub discharge_capacity: String,
    /// Degradation-layer thickness
    pub degradation: String,
}

impl Default for SignalNames {
    fn default() -> Self {
        Self {
            current: signals::CURRENT.to_string(),
            voltage: signals::VOLTAGE.to_string(),
            discharge_capacity: signals::DISCHARGE_CAPACITY.to_string(),
            degradation: signals::SEI_THICKNESS.to_string(),
        }
    }
}

/// Strategy for locating the charge interval in a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChargeWindow {
    /// Starts at the first sample at `-cc_current`, ends at the last
    /// sample at `cv_voltage`.
    CcCv {
        /// Constant-current magnitude (A)
        cc_current: f64,
        /// Constant-voltage level (V)
        cv_voltage: f64,
    },
    /// Starts and ends at the first and last samples at `-pulse_current`.
    Pulsed {
        /// Pulse current magnitude (A)
        pulse_current: f64,
    },
}

impl ChargeWindow {
    /// Locate `(start, end)` times in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSignal`], [`Error::EmptySignal`] or
    /// [`Error::SignalNotFound`].
    pub fn locate(
        &self,
        result: &SimulationResult,
        names: &SignalNames,
        tolerance: &SignalTolerance,
    ) -> Result<(f64, f64)> {
        let current = result.require_signal(&names.current)?;
        let not_found = |signal: &str, target: f64, tolerance: f64| Error::SignalNotFound {
            protocol: result.protocol_name().to_string(),
            signal: signal.to_string(),
            target,
            tolerance,
        };

        match *self {
            Self::CcCv {
                cc_current,
                cv_voltage,
            } => {
                let target = -cc_current;
                let start = current
                    .first_match(target, tolerance.current)
                    .and_then(|i| current.time_at(i))
                    .ok_or_else(|| not_found(&names.current, target, tolerance.current))?;

                let voltage = result.require_signal(&names.voltage)?;
                let end = voltage
                    .last_match(cv_voltage, tolerance.voltage)
                    .and_then(|i| voltage.time_at(i))
                    .ok_or_else(|| not_found(&names.voltage, cv_voltage, tolerance.voltage))?;
                Ok((start, end))
            }
            Self::Pulsed { pulse_current } => {
                let target = -pulse_current;
                let first = current.first_match(target, tolerance.current);
                let last = current.last_match(target, tolerance.current);
                match (first.and_then(|i| current.time_at(i)), last.and_then(|i| current.time_at(i))) {
                    (Some(start), Some(end)) => Ok((start, end)),
                    _ => Err(not_found(&names.current, target, tolerance.current)),
                }
            }
        }
    }
}

/// Turns simulation results into [`MetricRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct MetricExtractor {
    names: SignalNames,
    tolerance: SignalTolerance,
    time_unit: TimeUnit,
}

impl MetricExtractor {
    /// Create an extractor with default names, tolerances and hours.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the matching tolerances.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: SignalTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the time unit of charge time and speed.
    #[must_use]
    pub fn with_time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = unit;
        self
    }

    /// Set the signal names to read.
    #[must_use]
    pub fn with_signal_names(mut self, names: SignalNames) -> Self {
        self.names = names;
        self
    }

    /// Get the configured time unit.
    #[must_use]
    pub const fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    /// Get the signal names read by this extractor.
    #[must_use]
    pub const fn signal_names(&self) -> &SignalNames {
        &self.names
    }

    /// Compute metrics for one result.
    ///
    /// 1. locate charge start/end with `window`
    /// 2. charge time = end - start
    /// 3. charge capacity = max(discharge capacity) - last(discharge capacity)
    /// 4. degradation delta = peak-to-peak degradation signal
    ///
    /// Speed and degradation-per-speed are derived by
    /// [`MetricRecord::from_measurements`].
    ///
    /// # Errors
    ///
    /// Returns a locator error (see [`ChargeWindow::locate`]) or
    /// [`Error::UndefinedMetric`].
    ///
    /// # Example
    ///
    /// ```
    /// use cycle_aging::metrics::{ChargeWindow, MetricExtractor};
    /// use cycle_aging::simulation::{signals, SimulationResult, TimeSeries};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let h = 3600.0;
    /// let result = SimulationResult::builder("pulsed")
    ///     .signal(signals::CURRENT, TimeSeries::from_samples([(1.0 * h, -6.0), (1.2 * h, 0.0), (1.5 * h, -6.0)]))
    ///     .signal(signals::DISCHARGE_CAPACITY, TimeSeries::from_samples([(1.0 * h, 1.0), (1.5 * h, 0.2)]))
    ///     .signal(signals::SEI_THICKNESS, TimeSeries::from_samples([(1.0 * h, 5.0e-9), (1.5 * h, 5.1e-9)]))
    ///     .build();
    ///
    /// let record = MetricExtractor::new().extract(&result, &ChargeWindow::Pulsed { pulse_current: 6.0 })?;
    /// assert!((record.charge_time() - 0.5).abs() < 1e-12);
    /// # Ok(())
    /// # }
    /// ```
    pub fn extract(&self, result: &SimulationResult, window: &ChargeWindow) -> Result<MetricRecord> {
        let (start, end) = window.locate(result, &self.names, &self.tolerance)?;
        let charge_time = self.time_unit.convert_seconds(end - start);

        let capacity = result.require_signal(&self.names.discharge_capacity)?;
        let (Some(peak), Some(last)) = (capacity.max(), capacity.last_value()) else {
            return Err(Error::EmptySignal {
                protocol: result.protocol_name().to_string(),
                signal: self.names.discharge_capacity.clone(),
            });
        };
        let charge_capacity = peak - last;

        let degradation = result.require_signal(&self.names.degradation)?;
        let degradation_delta = degradation.peak_to_peak().ok_or_else(|| Error::EmptySignal {
            protocol: result.protocol_name().to_string(),
            signal: self.names.degradation.clone(),
        })?;

        MetricRecord::from_measurements(
            result.protocol_name(),
            charge_time,
            charge_capacity,
            degradation_delta,
            self.time_unit,
            result.is_complete(),
        )
    }
}
