//! Metric Record - scalar comparison metrics of one protocol run

use serde::{Deserialize, Serialize};

use super::TimeUnit;
use crate::{Error, Result};

/// Metric Record holds the comparison metrics extracted from one run.
///
/// ## Invariants
///
/// - `charge_time > 0`
/// - `charge_capacity >= 0`, `degradation_delta >= 0`
/// - `charge_speed = charge_capacity / charge_time` (A.h per `time_unit`)
/// - `degradation_per_speed = degradation_delta / charge_speed`
///
/// Records are only created through [`MetricRecord::from_measurements`],
/// which enforces these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    protocol_name: String,
    charge_time: f64,
    charge_capacity: f64,
    charge_speed: f64,
    degradation_delta: f64,
    degradation_per_speed: f64,
    time_unit: TimeUnit,
    complete: bool,
}

impl MetricRecord {
    /// Derive a record from raw measurements.
    ///
    /// # Arguments
    ///
    /// * `protocol_name` - Protocol the measurements came from
    /// * `charge_time` - Charge duration, in `time_unit`
    /// * `charge_capacity` - Charge delivered (A.h)
    /// * `degradation_delta` - Peak-to-peak SEI thickness (m)
    /// * `time_unit` - Unit of `charge_time`
    /// * `complete` - Whether the source simulation finished
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedMetric`] if `charge_time` is not positive,
    /// if a measurement is negative or non-finite, or if the charge speed
    /// is zero.
    pub fn from_measurements(
        protocol_name: impl Into<String>,
        charge_time: f64,
        charge_capacity: f64,
        degradation_delta: f64,
        time_unit: TimeUnit,
        complete: bool,
    ) -> Result<Self> {
        let protocol_name = protocol_name.into();
        let undefined = |reason: String| Error::UndefinedMetric {
            protocol: protocol_name.clone(),
            reason,
        };

        if !charge_time.is_finite() || charge_time <= 0.0 {
            return Err(undefined(format!(
                "charge time {charge_time} {time_unit} is not positive (charge end precedes start)"
            )));
        }
        if !charge_capacity.is_finite() || charge_capacity < 0.0 {
            return Err(undefined(format!("charge capacity {charge_capacity} A.h is invalid")));
        }
        if !degradation_delta.is_finite() || degradation_delta < 0.0 {
            return Err(undefined(format!(
                "degradation delta {degradation_delta} m is invalid"
            )));
        }

        let charge_speed = charge_capacity / charge_time;
        if charge_speed <= 0.0 {
            return Err(undefined(
                "charge speed is zero, degradation per speed is unbounded".to_string(),
            ));
        }

        Ok(Self {
            degradation_per_speed: degradation_delta / charge_speed,
            protocol_name,
            charge_time,
            charge_capacity,
            charge_speed,
            degradation_delta,
            time_unit,
            complete,
        })
    }

    /// Get the protocol name.
    #[must_use]
    pub fn protocol_name(&self) -> &str {
        &self.protocol_name
    }

    /// Get the charge time, in [`Self::time_unit`].
    #[must_use]
    pub const fn charge_time(&self) -> f64 {
        self.charge_time
    }

    /// Get the delivered charge (A.h).
    #[must_use]
    pub const fn charge_capacity(&self) -> f64 {
        self.charge_capacity
    }

    /// Get the time-averaged charge speed (A.h per time unit).
    #[must_use]
    pub const fn charge_speed(&self) -> f64 {
        self.charge_speed
    }

    /// Get the peak-to-peak SEI growth (m).
    #[must_use]
    pub const fn degradation_delta(&self) -> f64 {
        self.degradation_delta
    }

    /// Get SEI growth per unit of charge speed.
    #[must_use]
    pub const fn degradation_per_speed(&self) -> f64 {
        self.degradation_per_speed
    }

    /// Get the time unit of charge time and speed.
    #[must_use]
    pub const fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    /// Whether the source simulation ran to completion.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Re-express the record in another time unit.
    ///
    /// Degradation per speed scales by `to / from` seconds per unit; the
    /// ordering of records in the same unit is unchanged.
    #[must_use]
    pub fn in_time_unit(&self, unit: TimeUnit) -> Self {
        let factor = self.time_unit.seconds() / unit.seconds();
        let charge_time = self.charge_time * factor;
        let charge_speed = self.charge_capacity / charge_time;
        Self {
            protocol_name: self.protocol_name.clone(),
            charge_time,
            charge_capacity: self.charge_capacity,
            charge_speed,
            degradation_delta: self.degradation_delta,
            degradation_per_speed: self.degradation_delta / charge_speed,
            time_unit: unit,
            complete: self.complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_measurements_derives_ratios() {
        let record =
            MetricRecord::from_measurements("p", 0.5, 0.8, 2e-10, TimeUnit::Hours, true).unwrap();
        assert!((record.charge_speed() - 1.6).abs() < 1e-12);
        assert!((record.degradation_per_speed() - 1.25e-10).abs() < 1e-22);
        assert_eq!(record.time_unit(), TimeUnit::Hours);
        assert!(record.is_complete());
    }

    #[test]
    fn test_non_positive_charge_time_is_undefined() {
        for t in [0.0, -0.1, f64::NAN] {
            let err = MetricRecord::from_measurements("p", t, 1.0, 0.0, TimeUnit::Hours, true)
                .unwrap_err();
            assert!(matches!(err, Error::UndefinedMetric { .. }));
        }
    }

    #[test]
    fn test_zero_capacity_is_undefined() {
        assert!(MetricRecord::from_measurements("p", 1.0, 0.0, 1e-9, TimeUnit::Hours, true).is_err());
    }

    #[test]
    fn test_in_time_unit_scales_ratio() {
        let hours =
            MetricRecord::from_measurements("p", 0.5, 0.8, 2e-10, TimeUnit::Hours, true).unwrap();
        let seconds = hours.in_time_unit(TimeUnit::Seconds);
        assert!((seconds.charge_time() - 1800.0).abs() < 1e-9);
        let ratio = seconds.degradation_per_speed() / hours.degradation_per_speed();
        assert!((ratio - 3600.0).abs() < 1e-6);
    }
}
