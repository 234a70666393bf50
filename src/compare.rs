//! Protocol comparison
//!
//! Read-only view over a [`ResultStore`]. Records are first re-expressed in
//! a single [`TimeUnit`] so speeds and ratios are comparable, then ordered.
//! No winner is picked; the caller reads the rankings.
//!
//! Orderings use [`f64::total_cmp`] and break ties by protocol name, so the
//! same store always ranks the same way.

use std::cmp::Ordering;
use std::fmt;

use crate::metrics::{MetricRecord, TimeUnit};
use crate::store::ResultStore;

/// Sort order for a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest value first
    Ascending,
    /// Largest value first
    Descending,
}

/// Metric used to rank protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// SEI growth per unit of charge speed
    DegradationPerSpeed,
    /// Charge delivered per unit time
    ChargeSpeed,
    /// Charge duration
    ChargeTime,
    /// Peak-to-peak SEI growth
    DegradationDelta,
}

impl RankBy {
    fn value(self, record: &MetricRecord) -> f64 {
        match self {
            Self::DegradationPerSpeed => record.degradation_per_speed(),
            Self::ChargeSpeed => record.charge_speed(),
            Self::ChargeTime => record.charge_time(),
            Self::DegradationDelta => record.degradation_delta(),
        }
    }
}

/// Snapshot of the metric records of a batch, in one time unit.
#[derive(Debug, Clone)]
pub struct Comparison {
    records: Vec<MetricRecord>,
    time_unit: TimeUnit,
}

impl Comparison {
    /// Take a snapshot of every metric record in `store`.
    #[must_use]
    pub fn new(store: &ResultStore, time_unit: TimeUnit) -> Self {
        Self::from_records(store.all().map(|(_, record)| record), time_unit)
    }

    /// Build from any set of records.
    #[must_use]
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a MetricRecord>,
        time_unit: TimeUnit,
    ) -> Self {
        let records = records
            .into_iter()
            .map(|record| record.in_time_unit(time_unit))
            .collect();
        Self { records, time_unit }
    }

    /// Time unit every record is expressed in.
    #[must_use]
    pub const fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    /// Number of compared protocols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there is nothing to compare.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by `key`.
    #[must_use]
    pub fn rank(&self, key: RankBy, order: SortOrder) -> Vec<&MetricRecord> {
        let mut ranked: Vec<&MetricRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| {
            let by_value = key.value(a).total_cmp(&key.value(b));
            let by_value = match order {
                SortOrder::Ascending => by_value,
                SortOrder::Descending => by_value.reverse(),
            };
            match by_value {
                Ordering::Equal => a.protocol_name().cmp(b.protocol_name()),
                other => other,
            }
        });
        ranked
    }

    /// Least degradation per unit of charge speed first.
    #[must_use]
    pub fn by_degradation_per_speed(&self) -> Vec<&MetricRecord> {
        self.rank(RankBy::DegradationPerSpeed, SortOrder::Ascending)
    }

    /// Fastest charge first.
    #[must_use]
    pub fn by_charge_speed(&self) -> Vec<&MetricRecord> {
        self.rank(RankBy::ChargeSpeed, SortOrder::Descending)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.time_unit;
        let width = self
            .records
            .iter()
            .map(|r| r.protocol_name().len())
            .chain(std::iter::once("protocol".len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:<width$}  {:>12}  {:>12}  {:>14}  {:>12}  {:>16}  {}",
            "protocol",
            format!("time [{unit}]"),
            "charge [A.h]",
            format!("speed [A.h/{unit}]"),
            "SEI [m]",
            "SEI/speed",
            "complete",
        )?;
        for record in self.by_degradation_per_speed() {
            writeln!(
                f,
                "{:<width$}  {:>12.4}  {:>12.4}  {:>14.4}  {:>12.4e}  {:>16.4e}  {}",
                record.protocol_name(),
                record.charge_time(),
                record.charge_capacity(),
                record.charge_speed(),
                record.degradation_delta(),
                record.degradation_per_speed(),
                if record.is_complete() { "yes" } else { "partial" },
            )?;
        }
        Ok(())
    }
}
