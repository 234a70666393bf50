//! Time Series - non-uniformly sampled signal

use serde::{Deserialize, Serialize};

/// Ordered `(time, value)` samples of one signal.
///
/// Times are seconds since the start of the protocol run and never
/// decrease. Spacing is whatever the solver chose, so nothing here assumes
/// a fixed step.
///
/// Non-finite samples (a diverging solver produces them) serialize as the
/// strings `"NaN"`, `"inf"` and `"-inf"`, since JSON has no number for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(with = "non_finite")]
    times: Vec<f64>,
    #[serde(with = "non_finite")]
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Create a series from `(time, value)` pairs.
    #[must_use]
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (times, values) = samples.into_iter().unzip();
        Self { times, values }
    }

    /// Append one sample.
    pub fn push(&mut self, time: f64, value: f64) {
        debug_assert!(
            self.times.last().map_or(true, |&last| time >= last),
            "time went backwards: {time}"
        );
        self.times.push(time);
        self.values.push(value);
    }

    /// Append every sample of `other`.
    pub fn extend_from(&mut self, other: &Self) {
        self.times.extend_from_slice(&other.times);
        self.values.extend_from_slice(&other.values);
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Check if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sample times in seconds.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(time, value)` pairs.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Time of the sample at `index`.
    #[must_use]
    pub fn time_at(&self, index: usize) -> Option<f64> {
        self.times.get(index).copied()
    }

    /// Time of the last sample.
    #[must_use]
    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Value of the last sample.
    #[must_use]
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Largest value (NaN samples are skipped).
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
    }

    /// Smallest value (NaN samples are skipped).
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::min)
    }

    /// `max - min` over the whole series.
    #[must_use]
    pub fn peak_to_peak(&self) -> Option<f64> {
        Some(self.max()? - self.min()?)
    }

    /// Largest value among samples taken strictly after `time`.
    #[must_use]
    pub fn max_after(&self, time: f64) -> Option<f64> {
        self.samples()
            .filter(|&(t, v)| t > time && !v.is_nan())
            .map(|(_, v)| v)
            .reduce(f64::max)
    }

    /// Index of the first sample within `tolerance` of `target`.
    #[must_use]
    pub fn first_match(&self, target: f64, tolerance: f64) -> Option<usize> {
        self.values
            .iter()
            .position(|&v| (v - target).abs() <= tolerance)
    }

    /// Index of the last sample within `tolerance` of `target`.
    #[must_use]
    pub fn last_match(&self, target: f64, tolerance: f64) -> Option<usize> {
        self.values
            .iter()
            .rposition(|&v| (v - target).abs() <= tolerance)
    }
}

mod non_finite {
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Sample {
        Number(f64),
        Label(String),
    }

    fn label(value: f64) -> &'static str {
        if value.is_nan() {
            "NaN"
        } else if value.is_sign_positive() {
            "inf"
        } else {
            "-inf"
        }
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for &value in values {
            if value.is_finite() {
                seq.serialize_element(&value)?;
            } else {
                seq.serialize_element(label(value))?;
            }
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Sample>::deserialize(deserializer)?
            .into_iter()
            .map(|sample| match sample {
                Sample::Number(value) => Ok(value),
                Sample::Label(text) => match text.as_str() {
                    "NaN" => Ok(f64::NAN),
                    "inf" => Ok(f64::INFINITY),
                    "-inf" => Ok(f64::NEG_INFINITY),
                    other => Err(D::Error::custom(format!("not a sample value: '{other}'"))),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> TimeSeries {
        TimeSeries::from_samples([(0.0, 1.0), (1.0, -4.0), (2.5, -4.0000001), (4.0, 0.0)])
    }

    #[test]
    fn test_extrema() {
        let s = series();
        assert_eq!(s.max(), Some(1.0));
        assert_eq!(s.min(), Some(-4.0000001));
        assert!((s.peak_to_peak().unwrap() - 5.0000001).abs() < 1e-12);
        assert_eq!(TimeSeries::new().peak_to_peak(), None);
    }

    #[test]
    fn test_tolerant_matching() {
        let s = series();
        assert_eq!(s.first_match(-4.0, 0.0), Some(1));
        assert_eq!(s.last_match(-4.0, 0.0), Some(1));
        assert_eq!(s.last_match(-4.0, 1e-6), Some(2));
        assert_eq!(s.first_match(7.0, 1e-6), None);
    }

    #[test]
    fn test_max_after() {
        let s = series();
        assert_eq!(s.max_after(0.0), Some(0.0));
        assert_eq!(s.max_after(4.0), None);
    }

    #[test]
    fn test_json_keeps_non_finite_samples() {
        let s = TimeSeries::from_samples([(0.0, 4.0), (1.0, f64::NAN), (2.0, f64::NEG_INFINITY)]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"times":[0.0,1.0,2.0],"values":[4.0,"NaN","-inf"]}"#);

        let loaded: TimeSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.times(), s.times());
        assert_eq!(loaded.values()[0], 4.0);
        assert!(loaded.values()[1].is_nan());
        assert_eq!(loaded.values()[2], f64::NEG_INFINITY);

        assert!(serde_json::from_str::<TimeSeries>(r#"{"times":[0.0],"values":["x"]}"#).is_err());
    }

    #[test]
    fn test_extend_from() {
        let mut s = series();
        s.extend_from(&TimeSeries::from_samples([(5.0, 2.0)]));
        assert_eq!(s.len(), 5);
        assert_eq!(s.last_time(), Some(5.0));
        assert_eq!(s.last_value(), Some(2.0));
    }
}
