//! Parameter Set - named physical constants handed to the simulator

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named mapping of constants consumed only by the simulator.
///
/// The pipeline treats it as opaque; each simulator documents the keys it
/// reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    name: String,
    values: BTreeMap<String, f64>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Set a value, returning the updated set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Set a value in place.
    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Get the parameter set name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Get a value, falling back to `default` when absent.
    #[must_use]
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_and_get() {
        let params = ParameterSet::new("cell")
            .with("Cell capacity [A.h]", 1.0)
            .with("Internal resistance [Ohm]", 0.05);

        assert_eq!(params.name(), "cell");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("Cell capacity [A.h]"), Some(1.0));
        assert!((params.get_or("missing", 3.5) - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_overwrites_and_iterates_in_key_order() {
        let mut params = ParameterSet::new("cell").with("b", 2.0).with("a", 1.0);
        params.set("b", 5.0);
        params.set("c", 3.0);

        let pairs: Vec<(&str, f64)> = params.iter().collect();
        assert_eq!(pairs, vec![("a", 1.0), ("b", 5.0), ("c", 3.0)]);
        assert!(!params.is_empty());
    }
}
