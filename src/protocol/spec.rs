//! Protocol Spec - named, possibly repeated step sequence

use serde::{Deserialize, Serialize};

use super::directive::parse_directives;
use super::step::ChargeStep;
use crate::{Error, Result};

/// Condition that ends the repeated block early.
///
/// Checked by the driver after every repetition; `repeat_count` stays the
/// hard upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Termination {
    /// Stop once this much charge (A.h) has gone back into the cell since
    /// the repeated block started.
    ChargeDelivered {
        /// Target charge in ampere-hours
        amp_hours: f64,
    },
    /// Stop once the terminal voltage reached this ceiling during a
    /// repetition.
    VoltageCeiling {
        /// Ceiling in volts
        volts: f64,
    },
}

impl Termination {
    const fn threshold(self) -> f64 {
        match self {
            Self::ChargeDelivered { amp_hours } => amp_hours,
            Self::VoltageCeiling { volts } => volts,
        }
    }
}

/// Declarative protocol: optional preamble, then `steps` repeated
/// `repeat_count` times.
///
/// Construct with [`ProtocolSpec::new`], [`ProtocolSpec::builder`], the
/// directive constructor [`ProtocolSpec::from_directives`], or one of the
/// families in [`super::families`]. Nothing is validated at construction;
/// [`ProtocolSpec::validate`] runs before any simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSpec {
    name: String,
    #[serde(default)]
    preamble: Vec<ChargeStep>,
    steps: Vec<ChargeStep>,
    repeat_count: u32,
    #[serde(default)]
    termination: Option<Termination>,
}

impl ProtocolSpec {
    /// Create a protocol without preamble or termination.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<ChargeStep>, repeat_count: u32) -> Self {
        Self {
            name: name.into(),
            preamble: Vec::new(),
            steps,
            repeat_count,
            termination: None,
        }
    }

    /// Create a builder for a protocol with optional fields.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ProtocolSpecBuilder {
        ProtocolSpecBuilder::new(name)
    }

    /// Build a protocol from directive text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if any line is malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use cycle_aging::protocol::ProtocolSpec;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let spec = ProtocolSpec::from_directives(
    ///     "cccv_charging",
    ///     &["Charge at 2C until 4.2V"],
    ///     &[
    ///         "discharge at 2C until 2.1V",
    ///         "charge at 4C until 3.78V",
    ///         "hold at 4.1V until 20mA",
    ///         "Rest for 5 minutes",
    ///     ],
    ///     1,
    /// )?;
    /// spec.validate()?;
    /// assert_eq!(spec.planned_step_count(), 5);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_directives<S: AsRef<str>>(
        name: impl Into<String>,
        preamble: &[S],
        block: &[S],
        repeat_count: u32,
    ) -> Result<Self> {
        Ok(Self::builder(name)
            .preamble(parse_directives(preamble)?)
            .steps(parse_directives(block)?)
            .repeat_count(repeat_count)
            .build())
    }

    /// Get the protocol name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the steps run once before the repeated block.
    #[must_use]
    pub fn preamble(&self) -> &[ChargeStep] {
        &self.preamble
    }

    /// Get the repeated block.
    #[must_use]
    pub fn steps(&self) -> &[ChargeStep] {
        &self.steps
    }

    /// Get the number of repetitions of the block.
    #[must_use]
    pub const fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Get the early-termination condition, if any.
    #[must_use]
    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Total number of steps if the block runs `repeat_count` times.
    #[must_use]
    pub fn planned_step_count(&self) -> usize {
        self.preamble.len() + self.steps.len() * self.repeat_count as usize
    }

    /// All steps in execution order, ignoring early termination.
    pub fn planned_steps(&self) -> impl Iterator<Item = &ChargeStep> + '_ {
        self.preamble.iter().chain(
            (0..self.repeat_count).flat_map(move |_| self.steps.iter()),
        )
    }

    /// Reject malformed protocols before they reach a simulator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when:
    /// - the name is blank
    /// - the repeated block is empty or `repeat_count` is zero
    /// - any step fails [`ChargeStep::check`]
    /// - the protocol does not start with a normalizing step
    /// - the termination threshold is not positive and finite
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("", "protocol name is empty"));
        }
        if self.steps.is_empty() {
            return Err(Error::configuration(&self.name, "step list is empty"));
        }
        if self.repeat_count == 0 {
            return Err(Error::configuration(
                &self.name,
                "repeat count must be at least 1",
            ));
        }
        for step in self.preamble.iter().chain(&self.steps) {
            step.check()
                .map_err(|reason| Error::configuration(&self.name, reason))?;
        }
        let first = self.preamble.first().unwrap_or(&self.steps[0]);
        if !first.normalizes() {
            return Err(Error::configuration(
                &self.name,
                format!("first step '{first}' must charge or discharge to a voltage to normalize the cell state"),
            ));
        }
        if let Some(termination) = self.termination {
            let v = termination.threshold();
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::configuration(
                    &self.name,
                    "termination threshold must be positive and finite",
                ));
            }
        }
        Ok(())
    }
}

/// Builder for `ProtocolSpec`.
#[derive(Debug)]
pub struct ProtocolSpecBuilder {
    name: String,
    preamble: Vec<ChargeStep>,
    steps: Vec<ChargeStep>,
    repeat_count: u32,
    termination: Option<Termination>,
}

impl ProtocolSpecBuilder {
    /// Create a new builder; repeat count defaults to 1.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preamble: Vec::new(),
            steps: Vec::new(),
            repeat_count: 1,
            termination: None,
        }
    }

    /// Set the steps run once up front.
    #[must_use]
    pub fn preamble(mut self, steps: Vec<ChargeStep>) -> Self {
        self.preamble = steps;
        self
    }

    /// Set the repeated block.
    #[must_use]
    pub fn steps(mut self, steps: Vec<ChargeStep>) -> Self {
        self.steps = steps;
        self
    }

    /// Append one step to the repeated block.
    #[must_use]
    pub fn step(mut self, step: ChargeStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Set the number of repetitions.
    #[must_use]
    pub fn repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    /// Stop repeating once the condition holds.
    #[must_use]
    pub fn terminate_when(mut self, termination: Termination) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Build the `ProtocolSpec`.
    #[must_use]
    pub fn build(self) -> ProtocolSpec {
        ProtocolSpec {
            name: self.name,
            preamble: self.preamble,
            steps: self.steps,
            repeat_count: self.repeat_count,
            termination: self.termination,
        }
    }
}
