//! Directive parsing
//!
//! Turns one line of the protocol mini-language into a [`ChargeStep`]:
//!
//! ```text
//! <Action> [at <setpoint><unit>] [for <duration><unit>] [[or] until <threshold><unit>]
//! ```
//!
//! - Action: `Charge`, `Discharge`, `Rest`, `Hold` (case-insensitive)
//! - setpoint unit: `C`, `A`, `mA`, `V`
//! - duration unit: `s`, `second(s)`, `min`, `minute(s)`, `h`, `hour(s)`
//! - threshold unit: `V`, `A`, `mA`
//!
//! Only the grammar is checked here. Semantic checks (rest with a setpoint,
//! unreachable stops) happen in [`ChargeStep::check`].

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::step::{Action, ChargeStep, Setpoint, StopCondition};
use crate::{Error, Result};

const NUMBER: &str = r"(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?";

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)^\s*(?P<action>charge|discharge|rest|hold)(?:\s+at\s+(?P<set>{NUMBER})\s*(?P<set_unit>ma|a|c|v))?(?:\s+for\s+(?P<dur>{NUMBER})\s*(?P<dur_unit>seconds?|s|minutes?|mins?|hours?|h))?(?:\s+(?:or\s+)?until\s+(?P<thr>{NUMBER})\s*(?P<thr_unit>ma|a|v))?\s*$"
    );
    Regex::new(&pattern).expect("directive pattern is a valid regex")
});

/// Parse a single directive into a step.
///
/// # Errors
///
/// Returns [`Error::ParseError`] if the text does not match the grammar.
///
/// # Example
///
/// ```
/// use cycle_aging::protocol::{parse_directive, Action};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let step = parse_directive("charge at 6C for 1 second or until 4.15V")?;
/// assert_eq!(step.action(), Action::Charge);
/// assert_eq!(step.max_duration(), Some(1.0));
/// # Ok(())
/// # }
/// ```
pub fn parse_directive(text: &str) -> Result<ChargeStep> {
    let caps = DIRECTIVE
        .captures(text)
        .ok_or_else(|| Error::ParseError(format!("unrecognized directive: '{}'", text.trim())))?;

    let action = match caps["action"].to_ascii_lowercase().as_str() {
        "charge" => Action::Charge,
        "discharge" => Action::Discharge,
        "rest" => Action::Rest,
        _ => Action::Hold,
    };

    let setpoint = match number(&caps, "set", text)? {
        None => None,
        Some(value) => Some(match unit(&caps, "set_unit").as_str() {
            "c" => Setpoint::CRate(value),
            "a" => Setpoint::Current(value),
            "ma" => Setpoint::Current(value / 1000.0),
            _ => Setpoint::Voltage(value),
        }),
    };

    let mut step = ChargeStep::new(action, setpoint);

    if let Some(value) = number(&caps, "dur", text)? {
        let unit = unit(&caps, "dur_unit");
        let seconds = if unit.starts_with('h') {
            value * 3600.0
        } else if unit.starts_with('m') {
            value * 60.0
        } else {
            value
        };
        step = step.for_at_most(seconds);
    }

    if let Some(value) = number(&caps, "thr", text)? {
        let stop = match unit(&caps, "thr_unit").as_str() {
            "v" => StopCondition::voltage(value),
            "a" => StopCondition::current(value),
            _ => StopCondition::current(value / 1000.0),
        };
        step = step.until(stop);
    }

    Ok(step)
}

/// Parse a list of directives, preserving order.
///
/// # Errors
///
/// Returns the first [`Error::ParseError`] encountered.
pub fn parse_directives<S: AsRef<str>>(lines: &[S]) -> Result<Vec<ChargeStep>> {
    lines.iter().map(|l| parse_directive(l.as_ref())).collect()
}

fn number(caps: &Captures<'_>, name: &str, text: &str) -> Result<Option<f64>> {
    caps.name(name)
        .map(|m| {
            m.as_str().parse::<f64>().map_err(|e| {
                Error::ParseError(format!("bad number '{}' in '{}': {e}", m.as_str(), text.trim()))
            })
        })
        .transpose()
}

fn unit(caps: &Captures<'_>, name: &str) -> String {
    caps.name(name)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default()
}
