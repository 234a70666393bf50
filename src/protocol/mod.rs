//! Charging protocols
//!
//! A [`ProtocolSpec`] is an ordered list of [`ChargeStep`]s, run once as a
//! preamble and then as a repeated block. Protocols are written either in
//! code or in the directive mini-language:
//!
//! ```rust
//! use cycle_aging::protocol::{ProtocolSpec, PulsedParams, Termination};
//!
//! let pulsed = ProtocolSpec::pulsed(
//!     "6C charge, 2s rest",
//!     &PulsedParams::default(),
//!     Some(Termination::ChargeDelivered { amp_hours: 0.8 }),
//! );
//! assert!(pulsed.validate().is_ok());
//! ```

mod directive;
mod families;
mod spec;
mod step;

pub use directive::{parse_directive, parse_directives};
pub use families::{CcCvParams, PulsedParams};
pub use spec::{ProtocolSpec, ProtocolSpecBuilder, Termination};
pub use step::{Action, ChargeStep, Setpoint, StopCondition, StopKind};
