//! # cycle-aging: Charging-Protocol Evaluation
//!
//! **Version**: 0.1.0
//!
//! Runs battery charging protocols through a cell simulator and ranks them by
//! how much degradation-layer (SEI) growth they cause per unit of charge
//! speed.
//!
//! ## Pipeline
//!
//! ```text
//! ProtocolSpec ──Driver + CellSimulator──> SimulationResult
//!                                              │
//!                              MetricExtractor (CC-CV or Pulsed window)
//!                                              │
//!                     MetricRecord ──> ResultStore ──> Comparison
//! ```
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke safety**: Protocols are validated before the solver runs
//! - **Jidoka**: Solver divergence stops one protocol, never the batch
//! - **Genchi Genbutsu**: Every run keeps its raw signals for inspection
//!
//! ## Example Usage
//!
//! ```rust
//! use cycle_aging::compare::Comparison;
//! use cycle_aging::driver::{Driver, ProtocolRun};
//! use cycle_aging::metrics::TimeUnit;
//! use cycle_aging::protocol::CcCvParams;
//! use cycle_aging::simulation::{ParameterSet, ReferenceCell};
//! use cycle_aging::store::ResultStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut driver = Driver::new(ReferenceCell::new(), ParameterSet::new("reference"));
//! let mut store = ResultStore::new();
//!
//! let plan = ProtocolRun::cccv("cccv_charging", &CcCvParams::default(), 1, 1.0);
//! let record = driver.run(&plan, &mut store)?;
//! assert!(record.charge_time() > 0.0);
//!
//! let comparison = Comparison::new(&store, TimeUnit::Minutes);
//! println!("{comparison}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod compare;
pub mod config;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod simulation;
pub mod store;

pub use error::{Error, Result};
