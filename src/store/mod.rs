//! Result storage
//!
//! ## Schema Overview
//!
//! ```text
//! protocol name ──┬── RunRecord        (status, timestamps, step counts)
//!                 ├── SimulationResult (raw signals, possibly partial)
//!                 ├── MetricRecord     (only if extraction succeeded)
//!                 └── ArtifactRecord   (only if an ArtifactSink is set)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use cycle_aging::metrics::{MetricRecord, TimeUnit};
//! use cycle_aging::store::{ResultStore, RunRecord, RunStatus};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = ResultStore::new();
//!
//! let mut run = RunRecord::new("cccv", 9);
//! run.start();
//! store.record_run(run);
//!
//! let record = MetricRecord::from_measurements("cccv", 0.5, 0.9, 3e-10, TimeUnit::Hours, true)?;
//! store.record("cccv", record);
//!
//! assert_eq!(store.run("cccv").map(RunRecord::status), Some(RunStatus::Running));
//! assert_eq!(store.len(), 1);
//! # Ok(())
//! # }
//! ```

mod artifact;
mod result_store;
mod run_record;

pub use artifact::{load_simulation, ArtifactRecord, ArtifactSink, JsonArtifactSink};
pub use result_store::ResultStore;
pub use run_record::{RunRecord, RunStatus};
