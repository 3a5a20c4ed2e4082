//! Partition lifecycle and the drivers that step a ring of partitions.

pub mod driver;
pub mod partition;

#[cfg(feature = "mpi-support")]
pub use driver::{MpiRunResult, run_mpi};
pub use driver::{Frame, LocalRunResult, RunOutcome, RunReport, StepDriver, run_local_ring};
pub use partition::Partition;
