#![cfg_attr(docsrs, feature(doc_cfg))]
//! # halo-life
//!
//! halo-life is a distributed, multi-threaded stencil engine for Conway's Game
//! of Life (rule B3/S23). The grid is split into contiguous bands of rows, one
//! per worker; workers exchange their boundary rows with their ring neighbors
//! every generation, and each worker updates its band in parallel with rayon.
//!
//! ## Features
//! - Framed per-partition buffers with one-cell ghost rows and columns
//! - Ring halo exchange over pluggable communicators (serial, in-process
//!   threads, MPI)
//! - Double-buffered, data-parallel updates with a write-once guarantee per
//!   cell and generation
//! - Collection of the full grid to one rank or to all ranks
//! - Cooperative cancellation and bounded exchange waits
//!
//! ## Topology
//!
//! Columns wrap inside each partition, and the ring of partitions wraps in
//! the row dimension: the simulated grid is a torus. With a single worker the
//! partition exchanges rows with itself, so the result is the same torus.
//!
//! ## Determinism
//!
//! All randomized initialization uses `SmallRng` seeds derived from the
//! configured seed, per rank ([`InitialState::Random`](crate::grid::InitialState::Random)) or per global row
//! ([`InitialState::RandomRows`](crate::grid::InitialState::RandomRows)). The update itself is deterministic: for a
//! fixed initial grid, every worker count produces bit-identical generations.
//!
//! ## Uneven partitions
//!
//! When `rows` is not a multiple of `workers` the [`RemainderPolicy`](crate::config::RemainderPolicy) decides:
//! reject the configuration (default), drop the trailing rows, or give the
//! first ranks one extra row each.
//!
//! ## Usage
//!
//! ```
//! use halo_life::prelude::*;
//!
//! let cfg = LifeConfig::new(16, 16, 4).with_workers(4);
//! let init = InitialState::Pattern { pattern: Pattern::Glider, origin: (1, 1) };
//! let start = init.global_grid(&cfg).unwrap();
//! let run = run_local_ring(&cfg, &init, &StepDriver::new(&cfg), |_| {}).unwrap();
//! assert_eq!(run.grid.unwrap(), start.translated(1, 1));
//! ```

pub mod algs;
pub mod cancel;
pub mod config;
pub mod debug_invariants;
pub mod engine;
pub mod grid;
pub mod life_error;

pub use debug_invariants::DebugInvariants;
pub use life_error::LifeError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::communicator::{Communicator, NoComm, RayonComm};
    pub use crate::algs::ring::RingTopology;
    pub use crate::cancel::CancelToken;
    pub use crate::config::{LifeConfig, RemainderPolicy, RowLayout};
    pub use crate::debug_invariants::DebugInvariants;
    #[cfg(feature = "mpi-support")]
    pub use crate::engine::run_mpi;
    pub use crate::engine::{
        Frame, LocalRunResult, Partition, RunOutcome, RunReport, StepDriver, run_local_ring,
    };
    pub use crate::grid::{ALIVE, Cell, DEAD, GlobalGrid, InitialState, LocalGrid, Pattern};
    pub use crate::life_error::LifeError;
}
