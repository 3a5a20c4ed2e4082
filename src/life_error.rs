//! LifeError: Unified error type for halo-life public APIs
//!
//! Configuration problems are rejected up front; communication problems are
//! fatal to a run and reported as their own variants so callers can tell a
//! failed run apart from a completed or cancelled one.

use thiserror::Error;

/// Unified error type for halo-life operations.
#[derive(Debug, Error)]
pub enum LifeError {
    /// A grid dimension, generation count or worker count was zero.
    #[error("Configuration error: `{name}` must be positive (got {value})")]
    InvalidDimension { name: &'static str, value: usize },
    /// `rows` is not a multiple of `workers` under the rejecting remainder policy.
    #[error("Configuration error: {rows} rows cannot be split evenly across {workers} workers")]
    IndivisibleRows { rows: usize, workers: usize },
    /// More workers than rows would leave partitions without an interior.
    #[error("Configuration error: {workers} workers for only {rows} simulated rows")]
    TooManyWorkers { rows: usize, workers: usize },
    /// Live-cell probability outside `[0, 1]`.
    #[error("Configuration error: live probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    /// The communicator's group size disagrees with the configured worker count.
    #[error("Configuration error: communicator has {actual} ranks, config expects {expected}")]
    WorkerCountMismatch { expected: usize, actual: usize },
    /// A rank outside `0..workers` was asked for.
    #[error("Configuration error: rank {rank} is outside a group of {size}")]
    RankOutOfRange { rank: usize, size: usize },

    /// A named pattern placed at `origin` does not fit the simulated rows.
    #[error("Initialization error: pattern at row {row} falls outside {rows} simulated rows")]
    PatternOutOfBounds { row: usize, rows: usize },
    /// Two grids that must agree on shape do not.
    #[error("Shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
    /// Framed coordinate outside `(0..=local_rows+1, 0..=cols+1)`.
    #[error("Cell ({row}, {col}) is outside the framed buffer")]
    CellOutOfRange { row: usize, col: usize },
    /// A cell value other than `ALIVE` or `DEAD`.
    #[error("Invalid cell value {0} (expected 0 or 1)")]
    InvalidCell(u8),

    /// A message from `neighbor` never arrived or could not be used.
    #[error("Communication error with rank {neighbor}: {source}")]
    CommError {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A halo or collection record arrived but failed validation.
    #[error("Halo mismatch from rank {neighbor}: {reason}")]
    HaloMismatch { neighbor: usize, reason: String },
    /// A bounded wait on `neighbor` expired.
    #[error("Exchange with rank {neighbor} timed out in generation {generation}")]
    ExchangeTimeout { neighbor: usize, generation: u64 },
    /// The run was cancelled while waiting on an exchange.
    #[error("Run cancelled")]
    Cancelled,
    /// An in-process worker thread panicked.
    #[error("Worker {rank} panicked")]
    WorkerPanicked { rank: usize },
    /// MPI could not be initialized (or was initialized twice).
    #[error("MPI initialization failed")]
    MpiInit,
    /// The per-partition worker pool could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl LifeError {
    /// True for failures of the message exchange itself (as opposed to bad input).
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            LifeError::CommError { .. }
                | LifeError::HaloMismatch { .. }
                | LifeError::ExchangeTimeout { .. }
                | LifeError::WorkerPanicked { .. }
        )
    }
}
