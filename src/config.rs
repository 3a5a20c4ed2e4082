//! Run configuration and the row decomposition it implies.
//!
//! A [`LifeConfig`] is plain data: dimensions, generation count, worker count
//! and the knobs for seeding, threading and bounded waits. Every run calls
//! [`LifeConfig::validate`] before allocating anything, so an invalid
//! configuration never reaches the engine.

use crate::life_error::LifeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do with the `rows % workers` rows that do not split evenly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemainderPolicy {
    /// Refuse to run unless `rows` is a multiple of `workers`.
    #[default]
    Reject,
    /// Every partition gets `rows / workers` rows; the trailing remainder rows
    /// are not simulated and the ring closes over the shortened grid.
    Truncate,
    /// The first `rows % workers` partitions get one extra row each.
    Distribute,
}

/// Configuration of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifeConfig {
    /// Global row count `H`.
    pub rows: usize,
    /// Global column count `W`.
    pub cols: usize,
    /// Number of generations `G` to advance.
    pub generations: u64,
    /// Number of partitions `P` (one per worker).
    pub workers: usize,
    /// Base seed for random initialization.
    pub seed: u64,
    /// Probability that a randomly seeded cell starts alive.
    pub live_probability: f64,
    /// Remainder-row policy when `rows % workers != 0`.
    pub remainder: RemainderPolicy,
    /// Size of a dedicated rayon pool per worker; `None` uses the global pool.
    pub threads: Option<usize>,
    /// Upper bound on each halo wait; `None` waits indefinitely.
    pub exchange_timeout: Option<Duration>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            rows: 64,
            cols: 64,
            generations: 100,
            workers: 1,
            seed: 42,
            live_probability: 0.2,
            remainder: RemainderPolicy::Reject,
            threads: None,
            exchange_timeout: None,
        }
    }
}

impl LifeConfig {
    /// A configuration for an `rows x cols` grid advanced `generations` times.
    pub fn new(rows: usize, cols: usize, generations: u64) -> Self {
        Self {
            rows,
            cols,
            generations,
            ..Default::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_live_probability(mut self, p: f64) -> Self {
        self.live_probability = p;
        self
    }

    pub fn with_remainder(mut self, policy: RemainderPolicy) -> Self {
        self.remainder = policy;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = Some(timeout);
        self
    }

    /// Reject configurations the engine cannot run faithfully.
    ///
    /// # Errors
    /// - `InvalidDimension` if `rows`, `cols`, `generations`, `workers` or
    ///   `threads` is zero.
    /// - `InvalidProbability` if `live_probability` is not in `[0, 1]`.
    /// - `TooManyWorkers` if some partition would own no rows.
    /// - `IndivisibleRows` if `rows % workers != 0` under [`RemainderPolicy::Reject`].
    pub fn validate(&self) -> Result<(), LifeError> {
        for (name, value) in [
            ("rows", self.rows),
            ("cols", self.cols),
            ("workers", self.workers),
        ] {
            if value == 0 {
                return Err(LifeError::InvalidDimension { name, value });
            }
        }
        if self.generations == 0 {
            return Err(LifeError::InvalidDimension {
                name: "generations",
                value: 0,
            });
        }
        if self.threads == Some(0) {
            return Err(LifeError::InvalidDimension {
                name: "threads",
                value: 0,
            });
        }
        if !(0.0..=1.0).contains(&self.live_probability) {
            return Err(LifeError::InvalidProbability(self.live_probability));
        }
        if self.workers > self.rows {
            return Err(LifeError::TooManyWorkers {
                rows: self.rows,
                workers: self.workers,
            });
        }
        if self.remainder == RemainderPolicy::Reject && self.rows % self.workers != 0 {
            return Err(LifeError::IndivisibleRows {
                rows: self.rows,
                workers: self.workers,
            });
        }
        Ok(())
    }

    /// Number of rows actually simulated by the union of all partitions.
    pub fn simulated_rows(&self) -> usize {
        match self.remainder {
            RemainderPolicy::Truncate => self.workers * (self.rows / self.workers),
            RemainderPolicy::Reject | RemainderPolicy::Distribute => self.rows,
        }
    }

    /// Row band owned by `rank`.
    ///
    /// # Errors
    /// `RankOutOfRange` if `rank >= workers`.
    pub fn layout(&self, rank: usize) -> Result<RowLayout, LifeError> {
        if rank >= self.workers {
            return Err(LifeError::RankOutOfRange {
                rank,
                size: self.workers,
            });
        }
        let base = self.rows / self.workers;
        let extra = self.rows % self.workers;
        let (first_row, local_rows) = match self.remainder {
            RemainderPolicy::Distribute => (
                rank * base + rank.min(extra),
                base + usize::from(rank < extra),
            ),
            RemainderPolicy::Reject | RemainderPolicy::Truncate => (rank * base, base),
        };
        Ok(RowLayout {
            rank,
            workers: self.workers,
            first_row,
            local_rows,
            cols: self.cols,
        })
    }

    /// Layouts of every rank, in rank order.
    pub fn layouts(&self) -> Vec<RowLayout> {
        (0..self.workers)
            .filter_map(|r| self.layout(r).ok())
            .collect()
    }
}

/// The contiguous band of global rows one partition owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowLayout {
    pub rank: usize,
    pub workers: usize,
    /// First global row (0-based) owned by this partition.
    pub first_row: usize,
    /// Number of interior rows.
    pub local_rows: usize,
    /// Global column count.
    pub cols: usize,
}

impl RowLayout {
    /// One past the last global row owned.
    #[inline]
    pub fn end_row(&self) -> usize {
        self.first_row + self.local_rows
    }

    #[inline]
    pub fn contains_row(&self, global_row: usize) -> bool {
        (self.first_row..self.end_row()).contains(&global_row)
    }

    /// Interior (1-based) row index of `global_row`, if owned here.
    #[inline]
    pub fn to_local(&self, global_row: usize) -> Option<usize> {
        self.contains_row(global_row)
            .then(|| global_row - self.first_row + 1)
    }

    /// Number of visible cells this partition contributes to a collection.
    #[inline]
    pub fn visible_len(&self) -> usize {
        self.local_rows * self.cols
    }
}
