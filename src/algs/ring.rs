//! Ring topology over partition ranks.
//!
//! Partitions form a cycle: rank `r` sits between `up = (r - 1) mod P` and
//! `down = (r + 1) mod P`. The row dimension of the simulated grid is
//! therefore periodic, the same way columns are periodic inside a partition:
//! the grid is a torus. With `P = 1` a partition is its own up and down
//! neighbor and exchanges rows with itself.

use crate::life_error::LifeError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RingTopology {
    rank: usize,
    size: usize,
}

impl RingTopology {
    /// # Errors
    /// `InvalidDimension` for an empty ring, `RankOutOfRange` for `rank >= size`.
    pub fn new(rank: usize, size: usize) -> Result<Self, LifeError> {
        if size == 0 {
            return Err(LifeError::InvalidDimension {
                name: "workers",
                value: 0,
            });
        }
        if rank >= size {
            return Err(LifeError::RankOutOfRange { rank, size });
        }
        Ok(Self { rank, size })
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Owner of the rows directly above this partition.
    #[inline]
    pub fn up(&self) -> usize {
        (self.rank + self.size - 1) % self.size
    }

    /// Owner of the rows directly below this partition.
    #[inline]
    pub fn down(&self) -> usize {
        (self.rank + 1) % self.size
    }
}
