//! Initial cell state for a partition.
//!
//! Every generator is an explicit `SmallRng` seeded from the run's base seed
//! and either the partition rank or the global row, never a process-wide
//! generator. The same configuration therefore always produces the same
//! initial grid.

use crate::config::{LifeConfig, RowLayout};
use crate::grid::cell::{ALIVE, from_bool};
use crate::grid::global::GlobalGrid;
use crate::grid::local::LocalGrid;
use crate::grid::pattern::Pattern;
use crate::life_error::LifeError;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const ROW_SALT: u64 = 0xA5A5_5EED_C0FF_EE00;

/// How a partition's interior is filled before generation 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InitialState {
    /// Independent per-partition stream seeded from `(seed, rank)`.
    ///
    /// Reproducible for a fixed worker count; a different worker count gives
    /// a different grid.
    Random { probability: f64 },
    /// Per-row stream seeded from `(seed, global_row)`; the same grid for
    /// every worker count.
    RandomRows { probability: f64 },
    /// A named pattern with its top-left corner at `origin = (row, col)` of
    /// the unpartitioned grid.
    Pattern { pattern: Pattern, origin: (usize, usize) },
    /// An explicit grid of exactly the simulated size.
    Grid(GlobalGrid),
}

/// SplitMix64 finalizer over `base` and `salt`.
pub fn derive_seed(base: u64, salt: u64) -> u64 {
    let mut z = base ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl InitialState {
    /// Per-rank random seeding at the configured live probability.
    pub fn random(cfg: &LifeConfig) -> Self {
        InitialState::Random {
            probability: cfg.live_probability,
        }
    }

    /// Fill the interior of `grid`, which belongs to the partition `layout`.
    ///
    /// # Errors
    /// - `InvalidProbability` for a probability outside `[0, 1]`.
    /// - `PatternOutOfBounds` if a pattern cell lands beyond the simulated rows.
    /// - `ShapeMismatch` if an explicit grid or the buffer disagrees with `cfg`.
    pub fn seed_partition(
        &self,
        cfg: &LifeConfig,
        layout: &RowLayout,
        grid: &mut LocalGrid,
    ) -> Result<(), LifeError> {
        if grid.local_rows() != layout.local_rows || grid.cols() != cfg.cols {
            return Err(LifeError::ShapeMismatch {
                expected_rows: layout.local_rows,
                expected_cols: cfg.cols,
                rows: grid.local_rows(),
                cols: grid.cols(),
            });
        }
        match self {
            InitialState::Random { probability } => {
                check_probability(*probability)?;
                let mut rng = SmallRng::seed_from_u64(derive_seed(cfg.seed, layout.rank as u64));
                for i in 1..=layout.local_rows {
                    for cell in grid.row_mut(i) {
                        *cell = from_bool(rng.gen_bool(*probability));
                    }
                }
            }
            InitialState::RandomRows { probability } => {
                check_probability(*probability)?;
                for i in 1..=layout.local_rows {
                    let global_row = layout.first_row + i - 1;
                    let mut rng =
                        SmallRng::seed_from_u64(derive_seed(cfg.seed ^ ROW_SALT, global_row as u64));
                    for cell in grid.row_mut(i) {
                        *cell = from_bool(rng.gen_bool(*probability));
                    }
                }
            }
            InitialState::Pattern { pattern, origin } => {
                let rows = cfg.simulated_rows();
                for (r, c) in pattern.placed(origin.0, origin.1, rows, cfg.cols)? {
                    if let Some(i) = layout.to_local(r) {
                        grid.set(i, c + 1, ALIVE);
                    }
                }
            }
            InitialState::Grid(global) => {
                let rows = cfg.simulated_rows();
                if global.rows() != rows || global.cols() != cfg.cols {
                    return Err(LifeError::ShapeMismatch {
                        expected_rows: rows,
                        expected_cols: cfg.cols,
                        rows: global.rows(),
                        cols: global.cols(),
                    });
                }
                grid.load_visible(global.row_band(layout.first_row, layout.local_rows))?;
            }
        }
        log::trace!(
            "seeded rank {} rows {}..{} ({} live)",
            layout.rank,
            layout.first_row,
            layout.end_row(),
            grid.live_count()
        );
        Ok(())
    }

    /// The whole initial grid, assembled partition by partition.
    pub fn global_grid(&self, cfg: &LifeConfig) -> Result<GlobalGrid, LifeError> {
        cfg.validate()?;
        let mut cells = Vec::with_capacity(cfg.simulated_rows() * cfg.cols);
        for layout in cfg.layouts() {
            let mut local = LocalGrid::new(layout.local_rows, cfg.cols);
            self.seed_partition(cfg, &layout, &mut local)?;
            cells.extend(local.visible_cells());
        }
        GlobalGrid::from_cells(cfg.simulated_rows(), cfg.cols, cells)
    }
}

fn check_probability(p: f64) -> Result<(), LifeError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(LifeError::InvalidProbability(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemainderPolicy;

    #[test]
    fn derived_seeds_differ_per_rank() {
        let a = derive_seed(42, 0);
        let b = derive_seed(42, 1);
        assert_ne!(a, b);
        assert_eq!(a, derive_seed(42, 0));
    }

    #[test]
    fn random_seeding_is_deterministic() {
        let cfg = LifeConfig::new(16, 16, 1).with_workers(2).with_seed(7);
        let s = InitialState::random(&cfg);
        let a = s.global_grid(&cfg).unwrap();
        let b = s.global_grid(&cfg).unwrap();
        assert_eq!(a, b);
        let other = s.global_grid(&cfg.clone().with_seed(8)).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn random_rows_ignore_worker_count() {
        let s = InitialState::RandomRows { probability: 0.3 };
        let one = s.global_grid(&LifeConfig::new(12, 10, 1).with_seed(3)).unwrap();
        let three = s
            .global_grid(&LifeConfig::new(12, 10, 1).with_seed(3).with_workers(3))
            .unwrap();
        assert_eq!(one, three);
        assert!(one.live_count() > 0);
    }

    #[test]
    fn probability_extremes() {
        let cfg = LifeConfig::new(4, 4, 1);
        let all = InitialState::Random { probability: 1.0 };
        assert_eq!(all.global_grid(&cfg).unwrap().live_count(), 16);
        let none = InitialState::Random { probability: 0.0 };
        assert_eq!(none.global_grid(&cfg).unwrap().live_count(), 0);
        let bad = InitialState::Random { probability: 2.0 };
        assert!(matches!(
            bad.global_grid(&cfg),
            Err(LifeError::InvalidProbability(_))
        ));
    }

    #[test]
    fn pattern_splits_across_partitions() {
        let cfg = LifeConfig::new(8, 8, 1).with_workers(4);
        let s = InitialState::Pattern {
            pattern: Pattern::Glider,
            origin: (1, 1),
        };
        let g = s.global_grid(&cfg).unwrap();
        assert_eq!(g.live_cells(), vec![(1, 2), (2, 3), (3, 1), (3, 2), (3, 3)]);
    }

    #[test]
    fn pattern_beyond_simulated_rows_is_rejected() {
        let cfg = LifeConfig::new(10, 8, 1)
            .with_workers(3)
            .with_remainder(RemainderPolicy::Truncate);
        let s = InitialState::Pattern {
            pattern: Pattern::Block,
            origin: (8, 0),
        };
        assert!(matches!(
            s.global_grid(&cfg),
            Err(LifeError::PatternOutOfBounds { row: 9, rows: 9 })
        ));
    }

    #[test]
    fn explicit_grid_must_match_simulated_shape() {
        let cfg = LifeConfig::new(4, 4, 1).with_workers(2);
        let g = GlobalGrid::with_live_cells(4, 4, [(0, 0), (3, 3)]).unwrap();
        assert_eq!(InitialState::Grid(g.clone()).global_grid(&cfg).unwrap(), g);
        let wrong = GlobalGrid::new(5, 4);
        assert!(matches!(
            InitialState::Grid(wrong).global_grid(&cfg),
            Err(LifeError::ShapeMismatch { .. })
        ));
    }
}
