//! One worker's share of the simulation.
//!
//! A [`Partition`] owns its row band as two framed buffers. `current` is
//! read-only during an update and `next` is write-only; after the update the
//! roles swap, so no cell of generation `g + 1` is computed from another
//! cell of generation `g + 1`.

use crate::algs::collect::{all_gather_grid, gather_grid};
use crate::algs::communicator::{Communicator, WaitBound};
use crate::algs::halo::{exchange_ghost_rows, wrap_ghost_columns};
use crate::algs::ring::RingTopology;
use crate::algs::update::update_interior_in;
use crate::cancel::CancelToken;
use crate::config::{LifeConfig, RowLayout};
#[cfg(any(debug_assertions, feature = "check-invariants"))]
use crate::debug_invariants::DebugInvariants;
use crate::grid::cell::Cell;
use crate::grid::global::GlobalGrid;
use crate::grid::init::InitialState;
use crate::grid::local::LocalGrid;
use crate::life_error::LifeError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// A partition and the communicator it reaches its ring neighbors through.
///
/// # Invariants
///
/// - `current` and `next` both have shape `layout.local_rows x config.cols`.
/// - `generation` counts completed steps since initialization.
pub struct Partition<C: Communicator> {
    config: LifeConfig,
    layout: RowLayout,
    ring: RingTopology,
    comm: C,
    current: LocalGrid,
    next: LocalGrid,
    generation: u64,
    pool: Option<Arc<ThreadPool>>,
    cancel: Option<CancelToken>,
}

impl<C: Communicator> Partition<C> {
    /// Allocate and seed the partition for `comm.rank()`.
    ///
    /// # Errors
    /// - Any error of [`LifeConfig::validate`].
    /// - `WorkerCountMismatch` if `comm.size() != config.workers`.
    /// - Seeding errors of [`InitialState::seed_partition`].
    /// - `ThreadPool` if the dedicated pool cannot be built.
    pub fn new(config: LifeConfig, comm: C, initial: &InitialState) -> Result<Self, LifeError> {
        config.validate()?;
        if comm.size() != config.workers {
            return Err(LifeError::WorkerCountMismatch {
                expected: config.workers,
                actual: comm.size(),
            });
        }
        let rank = comm.rank();
        let layout = config.layout(rank)?;
        let ring = RingTopology::new(rank, comm.size())?;

        let mut current = LocalGrid::new(layout.local_rows, config.cols);
        initial.seed_partition(&config, &layout, &mut current)?;
        let next = LocalGrid::new(layout.local_rows, config.cols);

        let pool = match config.threads {
            Some(n) => Some(Arc::new(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(move |i| format!("life-{rank}-{i}"))
                    .build()?,
            )),
            None => None,
        };
        log::debug!(
            "rank {rank}/{}: rows {}..{} x {} cols, {} live, pool={:?}",
            comm.size(),
            layout.first_row,
            layout.end_row(),
            config.cols,
            current.live_count(),
            config.threads
        );
        Ok(Self {
            config,
            layout,
            ring,
            comm,
            current,
            next,
            generation: 0,
            pool,
            cancel: None,
        })
    }

    /// Observe `token` in every exchange wait.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = Some(token);
    }

    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    fn wait_bound(&self) -> WaitBound {
        WaitBound::new(self.config.exchange_timeout, self.cancel.as_ref())
    }

    /// Refresh the ghost frame of `current` for the current generation.
    ///
    /// [`step`](Self::step) does this itself; calling it separately is only
    /// useful to inspect the frame, and every rank of the ring must do the
    /// same.
    pub fn exchange_halo(&mut self) -> Result<(), LifeError> {
        let bound = self.wait_bound();
        exchange_ghost_rows(
            &mut self.current,
            &self.comm,
            &self.ring,
            self.generation,
            &bound,
        )?;
        self.wrap_columns();
        Ok(())
    }

    fn wrap_columns(&mut self) {
        let current = &mut self.current;
        match self.pool.as_deref() {
            Some(pool) => pool.install(|| wrap_ghost_columns(current)),
            None => wrap_ghost_columns(current),
        }
    }

    /// Advance one generation: exchange, wrap, update, swap.
    ///
    /// On error the partition is left at its current generation with
    /// `current` intact.
    ///
    /// # Errors
    /// Communication errors of the halo exchange.
    pub fn step(&mut self) -> Result<(), LifeError> {
        let bound = self.wait_bound();
        exchange_ghost_rows(
            &mut self.current,
            &self.comm,
            &self.ring,
            self.generation,
            &bound,
        )?;
        self.wrap_columns();
        update_interior_in(self.pool.as_deref(), &self.current, &mut self.next)?;
        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.current.debug_assert_invariants();
        Ok(())
    }

    /// Gather every partition's visible cells at `root`.
    ///
    /// Collective: every rank must call it at the same generation.
    pub fn collect(&self, root: usize) -> Result<Option<GlobalGrid>, LifeError> {
        gather_grid(
            &self.comm,
            &self.config,
            &self.current.visible_cells(),
            root,
            self.generation,
            &self.wait_bound(),
        )
    }

    /// Like [`collect`](Self::collect), but every rank receives the grid.
    pub fn collect_all(&self) -> Result<GlobalGrid, LifeError> {
        all_gather_grid(
            &self.comm,
            &self.config,
            &self.current.visible_cells(),
            self.generation,
            &self.wait_bound(),
        )
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.layout.rank
    }

    pub fn layout(&self) -> &RowLayout {
        &self.layout
    }

    pub fn ring(&self) -> &RingTopology {
        &self.ring
    }

    pub fn config(&self) -> &LifeConfig {
        &self.config
    }

    pub fn comm(&self) -> &C {
        &self.comm
    }

    /// The framed buffer holding the current generation.
    pub fn current(&self) -> &LocalGrid {
        &self.current
    }

    /// Interior cells of the current generation, row-major.
    pub fn visible_cells(&self) -> Vec<Cell> {
        self.current.visible_cells()
    }

    pub fn live_count(&self) -> usize {
        self.current.live_count()
    }
}

impl<C: Communicator> std::fmt::Debug for Partition<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition")
            .field("layout", &self.layout)
            .field("generation", &self.generation)
            .field("threads", &self.config.threads)
            .finish_non_exhaustive()
    }
}
