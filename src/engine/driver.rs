//! Global step driver: runs a partition for a fixed number of generations.
//!
//! [`StepDriver::run`] is executed by every worker of a ring. Between
//! generations it checks the cancellation token; every `collect_every`
//! generations all workers take part in an all-gather and the reporting rank
//! receives a [`Frame`]. [`run_local_ring`] drives a whole ring of worker
//! threads in this process; `run_mpi` drives one MPI process.

use crate::algs::communicator::{Communicator, RayonComm};
use crate::cancel::CancelToken;
use crate::config::LifeConfig;
#[cfg(any(debug_assertions, feature = "check-invariants"))]
use crate::debug_invariants::DebugInvariants;
use crate::engine::partition::Partition;
use crate::grid::cell::Cell;
use crate::grid::global::GlobalGrid;
use crate::grid::init::InitialState;
use crate::life_error::LifeError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A collected snapshot of the whole grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub generation: u64,
    pub grid: GlobalGrid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every configured generation was computed.
    Completed,
    /// The cancellation token fired before the last generation.
    Cancelled,
}

/// What one worker did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub rank: usize,
    /// Generation the partition reached.
    pub generations: u64,
    pub outcome: RunOutcome,
}

/// Per-run stepping policy shared by every worker.
#[derive(Clone, Debug)]
pub struct StepDriver {
    generations: u64,
    collect_every: Option<u64>,
    report_rank: usize,
    cancel: Option<CancelToken>,
}

impl StepDriver {
    /// Run `config.generations` generations, collecting nothing.
    pub fn new(config: &LifeConfig) -> Self {
        Self {
            generations: config.generations,
            collect_every: None,
            report_rank: 0,
            cancel: None,
        }
    }

    /// Emit a frame for the starting state, after every `k`-th generation,
    /// and after the last one. `k == 0` disables frames.
    pub fn collect_every(mut self, k: u64) -> Self {
        self.collect_every = (k > 0).then_some(k);
        self
    }

    /// Rank whose callback receives frames (default 0).
    pub fn report_rank(mut self, rank: usize) -> Self {
        self.report_rank = rank;
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn generations(&self) -> u64 {
        self.generations
    }

    fn wants_frame(&self, generation: u64, last: u64) -> bool {
        match self.collect_every {
            Some(k) => generation % k == 0 || generation == last,
            None => false,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn emit<C, F>(&self, partition: &Partition<C>, on_frame: &mut F) -> Result<(), LifeError>
    where
        C: Communicator,
        F: FnMut(Frame),
    {
        let grid = partition.collect_all()?;
        if partition.rank() == self.report_rank {
            on_frame(Frame {
                generation: partition.generation(),
                grid,
            });
        }
        Ok(())
    }

    /// Advance `partition` by the configured number of generations.
    ///
    /// Cancellation is reported as [`RunOutcome::Cancelled`], never as an
    /// error, whether it is noticed between generations or inside a wait.
    ///
    /// # Errors
    /// - `RankOutOfRange` if the reporting rank is outside the ring.
    /// - Any communication error of a step or collection.
    pub fn run<C, F>(&self, partition: &mut Partition<C>, mut on_frame: F) -> Result<RunReport, LifeError>
    where
        C: Communicator,
        F: FnMut(Frame),
    {
        let size = partition.ring().size();
        if self.report_rank >= size {
            return Err(LifeError::RankOutOfRange {
                rank: self.report_rank,
                size,
            });
        }
        if let Some(token) = &self.cancel {
            partition.set_cancel_token(token.clone());
        }
        let rank = partition.rank();
        let last = partition.generation() + self.generations;
        log::info!(
            "rank {rank}: running generations {}..{last}",
            partition.generation()
        );

        let cancelled = |rank: usize, generation: u64| -> Result<RunReport, LifeError> {
            log::warn!("rank {rank}: cancelled at generation {generation}");
            Ok(RunReport {
                rank,
                generations: generation,
                outcome: RunOutcome::Cancelled,
            })
        };

        if self.collect_every.is_some() {
            match self.emit(partition, &mut on_frame) {
                Err(LifeError::Cancelled) => return cancelled(rank, partition.generation()),
                other => other?,
            }
        }
        while partition.generation() < last {
            if self.is_cancelled() {
                return cancelled(rank, partition.generation());
            }
            match partition.step() {
                Err(LifeError::Cancelled) => return cancelled(rank, partition.generation()),
                other => other?,
            }
            let generation = partition.generation();
            if self.wants_frame(generation, last) {
                match self.emit(partition, &mut on_frame) {
                    Err(LifeError::Cancelled) => return cancelled(rank, generation),
                    other => other?,
                }
            }
        }
        log::info!(
            "rank {rank}: completed at generation {last} ({} live)",
            partition.live_count()
        );
        Ok(RunReport {
            rank,
            generations: last,
            outcome: RunOutcome::Completed,
        })
    }
}

/// Result of an in-process ring run.
#[derive(Clone, Debug)]
pub struct LocalRunResult {
    /// One report per worker, in rank order.
    pub reports: Vec<RunReport>,
    /// The final grid, if every worker completed.
    pub grid: Option<GlobalGrid>,
}

impl LocalRunResult {
    pub fn outcome(&self) -> RunOutcome {
        if self
            .reports
            .iter()
            .all(|r| r.outcome == RunOutcome::Completed)
        {
            RunOutcome::Completed
        } else {
            RunOutcome::Cancelled
        }
    }
}

type WorkerSlot = Option<Result<(RunReport, Vec<Cell>), LifeError>>;

/// Run `config.workers` partitions as scoped threads of this process.
///
/// Each worker gets its own in-process communicator in a private group. A
/// worker that fails or panics cancels the others; the first failure in rank
/// order is returned. `on_frame` runs on the reporting rank's thread.
///
/// # Errors
/// - Any error of [`LifeConfig::validate`] or of partition construction.
/// - `WorkerPanicked` if a worker thread panicked.
/// - Communication errors of the first failing worker.
pub fn run_local_ring<F>(
    config: &LifeConfig,
    initial: &InitialState,
    driver: &StepDriver,
    on_frame: F,
) -> Result<LocalRunResult, LifeError>
where
    F: FnMut(Frame) + Send,
{
    config.validate()?;
    let workers = config.workers;
    if driver.report_rank >= workers {
        return Err(LifeError::RankOutOfRange {
            rank: driver.report_rank,
            size: workers,
        });
    }
    let stop = driver
        .cancel
        .as_ref()
        .map(CancelToken::child)
        .unwrap_or_default();
    let worker_driver = driver.clone().cancel_token(stop.clone());
    let slots: Vec<Mutex<WorkerSlot>> = (0..workers).map(|_| Mutex::new(None)).collect();
    let mut on_frame = Some(on_frame);
    let group = RayonComm::group(workers);
    let mailbox = group[0].clone();

    std::thread::scope(|s| {
        for comm in group {
            let rank = comm.rank();
            let mut callback = if rank == driver.report_rank {
                on_frame.take()
            } else {
                None
            };
            let (stop, driver, slot) = (&stop, &worker_driver, &slots[rank]);
            s.spawn(move || {
                let work = catch_unwind(AssertUnwindSafe(|| {
                    let mut partition = Partition::new(config.clone(), comm, initial)?;
                    let report = driver.run(&mut partition, |frame| {
                        if let Some(cb) = callback.as_mut() {
                            cb(frame);
                        }
                    })?;
                    Ok((report, partition.visible_cells()))
                }));
                let result = work.unwrap_or(Err(LifeError::WorkerPanicked { rank }));
                if let Err(e) = &result {
                    log::warn!("rank {rank}: {e}; stopping ring");
                    stop.cancel();
                }
                *slot.lock() = Some(result);
            });
        }
    });
    let stale = mailbox.discard_pending();
    if stale > 0 {
        log::debug!("ring of {workers}: dropped {stale} undelivered messages");
    }

    let mut reports = Vec::with_capacity(workers);
    let mut cells = Vec::with_capacity(config.simulated_rows() * config.cols);
    for (rank, slot) in slots.into_iter().enumerate() {
        let (report, visible) = slot
            .into_inner()
            .unwrap_or(Err(LifeError::WorkerPanicked { rank }))?;
        reports.push(report);
        cells.extend(visible);
    }
    let result = LocalRunResult {
        grid: None,
        reports,
    };
    if result.outcome() == RunOutcome::Cancelled {
        log::info!("ring of {workers} cancelled");
        return Ok(result);
    }
    let grid = GlobalGrid::from_cells(config.simulated_rows(), config.cols, cells)?;
    #[cfg(any(debug_assertions, feature = "check-invariants"))]
    grid.debug_assert_invariants();
    log::info!(
        "ring of {workers} completed {} generations, {} live",
        driver.generations,
        grid.live_count()
    );
    Ok(LocalRunResult {
        grid: Some(grid),
        ..result
    })
}

/// Result of one MPI process's run.
#[cfg(feature = "mpi-support")]
#[derive(Clone, Debug)]
pub struct MpiRunResult {
    pub report: RunReport,
    /// The final grid, on the reporting rank of a completed run.
    pub grid: Option<GlobalGrid>,
}

/// Run this process's partition over `MPI_COMM_WORLD`.
///
/// Cancellation tokens are local to the process; wait bounds are not
/// honoured by MPI.
#[cfg(feature = "mpi-support")]
pub fn run_mpi<F>(
    config: &LifeConfig,
    initial: &InitialState,
    driver: &StepDriver,
    on_frame: F,
) -> Result<MpiRunResult, LifeError>
where
    F: FnMut(Frame),
{
    use crate::algs::communicator::MpiComm;

    let comm = MpiComm::new()?;
    let mut partition = Partition::new(config.clone(), comm, initial)?;
    let report = driver.run(&mut partition, on_frame)?;
    let grid = match report.outcome {
        RunOutcome::Completed => partition.collect(driver.report_rank)?,
        RunOutcome::Cancelled => None,
    };
    Ok(MpiRunResult { report, grid })
}
