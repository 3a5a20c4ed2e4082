//! Run with `mpirun -n <P> cargo test --features mpi-support --test mpi_halo`.
//! MPI may only be initialized once per process, so this file holds one test.
#![cfg(feature = "mpi-support")]

use halo_life::prelude::*;

#[test]
fn mpi_glider_matches_translation() {
    let size = mpi_world_size();
    let cfg = LifeConfig::new(4 * size.max(2), 12, 8).with_workers(size);
    let init = InitialState::Pattern {
        pattern: Pattern::Glider,
        origin: (1, 1),
    };
    let start = init.global_grid(&cfg).unwrap();
    let run = run_mpi(&cfg, &init, &StepDriver::new(&cfg), |_| {}).unwrap();
    assert_eq!(run.report.outcome, RunOutcome::Completed);
    assert_eq!(run.report.generations, 8);
    if let Some(grid) = run.grid {
        assert_eq!(grid, start.translated(2, 2));
    }
}

fn mpi_world_size() -> usize {
    std::env::var("OMPI_COMM_WORLD_SIZE")
        .or_else(|_| std::env::var("PMI_SIZE"))
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
}
