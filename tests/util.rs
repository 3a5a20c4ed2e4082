#![allow(dead_code)]
use halo_life::prelude::*;

/// Two ranks of the process-wide default group (ranks 0 and 1).
pub fn rayons() -> (RayonComm, RayonComm) {
    (RayonComm::new(0, 2), RayonComm::new(1, 2))
}

/// Straightforward whole-grid B3/S23 step on a torus, used as the oracle.
pub fn reference_step(g: &GlobalGrid) -> GlobalGrid {
    let (rows, cols) = (g.rows(), g.cols());
    let mut live = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            let mut n = 0;
            for dr in [rows - 1, 0, 1] {
                for dc in [cols - 1, 0, 1] {
                    if (dr, dc) != (0, 0) {
                        n += g.get((r + dr) % rows, (c + dc) % cols);
                    }
                }
            }
            let alive = g.get(r, c) == ALIVE;
            if n == 3 || (alive && n == 2) {
                live.push((r, c));
            }
        }
    }
    GlobalGrid::with_live_cells(rows, cols, live).unwrap()
}

pub fn reference_run(g: &GlobalGrid, generations: u64) -> GlobalGrid {
    (0..generations).fold(g.clone(), |g, _| reference_step(&g))
}

/// Run the in-process ring to completion and return the final grid.
pub fn ring_grid(cfg: &LifeConfig, init: &InitialState) -> GlobalGrid {
    let run = run_local_ring(cfg, init, &StepDriver::new(cfg), |_| {}).expect("ring run");
    assert_eq!(run.outcome(), RunOutcome::Completed);
    run.grid.expect("completed run has a grid")
}

/// Render with `O` for live and `.` for dead cells, one line per row.
pub fn render(g: &GlobalGrid) -> String {
    let mut s = String::with_capacity(g.rows() * (g.cols() + 1));
    for r in 0..g.rows() {
        for c in 0..g.cols() {
            s.push(if g.get(r, c) == ALIVE { 'O' } else { '.' });
        }
        s.push('\n');
    }
    s
}
