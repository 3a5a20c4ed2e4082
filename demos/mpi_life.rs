// One partition per MPI process. Rank 0 prints the population of every
// collected frame and the final grid.
//
//     mpirun -n 4 cargo run --release --features mpi-support --example mpi_life -- [rows] [cols] [generations]
fn main() {
    use halo_life::prelude::*;

    let args: Vec<usize> = std::env::args()
        .skip(1)
        .filter_map(|a| a.parse().ok())
        .collect();
    let arg = |i: usize, default: usize| args.get(i).copied().unwrap_or(default);
    let (rows, cols, generations) = (arg(0, 64), arg(1, 64), arg(2, 100));
    let workers = std::env::var("OMPI_COMM_WORLD_SIZE")
        .or_else(|_| std::env::var("PMI_SIZE"))
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    let cfg = LifeConfig::new(rows, cols, generations as u64)
        .with_workers(workers)
        .with_remainder(RemainderPolicy::Distribute);
    let driver = StepDriver::new(&cfg).collect_every(10);
    let run = run_mpi(&cfg, &InitialState::random(&cfg), &driver, |f| {
        println!("gen {:>5}: {} live", f.generation, f.grid.live_count());
    });
    match run {
        Ok(r) => {
            if let Some(g) = r.grid {
                for row in g.cells().chunks(g.cols()) {
                    let line: String = row
                        .iter()
                        .map(|&c| if c == ALIVE { 'O' } else { '.' })
                        .collect();
                    println!("{line}");
                }
            }
        }
        Err(e) => {
            eprintln!("rank failed: {e}");
            std::process::exit(1);
        }
    }
}
