// Runs a random grid on a ring of in-process workers and prints the
// population every few generations, then checks the result against a
// single-worker run of the same initial grid.
//
//     cargo run --release --example local_ring -- [rows] [cols] [generations] [workers]
fn main() {
    use halo_life::prelude::*;
    use std::time::Instant;

    let args: Vec<usize> = std::env::args()
        .skip(1)
        .filter_map(|a| a.parse().ok())
        .collect();
    let arg = |i: usize, default: usize| args.get(i).copied().unwrap_or(default);
    let (rows, cols, generations, workers) = (arg(0, 256), arg(1, 256), arg(2, 200), arg(3, 4));

    let cfg = LifeConfig::new(rows, cols, generations as u64)
        .with_workers(workers)
        .with_remainder(RemainderPolicy::Distribute);
    // per-row seeding so the single-worker comparison starts from the same grid
    let init = InitialState::RandomRows {
        probability: cfg.live_probability,
    };

    let driver = StepDriver::new(&cfg).collect_every((generations as u64 / 10).max(1));
    let t0 = Instant::now();
    let run = match run_local_ring(&cfg, &init, &driver, |f| {
        println!("gen {:>6}: {:>8} live", f.generation, f.grid.live_count());
    }) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("run failed: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "{rows}x{cols}, {workers} workers, {generations} generations in {:?}",
        t0.elapsed()
    );

    let single = cfg.clone().with_workers(1);
    let reference = run_local_ring(&single, &init, &StepDriver::new(&single), |_| {})
        .ok()
        .and_then(|r| r.grid);
    match (run.grid, reference) {
        (Some(a), Some(b)) if a == b => println!("matches single-worker run"),
        _ => {
            eprintln!("MISMATCH against single-worker run");
            std::process::exit(2);
        }
    }
}
