// Prints a glider crossing partition seams, one frame per generation, with
// `O` for live and `.` for dead cells.
//
//     cargo run --example glider_frames -- [workers]
fn main() {
    use halo_life::prelude::*;

    let workers = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(4);
    let cfg = LifeConfig::new(12, 12, 8).with_workers(workers);
    let init = InitialState::Pattern {
        pattern: Pattern::Glider,
        origin: (1, 1),
    };
    let driver = StepDriver::new(&cfg).collect_every(1);

    let result = run_local_ring(&cfg, &init, &driver, |frame| {
        println!("generation {}", frame.generation);
        let g = &frame.grid;
        for r in 0..g.rows() {
            let line: String = (0..g.cols())
                .map(|c| if g.get(r, c) == ALIVE { 'O' } else { '.' })
                .collect();
            println!("{line}");
        }
        println!();
    });
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
