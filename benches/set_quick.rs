// Quick benchmark for getting summary results: OrderedSet vs BTreeSet
//
// Run with `cargo run --release --features bench --bin set_quick`.
// Set RBSET_LOG=debug (or trace) to see the set's own log output.

use std::collections::BTreeSet;
use std::hint::black_box;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rbset::OrderedSet;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

const SEED: u64 = 0x5eed;

fn initialize_logging() {
    let level = std::env::var("RBSET_LOG")
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Warn);
    if let Err(err) = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("logging disabled: {}", err);
    }
}

fn time_ops<F: Fn() -> usize>(f: F, iterations: usize) -> f64 {
    // Warmup
    for _ in 0..3 {
        black_box(f());
    }

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(f());
    }
    let elapsed = start.elapsed();
    elapsed.as_nanos() as f64 / iterations as f64
}

fn random_keys(n: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..n).map(|_| rng.gen_range(0..u64::MAX)).collect()
}

fn report(name: &str, ours: f64, theirs: f64) {
    println!(
        "  {:<16} {:>12.0} ns  {:>12.0} ns  {:>6.2}x",
        name,
        ours,
        theirs,
        ours / theirs
    );
}

fn main() {
    initialize_logging();

    for &n in &[1_000usize, 10_000, 100_000] {
        let iterations = (1_000_000 / n).max(3);
        let keys = random_keys(n);
        let sequential: Vec<u64> = (0..n as u64).collect();

        println!("\n=== n = {} ({} iterations) ===", n, iterations);
        println!("  {:<16} {:>15}  {:>15}  {:>7}", "", "OrderedSet", "BTreeSet", "ratio");

        let ours = time_ops(|| sequential.iter().copied().collect::<OrderedSet<u64>>().len(), iterations);
        let theirs = time_ops(|| sequential.iter().copied().collect::<BTreeSet<u64>>().len(), iterations);
        report("insert seq", ours, theirs);

        let ours = time_ops(|| keys.iter().copied().collect::<OrderedSet<u64>>().len(), iterations);
        let theirs = time_ops(|| keys.iter().copied().collect::<BTreeSet<u64>>().len(), iterations);
        report("insert random", ours, theirs);

        let set: OrderedSet<u64> = keys.iter().copied().collect();
        let model: BTreeSet<u64> = keys.iter().copied().collect();

        let ours = time_ops(|| keys.iter().filter(|k| set.contains(k)).count(), iterations);
        let theirs = time_ops(|| keys.iter().filter(|k| model.contains(k)).count(), iterations);
        report("lookup hit", ours, theirs);

        let ours = time_ops(|| set.iter().count(), iterations);
        let theirs = time_ops(|| model.iter().count(), iterations);
        report("iterate", ours, theirs);

        let ours = time_ops(
            || {
                let mut set = set.clone();
                for k in &keys {
                    set.erase(k);
                }
                set.len()
            },
            iterations,
        );
        let theirs = time_ops(
            || {
                let mut model = model.clone();
                for k in &keys {
                    model.remove(k);
                }
                model.len()
            },
            iterations,
        );
        report("clone+erase all", ours, theirs);
    }
}
