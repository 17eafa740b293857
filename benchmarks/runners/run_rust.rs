//! Minimal benchmark runner for the position tracker.
//!
//! Usage:
//!     benchmark_single [--scenario <path>] [--particles <n>] [--subticks <n>] [--seed <n>]
//!
//! Output:
//!     Elapsed time in milliseconds on the first line, then the mean centre
//!     error and the final best rectangle.
//!     Exit 0 on success, non-zero on error.

use std::time::Instant;

use clap::Parser;

use particle_tracker_rs::bench_utils::{load_scenario, run_scenario, ScenarioJson};

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "benchmark_single")]
#[command(about = "Minimal benchmark runner for the position tracker")]
struct Args {
    /// Path to scenario JSON file (built-in linear scenario if omitted)
    #[arg(long)]
    scenario: Option<String>,

    /// Number of particles
    #[arg(long, default_value_t = 200)]
    particles: usize,

    /// Filter cycles per frame
    #[arg(long, default_value_t = 1)]
    subticks: usize,

    /// Override the scenario's tracker seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => ScenarioJson::linear(),
    };
    if let Some(seed) = args.seed {
        scenario.tracker.seed = seed;
    }
    scenario.tracker.validate()?;

    let start = Instant::now();
    let run = run_scenario(&scenario, args.particles, args.subticks)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    println!("{:.3}", elapsed_ms);
    println!("mean_error={:.3}", run.mean_error());
    if let Some(best) = run.estimates.last() {
        println!("best={} {} {} {}", best.x0, best.y0, best.x1, best.y1);
    }
    Ok(())
}
