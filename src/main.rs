use impactx::{bench_gravity, bench_step, ParticleSystem, SimulationConfig};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::path::PathBuf;

/// Headless driver: loads a scenario, runs it, and logs conservation diagnostics.
#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, relative to `scenarios/` unless it exists as given
    #[arg(short, long, default_value = "two_planets.yaml")]
    file_name: PathBuf,

    /// Override the number of steps from the scenario
    #[arg(long)]
    steps: Option<usize>,

    /// Override the step size from the scenario
    #[arg(long)]
    dt: Option<f32>,

    /// Log diagnostics every this many steps
    #[arg(long, default_value_t = 10)]
    report_every: usize,

    /// Run the direct vs tree timing sweeps instead of a scenario
    #[arg(long)]
    bench: bool,

    /// Worker threads for the benchmark (0 = all cores)
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

// load here to keep main clean
fn load_scenario(file_name: &PathBuf) -> Result<SimulationConfig> {
    let config_path = if file_name.exists() {
        file_name.clone()
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };
    SimulationConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_step(args.threads)?;
        return Ok(());
    }

    let cfg = load_scenario(&args.file_name)?;
    let steps = args.steps.unwrap_or(cfg.run.steps);
    let dt = args.dt.unwrap_or(cfg.run.dt);

    let mut sys = ParticleSystem::new(&cfg).context("failed to build particle system")?;
    let mass0 = sys.total_mass();
    let momentum0 = sys.total_momentum();

    let report_every = args.report_every.max(1);
    for i in 1..=steps {
        sys.step(dt);
        if i % report_every == 0 || i == steps {
            let stats = sys.last_step();
            info!(
                "step {:5}  t = {:.4}  mass drift = {:.3e}  |dp| = {:.3e}  KE = {:.5}  nodes = {}  contacts = {}",
                i,
                sys.time(),
                sys.total_mass() - mass0,
                (sys.total_momentum() - momentum0).norm(),
                sys.kinetic_energy(),
                stats.tree_nodes,
                stats.contacts,
            );
        }
    }

    Ok(())
}
