use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod level;
mod simulation;

use level::Level;
use simulation::Simulation;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless kinematic level runner", long_about = None)]
struct Args {
    /// Level description (JSON). The built-in demo level is used when omitted.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Number of fixed steps to run.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Step length in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Log filter (e.g. `debug` or `kinematic=debug`). Falls back to RUST_LOG, then `info`.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match &args.log {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if !args.dt.is_finite() || args.dt <= 0.0 {
        bail!("--dt must be a positive number of seconds, got {}", args.dt);
    }

    let level = match &args.level {
        Some(path) => Level::load(path)?,
        None => {
            info!("no --level given; running the built-in demo");
            Level::demo()?
        }
    };

    let mut sim = Simulation::new(level, args.dt)?;
    sim.run(args.ticks);
    sim.log_summary();

    Ok(())
}
