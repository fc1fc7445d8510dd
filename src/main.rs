use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use forager_lib::model::config::ForagingConfig;
use forager_lib::model::lattice::WalkerLattice;
use forager_lib::model::runner::ForagingRun;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chemotactic foraging simulation", long_about = None)]
struct Args {
    /// JSON parameter overlay file (partial; missing fields keep defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the step budget
    #[arg(long)]
    steps: Option<u64>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress diagnostics, leaving only the summary line
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Diagnostics go to stderr; stdout carries only the summary line so the
    // evolution harness can parse it.
    let filter = if args.quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => ForagingConfig::load(path)?,
        None => ForagingConfig::default(),
    };
    if let Some(steps) = args.steps {
        config.simsettings.runtime = steps;
    }
    if let Some(seed) = args.seed {
        config.conf.seed = seed;
    }

    let mut run = ForagingRun::start(config, |cfg, rng| {
        let mut lattice = WalkerLattice::new(cfg);
        lattice.seed(cfg, rng);
        lattice
    })?;
    run.run_loop();

    let summary = run.finalize();
    println!("{}", summary.report_line());
    Ok(())
}
