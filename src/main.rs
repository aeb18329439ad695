use anyhow::{Context, Result};
use clap::Parser;

use antnet::simulation::params::Params;
use antnet::simulation::runner::Simulation;

#[derive(Parser, Debug)]
#[command(
    name = "antnet",
    version,
    about = "Evolve ant colonies driven by neural networks"
)]
struct Cli {
    /// JSON parameter file; built-in defaults are used when omitted.
    #[arg(long)]
    params: Option<String>,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 10_000)]
    ticks: u64,

    /// Log a summary every N ticks (0 disables).
    #[arg(long, default_value_t = 500)]
    report_every: u64,

    /// Resume from a saved population.
    #[arg(long)]
    load: Option<String>,

    /// Where to save the final population.
    #[arg(long)]
    save: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let params = match &cli.params {
        Some(path) => {
            Params::load_from_file(path).with_context(|| format!("loading params from {path}"))?
        }
        None => Params::default(),
    };

    let mut simulation = match &cli.load {
        Some(path) => Simulation::load(params, path)
            .with_context(|| format!("loading population from {path}"))?,
        None => Simulation::new(params).context("starting simulation")?,
    };

    simulation.run(cli.ticks, cli.report_every)?;

    let save_path = cli.save.unwrap_or_else(|| {
        format!(
            "population_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )
    });
    simulation
        .save(&save_path)
        .with_context(|| format!("saving population to {save_path}"))?;
    Ok(())
}
