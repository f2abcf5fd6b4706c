//! sedprep: photometry preparation CLI
//!
//! Matches AGN candidates against the sweep, GALEX and VHS catalogs of a sky
//! region and writes corrected LePhare input files.

mod bricks;
mod cli;
mod crossmatch;
mod run;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Bricks(args) => bricks::run(args, &cli),
        Commands::Crossmatch(args) => crossmatch::run(args, &cli),
        Commands::Run(args) => run::run(args, &cli),
    }
}

/// `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
