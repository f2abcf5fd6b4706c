//! CLI argument definitions for sedprep

use celestial_catalog::JoinMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sedprep")]
#[command(about = "Multi-survey photometry preparation for SED fitting")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the sweep bricks overlapping a region
    Bricks(BricksArgs),

    /// Crossmatch two catalog files by position
    Crossmatch(CrossmatchArgs),

    /// Run the full pipeline and write LePhare inputs
    Run(RunArgs),
}

#[derive(Parser)]
pub struct BricksArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub ra_min: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub ra_max: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub dec_min: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub dec_max: f64,

    /// Print tile file names instead of brick names
    #[arg(long)]
    pub files: bool,
}

#[derive(Parser)]
pub struct CrossmatchArgs {
    /// Catalog A (comma-separated, optionally gzipped)
    pub a: PathBuf,

    /// Catalog B
    pub b: PathBuf,

    /// Maximum separation in arcseconds
    #[arg(long, default_value = "1.0")]
    pub radius_arcsec: f64,

    /// Join mode: left, right or inner
    #[arg(long, default_value = "left")]
    pub join: JoinMode,

    /// Output file; `.gz` compresses
    #[arg(long)]
    pub output: PathBuf,

    /// Replace the output file if it exists
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Parser)]
pub struct RunArgs {
    /// TOML configuration; defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Data root holding catalogues/ and data/
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Replace existing outputs
    #[arg(long)]
    pub overwrite: bool,

    /// Skip the remote GALEX match and the UV bands
    #[arg(long)]
    pub skip_galex: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
