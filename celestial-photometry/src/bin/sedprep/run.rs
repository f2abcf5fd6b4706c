//! Full pipeline run.

use crate::cli::{Cli, RunArgs};
use anyhow::Context;
use celestial_catalog::PathConfig;
use celestial_photometry::{Pipeline, PipelineConfig, PipelineReport};

pub fn run(args: &RunArgs, _cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config.overwrite |= args.overwrite;
    config.skip_galex |= args.skip_galex;

    let pipeline = Pipeline::with_cds(config, PathConfig::new(&args.root))?;
    let report = pipeline.run().context("pipeline failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!("AGN candidates:   {}", report.agn_rows);
    println!("Sweep sources:    {}", report.sweep_rows);
    println!("VHS sources:      {}", report.vhs_rows);
    println!("Matched to sweep: {}", report.matched_rows);
    println!("  with GALEX:     {}", report.galex_matches);
    println!("  with VHS:       {}", report.vhs_matches);
    println!("Point-like:       {}", report.pointlike_rows);
    println!("Extended:         {}", report.extended_rows);
    if let Some(backup) = &report.backup {
        println!("Backup:           {}", backup.display());
    }
    for path in &report.inputs {
        println!("Wrote {}", path.display());
    }
}
