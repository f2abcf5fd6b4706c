//! Ad hoc crossmatch of two catalog files.

use crate::cli::{Cli, CrossmatchArgs};
use anyhow::Context;
use celestial_catalog::io::{read_table, write_table};
use celestial_catalog::{crossmatch, CrossmatchParams};
use tracing::info;

pub fn run(args: &CrossmatchArgs, _cli: &Cli) -> anyhow::Result<()> {
    let a = read_table(&args.a).with_context(|| format!("reading {}", args.a.display()))?;
    let b = read_table(&args.b).with_context(|| format!("reading {}", args.b.display()))?;

    let params = CrossmatchParams::from_arcsec(args.radius_arcsec, args.join);
    let matched = crossmatch(&a, &b, &params)?;
    info!(
        a = a.len(),
        b = b.len(),
        matched = matched.len(),
        join = %args.join,
        "crossmatched"
    );

    write_table(&args.output, &matched.table, args.overwrite)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("{} matches written to {}", matched.len(), args.output.display());
    Ok(())
}
