//! Brick listing for a region.

use crate::cli::{BricksArgs, Cli};
use celestial_catalog::Region;

pub fn run(args: &BricksArgs, _cli: &Cli) -> anyhow::Result<()> {
    let region = Region::new(args.ra_min, args.ra_max, args.dec_min, args.dec_max)?;
    let bricks = region.bricks();
    tracing::info!(region = %region, count = bricks.len(), "enumerated bricks");
    for brick in bricks {
        if args.files {
            println!("{}", brick.sweep_file_name());
        } else {
            println!("{}", brick);
        }
    }
    Ok(())
}
