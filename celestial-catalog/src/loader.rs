//! Survey loaders.
//!
//! Each loader reads one survey dump (FITS or comma-separated, see
//! [`read_table`]), normalises column names, trims it to the run's
//! [`Region`] and keeps only the columns later stages use. Band
//! names are passed in lowercase (`"g"`, `"w1"`, `"ks"`, ...).

use crate::config::{PathConfig, PathKind};
use crate::errors::{CatalogError, CatalogResult};
use crate::io::read_table;
use crate::region::Region;
use crate::table::{Column, Table};
use celestial_core::constants::RAD_TO_DEG;
use tracing::{info, warn};

/// Default extension of sweep tile files.
pub const SWEEP_EXTENSION: &str = "csv";

const SWEEP_RENAMED: [&str; 4] = ["type", "ebv", "maskbits", "fitbits"];
const SWEEP_BAND_PREFIXES: [&str; 3] = ["flux_", "flux_ivar_", "mw_transmission_"];
const VHS_RENAMED: [&str; 3] = ["pstar", "pgalaxy", "ebv"];
const VHS_BAND_SUFFIXES: [&str; 4] = ["apermag6", "apermag6err", "apermag4", "apermag4err"];

/// Response columns of the GALEX remote match and their local names.
///
/// Passed to [`crossmatch_remote`](crate::crossmatch::remote::crossmatch_remote),
/// which keeps only these columns of the service response.
pub const GALEX_COLUMN_MAPPING: [(&str, &str); 9] = [
    ("angDist", "sep_to_galex"),
    ("RAJ2000", "ra_galex"),
    ("DEJ2000", "dec_galex"),
    ("sweep_id", "sweep_id_galex"),
    ("E(B-V)", "galex_ebv"),
    ("Fflux", "flux_fuv"),
    ("Nflux", "flux_nuv"),
    ("e_Fflux", "flux_err_fuv"),
    ("e_Nflux", "flux_err_nuv"),
];

/// Lowercase all column names and, given a region, keep only rows inside it.
pub fn sanitise(table: Table, region: Option<&Region>, name: &str) -> CatalogResult<Table> {
    let table = table.lowercase_names();
    let table = match region {
        Some(region) => region.filter(&table)?,
        None => table,
    };
    info!(table = name, rows = table.len(), "sanitised table");
    Ok(table)
}

/// Load every sweep tile overlapping `region`.
///
/// Tiles missing on disk are logged and skipped. If no tile is present the
/// result is an empty table without columns.
pub fn load_sweep(
    region: &Region,
    paths: &PathConfig,
    bands: &[&str],
    extension: &str,
) -> CatalogResult<Table> {
    let bricks = region.bricks();
    let names: Vec<String> = bricks.iter().map(ToString::to_string).collect();
    info!(count = bricks.len(), bricks = ?names, "sweep bricks in region");

    let dir = paths.path(PathKind::Sweep);
    let mut tiles = Vec::with_capacity(bricks.len());
    for brick in &bricks {
        let path = dir.join(brick.file_name(extension));
        if !path.is_file() {
            let err = CatalogError::BrickNotFound {
                brick: brick.to_string(),
                path,
            };
            warn!(error = %err, "skipping brick inside the requested region");
            continue;
        }
        tiles.push(read_table(&path)?.lowercase_names());
    }
    if tiles.is_empty() {
        warn!(region = %region, "no sweep bricks found");
        return Ok(Table::new());
    }

    let table = sanitise(Table::vstack(tiles)?, Some(region), "sweep")?;
    let sweep_id = sweep_ids(&table)?;
    let table = table.with_column("sweep_id", sweep_id)?;

    let renamed: Vec<(String, String)> = SWEEP_RENAMED
        .iter()
        .map(|col| (col.to_string(), format!("sweep_{}", col)))
        .collect();
    let pairs: Vec<(&str, &str)> = renamed
        .iter()
        .map(|(old, new)| (old.as_str(), new.as_str()))
        .collect();
    let table = table.rename_all(&pairs)?;

    let mut keep: Vec<String> = vec!["ra".into(), "dec".into(), "sweep_id".into()];
    keep.extend(renamed.into_iter().map(|(_, new)| new));
    for prefix in SWEEP_BAND_PREFIXES {
        keep.extend(bands.iter().map(|band| format!("{}{}", prefix, band)));
    }
    table.select(&keep)
}

/// `"<release>_<brickid>_<objid>"` per row; null if any part is null.
fn sweep_ids(table: &Table) -> CatalogResult<Column> {
    let release = table.require("release", "sweep_id")?;
    let brickid = table.require("brickid", "sweep_id")?;
    let objid = table.require("objid", "sweep_id")?;
    Ok(Column::Text(
        (0..table.len())
            .map(|row| {
                Some(format!(
                    "{}_{}_{}",
                    release.key_at(row)?,
                    brickid.key_at(row)?,
                    objid.key_at(row)?
                ))
            })
            .collect(),
    ))
}

/// Load the optical AGN candidate catalog and apply the random-forest cut.
pub fn load_agn(
    region: &Region,
    paths: &PathConfig,
    file_name: &str,
    rf_prob_cut: f64,
) -> CatalogResult<Table> {
    let path = paths.path(PathKind::Catalogues).join(file_name);
    let table = sanitise(read_table(&path)?, Some(region), "shu_agn")?;
    let table = table
        .select(&["ra", "dec", "phot_z", "prob_rf"])?
        .rename_all(&[("phot_z", "shu_z_phot"), ("prob_rf", "shu_prob_rf")])?;
    let mask: Vec<bool> = table
        .floats("shu_prob_rf", "probability cut")?
        .iter()
        .map(|&p| p >= rf_prob_cut)
        .collect();
    let table = table.filter(&mask);
    info!(
        cut = rf_prob_cut,
        rows = table.len(),
        "applied random-forest probability cut to shu_agn"
    );
    Ok(table)
}

/// Load the VHS near-infrared catalog. Positions on disk are in radians.
pub fn load_vhs(
    region: &Region,
    paths: &PathConfig,
    file_name: &str,
    bands: &[&str],
) -> CatalogResult<Table> {
    let path = paths.path(PathKind::Catalogues).join(file_name);
    let table = sanitise(read_table(&path)?, None, "vhs")?;
    let table = radians_to_degrees(table)?;
    let table = sanitise(table, Some(region), "vhs")?;

    let renamed: Vec<String> = VHS_RENAMED.iter().map(|c| format!("vhs_{}", c)).collect();
    let pairs: Vec<(&str, &str)> = VHS_RENAMED
        .iter()
        .zip(&renamed)
        .map(|(old, new)| (*old, new.as_str()))
        .collect();
    let table = table.rename_all(&pairs)?;

    let mut keep: Vec<String> = vec!["ra".into(), "dec".into()];
    keep.extend(renamed);
    for suffix in VHS_BAND_SUFFIXES {
        keep.extend(bands.iter().map(|band| format!("{}{}", band, suffix)));
    }
    keep.extend(bands.iter().map(|band| format!("a{}", band)));
    table.select(&keep)
}

fn radians_to_degrees(table: Table) -> CatalogResult<Table> {
    let (ra, dec) = {
        let (ra, dec) = table.positions("radian conversion")?;
        let ra: Vec<f64> = ra.iter().map(|r| r * RAD_TO_DEG).collect();
        let dec: Vec<f64> = dec.iter().map(|d| d * RAD_TO_DEG).collect();
        (ra, dec)
    };
    table
        .with_column("ra", Column::Float(ra))?
        .with_column("dec", Column::Float(dec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::write_text;
    use tempfile::tempdir;

    fn layout() -> (tempfile::TempDir, PathConfig) {
        let dir = tempdir().unwrap();
        let paths = PathConfig::new(dir.path());
        paths.create_all().unwrap();
        (dir, paths)
    }

    const TILE: &str = "\
RA,DEC,RELEASE,BRICKID,OBJID,TYPE,EBV,MASKBITS,FITBITS,FLUX_G,FLUX_IVAR_G,MW_TRANSMISSION_G,FLUX_R
5.0,1.0,9010,331,17,PSF,0.01,0,0,12.5,4.0,0.95,20.0
5.5,3.0,9010,331,18,REX,0.02,0,0,3.0,1.0,0.9,4.0
";

    #[test]
    fn test_load_sweep_skips_missing_bricks() {
        let (_dir, paths) = layout();
        let region = Region::new(0.0, 20.0, -5.0, 5.0).unwrap();
        write_text(
            &paths.path(PathKind::Sweep).join("sweep-000p000-010p005.csv"),
            TILE,
            false,
        )
        .unwrap();
        let region_small = Region::new(0.0, 10.0, 0.0, 2.0).unwrap();

        let table = load_sweep(&region, &paths, &["g"], SWEEP_EXTENSION).unwrap();
        assert_eq!(table.len(), 2);
        let names: Vec<&str> = table.column_names().iter().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "ra",
                "dec",
                "sweep_id",
                "sweep_type",
                "sweep_ebv",
                "sweep_maskbits",
                "sweep_fitbits",
                "flux_g",
                "flux_ivar_g",
                "mw_transmission_g",
            ]
        );
        assert_eq!(
            table.column("sweep_id"),
            Some(&Column::Text(vec![
                Some("9010_331_17".into()),
                Some("9010_331_18".into())
            ]))
        );

        let trimmed = load_sweep(&region_small, &paths, &["g"], SWEEP_EXTENSION).unwrap();
        assert_eq!(trimmed.len(), 1);
    }

    #[test]
    fn test_load_sweep_without_tiles_is_empty() {
        let (_dir, paths) = layout();
        let region = Region::new(100.0, 101.0, 0.0, 1.0).unwrap();
        let table = load_sweep(&region, &paths, &["g"], SWEEP_EXTENSION).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.num_columns(), 0);
    }

    #[test]
    fn test_load_agn_probability_cut() {
        let (_dir, paths) = layout();
        write_text(
            &paths.path(PathKind::Catalogues).join("agn.csv"),
            "ra,dec,phot_z,prob_rf,extra\n1.0,1.0,0.5,0.95,x\n1.0,1.0,0.7,0.93,y\n1.0,1.0,0.9,0.94,z\n",
            false,
        )
        .unwrap();
        let region = Region::new(0.0, 2.0, 0.0, 2.0).unwrap();
        let table = load_agn(&region, &paths, "agn.csv", 0.94).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column_names(),
            &["ra", "dec", "shu_z_phot", "shu_prob_rf"]
        );
    }

    #[test]
    fn test_load_vhs_converts_radians() {
        let (_dir, paths) = layout();
        let ra = 10.0_f64.to_radians();
        let dec = 1.0_f64.to_radians();
        let text = format!(
            "RA,DEC,PSTAR,PGALAXY,EBV,JAPERMAG6,JAPERMAG6ERR,JAPERMAG4,JAPERMAG4ERR,AJ\n\
             {},{},0.9,0.1,0.02,19.1,0.05,19.3,0.04,0.01\n\
             3.0,0.5,0.9,0.1,0.02,19.1,0.05,19.3,0.04,0.01\n",
            ra, dec
        );
        write_text(&paths.path(PathKind::Catalogues).join("vhs.csv"), &text, false).unwrap();
        let region = Region::new(5.0, 15.0, 0.0, 2.0).unwrap();
        let table = load_vhs(&region, &paths, "vhs.csv", &["j"]).unwrap();
        assert_eq!(table.len(), 1);
        let (ra_deg, _) = table.positions("test").unwrap();
        assert!((ra_deg[0] - 10.0).abs() < 1e-9);
        assert!(table.has_column("vhs_pstar"));
        assert!(table.has_column("japermag4err"));
        assert!(table.has_column("aj"));
    }

    #[test]
    fn test_missing_catalog_is_io_error() {
        let (_dir, paths) = layout();
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let err = load_agn(&region, &paths, "absent.csv", 0.94).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_load_agn_from_fits() {
        use crate::io::fits::tests::{bintable, Field};
        use crate::io::write_bytes;

        let (_dir, paths) = layout();
        let bytes = bintable(&[
            ("RA", Field::Double(vec![130.0, 131.0, 150.0])),
            ("DEC", Field::Double(vec![1.0, 2.0, 1.0])),
            ("PHOT_Z", Field::Float(vec![0.5, 1.25, 0.7])),
            ("PROB_RF", Field::Float(vec![0.5, 0.96875, 0.99])),
            ("NAME", Field::Text(8, vec!["J0842", "J0844", "J1000"])),
        ]);
        write_bytes(
            &paths.path(PathKind::Catalogues).join("optical_agn_shu.fits"),
            &bytes,
            false,
        )
        .unwrap();
        let table = load_agn(&Region::EFEDS, &paths, "optical_agn_shu.fits", 0.94).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.floats("shu_z_phot", "test").unwrap()[0], 1.25);
        assert_eq!(table.floats("ra", "test").unwrap()[0], 131.0);
    }
}
