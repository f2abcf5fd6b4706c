//! LePhare input catalogs.
//!
//! LePhare reads one source per line:
//!
//! ```text
//! IDENT fuv fuv_err ... ks ks_err CONTEXT zspec String
//! ```
//!
//! Bands appear in canonical order. Missing values are written as `-99.0`,
//! which LePhare treats as "not observed". `CONTEXT` is `-1` (use every band).

use crate::band::{canonical, Band};
use crate::correct::{flux_column, flux_error_column};
use crate::errors::PhotometryResult;
use crate::split::SourceType;
use celestial_catalog::io::{write_table, write_text};
use celestial_catalog::{Column, PathConfig, PathKind, Table};
use std::path::PathBuf;
use tracing::info;

/// Written in place of a missing value.
pub const NULL_SENTINEL: f64 = -99.0;

/// Context bitmask meaning "all bands".
pub const DEFAULT_CONTEXT: &str = "-1";

const ID_COLUMN: &str = "sweep_id";
const ZSPEC_COLUMN: &str = "zspec";

/// Project a corrected table onto the LePhare column layout.
///
/// Uses `c_flux_<b>`/`c_flux_err_<b>` for every band and `zspec` if the table
/// has one. NaN becomes [`NULL_SENTINEL`]; infinities are kept.
pub fn format_input(table: &Table, bands: &[Band]) -> PhotometryResult<Table> {
    let n = table.len();
    let ident = table.texts(ID_COLUMN, "LePhare input")?.into_owned();
    let mut out = Table::new().with_column("IDENT", Column::Text(ident))?;

    for band in canonical(bands) {
        let flux = filled(table, &flux_column(band))?;
        let err = filled(table, &flux_error_column(band))?;
        out = out
            .with_column(band.name(), Column::Float(flux))?
            .with_column(format!("{}_err", band), Column::Float(err))?;
    }

    let zspec = if table.has_column(ZSPEC_COLUMN) {
        filled(table, ZSPEC_COLUMN)?
    } else {
        vec![NULL_SENTINEL; n]
    };
    Ok(out
        .with_column("CONTEXT", Column::text_filled(DEFAULT_CONTEXT, n))?
        .with_column(ZSPEC_COLUMN, Column::Float(zspec))?
        .with_column("String", Column::text_filled("", n))?)
}

fn filled(table: &Table, name: &str) -> PhotometryResult<Vec<f64>> {
    Ok(table
        .floats(name, "LePhare input")?
        .iter()
        .map(|&v| if v.is_nan() { NULL_SENTINEL } else { v })
        .collect())
}

/// Whitespace-separated text with a header line.
///
/// Text cells that are empty or contain whitespace are double-quoted.
pub fn to_ascii(table: &Table) -> String {
    let mut out = table.column_names().join(" ");
    out.push('\n');
    for row in 0..table.len() {
        let cells: Vec<String> = table
            .columns()
            .map(|(_, column)| match column {
                Column::Text(_) => {
                    let text = column.format_cell(row);
                    if text.is_empty() || text.contains(char::is_whitespace) {
                        format!("\"{}\"", text)
                    } else {
                        text
                    }
                }
                _ => column.format_cell(row),
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

/// File stem `<stem>_input_<type>` shared by the `.in` and `.csv` outputs.
pub fn input_file_stem(stem: &str, source_type: SourceType) -> String {
    format!("{}_input_{}", stem, source_type)
}

/// Write a formatted table to the LePhare input directory.
///
/// Produces `<stem>_input_<type>.in` and a `.csv` copy; returns the path of
/// the `.in` file.
///
/// # Errors
/// Returns [`AlreadyExists`](celestial_catalog::CatalogError::AlreadyExists)
/// if either file exists and `overwrite` is false.
pub fn write_input(
    table: &Table,
    source_type: SourceType,
    stem: &str,
    paths: &PathConfig,
    overwrite: bool,
) -> PhotometryResult<PathBuf> {
    let dir = paths.path(PathKind::LephareInput);
    let file_stem = input_file_stem(stem, source_type);
    let ascii_path = dir.join(format!("{}.in", file_stem));
    let csv_path = dir.join(format!("{}.csv", file_stem));
    write_text(&ascii_path, &to_ascii(table), overwrite)?;
    write_table(&csv_path, table, overwrite)?;
    info!(
        path = %ascii_path.display(),
        rows = table.len(),
        %source_type,
        "wrote LePhare input"
    );
    Ok(ascii_path)
}
