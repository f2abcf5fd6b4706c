//! Table files.
//!
//! Two on-disk layouts are read:
//!
//! | Extension | Reader |
//! |-----------|--------|
//! | `.fits`, `.fit`, `.fts` | First `BINTABLE` extension, see [`fits`] |
//! | anything else | Comma-separated text, see [`delimited`] |
//!
//! Either may carry a trailing `.gz` and is then decompressed on the fly.
//! Tables are always written as comma-separated text.

pub mod delimited;
pub mod fits;

pub use delimited::{format_table, parse_table, parse_table_str};
pub use fits::parse_fits;

use crate::errors::{CatalogError, CatalogResult};
use crate::table::Table;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// On-disk layout of a table file, decided by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Fits,
    Delimited,
}

impl TableFormat {
    /// Layout for `path`, looking through a trailing `.gz`.
    pub fn from_path(path: &Path) -> Self {
        let inner = if is_gzip(path) {
            path.file_stem().map(Path::new)
        } else {
            Some(path)
        };
        let is_fits = inner
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                ["fits", "fit", "fts"]
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if is_fits {
            Self::Fits
        } else {
            Self::Delimited
        }
    }
}

/// Read a table from `path`, decompressing `.gz` files.
///
/// # Errors
/// Returns [`CatalogError::Io`] if the file cannot be opened or read,
/// [`CatalogError::Parse`] on malformed text and [`CatalogError::Fits`] on a
/// malformed FITS file.
pub fn read_table(path: &Path) -> CatalogResult<Table> {
    let format = TableFormat::from_path(path);
    let file = File::open(path).map_err(|e| CatalogError::io(path, e))?;
    let mut reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let table = match format {
        TableFormat::Fits => {
            let mut bytes = Vec::new();
            reader
                .read_to_end(&mut bytes)
                .map_err(|e| CatalogError::io(path, e))?;
            parse_fits(&bytes, path)?
        }
        TableFormat::Delimited => parse_table(reader, path)?,
    };
    debug!(
        path = %path.display(),
        ?format,
        rows = table.len(),
        columns = table.num_columns(),
        "read table"
    );
    Ok(table)
}

/// Write `table` to `path`, compressing if the name ends in `.gz`.
///
/// Parent directories are created as needed.
///
/// # Errors
/// Returns [`CatalogError::AlreadyExists`] if the file exists and `overwrite`
/// is false, or [`CatalogError::Io`] on write failure.
pub fn write_table(path: &Path, table: &Table, overwrite: bool) -> CatalogResult<()> {
    write_text(path, &format_table(table)?, overwrite)?;
    debug!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(())
}

/// Write raw text to `path` under the same overwrite rules as [`write_table`].
pub fn write_text(path: &Path, text: &str, overwrite: bool) -> CatalogResult<()> {
    write_bytes(path, text.as_bytes(), overwrite)
}

/// Write raw bytes to `path` under the same overwrite rules as [`write_table`].
pub fn write_bytes(path: &Path, bytes: &[u8], overwrite: bool) -> CatalogResult<()> {
    if path.exists() && !overwrite {
        return Err(CatalogError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| CatalogError::io(path, e))?;
    let io_err = |e: std::io::Error| CatalogError::io(path, e);
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(bytes).map_err(io_err)?;
        encoder.finish().map_err(io_err)?.flush().map_err(io_err)?;
    } else {
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    Ok(())
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
# survey dump
ra,dec,objid,type
150.1,2.2,17,PSF
150.2,,18,\"REX, round\"
";

    #[test]
    fn test_format_from_path() {
        let format = |name: &str| TableFormat::from_path(Path::new(name));
        assert_eq!(format("sweep-000p000-010p005.fits"), TableFormat::Fits);
        assert_eq!(format("vhs.FITS.gz"), TableFormat::Fits);
        assert_eq!(format("agn.csv.gz"), TableFormat::Delimited);
        assert_eq!(format("agn"), TableFormat::Delimited);
    }

    #[test]
    fn test_write_then_read_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("t.csv.gz");
        let table = parse_table_str(SAMPLE).unwrap();
        write_table(&path, &table, false).unwrap();
        let back = read_table(&path).unwrap();
        assert_eq!(back.column_names(), table.column_names());
        assert_eq!(back.column("type"), table.column("type"));
        assert_eq!(back.column("objid"), table.column("objid"));
    }

    #[test]
    fn test_read_fits_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("optical_agn_shu.fits.gz");
        let bytes = fits::tests::bintable(&[
            ("RA", fits::tests::Field::Double(vec![130.0, 131.0])),
            ("DEC", fits::tests::Field::Double(vec![1.0, 2.0])),
        ]);
        write_bytes(&path, &bytes, false).unwrap();
        let table = read_table(&path).unwrap();
        assert_eq!(table.column("RA"), Some(&Column::Float(vec![130.0, 131.0])));
    }

    #[test]
    fn test_overwrite_guard() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let table = parse_table_str(SAMPLE).unwrap();
        write_table(&path, &table, false).unwrap();
        let err = write_table(&path, &table, false).unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
        write_table(&path, &table, true).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_table(Path::new("/nonexistent/sweep.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        let err = read_table(Path::new("/nonexistent/sweep.fits")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
