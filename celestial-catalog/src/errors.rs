//! Error types for catalog loading, filtering and matching.
//!
//! | Variant | Meaning | Recoverable? |
//! |---------|---------|--------------|
//! | [`InvalidRegion`](CatalogError::InvalidRegion) | Region bounds are empty or inverted | No |
//! | [`MissingColumn`](CatalogError::MissingColumn) | A required column is absent | No |
//! | [`ColumnType`](CatalogError::ColumnType) | A column holds the wrong kind of values | No |
//! | [`DuplicateColumn`](CatalogError::DuplicateColumn) | Two columns would share a name | No |
//! | [`LengthMismatch`](CatalogError::LengthMismatch) | Column or table shapes disagree | No |
//! | [`BrickNotFound`](CatalogError::BrickNotFound) | A sweep tile is absent on disk | Yes |
//! | [`Network`](CatalogError::Network) | The remote crossmatch service failed | No |
//! | [`Parse`](CatalogError::Parse) | Malformed table text | No |
//! | [`Fits`](CatalogError::Fits) | Malformed FITS file or no binary table | No |
//! | [`Io`](CatalogError::Io) | File system failure | No |
//! | [`AlreadyExists`](CatalogError::AlreadyExists) | Output exists and overwrite is off | No |
//! | [`Config`](CatalogError::Config) | Malformed configuration file | No |

use std::path::PathBuf;
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid region: {message}")]
    InvalidRegion { message: String },

    #[error("Missing column '{column}' ({context})")]
    MissingColumn { column: String, context: String },

    #[error("Column '{column}' has type {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Duplicate column '{column}'")]
    DuplicateColumn { column: String },

    #[error("Length mismatch: expected {expected} rows, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// A brick produced by region enumeration has no tile file.
    ///
    /// Loaders log and skip these; the region over-covers by construction.
    #[error("Brick {brick} not found at {path:?}")]
    BrickNotFound { brick: String, path: PathBuf },

    #[error("Crossmatch service {service} failed: {message}")]
    Network { service: String, message: String },

    #[error("Parse error in {path:?} line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Malformed FITS file {path:?}: {message}")]
    Fits { path: PathBuf, message: String },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite existing file {path:?}")]
    AlreadyExists { path: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CatalogError {
    pub fn invalid_region(message: impl Into<String>) -> Self {
        Self::InvalidRegion {
            message: message.into(),
        }
    }

    pub fn missing_column(column: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            context: context.into(),
        }
    }

    pub fn network(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub fn fits(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Fits {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns `true` if the run may continue past this error.
    ///
    /// Only a missing brick is recoverable: the tile is skipped.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BrickNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message() {
        let err = CatalogError::missing_column("ra", "region filter");
        assert_eq!(err.to_string(), "Missing column 'ra' (region filter)");
    }

    #[test]
    fn test_network_message() {
        let err = CatalogError::network("CDS XMatch", "connection refused");
        assert!(err.to_string().contains("CDS XMatch"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_recoverable_errors() {
        let missing = CatalogError::BrickNotFound {
            brick: "000m005-010p000".to_string(),
            path: PathBuf::from("sweep-000m005-010p000.fits"),
        };
        assert!(missing.is_recoverable());
        assert!(!CatalogError::invalid_region("ra_max <= ra_min").is_recoverable());
        assert!(!CatalogError::network("svc", "timeout").is_recoverable());
    }

    #[test]
    fn test_send_sync() {
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}
        _assert_send::<CatalogError>();
        _assert_sync::<CatalogError>();
    }
}
