//! Error types for photometric processing.
//!
//! Catalog failures pass through unchanged inside
//! [`PhotometryError::Catalog`]. Numeric trouble (zero inverse variance,
//! zero transmission) is never an error here: it flows on as NaN or ±inf.

use crate::band::{Band, Survey};
use celestial_catalog::CatalogError;
use thiserror::Error;

pub type PhotometryResult<T> = Result<T, PhotometryError>;

#[derive(Debug, Error)]
pub enum PhotometryError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Unknown band '{name}'")]
    UnknownBand { name: String },

    #[error("Band {band} does not belong to the {survey} survey")]
    BandSurvey { band: Band, survey: Survey },
}

impl PhotometryError {
    pub fn unknown_band(name: impl Into<String>) -> Self {
        Self::UnknownBand { name: name.into() }
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Catalog(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_errors_pass_through() {
        let err: PhotometryError = CatalogError::missing_column("sweep_type", "split").into();
        assert_eq!(err.to_string(), "Missing column 'sweep_type' (split)");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_band_survey_message() {
        let err = PhotometryError::BandSurvey {
            band: Band::J,
            survey: Survey::Sweep,
        };
        assert_eq!(err.to_string(), "Band j does not belong to the sweep survey");
    }
}
