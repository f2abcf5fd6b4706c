//! Run configuration, read from TOML.
//!
//! Every field has a default, so an empty file (or no file) describes the
//! standard eFEDS run:
//!
//! ```toml
//! stem = "efeds_v2"
//! overwrite = true
//!
//! [region]
//! ra_min = 126.0
//! ra_max = 146.0
//! dec_min = -3.0
//! dec_max = 6.0
//!
//! [matching]
//! vhs_radius_arcsec = 1.0
//! ```

use crate::band::{require_survey, Band, Survey};
use crate::errors::PhotometryResult;
use celestial_catalog::crossmatch::remote::{CDS_XMATCH_URL, GALEX_CATALOG};
use celestial_catalog::crossmatch::SWEEP_MATCH_RADIUS_DEG;
use celestial_catalog::loader::SWEEP_EXTENSION;
use celestial_catalog::{CatalogError, Region};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub region: Region,
    pub bands: BandConfig,
    pub catalogs: CatalogFiles,
    pub matching: MatchConfig,
    pub remote: RemoteConfig,
    /// Prefix of every output file name.
    pub stem: String,
    pub overwrite: bool,
    /// Write the fully matched table to the match backup directory.
    pub save_backups: bool,
    /// Leave out the remote GALEX match and the UV bands.
    pub skip_galex: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub galex: Vec<Band>,
    pub sweep: Vec<Band>,
    pub vhs: Vec<Band>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFiles {
    pub agn: String,
    pub vhs: String,
    /// Extension of `sweep-<brick>.<ext>` tiles.
    pub sweep_extension: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// AGN to sweep, in degrees.
    pub sweep_radius_deg: f64,
    pub vhs_radius_arcsec: f64,
    pub galex_radius_arcsec: f64,
    /// Minimum random-forest AGN probability.
    pub rf_prob_cut: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub galex_catalog: String,
    /// Request timeout; absent means wait indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            region: Region::EFEDS,
            bands: BandConfig::default(),
            catalogs: CatalogFiles::default(),
            matching: MatchConfig::default(),
            remote: RemoteConfig::default(),
            stem: "base".to_string(),
            overwrite: false,
            save_backups: true,
            skip_galex: false,
        }
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            galex: Survey::Galex.bands().to_vec(),
            sweep: Survey::Sweep.bands().to_vec(),
            vhs: Survey::Vhs.bands().to_vec(),
        }
    }
}

impl Default for CatalogFiles {
    fn default() -> Self {
        Self {
            agn: "optical_agn_shu.csv".to_string(),
            vhs: "vhs_query_efeds.csv".to_string(),
            sweep_extension: SWEEP_EXTENSION.to_string(),
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            sweep_radius_deg: SWEEP_MATCH_RADIUS_DEG,
            vhs_radius_arcsec: 1.0,
            galex_radius_arcsec: 3.5,
            rf_prob_cut: 0.94,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: CDS_XMATCH_URL.to_string(),
            galex_catalog: GALEX_CATALOG.to_string(),
            timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> PhotometryResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CatalogError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> PhotometryResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Check that every band list only names bands of its survey.
    pub fn validate(&self) -> PhotometryResult<()> {
        require_survey(&self.bands.galex, Survey::Galex)?;
        require_survey(&self.bands.sweep, Survey::Sweep)?;
        require_survey(&self.bands.vhs, Survey::Vhs)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PhotometryError;

    #[test]
    fn test_empty_file_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.matching.rf_prob_cut, 0.94);
        assert_eq!(config.matching.sweep_radius_deg, 1e-5);
        assert_eq!(config.stem, "base");
        assert_eq!(config.bands.vhs, vec![Band::Y, Band::J, Band::H, Band::Ks]);
    }

    #[test]
    fn test_partial_sections() {
        let config = PipelineConfig::from_toml_str(
            r#"
            stem = "efeds_v2"

            [region]
            ra_min = 0.0
            ra_max = 20.0
            dec_min = -5.0
            dec_max = 5.0

            [bands]
            sweep = ["g", "r"]

            [matching]
            vhs_radius_arcsec = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.stem, "efeds_v2");
        assert_eq!(config.region.bricks().len(), 4);
        assert_eq!(config.bands.sweep, vec![Band::G, Band::R]);
        assert_eq!(config.bands.galex, vec![Band::Fuv, Band::Nuv]);
        assert_eq!(config.matching.vhs_radius_arcsec, 0.5);
        assert_eq!(config.matching.rf_prob_cut, 0.94);
    }

    #[test]
    fn test_invalid_region_rejected() {
        let err = PipelineConfig::from_toml_str(
            "[region]\nra_min = 5.0\nra_max = 1.0\ndec_min = 0.0\ndec_max = 1.0\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PhotometryError::Catalog(CatalogError::Config { .. })
        ));
    }

    #[test]
    fn test_band_in_wrong_survey() {
        let err = PipelineConfig::from_toml_str("[bands]\nvhs = [\"g\"]\n").unwrap_err();
        assert!(matches!(err, PhotometryError::BandSurvey { .. }));
    }
}
