//! Conversion of survey photometry to a common flux unit.
//!
//! Every corrected flux and error is in erg s⁻¹ cm⁻² Hz⁻¹ and lands in
//! `c_flux_<band>` and `c_flux_err_<band>`. Inputs are left untouched and
//! bands that are not requested are not looked at.
//!
//! Non-finite results are valid output. A zero inverse variance gives an
//! infinite error, a zero transmission an infinite flux, and NaN inputs stay
//! NaN. Rows like these are screened downstream, not here.
//!
//! The table functions are one-shot: running one twice on its own output
//! corrects twice.

use crate::band::{require_survey, Band, Survey};
use crate::errors::PhotometryResult;
use celestial_catalog::{Column, Table};
use celestial_core::constants::{
    AB_ZERO_POINT_MAG, MICROJANSKY_TO_CGS, NANOMAGGIE_TO_CGS, POGSON,
};
use std::f64::consts::LN_10;
use tracing::debug;

/// Column holding the GALEX `E(B-V)` used for the UV extinction correction.
pub const GALEX_EBV_COLUMN: &str = "galex_ebv";

pub fn flux_column(band: Band) -> String {
    format!("c_flux_{}", band)
}

pub fn flux_error_column(band: Band) -> String {
    format!("c_flux_err_{}", band)
}

pub fn magnitude_column(band: Band) -> String {
    format!("c_mag_{}", band)
}

/// Sweep flux and error from nanomaggies, de-reddened by the Milky Way
/// transmission. Returns `(flux, error)`.
pub fn sweep_flux(flux: f64, flux_ivar: f64, transmission: f64) -> (f64, f64) {
    let corrected = flux / transmission * NANOMAGGIE_TO_CGS;
    let error = 1.0 / flux_ivar.sqrt() / transmission * NANOMAGGIE_TO_CGS;
    (corrected, error)
}

/// GALEX flux and error from µJy, corrected for `A = k × E(B-V)`.
///
/// Returns `None` for a band without a GALEX extinction coefficient.
pub fn galex_flux(band: Band, flux: f64, flux_err: f64, ebv: f64) -> Option<(f64, f64)> {
    let k = band.galex_extinction_coefficient()?;
    let scale = 10f64.powf(k * ebv / POGSON) * MICROJANSKY_TO_CGS;
    Some((flux * scale, flux_err * scale))
}

/// De-reddened AB magnitude from a VHS Vega magnitude.
///
/// Returns `None` for a band without a Vega to AB offset.
pub fn vhs_ab_magnitude(band: Band, vega_mag: f64, extinction: f64) -> Option<f64> {
    Some(vega_mag + extinction + band.vega_ab_offset()?)
}

pub fn ab_magnitude_to_flux(ab_mag: f64) -> f64 {
    10f64.powf(-(ab_mag + AB_ZERO_POINT_MAG) / POGSON)
}

/// First-order propagation of a magnitude error through
/// [`ab_magnitude_to_flux`].
pub fn ab_flux_error(flux: f64, mag_err: f64) -> f64 {
    flux * LN_10 / POGSON * mag_err
}

/// Add corrected fluxes for sweep bands.
///
/// Reads `flux_<b>`, `flux_ivar_<b>` and `mw_transmission_<b>`.
pub fn correct_sweep(table: Table, bands: &[Band]) -> PhotometryResult<Table> {
    require_survey(bands, Survey::Sweep)?;
    let mut table = table;
    for &band in bands {
        let (c_flux, c_err): (Vec<f64>, Vec<f64>) = {
            let flux = table.floats(&format!("flux_{}", band), "sweep correction")?;
            let ivar = table.floats(&format!("flux_ivar_{}", band), "sweep correction")?;
            let trans = table.floats(&format!("mw_transmission_{}", band), "sweep correction")?;
            flux.iter()
                .zip(ivar.iter())
                .zip(trans.iter())
                .map(|((&f, &iv), &t)| sweep_flux(f, iv, t))
                .unzip()
        };
        table = table
            .with_column(flux_column(band), Column::Float(c_flux))?
            .with_column(flux_error_column(band), Column::Float(c_err))?;
        debug!(%band, "corrected sweep band");
    }
    Ok(table)
}

/// Add corrected fluxes for GALEX bands.
///
/// Reads `flux_<b>`, `flux_err_<b>` and [`GALEX_EBV_COLUMN`].
pub fn correct_galex(table: Table, bands: &[Band]) -> PhotometryResult<Table> {
    require_survey(bands, Survey::Galex)?;
    let mut table = table;
    for &band in bands {
        let (c_flux, c_err): (Vec<f64>, Vec<f64>) = {
            let flux = table.floats(&format!("flux_{}", band), "galex correction")?;
            let err = table.floats(&format!("flux_err_{}", band), "galex correction")?;
            let ebv = table.floats(GALEX_EBV_COLUMN, "galex correction")?;
            flux.iter()
                .zip(err.iter())
                .zip(ebv.iter())
                .map(|((&f, &e), &x)| {
                    galex_flux(band, f, e, x).unwrap_or((f64::NAN, f64::NAN))
                })
                .unzip()
        };
        table = table
            .with_column(flux_column(band), Column::Float(c_flux))?
            .with_column(flux_error_column(band), Column::Float(c_err))?;
        debug!(%band, "corrected galex band");
    }
    Ok(table)
}

/// Add AB magnitudes and fluxes for VHS bands of a split table.
///
/// Reads `mag_<b>`, `mag_<b>err` and `a<b>`, the names left by
/// [`split_by_source_type`](crate::split::split_by_source_type).
pub fn correct_vhs(table: Table, bands: &[Band]) -> PhotometryResult<Table> {
    require_survey(bands, Survey::Vhs)?;
    let mut table = table;
    for &band in bands {
        let (c_mag, c_flux, c_err) = {
            let mag = table.floats(&format!("mag_{}", band), "vhs correction")?;
            let mag_err = table.floats(&format!("mag_{}err", band), "vhs correction")?;
            let ext = table.floats(&format!("a{}", band), "vhs correction")?;
            let c_mag: Vec<f64> = mag
                .iter()
                .zip(ext.iter())
                .map(|(&m, &a)| vhs_ab_magnitude(band, m, a).unwrap_or(f64::NAN))
                .collect();
            let c_flux: Vec<f64> = c_mag.iter().map(|&m| ab_magnitude_to_flux(m)).collect();
            let c_err: Vec<f64> = c_flux
                .iter()
                .zip(mag_err.iter())
                .map(|(&f, &e)| ab_flux_error(f, e))
                .collect();
            (c_mag, c_flux, c_err)
        };
        table = table
            .with_column(magnitude_column(band), Column::Float(c_mag))?
            .with_column(flux_column(band), Column::Float(c_flux))?
            .with_column(flux_error_column(band), Column::Float(c_err))?;
        debug!(%band, "corrected vhs band");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PhotometryError;
    use celestial_catalog::CatalogError;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
    }

    #[test]
    fn test_sweep_unit_transmission_is_pure_scale() {
        let (flux, err) = sweep_flux(12.5, 4.0, 1.0);
        assert_eq!(flux, 12.5 * 3.631e-29);
        assert!(close(err, 0.5 * 3.631e-29));
    }

    #[test]
    fn test_sweep_zero_ivar_is_infinite_error() {
        let (flux, err) = sweep_flux(1.0, 0.0, 0.9);
        assert!(flux.is_finite());
        assert!(err.is_infinite());
    }

    #[test]
    fn test_galex_extinction() {
        let (flux, err) = galex_flux(Band::Fuv, 10.0, 1.0, 0.05).unwrap();
        let scale = 10f64.powf(8.06 * 0.05 / 2.5) * 1e-29;
        assert!(close(flux, 10.0 * scale));
        assert!(close(err, scale));
        let (flux, _) = galex_flux(Band::Nuv, 10.0, 1.0, 0.0).unwrap();
        assert!(close(flux, 1e-28));
        assert!(galex_flux(Band::G, 1.0, 1.0, 0.0).is_none());
    }

    #[test]
    fn test_vhs_j_scenario() {
        let mag = vhs_ab_magnitude(Band::J, 20.0, 0.05).unwrap();
        assert!((mag - 20.97).abs() < 1e-12);
        let flux = ab_magnitude_to_flux(mag);
        assert!(close(flux, 10f64.powf(-(20.97 + 48.6) / 2.5)));
        let err = ab_flux_error(flux, 0.1);
        assert!(close(err, flux * 10f64.ln() / 2.5 * 0.1));
    }

    #[test]
    fn test_ab_zero_point() {
        // 0 AB mag is about 3631 Jy.
        let flux = ab_magnitude_to_flux(0.0);
        assert!((flux / 3.631e-20 - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_correct_sweep_leaves_other_bands() {
        let table = Table::from_columns(vec![
            ("flux_g", Column::Float(vec![2.0, f64::NAN])),
            ("flux_ivar_g", Column::Float(vec![1.0, 1.0])),
            ("mw_transmission_g", Column::Float(vec![0.5, 1.0])),
            ("flux_r", Column::Float(vec![7.0, 8.0])),
        ])
        .unwrap();
        let out = correct_sweep(table.clone(), &[Band::G]).unwrap();
        let c = out.floats("c_flux_g", "test").unwrap();
        assert!(close(c[0], 4.0 * 3.631e-29));
        assert!(c[1].is_nan());
        assert_eq!(out.column("flux_r"), table.column("flux_r"));
        assert!(!out.has_column("c_flux_r"));
    }

    #[test]
    fn test_correct_sweep_missing_column() {
        let table = Table::from_columns(vec![("flux_g", Column::Float(vec![2.0]))]).unwrap();
        let err = correct_sweep(table, &[Band::G]).unwrap_err();
        assert!(matches!(
            err,
            PhotometryError::Catalog(CatalogError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_correct_rejects_foreign_band() {
        let err = correct_galex(Table::new(), &[Band::G]).unwrap_err();
        assert!(matches!(err, PhotometryError::BandSurvey { .. }));
    }

    #[test]
    fn test_correct_vhs_columns() {
        let table = Table::from_columns(vec![
            ("mag_j", Column::Float(vec![20.0])),
            ("mag_jerr", Column::Float(vec![0.1])),
            ("aj", Column::Float(vec![0.05])),
        ])
        .unwrap();
        let out = correct_vhs(table, &[Band::J]).unwrap();
        let c_mag = out.floats("c_mag_j", "test").unwrap();
        let c_flux = out.floats("c_flux_j", "test").unwrap();
        let c_err = out.floats("c_flux_err_j", "test").unwrap();
        assert!((c_mag[0] - 20.97).abs() < 1e-12);
        assert!(close(c_flux[0], 10f64.powf(-(20.97 + 48.6) / 2.5)));
        assert!(close(c_err[0], c_flux[0] * LN_10 / 2.5 * 0.1));
    }
}
