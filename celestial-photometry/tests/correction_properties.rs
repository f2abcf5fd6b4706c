use celestial_catalog::{Column, Table};
use celestial_photometry::correct::{
    ab_flux_error, ab_magnitude_to_flux, correct_sweep, sweep_flux, vhs_ab_magnitude,
};
use celestial_photometry::Band;
use proptest::prelude::*;

fn vhs_band() -> impl Strategy<Value = Band> {
    prop::sample::select(vec![Band::Y, Band::J, Band::H, Band::Ks])
}

proptest! {
    #[test]
    fn prop_nir_flux_decreases_with_magnitude(
        band in vhs_band(),
        m1 in 10.0f64..25.0,
        m2 in 10.0f64..25.0,
        extinction in 0.0f64..0.5,
    ) {
        prop_assume!((m1 - m2).abs() > 1e-6);
        let (bright, faint) = if m1 < m2 { (m1, m2) } else { (m2, m1) };
        let f_bright = ab_magnitude_to_flux(vhs_ab_magnitude(band, bright, extinction).unwrap());
        let f_faint = ab_magnitude_to_flux(vhs_ab_magnitude(band, faint, extinction).unwrap());
        prop_assert!(f_bright > f_faint);
    }

    #[test]
    fn prop_sweep_unit_transmission_is_exact_scale(
        flux in -1.0e4f64..1.0e4,
        ivar in 1.0e-6f64..1.0e4,
    ) {
        let (corrected, _) = sweep_flux(flux, ivar, 1.0);
        prop_assert_eq!(corrected, flux * 3.631e-29);
    }

    #[test]
    fn prop_flux_error_scales_with_magnitude_error(
        mag in 15.0f64..25.0,
        err in 0.0f64..1.0,
    ) {
        let flux = ab_magnitude_to_flux(mag);
        let e1 = ab_flux_error(flux, err);
        let e2 = ab_flux_error(flux, 2.0 * err);
        prop_assert!((e2 - 2.0 * e1).abs() <= 1e-12 * e2.abs());
    }
}

#[test]
fn test_nir_j_band_scenario() {
    let c_mag = vhs_ab_magnitude(Band::J, 20.0, 0.05).unwrap();
    assert!((c_mag - 20.97).abs() < 1e-12);

    let c_flux = ab_magnitude_to_flux(c_mag);
    let expected = 10f64.powf(-(20.97 + 48.6) / 2.5);
    assert!((c_flux / expected - 1.0).abs() < 1e-12);

    let c_err = ab_flux_error(c_flux, 0.1);
    assert!((c_err / (c_flux * 10f64.ln() / 2.5 * 0.1) - 1.0).abs() < 1e-12);
}

#[test]
fn test_sweep_table_non_finite_rows_flow_through() {
    let table = Table::from_columns(vec![
        ("flux_z", Column::Float(vec![5.0, 5.0, 5.0])),
        ("flux_ivar_z", Column::Float(vec![1.0, 0.0, 1.0])),
        ("mw_transmission_z", Column::Float(vec![1.0, 1.0, 0.0])),
    ])
    .unwrap();
    let out = correct_sweep(table, &[Band::Z]).unwrap();
    let flux = out.floats("c_flux_z", "test").unwrap();
    let err = out.floats("c_flux_err_z", "test").unwrap();
    assert_eq!(flux[0], 5.0 * 3.631e-29);
    assert!(err[1].is_infinite());
    assert!(flux[2].is_infinite());
}
