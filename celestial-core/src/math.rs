use crate::constants::{DEG_TO_RAD, RAD_TO_DEG};

/// Central angle between two points given the sines and cosines of their
/// latitudes and their longitude difference, in radians.
///
/// The Vincenty form stays well conditioned for coincident and antipodal
/// points alike, unlike the plain law of cosines.
#[inline]
pub fn vincenty_angular_separation(
    sin_lat1: f64,
    cos_lat1: f64,
    sin_lat2: f64,
    cos_lat2: f64,
    delta_lon: f64,
) -> f64 {
    let (sin_delta_lon, cos_delta_lon) = libm::sincos(delta_lon);

    let num = libm::sqrt(
        (cos_lat2 * sin_delta_lon).powi(2)
            + (cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_delta_lon).powi(2),
    );
    let den = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_delta_lon;

    libm::atan2(num, den)
}

/// Great-circle distance between two sky positions, all in degrees.
pub fn angular_separation_deg(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let (d1_sin, d1_cos) = libm::sincos(dec1_deg * DEG_TO_RAD);
    let (d2_sin, d2_cos) = libm::sincos(dec2_deg * DEG_TO_RAD);
    let delta_lon = (ra2_deg - ra1_deg) * DEG_TO_RAD;

    vincenty_angular_separation(d1_sin, d1_cos, d2_sin, d2_cos, delta_lon) * RAD_TO_DEG
}

/// Largest multiple of `step` that is `<= value`.
#[inline]
pub fn floor_to_multiple(value: f64, step: i64) -> i64 {
    step * libm::floor(value / step as f64) as i64
}

/// Smallest multiple of `step` that is `>= value`.
#[inline]
pub fn ceil_to_multiple(value: f64, step: i64) -> i64 {
    step * libm::ceil(value / step as f64) as i64
}
