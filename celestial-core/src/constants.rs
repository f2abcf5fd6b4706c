#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

pub const ARCSEC_PER_DEGREE: f64 = 3600.0;

/// Right ascension wraps at this value, in degrees.
pub const FULL_CIRCLE_DEG: f64 = 360.0;

/// AB magnitude zero point: `m_AB = -2.5 log10(f_nu) - 48.60` with `f_nu` in erg/cm²/Hz/s.
pub const AB_ZERO_POINT_MAG: f64 = 48.6;

/// Pogson ratio: five magnitudes are a factor of 100 in flux.
pub const POGSON: f64 = 2.5;

/// One nanomaggie (3631 Jy × 10⁻⁹) in erg/cm²/Hz/s.
pub const NANOMAGGIE_TO_CGS: f64 = 3.631e-29;

/// One microjansky in erg/cm²/Hz/s.
pub const MICROJANSKY_TO_CGS: f64 = 1e-29;
