//! Photometric bands and the surveys that measure them.

use crate::errors::{PhotometryError, PhotometryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Survey {
    /// GALEX ultraviolet, fluxes in µJy.
    Galex,
    /// Legacy Survey DR10 sweeps, optical and WISE fluxes in nanomaggies.
    Sweep,
    /// VISTA Hemisphere Survey, Vega magnitudes.
    Vhs,
}

impl Survey {
    pub fn name(self) -> &'static str {
        match self {
            Self::Galex => "galex",
            Self::Sweep => "sweep",
            Self::Vhs => "vhs",
        }
    }

    /// Bands of this survey in canonical order.
    pub fn bands(self) -> &'static [Band] {
        match self {
            Self::Galex => &[Band::Fuv, Band::Nuv],
            Self::Sweep => &[
                Band::G,
                Band::R,
                Band::Z,
                Band::W1,
                Band::W2,
                Band::W3,
                Band::W4,
            ],
            Self::Vhs => &[Band::Y, Band::J, Band::H, Band::Ks],
        }
    }
}

impl fmt::Display for Survey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A photometric channel. The derived ordering is the canonical band order
/// used for output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Fuv,
    Nuv,
    G,
    R,
    Z,
    W1,
    W2,
    W3,
    W4,
    Y,
    J,
    H,
    Ks,
}

impl Band {
    pub const ALL: [Band; 13] = [
        Band::Fuv,
        Band::Nuv,
        Band::G,
        Band::R,
        Band::Z,
        Band::W1,
        Band::W2,
        Band::W3,
        Band::W4,
        Band::Y,
        Band::J,
        Band::H,
        Band::Ks,
    ];

    /// Lowercase name as used in column names.
    pub fn name(self) -> &'static str {
        match self {
            Self::Fuv => "fuv",
            Self::Nuv => "nuv",
            Self::G => "g",
            Self::R => "r",
            Self::Z => "z",
            Self::W1 => "w1",
            Self::W2 => "w2",
            Self::W3 => "w3",
            Self::W4 => "w4",
            Self::Y => "y",
            Self::J => "j",
            Self::H => "h",
            Self::Ks => "ks",
        }
    }

    pub fn survey(self) -> Survey {
        match self {
            Self::Fuv | Self::Nuv => Survey::Galex,
            Self::G | Self::R | Self::Z | Self::W1 | Self::W2 | Self::W3 | Self::W4 => {
                Survey::Sweep
            }
            Self::Y | Self::J | Self::H | Self::Ks => Survey::Vhs,
        }
    }

    /// Vega to AB offset in magnitudes; only defined for VHS bands.
    pub fn vega_ab_offset(self) -> Option<f64> {
        match self {
            Self::Y => Some(0.60),
            Self::J => Some(0.92),
            Self::H => Some(1.37),
            Self::Ks => Some(1.83),
            _ => None,
        }
    }

    /// `A_band / E(B-V)` for the GALEX bands.
    pub fn galex_extinction_coefficient(self) -> Option<f64> {
        match self {
            Self::Fuv => Some(8.06),
            Self::Nuv => Some(7.95),
            _ => None,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Band {
    type Err = PhotometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Band::ALL
            .iter()
            .copied()
            .find(|b| b.name() == lower)
            .ok_or_else(|| PhotometryError::unknown_band(s))
    }
}

/// Check that every band in `bands` belongs to `survey`.
pub fn require_survey(bands: &[Band], survey: Survey) -> PhotometryResult<()> {
    match bands.iter().find(|b| b.survey() != survey) {
        Some(&band) => Err(PhotometryError::BandSurvey { band, survey }),
        None => Ok(()),
    }
}

/// Sorted into canonical order with duplicates removed.
pub fn canonical(bands: &[Band]) -> Vec<Band> {
    let mut out = bands.to_vec();
    out.sort();
    out.dedup();
    out
}
