//! Sweep bricks: fixed 10° × 5° sky tiles.
//!
//! A brick is named after its lower and upper corners, each written as
//! `RRRcDDD` (RA zero-padded to three digits, `p`/`m` for the sign of Dec,
//! |Dec| zero-padded to three digits), joined by `-`:
//!
//! ```text
//! 000m005-010p000   RA 0..10, Dec -5..0
//! 350p085-360p090   RA 350..360, Dec 85..90
//! ```

use crate::errors::{CatalogError, CatalogResult};
use std::fmt;
use std::str::FromStr;

/// Width of a brick in right ascension, in degrees.
pub const BRICK_RA_STEP: i32 = 10;
/// Height of a brick in declination, in degrees.
pub const BRICK_DEC_STEP: i32 = 5;

/// One sweep tile covering `[ra_min, ra_min + 10) × [dec_min, dec_min + 5)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Brick {
    ra_min: i32,
    dec_min: i32,
}

impl Brick {
    /// Create the brick whose lower corner is `(ra_min, dec_min)`.
    ///
    /// Corners are not checked against the brick grid; the region enumeration
    /// only ever produces aligned corners.
    pub fn new(ra_min: i32, dec_min: i32) -> Self {
        Self { ra_min, dec_min }
    }

    pub fn ra_min(&self) -> i32 {
        self.ra_min
    }

    pub fn ra_max(&self) -> i32 {
        self.ra_min + BRICK_RA_STEP
    }

    pub fn dec_min(&self) -> i32 {
        self.dec_min
    }

    pub fn dec_max(&self) -> i32 {
        self.dec_min + BRICK_DEC_STEP
    }

    /// Whether a position falls inside the half-open tile.
    pub fn contains(&self, ra_deg: f64, dec_deg: f64) -> bool {
        (self.ra_min as f64..self.ra_max() as f64).contains(&ra_deg)
            && (self.dec_min as f64..self.dec_max() as f64).contains(&dec_deg)
    }

    /// Canonical tile file name, e.g. `sweep-000m005-010p000.fits`.
    pub fn sweep_file_name(&self) -> String {
        self.file_name("fits")
    }

    /// Tile file name with a custom extension (without the leading dot).
    pub fn file_name(&self, extension: &str) -> String {
        format!("sweep-{}.{}", self, extension)
    }
}

fn corner_token(ra: i32, dec: i32) -> String {
    let sign = if dec >= 0 { 'p' } else { 'm' };
    format!("{:03}{}{:03}", ra, sign, dec.abs())
}

impl fmt::Display for Brick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            corner_token(self.ra_min, self.dec_min),
            corner_token(self.ra_max(), self.dec_max())
        )
    }
}

fn parse_corner(token: &str, name: &str) -> CatalogResult<(i32, i32)> {
    let invalid = || CatalogError::invalid_region(format!("Malformed brick name '{}'", name));
    if token.len() != 7 || !token.is_ascii() {
        return Err(invalid());
    }
    let ra: i32 = token[0..3].parse().map_err(|_| invalid())?;
    let sign = match &token[3..4] {
        "p" => 1,
        "m" => -1,
        _ => return Err(invalid()),
    };
    let dec: i32 = token[4..7].parse().map_err(|_| invalid())?;
    Ok((ra, sign * dec))
}

impl FromStr for Brick {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lower, upper) = s
            .split_once('-')
            .ok_or_else(|| CatalogError::invalid_region(format!("Malformed brick name '{}'", s)))?;
        let (ra_min, dec_min) = parse_corner(lower, s)?;
        let brick = Brick::new(ra_min, dec_min);
        if parse_corner(upper, s)? != (brick.ra_max(), brick.dec_max()) {
            return Err(CatalogError::invalid_region(format!(
                "Brick '{}' is not a {}x{} degree tile",
                s, BRICK_RA_STEP, BRICK_DEC_STEP
            )));
        }
        Ok(brick)
    }
}
