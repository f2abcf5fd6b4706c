//! Rectangular sky regions.
//!
//! A [`Region`] bounds the whole run: it selects which sweep bricks to load
//! and trims every catalog to the same RA/Dec box before matching.

use crate::brick::{Brick, BRICK_DEC_STEP, BRICK_RA_STEP};
use crate::errors::{CatalogError, CatalogResult};
use crate::table::Table;
use celestial_core::{ceil_to_multiple, floor_to_multiple};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw region bounds as written in a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub ra_min: f64,
    pub ra_max: f64,
    pub dec_min: f64,
    pub dec_max: f64,
}

/// A validated RA/Dec box, in degrees. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegionBounds", into = "RegionBounds")]
pub struct Region {
    ra_min: f64,
    ra_max: f64,
    dec_min: f64,
    dec_max: f64,
}

impl Region {
    /// The eFEDS field.
    pub const EFEDS: Region = Region {
        ra_min: 126.0,
        ra_max: 146.0,
        dec_min: -3.0,
        dec_max: 6.0,
    };

    /// # Errors
    /// Returns [`CatalogError::InvalidRegion`] unless every RA bound lies in
    /// `[0, 360]`, every Dec bound in `[-90, 90]`, `ra_min < ra_max` and
    /// `dec_min < dec_max`. NaN bounds are rejected.
    pub fn new(ra_min: f64, ra_max: f64, dec_min: f64, dec_max: f64) -> CatalogResult<Self> {
        for (name, value, lo, hi) in [
            ("ra_min", ra_min, 0.0, 360.0),
            ("ra_max", ra_max, 0.0, 360.0),
            ("dec_min", dec_min, -90.0, 90.0),
            ("dec_max", dec_max, -90.0, 90.0),
        ] {
            if !(lo..=hi).contains(&value) {
                return Err(CatalogError::invalid_region(format!(
                    "{} ({}) must lie in [{}, {}]",
                    name, value, lo, hi
                )));
            }
        }
        if !(ra_max > ra_min) {
            return Err(CatalogError::invalid_region(format!(
                "ra_max ({}) must be greater than ra_min ({})",
                ra_max, ra_min
            )));
        }
        if !(dec_max > dec_min) {
            return Err(CatalogError::invalid_region(format!(
                "dec_max ({}) must be greater than dec_min ({})",
                dec_max, dec_min
            )));
        }
        Ok(Self {
            ra_min,
            ra_max,
            dec_min,
            dec_max,
        })
    }

    pub fn ra_min(&self) -> f64 {
        self.ra_min
    }

    pub fn ra_max(&self) -> f64 {
        self.ra_max
    }

    pub fn dec_min(&self) -> f64 {
        self.dec_min
    }

    pub fn dec_max(&self) -> f64 {
        self.dec_max
    }

    pub fn ra_span(&self) -> f64 {
        self.ra_max - self.ra_min
    }

    pub fn dec_span(&self) -> f64 {
        self.dec_max - self.dec_min
    }

    /// Linear area `ra_span × dec_span` in square degrees (not solid angle).
    pub fn area(&self) -> f64 {
        self.ra_span() * self.dec_span()
    }

    pub fn contains(&self, ra_deg: f64, dec_deg: f64) -> bool {
        (self.ra_min..=self.ra_max).contains(&ra_deg)
            && (self.dec_min..=self.dec_max).contains(&dec_deg)
    }

    /// Rows of `table` whose `ra`/`dec` lie inside the region, in input order.
    ///
    /// # Errors
    /// Returns [`CatalogError::MissingColumn`] if `ra` or `dec` is absent.
    pub fn filter(&self, table: &Table) -> CatalogResult<Table> {
        let (ra, dec) = table.positions("region filter")?;
        let mask: Vec<bool> = ra
            .iter()
            .zip(dec.iter())
            .map(|(&r, &d)| self.contains(r, d))
            .collect();
        Ok(table.filter(&mask))
    }

    /// Every sweep brick overlapping the region.
    ///
    /// The bounds are widened outward to the brick grid (RA to multiples of
    /// 10°, Dec to multiples of 5°) and one brick is emitted per grid cell,
    /// RA-major. The result is a superset of the region: edge bricks may hold
    /// no region members at all, and some may not exist on disk.
    pub fn bricks(&self) -> Vec<Brick> {
        let ra_lo = floor_to_multiple(self.ra_min, BRICK_RA_STEP as i64) as i32;
        let ra_hi = ceil_to_multiple(self.ra_max, BRICK_RA_STEP as i64) as i32;
        let dec_lo = floor_to_multiple(self.dec_min, BRICK_DEC_STEP as i64) as i32;
        let dec_hi = ceil_to_multiple(self.dec_max, BRICK_DEC_STEP as i64) as i32;

        (ra_lo..ra_hi)
            .step_by(BRICK_RA_STEP as usize)
            .flat_map(|ra| {
                (dec_lo..dec_hi)
                    .step_by(BRICK_DEC_STEP as usize)
                    .map(move |dec| Brick::new(ra, dec))
            })
            .collect()
    }
}

impl TryFrom<RegionBounds> for Region {
    type Error = CatalogError;

    fn try_from(b: RegionBounds) -> Result<Self, Self::Error> {
        Region::new(b.ra_min, b.ra_max, b.dec_min, b.dec_max)
    }
}

impl From<Region> for RegionBounds {
    fn from(r: Region) -> Self {
        RegionBounds {
            ra_min: r.ra_min,
            ra_max: r.ra_max,
            dec_min: r.dec_min,
            dec_max: r.dec_max,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4} <= RA <= {:.4}, {:.4} <= Dec <= {:.4} ({:.2} deg^2 linear)",
            self.ra_min,
            self.ra_max,
            self.dec_min,
            self.dec_max,
            self.area()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_rejects_inverted_bounds() {
        assert!(matches!(
            Region::new(10.0, 10.0, 0.0, 1.0),
            Err(CatalogError::InvalidRegion { .. })
        ));
        assert!(Region::new(0.0, 1.0, 5.0, -5.0).is_err());
        assert!(Region::new(f64::NAN, 1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_rejects_bounds_off_the_sky() {
        for (ra_min, ra_max, dec_min, dec_max) in [
            (-10.0, 10.0, 0.0, 5.0),
            (350.0, 370.0, 0.0, 5.0),
            (0.0, 10.0, -95.0, -85.0),
            (0.0, 10.0, 85.0, 91.0),
        ] {
            let err = Region::new(ra_min, ra_max, dec_min, dec_max).unwrap_err();
            assert!(matches!(err, CatalogError::InvalidRegion { .. }));
        }
        let whole_sky = Region::new(0.0, 360.0, -90.0, 90.0).unwrap().bricks();
        assert_eq!(whole_sky.len(), 36 * 36);
        assert!(whole_sky.iter().all(|b| b.to_string().len() == 15));
    }

    #[test]
    fn test_derived_sizes() {
        let region = Region::new(30.0, 40.0, -2.0, 3.0).unwrap();
        assert_eq!(region.ra_span(), 10.0);
        assert_eq!(region.dec_span(), 5.0);
        assert_eq!(region.area(), 50.0);
    }

    #[test]
    fn test_bricks_four_tile_region() {
        let region = Region::new(0.0, 20.0, -5.0, 5.0).unwrap();
        let names: Vec<String> = region.bricks().iter().map(Brick::to_string).collect();
        assert_eq!(
            names,
            vec![
                "000m005-010p000",
                "000p000-010p005",
                "010m005-020p000",
                "010p000-020p005",
            ]
        );
    }

    #[test]
    fn test_bricks_unaligned_region_over_covers() {
        let region = Region::new(126.0, 141.5, -1.2, 3.3).unwrap();
        let bricks = region.bricks();
        // RA 120..150 (3 columns) × Dec -5..5 (2 rows)
        assert_eq!(bricks.len(), 6);
        assert_eq!(bricks[0].to_string(), "120m005-130p000");
        assert_eq!(bricks[5].to_string(), "140p000-150p005");
    }

    #[test]
    fn test_filter_inclusive_bounds() {
        let table = Table::from_columns(vec![
            ("ra", Column::Float(vec![0.0, 10.0, 10.5, 5.0])),
            ("dec", Column::Float(vec![0.0, 1.0, 0.5, -0.1])),
            ("id", Column::Int(vec![Some(1), Some(2), Some(3), Some(4)])),
        ])
        .unwrap();
        let region = Region::new(0.0, 10.0, 0.0, 1.0).unwrap();
        let inside = region.filter(&table).unwrap();
        assert_eq!(
            inside.column("id"),
            Some(&Column::Int(vec![Some(1), Some(2)]))
        );
    }

    #[test]
    fn test_filter_requires_positions() {
        let table = Table::from_columns(vec![("ra", Column::Float(vec![1.0]))]).unwrap();
        let region = Region::new(0.0, 10.0, 0.0, 1.0).unwrap();
        let err = region.filter(&table).unwrap_err();
        assert!(err.to_string().contains("'dec'"));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Region, _> =
            toml::from_str("ra_min = 0.0\nra_max = 20.0\ndec_min = -5.0\ndec_max = 5.0");
        assert!(ok.is_ok());
        let bad: Result<Region, _> =
            toml::from_str("ra_min = 20.0\nra_max = 0.0\ndec_min = -5.0\ndec_max = 5.0");
        assert!(bad.is_err());
    }
}
