//! Declination-zone index for nearest-neighbour queries.
//!
//! Reference positions are sorted by declination. Because the great-circle
//! separation between two points is never smaller than their declination
//! difference, a query with radius `r` only has to examine the contiguous
//! run of entries with `|Δdec| <= r`. The scan computes exact Vincenty
//! separations, so the index never misses a candidate inside the radius.

use celestial_core::angular_separation_deg;

/// A reference row and its separation from the query position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub separation_deg: f64,
}

/// Nearest-neighbour lookup over a fixed set of sky positions.
///
/// Rows with non-finite coordinates are left out of the index and can never
/// be returned as a neighbour.
#[derive(Debug, Clone)]
pub struct SkyIndex {
    ra: Vec<f64>,
    dec: Vec<f64>,
    by_dec: Vec<usize>,
}

impl SkyIndex {
    pub fn new(ra: &[f64], dec: &[f64]) -> Self {
        let mut by_dec: Vec<usize> = (0..ra.len().min(dec.len()))
            .filter(|&i| ra[i].is_finite() && dec[i].is_finite())
            .collect();
        by_dec.sort_by(|&a, &b| dec[a].total_cmp(&dec[b]));
        Self {
            ra: ra.to_vec(),
            dec: dec.to_vec(),
            by_dec,
        }
    }

    /// Number of indexed (finite) positions.
    pub fn len(&self) -> usize {
        self.by_dec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_dec.is_empty()
    }

    /// The closest indexed row within `radius_deg` of the query position.
    ///
    /// The bound is inclusive: a separation equal to the radius matches, so a
    /// zero radius still pairs exactly coincident positions. When two rows are
    /// equally close the one earlier in declination order wins; callers should
    /// not rely on which.
    pub fn nearest_within(&self, ra_deg: f64, dec_deg: f64, radius_deg: f64) -> Option<Neighbor> {
        if !ra_deg.is_finite() || !dec_deg.is_finite() || !(radius_deg >= 0.0) {
            return None;
        }

        let lo = self
            .by_dec
            .partition_point(|&i| self.dec[i] < dec_deg - radius_deg);
        let hi = self
            .by_dec
            .partition_point(|&i| self.dec[i] <= dec_deg + radius_deg);

        let mut best: Option<Neighbor> = None;
        for &row in &self.by_dec[lo..hi.max(lo)] {
            let separation_deg =
                angular_separation_deg(ra_deg, dec_deg, self.ra[row], self.dec[row]);
            if separation_deg > radius_deg {
                continue;
            }
            if best.map_or(true, |b| separation_deg < b.separation_deg) {
                best = Some(Neighbor {
                    row,
                    separation_deg,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(ra: &[f64], dec: &[f64], q: (f64, f64), r: f64) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..ra.len() {
            let d = angular_separation_deg(q.0, q.1, ra[i], dec[i]);
            if d <= r && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best
    }

    #[test]
    fn test_nearest_of_three() {
        let ra = [10.0, 10.001, 10.01];
        let dec = [0.0, 0.0, 0.0];
        let index = SkyIndex::new(&ra, &dec);
        let hit = index.nearest_within(10.0008, 0.0, 0.1).unwrap();
        assert_eq!(hit.row, 1);
        assert!((hit.separation_deg - 0.0002).abs() < 1e-9);
    }

    #[test]
    fn test_radius_cut() {
        let index = SkyIndex::new(&[0.0], &[0.0]);
        assert!(index.nearest_within(0.0, 1.0, 0.5).is_none());
        assert!(index.nearest_within(0.0, 1.0, 1.0).is_some());
    }

    #[test]
    fn test_zero_radius_requires_identity() {
        let index = SkyIndex::new(&[150.0], &[2.2]);
        let hit = index.nearest_within(150.0, 2.2, 0.0).unwrap();
        assert_eq!(hit.separation_deg, 0.0);
        assert!(index.nearest_within(150.0, 2.2000001, 0.0).is_none());
    }

    #[test]
    fn test_matches_across_ra_wrap() {
        let index = SkyIndex::new(&[359.9995, 180.0], &[0.0, 0.0]);
        let hit = index.nearest_within(0.0005, 0.0, 0.01).unwrap();
        assert_eq!(hit.row, 0);
        assert!((hit.separation_deg - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_skips_non_finite_rows() {
        let index = SkyIndex::new(&[f64::NAN, 1.0], &[0.0, 0.0]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.nearest_within(0.0, 0.0, 5.0).unwrap().row, 1);
        assert!(index.nearest_within(f64::NAN, 0.0, 5.0).is_none());
    }

    #[test]
    fn test_agrees_with_brute_force() {
        let ra: Vec<f64> = (0..200).map(|i| (i as f64 * 37.3) % 360.0).collect();
        let dec: Vec<f64> = (0..200).map(|i| ((i as f64 * 13.7) % 170.0) - 85.0).collect();
        let index = SkyIndex::new(&ra, &dec);
        for q in [(12.0, 5.0), (300.0, -80.0), (181.0, 44.0), (0.0, 89.0)] {
            for r in [0.5, 5.0, 30.0, 180.0] {
                let expected = brute_force(&ra, &dec, q, r).map(|(_, d)| d);
                let got = index.nearest_within(q.0, q.1, r).map(|n| n.separation_deg);
                assert_eq!(expected, got, "query {:?} radius {}", q, r);
            }
        }
    }
}
