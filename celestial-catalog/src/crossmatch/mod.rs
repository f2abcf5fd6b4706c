//! Positional crossmatching of two catalogs.
//!
//! [`crossmatch`] pairs each row of the query catalog with its single nearest
//! neighbour in the reference catalog and keeps the pair only if the
//! separation is within the radius. The join mode picks which catalog queries
//! which:
//!
//! | Mode | Query | Reference | Kept rows |
//! |------|-------|-----------|-----------|
//! | [`JoinMode::Left`] | A | B | A rows with a B neighbour in radius |
//! | [`JoinMode::Right`] | B | A | B rows with an A neighbour in radius |
//! | [`JoinMode::Inner`] | A | B | mutual nearest pairs in radius |
//!
//! Unmatched query rows are dropped in every mode; there is no null filling at
//! this level. Null-filled joins happen by key in [`join_on_key`], which is
//! also how remote matches are attached back to their catalog.
//!
//! The output table is the separation column, then the surviving query rows,
//! then their matched reference rows. Column names present in both inputs get
//! the suffix of their side (see [`CrossmatchParams::suffixes`]).

mod index;
mod key;
pub mod remote;

pub use index::{Neighbor, SkyIndex};
pub use key::{join_on_key, KeyJoin};

use crate::errors::CatalogResult;
use crate::table::{Column, Table};
use celestial_core::constants::ARCSEC_PER_DEGREE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Default name of the separation column, in degrees.
pub const SEPARATION_COLUMN: &str = "separation";

/// Default radius for matching against the sweep catalog, in degrees.
pub const SWEEP_MATCH_RADIUS_DEG: f64 = 1e-5;

/// Separation column written by [`match_with_sweep`], in degrees.
pub const SWEEP_SEPARATION_COLUMN: &str = "sep_to_sweep";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    #[default]
    Left,
    Right,
    Inner,
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Inner => "inner",
        };
        f.write_str(s)
    }
}

impl FromStr for JoinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "inner" => Ok(Self::Inner),
            other => Err(format!("unknown join mode '{}'", other)),
        }
    }
}

/// Parameters for [`crossmatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct CrossmatchParams {
    /// Maximum separation for an accepted pair, in degrees (inclusive).
    pub radius_deg: f64,
    pub join: JoinMode,
    /// Suffixes for clashing column names of catalog A and catalog B.
    pub suffixes: (String, String),
    /// Name of the separation column prepended to the output.
    pub separation_column: String,
}

impl CrossmatchParams {
    pub fn new(radius_deg: f64, join: JoinMode) -> Self {
        Self {
            radius_deg,
            join,
            suffixes: ("_1".to_string(), "_2".to_string()),
            separation_column: SEPARATION_COLUMN.to_string(),
        }
    }

    pub fn from_arcsec(radius_arcsec: f64, join: JoinMode) -> Self {
        Self::new(radius_arcsec / ARCSEC_PER_DEGREE, join)
    }

    pub fn with_suffixes(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.suffixes = (a.into(), b.into());
        self
    }

    pub fn with_separation_column(mut self, name: impl Into<String>) -> Self {
        self.separation_column = name.into();
        self
    }
}

/// One accepted association, by row index into the two input catalogs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPair {
    pub a_row: usize,
    pub b_row: usize,
    pub separation_deg: f64,
}

/// Result of [`crossmatch`]: the merged table plus the pairs that built it.
#[derive(Debug, Clone)]
pub struct Crossmatch {
    pub table: Table,
    /// Accepted pairs in output row order.
    pub pairs: Vec<MatchPair>,
}

impl Crossmatch {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn separations_deg(&self) -> impl Iterator<Item = f64> + '_ {
        self.pairs.iter().map(|p| p.separation_deg)
    }
}

/// Nearest reference row within `radius_deg` for every query row.
///
/// # Errors
/// Returns [`CatalogError::MissingColumn`](crate::errors::CatalogError::MissingColumn)
/// if either catalog has columns but no `ra`/`dec`, even with zero rows. A
/// table without any columns counts as an empty catalog.
pub fn nearest_neighbors(
    query: &Table,
    reference: &Table,
    radius_deg: f64,
) -> CatalogResult<Vec<Option<Neighbor>>> {
    let (q_ra, q_dec) = sky_positions(query, "crossmatch query")?;
    let (r_ra, r_dec) = sky_positions(reference, "crossmatch reference")?;
    let index = SkyIndex::new(&r_ra, &r_dec);
    Ok(q_ra
        .iter()
        .zip(q_dec.iter())
        .map(|(&ra, &dec)| index.nearest_within(ra, dec, radius_deg))
        .collect())
}

/// Crossmatch catalog `a` against catalog `b`.
///
/// See the [module documentation](self) for the join semantics. Empty inputs
/// give an empty result, not an error.
///
/// # Errors
/// Returns [`CatalogError::MissingColumn`](crate::errors::CatalogError::MissingColumn)
/// if a catalog with columns lacks `ra`/`dec` (row count does not matter), or
/// [`CatalogError::DuplicateColumn`](crate::errors::CatalogError::DuplicateColumn)
/// if the suffixes leave clashing names.
pub fn crossmatch(a: &Table, b: &Table, params: &CrossmatchParams) -> CatalogResult<Crossmatch> {
    let pairs = match params.join {
        JoinMode::Left => nearest_neighbors(a, b, params.radius_deg)?
            .into_iter()
            .enumerate()
            .filter_map(|(a_row, hit)| {
                hit.map(|n| MatchPair {
                    a_row,
                    b_row: n.row,
                    separation_deg: n.separation_deg,
                })
            })
            .collect::<Vec<_>>(),
        JoinMode::Right => nearest_neighbors(b, a, params.radius_deg)?
            .into_iter()
            .enumerate()
            .filter_map(|(b_row, hit)| {
                hit.map(|n| MatchPair {
                    a_row: n.row,
                    b_row,
                    separation_deg: n.separation_deg,
                })
            })
            .collect(),
        JoinMode::Inner => {
            let forward = nearest_neighbors(a, b, params.radius_deg)?;
            let backward = nearest_neighbors(b, a, params.radius_deg)?;
            forward
                .into_iter()
                .enumerate()
                .filter_map(|(a_row, hit)| {
                    let n = hit?;
                    let mutual = backward[n.row].map_or(false, |back| back.row == a_row);
                    mutual.then_some(MatchPair {
                        a_row,
                        b_row: n.row,
                        separation_deg: n.separation_deg,
                    })
                })
                .collect()
        }
    };

    debug!(
        join = %params.join,
        radius_deg = params.radius_deg,
        a_rows = a.len(),
        b_rows = b.len(),
        matched = pairs.len(),
        "crossmatch"
    );

    let table = merge_pairs(a, b, &pairs, params)?;
    Ok(Crossmatch { table, pairs })
}

/// Left crossmatch of a base catalog against the sweep catalog.
///
/// Sweep columns keep their names, so `ra`/`dec` and `sweep_id` of the output
/// are the sweep's; clashing base columns get `base_suffix`. The separation
/// lands in [`SWEEP_SEPARATION_COLUMN`].
pub fn match_with_sweep(
    base: &Table,
    sweep: &Table,
    radius_deg: f64,
    base_suffix: &str,
) -> CatalogResult<Crossmatch> {
    let params = CrossmatchParams::new(radius_deg, JoinMode::Left)
        .with_suffixes(base_suffix, "")
        .with_separation_column(SWEEP_SEPARATION_COLUMN);
    crossmatch(base, sweep, &params)
}

fn merge_pairs(
    a: &Table,
    b: &Table,
    pairs: &[MatchPair],
    params: &CrossmatchParams,
) -> CatalogResult<Table> {
    let a_rows: Vec<usize> = pairs.iter().map(|p| p.a_row).collect();
    let b_rows: Vec<usize> = pairs.iter().map(|p| p.b_row).collect();
    let a_part = a.take(&a_rows);
    let b_part = b.take(&b_rows);

    let separation = Table::new().with_column(
        params.separation_column.clone(),
        Column::Float(pairs.iter().map(|p| p.separation_deg).collect()),
    )?;

    let (a_suffix, b_suffix) = (params.suffixes.0.as_str(), params.suffixes.1.as_str());
    match params.join {
        JoinMode::Right => {
            Table::hstack(&[&separation, &b_part, &a_part], &["", b_suffix, a_suffix])
        }
        JoinMode::Left | JoinMode::Inner => {
            Table::hstack(&[&separation, &a_part, &b_part], &["", a_suffix, b_suffix])
        }
    }
}

fn sky_positions(table: &Table, context: &str) -> CatalogResult<(Vec<f64>, Vec<f64>)> {
    if table.num_columns() == 0 {
        return Ok((Vec::new(), Vec::new()));
    }
    let (ra, dec) = table.positions(context)?;
    Ok((ra.into_owned(), dec.into_owned()))
}

impl From<Crossmatch> for Table {
    fn from(m: Crossmatch) -> Self {
        m.table
    }
}
