//! Point-like / extended source split.
//!
//! Point sources use the smaller VHS aperture (`apermag4`, 2.8″) and
//! extended sources the larger one (`apermag6`, 5.7″). After the split each
//! subset keeps only its aperture, renamed to `mag_<rest>`:
//! `japermag4err` becomes `mag_jerr`.

use crate::errors::PhotometryResult;
use celestial_catalog::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Morphology column written by the sweep loader.
pub const MORPHOLOGY_COLUMN: &str = "sweep_type";

/// Morphological type marking a point source.
pub const POINTLIKE_TYPE: &str = "PSF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Pointlike,
    Extended,
}

impl SourceType {
    pub const ALL: [SourceType; 2] = [SourceType::Pointlike, SourceType::Extended];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pointlike => "pointlike",
            Self::Extended => "extended",
        }
    }

    /// Aperture column tag kept for this source type.
    pub fn aperture(self) -> &'static str {
        match self {
            Self::Pointlike => "apermag4",
            Self::Extended => "apermag6",
        }
    }

    fn other(self) -> Self {
        match self {
            Self::Pointlike => Self::Extended,
            Self::Extended => Self::Pointlike,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitTables {
    pub pointlike: Table,
    pub extended: Table,
}

impl SplitTables {
    pub fn get(&self, source_type: SourceType) -> &Table {
        match source_type {
            SourceType::Pointlike => &self.pointlike,
            SourceType::Extended => &self.extended,
        }
    }

    /// Both subsets, point-like first.
    pub fn into_parts(self) -> [(SourceType, Table); 2] {
        [
            (SourceType::Pointlike, self.pointlike),
            (SourceType::Extended, self.extended),
        ]
    }
}

/// Partition `table` on [`MORPHOLOGY_COLUMN`] and select each subset's
/// aperture photometry. Rows with a null type count as extended.
///
/// # Errors
/// Returns [`MissingColumn`](celestial_catalog::CatalogError::MissingColumn)
/// if the morphology column is absent.
pub fn split_by_source_type(table: &Table) -> PhotometryResult<SplitTables> {
    let types = table.texts(MORPHOLOGY_COLUMN, "source type split")?;
    let mask: Vec<bool> = types
        .iter()
        .map(|t| t.as_deref() == Some(POINTLIKE_TYPE))
        .collect();
    let inverse: Vec<bool> = mask.iter().map(|m| !m).collect();

    let pointlike = select_aperture(table.filter(&mask), SourceType::Pointlike);
    let extended = select_aperture(table.filter(&inverse), SourceType::Extended);
    info!(
        pointlike = pointlike.len(),
        extended = extended.len(),
        "split by source type"
    );
    Ok(SplitTables {
        pointlike,
        extended,
    })
}

/// Drop the other aperture's columns and rename this one's to `mag_*`.
pub fn select_aperture(table: Table, source_type: SourceType) -> Table {
    let dropped = source_type.other().aperture();
    let (table, removed) = table.without_where(|name| name.contains(dropped));
    debug!(
        source_type = %source_type,
        removed,
        aperture = dropped,
        "removed aperture columns"
    );
    let kept = source_type.aperture();
    table.map_names(|name| {
        if name.contains(kept) {
            format!("mag_{}", name.replace(kept, ""))
        } else {
            name.to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PhotometryError;
    use celestial_catalog::{CatalogError, Column};

    fn matched() -> Table {
        Table::from_columns(vec![
            (
                "sweep_type",
                Column::Text(vec![
                    Some("PSF".into()),
                    Some("REX".into()),
                    None,
                    Some("PSF".into()),
                ]),
            ),
            ("japermag4", Column::Float(vec![19.0, 19.1, 19.2, 19.3])),
            ("japermag4err", Column::Float(vec![0.1, 0.1, 0.1, 0.1])),
            ("japermag6", Column::Float(vec![18.0, 18.1, 18.2, 18.3])),
            ("japermag6err", Column::Float(vec![0.2, 0.2, 0.2, 0.2])),
            ("aj", Column::Float(vec![0.01; 4])),
        ])
        .unwrap()
    }

    #[test]
    fn test_partition_sizes() {
        let split = split_by_source_type(&matched()).unwrap();
        assert_eq!(split.pointlike.len(), 2);
        assert_eq!(split.extended.len(), 2);
    }

    #[test]
    fn test_aperture_selection() {
        let split = split_by_source_type(&matched()).unwrap();
        let names: Vec<&str> = split
            .pointlike
            .column_names()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["sweep_type", "mag_j", "mag_jerr", "aj"]);
        assert_eq!(
            split.pointlike.floats("mag_j", "test").unwrap().as_ref(),
            &[19.0, 19.3]
        );
        assert_eq!(
            split.extended.floats("mag_j", "test").unwrap().as_ref(),
            &[18.1, 18.2]
        );
    }

    #[test]
    fn test_missing_morphology() {
        let table = Table::from_columns(vec![("ra", Column::Float(vec![1.0]))]).unwrap();
        let err = split_by_source_type(&table).unwrap_err();
        assert!(matches!(
            err,
            PhotometryError::Catalog(CatalogError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_parts_order() {
        let split = split_by_source_type(&matched()).unwrap();
        let order: Vec<SourceType> = split.into_parts().iter().map(|(t, _)| *t).collect();
        assert_eq!(order, SourceType::ALL.to_vec());
    }
}
