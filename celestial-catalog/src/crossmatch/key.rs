//! Joins on an identifier column instead of position.
//!
//! Once a survey has been matched, its rows carry the identifier of the base
//! catalog (for instance `sweep_id`). Joining on that key broadcasts each
//! matched row back onto every base row sharing the identifier, which lets a
//! later stage revisit the same source as more surveys are added.

use crate::errors::CatalogResult;
use crate::table::Table;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyJoin {
    /// Keep every left row; rows without a partner get nulls.
    #[default]
    Left,
    /// Keep only left rows with a partner.
    Inner,
}

/// Attach the columns of `right` to `left` where `left_key == right_key`.
///
/// The first `right` row carrying a key is used for that key. Null keys never
/// match. The right key column is dropped from the output when it has the
/// same name as the left key; other clashing right columns get a `_2` suffix.
///
/// # Errors
/// Returns [`MissingColumn`](crate::errors::CatalogError::MissingColumn) if
/// either key column is absent.
pub fn join_on_key(
    left: &Table,
    right: &Table,
    left_key: &str,
    right_key: &str,
    how: KeyJoin,
) -> CatalogResult<Table> {
    let left_keys = left.texts(left_key, "key join (left)")?;
    let right_keys = right.texts(right_key, "key join (right)")?;

    let mut first_row: HashMap<&str, usize> = HashMap::with_capacity(right_keys.len());
    for (row, key) in right_keys.iter().enumerate() {
        if let Some(key) = key {
            first_row.entry(key.as_str()).or_insert(row);
        }
    }

    let partners: Vec<Option<usize>> = left_keys
        .iter()
        .map(|key| key.as_deref().and_then(|k| first_row.get(k).copied()))
        .collect();

    let right = if left_key == right_key {
        right.clone().without_where(|name| name == right_key).0
    } else {
        right.clone()
    };

    match how {
        KeyJoin::Left => {
            let attached = right.take_or_null(&partners);
            Table::hstack(&[left, &attached], &["", "_2"])
        }
        KeyJoin::Inner => {
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = partners
                .iter()
                .enumerate()
                .filter_map(|(l, r)| r.map(|r| (l, r)))
                .unzip();
            let kept = left.take(&left_rows);
            let attached = right.take(&right_rows);
            Table::hstack(&[&kept, &attached], &["", "_2"])
        }
    }
}
