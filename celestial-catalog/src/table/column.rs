//! Typed column storage.
//!
//! Three kinds cover every survey table this crate reads. Floats use NaN as
//! their null, which is also how invalid photometry flows through the
//! correction stages; integers and text carry explicit `Option`s.

use crate::errors::{CatalogError, CatalogResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating-point values. NaN marks a null or invalid measurement.
    Float(Vec<f64>),
    Int(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Text(_) => "text",
        }
    }

    /// A column of the same kind holding `len` nulls.
    pub fn nulls_like(&self, len: usize) -> Self {
        match self {
            Self::Float(_) => Self::Float(vec![f64::NAN; len]),
            Self::Int(_) => Self::Int(vec![None; len]),
            Self::Text(_) => Self::Text(vec![None; len]),
        }
    }

    pub fn text_filled(value: &str, len: usize) -> Self {
        Self::Text(vec![Some(value.to_string()); len])
    }

    pub fn take(&self, rows: &[usize]) -> Self {
        match self {
            Self::Float(v) => Self::Float(rows.iter().map(|&i| v[i]).collect()),
            Self::Int(v) => Self::Int(rows.iter().map(|&i| v[i]).collect()),
            Self::Text(v) => Self::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    /// Gather rows, emitting a null wherever the index is `None`.
    pub fn take_or_null(&self, rows: &[Option<usize>]) -> Self {
        match self {
            Self::Float(v) => Self::Float(
                rows.iter()
                    .map(|r| r.map_or(f64::NAN, |i| v[i]))
                    .collect(),
            ),
            Self::Int(v) => Self::Int(rows.iter().map(|r| r.and_then(|i| v[i])).collect()),
            Self::Text(v) => Self::Text(
                rows.iter()
                    .map(|r| r.and_then(|i| v[i].clone()))
                    .collect(),
            ),
        }
    }

    /// Append `other` in place, promoting int to float when kinds differ that way.
    pub(crate) fn extend_from(&mut self, name: &str, other: &Column) -> CatalogResult<()> {
        match (&mut *self, other) {
            (Self::Float(a), Self::Float(b)) => a.extend_from_slice(b),
            (Self::Int(a), Self::Int(b)) => a.extend_from_slice(b),
            (Self::Text(a), Self::Text(b)) => a.extend(b.iter().cloned()),
            (Self::Float(a), Self::Int(b)) => a.extend(b.iter().map(|v| int_to_float(*v))),
            (Self::Int(a), Self::Float(b)) => {
                let mut promoted: Vec<f64> = a.iter().map(|v| int_to_float(*v)).collect();
                promoted.extend_from_slice(b);
                *self = Self::Float(promoted);
            }
            (this, other) => {
                return Err(CatalogError::ColumnType {
                    column: name.to_string(),
                    expected: this.kind(),
                    found: other.kind(),
                })
            }
        }
        Ok(())
    }

    /// Value at `row` as a float; text yields NaN.
    pub fn f64_at(&self, row: usize) -> f64 {
        match self {
            Self::Float(v) => v[row],
            Self::Int(v) => int_to_float(v[row]),
            Self::Text(_) => f64::NAN,
        }
    }

    /// Join key at `row`. Nulls and NaNs never match anything.
    pub fn key_at(&self, row: usize) -> Option<String> {
        match self {
            Self::Float(v) => Some(v[row]).filter(|x| !x.is_nan()).map(|x| x.to_string()),
            Self::Int(v) => v[row].map(|x| x.to_string()),
            Self::Text(v) => v[row].clone(),
        }
    }

    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Self::Float(v) => v[row].is_nan(),
            Self::Int(v) => v[row].is_none(),
            Self::Text(v) => v[row].is_none(),
        }
    }

    /// Cell text as written to table files; nulls are empty.
    ///
    /// Floats always carry a decimal point or exponent so they read back as
    /// floats, never as integers.
    pub fn format_cell(&self, row: usize) -> String {
        match self {
            Self::Float(v) if v[row].is_nan() => String::new(),
            Self::Float(v) => format!("{:?}", v[row]),
            Self::Int(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
            Self::Text(v) => v[row].clone().unwrap_or_default(),
        }
    }
}

fn int_to_float(v: Option<i64>) -> f64 {
    v.map_or(f64::NAN, |x| x as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_or_null_per_kind() {
        let f = Column::Float(vec![1.0, 2.0]);
        let taken = f.take_or_null(&[Some(1), None]);
        match taken {
            Column::Float(v) => {
                assert_eq!(v[0], 2.0);
                assert!(v[1].is_nan());
            }
            other => panic!("unexpected kind {}", other.kind()),
        }

        let t = Column::Text(vec![Some("a".into())]);
        assert_eq!(
            t.take_or_null(&[None, Some(0)]),
            Column::Text(vec![None, Some("a".into())])
        );
    }

    #[test]
    fn test_extend_promotes_int_to_float() {
        let mut col = Column::Int(vec![Some(1), None]);
        col.extend_from("x", &Column::Float(vec![2.5])).unwrap();
        match col {
            Column::Float(v) => {
                assert_eq!(v[0], 1.0);
                assert!(v[1].is_nan());
                assert_eq!(v[2], 2.5);
            }
            other => panic!("unexpected kind {}", other.kind()),
        }
    }

    #[test]
    fn test_extend_rejects_text_into_float() {
        let mut col = Column::Float(vec![1.0]);
        let err = col
            .extend_from("x", &Column::Text(vec![None]))
            .unwrap_err();
        assert!(err.to_string().contains("expected float"));
    }

    #[test]
    fn test_format_cell_keeps_float_kind() {
        let col = Column::Float(vec![3.0, 1e-29, f64::NAN]);
        assert_eq!(col.format_cell(0), "3.0");
        assert_eq!(col.format_cell(1), "1e-29");
        assert_eq!(col.format_cell(2), "");
    }

    #[test]
    fn test_keys_skip_nulls() {
        let col = Column::Float(vec![f64::NAN, 3.0]);
        assert_eq!(col.key_at(0), None);
        assert_eq!(col.key_at(1), Some("3".to_string()));
        assert_eq!(Column::Int(vec![None]).key_at(0), None);
    }
}
