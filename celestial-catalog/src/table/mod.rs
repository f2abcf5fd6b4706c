//! In-memory columnar tables.
//!
//! A [`Table`] is an ordered list of equally long named [`Column`]s. Every
//! transform takes the table by value or by reference and returns a new one;
//! nothing is mutated behind a caller's back. Row order is preserved by all
//! operations except the explicit gathers ([`Table::take`], [`Table::filter`]).

mod column;

pub use column::Column;

use crate::errors::{CatalogError, CatalogResult};
use std::borrow::Cow;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, column)` pairs.
    ///
    /// # Errors
    /// Returns [`CatalogError::LengthMismatch`] if the columns differ in length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Column)>) -> CatalogResult<Self> {
        columns
            .into_iter()
            .try_fold(Self::new(), |table, (name, column)| {
                table.with_column(name, column)
            })
    }

    /// Number of rows. A table without columns has none.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    /// Look up a column, reporting `context` if it is absent.
    pub fn require(&self, name: &str, context: &str) -> CatalogResult<&Column> {
        self.column(name)
            .ok_or_else(|| CatalogError::missing_column(name, context))
    }

    /// Numeric view of a column. Integer columns are converted, text is rejected.
    pub fn floats(&self, name: &str, context: &str) -> CatalogResult<Cow<'_, [f64]>> {
        match self.require(name, context)? {
            Column::Float(values) => Ok(Cow::Borrowed(values)),
            Column::Int(values) => Ok(Cow::Owned(
                values
                    .iter()
                    .map(|v| v.map_or(f64::NAN, |x| x as f64))
                    .collect(),
            )),
            Column::Text(_) => Err(CatalogError::ColumnType {
                column: name.to_string(),
                expected: "float",
                found: "text",
            }),
        }
    }

    /// Text values of a column; other kinds are rendered as text.
    pub fn texts(&self, name: &str, context: &str) -> CatalogResult<Cow<'_, [Option<String>]>> {
        let column = self.require(name, context)?;
        match column {
            Column::Text(values) => Ok(Cow::Borrowed(values)),
            other => Ok(Cow::Owned(
                (0..other.len())
                    .map(|row| other.key_at(row))
                    .collect(),
            )),
        }
    }

    /// The `ra` and `dec` columns, in degrees.
    ///
    /// # Errors
    /// Returns [`CatalogError::MissingColumn`] if either is absent.
    pub fn positions(&self, context: &str) -> CatalogResult<(Cow<'_, [f64]>, Cow<'_, [f64]>)> {
        Ok((self.floats("ra", context)?, self.floats("dec", context)?))
    }

    /// Add a column, replacing any existing column of the same name in place.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> CatalogResult<Self> {
        let name = name.into();
        if !self.columns.is_empty() && column.len() != self.len() {
            return Err(CatalogError::LengthMismatch {
                expected: self.len(),
                found: column.len(),
            });
        }
        match self.position(&name) {
            Some(i) => self.columns[i] = column,
            None => {
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(self)
    }

    pub fn rename(self, old: &str, new: &str) -> CatalogResult<Self> {
        self.rename_all(&[(old, new)])
    }

    /// Rename several columns at once. All `old` names must exist.
    pub fn rename_all(mut self, pairs: &[(&str, &str)]) -> CatalogResult<Self> {
        for (old, new) in pairs {
            let i = self
                .position(old)
                .ok_or_else(|| CatalogError::missing_column(*old, "rename"))?;
            self.names[i] = (*new).to_string();
        }
        Ok(self)
    }

    /// Apply `f` to every column name.
    pub fn map_names(mut self, f: impl Fn(&str) -> String) -> Self {
        self.names = self.names.iter().map(|n| f(n)).collect();
        self
    }

    pub fn lowercase_names(self) -> Self {
        self.map_names(str::to_lowercase)
    }

    /// Project onto `names`, in that order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> CatalogResult<Self> {
        let mut out = Self::new();
        for name in names {
            let name = name.as_ref();
            let column = self.require(name, "select")?.clone();
            out.names.push(name.to_string());
            out.columns.push(column);
        }
        Ok(out)
    }

    /// Drop every column whose name satisfies `predicate`; returns the count removed.
    pub fn without_where(mut self, predicate: impl Fn(&str) -> bool) -> (Self, usize) {
        let before = self.names.len();
        let (names, columns): (Vec<_>, Vec<_>) = self
            .names
            .into_iter()
            .zip(self.columns)
            .filter(|(name, _)| !predicate(name))
            .unzip();
        self.names = names;
        self.columns = columns;
        let removed = before - self.names.len();
        (self, removed)
    }

    pub fn take(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
        }
    }

    pub fn take_or_null(&self, rows: &[Option<usize>]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take_or_null(rows)).collect(),
        }
    }

    /// Keep the rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Self {
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take(&rows)
    }

    /// Concatenate tables side by side.
    ///
    /// A name present in more than one input gets that input's suffix appended
    /// (`_1`, `_2`, ... when `suffixes` is empty). Names unique to one input are
    /// kept unchanged.
    ///
    /// # Errors
    /// Returns [`CatalogError::DuplicateColumn`] if suffixing still leaves two
    /// columns with one name, or [`CatalogError::LengthMismatch`] if the inputs
    /// differ in row count.
    pub fn hstack(tables: &[&Table], suffixes: &[&str]) -> CatalogResult<Self> {
        let mut out = Self::new();
        for (i, table) in tables.iter().enumerate() {
            let default_suffix = format!("_{}", i + 1);
            let suffix = suffixes.get(i).copied().unwrap_or(default_suffix.as_str());
            for (name, column) in table.columns() {
                let clashes = tables
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && other.has_column(name));
                let out_name = if clashes {
                    format!("{}{}", name, suffix)
                } else {
                    name.to_string()
                };
                if out.has_column(&out_name) {
                    return Err(CatalogError::DuplicateColumn { column: out_name });
                }
                out = out.with_column(out_name, column.clone())?;
            }
        }
        Ok(out)
    }

    /// Concatenate tables vertically. Column order follows the first table.
    ///
    /// # Errors
    /// Returns [`CatalogError::MissingColumn`] if a later table lacks one of
    /// the first table's columns, or [`CatalogError::ColumnType`] on
    /// incompatible kinds.
    pub fn vstack(tables: Vec<Table>) -> CatalogResult<Self> {
        let mut iter = tables.into_iter();
        let Some(mut out) = iter.next() else {
            return Ok(Self::new());
        };
        for table in iter {
            for (i, name) in out.names.iter().enumerate() {
                let other = table.require(name, "vstack")?;
                out.columns[i].extend_from(name, other)?;
            }
        }
        Ok(out)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
