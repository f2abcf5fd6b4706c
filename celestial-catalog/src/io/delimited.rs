//! Comma-separated tables.
//!
//! The layout shared by the survey dumps and the remote crossmatch responses:
//! optional `#` metadata lines, one header line, then one row per line.
//!
//! Column kinds are inferred from the cells. A column is `Int` if every
//! non-empty cell parses as an integer, `Float` if every non-empty cell parses
//! as a float, and `Text` otherwise. Empty cells are nulls.

use crate::errors::{CatalogError, CatalogResult};
use crate::table::{Column, Table};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

const IN_MEMORY: &str = "<memory>";

/// Parse table text held in memory, such as a service response.
pub fn parse_table_str(text: &str) -> CatalogResult<Table> {
    parse_table(text.as_bytes(), Path::new(IN_MEMORY))
}

/// Parse table text from any reader. `origin` is only used in errors.
pub fn parse_table<R: Read>(reader: R, origin: &Path) -> CatalogResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header = reader.headers().map_err(|e| csv_error(origin, e))?;
    let header_line = header.position().map_or(1, |p| p.line() as usize);
    let names: Vec<String> = header.iter().map(str::to_string).collect();
    if names.is_empty() {
        return Ok(Table::new());
    }
    let mut seen = HashSet::new();
    for name in &names {
        if name.is_empty() {
            return Err(CatalogError::parse(origin, header_line, "empty column name"));
        }
        if !seen.insert(name.as_str()) {
            return Err(CatalogError::DuplicateColumn {
                column: name.clone(),
            });
        }
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(origin, e))?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    Table::from_columns(
        names
            .into_iter()
            .zip(cells)
            .map(|(name, column)| (name, infer_column(column)))
            .collect(),
    )
}

/// Render `table` as comma-separated text with a header line.
///
/// Text cells are quoted, numbers are not, nulls are empty.
pub fn format_table(table: &Table) -> CatalogResult<String> {
    if table.num_columns() == 0 {
        return Ok(String::new());
    }
    let origin = Path::new(IN_MEMORY);
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(Vec::new());
    writer
        .write_record(table.column_names())
        .map_err(|e| csv_error(origin, e))?;
    for row in 0..table.len() {
        writer
            .write_record(table.columns().map(|(_, column)| column.format_cell(row)))
            .map_err(|e| csv_error(origin, e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CatalogError::io(origin, e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| CatalogError::parse(origin, 0, e.to_string()))
}

fn csv_error(origin: &Path, err: csv::Error) -> CatalogError {
    let line = err.position().map_or(0, |p| p.line() as usize);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => CatalogError::io(origin, source),
        _ => CatalogError::parse(origin, line, message),
    }
}

fn infer_column(cells: Vec<String>) -> Column {
    let present = || cells.iter().filter(|c| !c.is_empty());

    if present().count() > 0 && present().all(|c| c.parse::<i64>().is_ok()) {
        return Column::Int(cells.iter().map(|c| c.parse().ok()).collect());
    }
    if present().all(|c| c.parse::<f64>().is_ok()) {
        return Column::Float(
            cells
                .iter()
                .map(|c| c.parse().unwrap_or(f64::NAN))
                .collect(),
        );
    }
    Column::Text(
        cells
            .into_iter()
            .map(|c| (!c.is_empty()).then_some(c))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# survey dump
# columns follow
ra,dec,objid,type
150.1,2.2,17,PSF
150.2,,18,\"REX, round\"
";

    #[test]
    fn test_parse_infers_kinds() {
        let t = parse_table_str(SAMPLE).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column("objid"), Some(&Column::Int(vec![Some(17), Some(18)])));
        let dec = t.floats("dec", "test").unwrap();
        assert_eq!(dec[0], 2.2);
        assert!(dec[1].is_nan());
        assert_eq!(
            t.column("type"),
            Some(&Column::Text(vec![Some("PSF".into()), Some("REX, round".into())]))
        );
    }

    #[test]
    fn test_mixed_cells_become_text() {
        let t = parse_table_str("id\n0123\n1_2_3\n\n").unwrap();
        assert_eq!(
            t.column("id"),
            Some(&Column::Text(vec![Some("0123".into()), Some("1_2_3".into())]))
        );
    }

    #[test]
    fn test_service_nan_cells_are_floats() {
        let t = parse_table_str("angDist,Fflux\n0.4,NaN\n1.2,3.5\n").unwrap();
        let flux = t.floats("Fflux", "test").unwrap();
        assert!(flux[0].is_nan());
        assert_eq!(flux[1], 3.5);
    }

    #[test]
    fn test_field_count_mismatch_is_parse_error() {
        let err = parse_table_str("a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn test_duplicate_header() {
        let err = parse_table_str("ra,ra\n1,2\n").unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_empty_input_is_empty_table() {
        let t = parse_table_str("# nothing here\n").unwrap();
        assert_eq!(t.num_columns(), 0);
    }

    #[test]
    fn test_integral_floats_stay_float() {
        let table = Table::from_columns(vec![("flux", Column::Float(vec![3.0, 4.5]))]).unwrap();
        let back = parse_table_str(&format_table(&table).unwrap()).unwrap();
        assert_eq!(back.column("flux"), Some(&Column::Float(vec![3.0, 4.5])));
    }

    #[test]
    fn test_format_quotes_text() {
        let table = Table::from_columns(vec![
            ("sweep_id", Column::Text(vec![Some("9010_1_2".into()), None])),
            ("objid", Column::Int(vec![Some(7), None])),
        ])
        .unwrap();
        let text = format_table(&table).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "\"9010_1_2\",7");
        let back = parse_table_str(&text).unwrap();
        assert_eq!(back.column("sweep_id"), table.column("sweep_id"));
        assert_eq!(back.column("objid"), table.column("objid"));
    }
}
