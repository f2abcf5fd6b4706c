//! FITS binary tables.
//!
//! Survey dumps (sweep tiles, the AGN candidate list, VHS queries) ship as
//! FITS files whose first `BINTABLE` extension holds the catalog. Every HDU
//! before it is skipped by size.
//!
//! | `TFORM` | Column |
//! |---------|--------|
//! | `L` | `Int`, 1 for `T`, 0 for `F`, null otherwise |
//! | `B`, `I`, `J`, `K` | `Int`, or `Float` when `TSCAL`/`TZERO` are not integral |
//! | `E`, `D` | `Float` |
//! | `rA` | `Text`, trailing blanks removed, blank is null |
//!
//! Vector (`r > 1`), bit, complex and variable-length columns are skipped.
//! `TNULLn` marks null integers; floats carry NaN.

use crate::errors::{CatalogError, CatalogResult};
use crate::table::{Column, Table};
use byteorder::{BigEndian, ByteOrder};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const BLOCK_SIZE: usize = 2880;
const CARD_SIZE: usize = 80;

#[derive(Debug, Clone, PartialEq)]
enum CardValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    String(String),
}

#[derive(Debug, Default)]
struct Header {
    values: HashMap<String, CardValue>,
}

impl Header {
    fn integer(&self, keyword: &str) -> Option<i64> {
        match self.values.get(keyword) {
            Some(CardValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    fn logical(&self, keyword: &str) -> Option<bool> {
        match self.values.get(keyword) {
            Some(CardValue::Logical(v)) => Some(*v),
            _ => None,
        }
    }

    fn real(&self, keyword: &str) -> Option<f64> {
        match self.values.get(keyword) {
            Some(CardValue::Real(v)) => Some(*v),
            Some(CardValue::Integer(v)) => Some(*v as f64),
            _ => None,
        }
    }

    fn string(&self, keyword: &str) -> Option<&str> {
        match self.values.get(keyword) {
            Some(CardValue::String(v)) => Some(v),
            _ => None,
        }
    }

    fn require_integer(&self, keyword: &str, origin: &Path) -> CatalogResult<i64> {
        self.integer(keyword)
            .ok_or_else(|| CatalogError::fits(origin, format!("missing keyword {}", keyword)))
    }

    fn require_count(&self, keyword: &str, origin: &Path) -> CatalogResult<usize> {
        let value = self.require_integer(keyword, origin)?;
        usize::try_from(value).map_err(|_| {
            CatalogError::fits(origin, format!("{} = {} is negative", keyword, value))
        })
    }
}

/// Parse the first binary table of a FITS file held in memory.
///
/// # Errors
/// Returns [`CatalogError::Fits`] if the bytes are not a FITS file, the
/// file has no `BINTABLE` extension, or the table is truncated or malformed.
pub fn parse_fits(bytes: &[u8], origin: &Path) -> CatalogResult<Table> {
    if !bytes.starts_with(b"SIMPLE  =") {
        return Err(CatalogError::fits(origin, "missing SIMPLE card"));
    }
    let mut offset = 0;
    let mut hdu = 0;
    while offset < bytes.len() {
        let (header, data_start) = parse_header(bytes, offset, origin)?;
        if hdu == 0 && header.logical("SIMPLE") != Some(true) {
            return Err(CatalogError::fits(origin, "SIMPLE is not T"));
        }
        let size = data_size(&header, origin)?;
        if header.string("XTENSION") == Some("BINTABLE") {
            let data = bytes
                .get(data_start..data_start + size)
                .ok_or_else(|| CatalogError::fits(origin, "binary table data is truncated"))?;
            let layout = BinaryTable::from_header(&header, origin)?;
            debug!(
                path = %origin.display(),
                hdu,
                rows = layout.rows,
                fields = layout.fields.len(),
                "reading binary table"
            );
            return layout.decode(data);
        }
        offset = data_start + padded(size);
        hdu += 1;
    }
    Err(CatalogError::fits(origin, "no BINTABLE extension"))
}

/// Header starting at `offset`; returns it with the offset of its data.
fn parse_header(bytes: &[u8], offset: usize, origin: &Path) -> CatalogResult<(Header, usize)> {
    let mut header = Header::default();
    let mut pos = offset;
    loop {
        let card = bytes
            .get(pos..pos + CARD_SIZE)
            .and_then(|raw| std::str::from_utf8(raw).ok())
            .filter(|card| card.is_ascii())
            .ok_or_else(|| {
                CatalogError::fits(origin, format!("bad header card at byte {}", pos))
            })?;
        pos += CARD_SIZE;

        let keyword = card[..8].trim_end();
        if keyword == "END" {
            break;
        }
        if &card[8..10] != "= " {
            continue;
        }
        if let Some(value) = parse_card_value(&card[10..]) {
            header.values.entry(keyword.to_string()).or_insert(value);
        }
    }
    Ok((header, offset + padded(pos - offset)))
}

fn parse_card_value(field: &str) -> Option<CardValue> {
    let field = field.trim_start();
    if let Some(rest) = field.strip_prefix('\'') {
        let mut value = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\'' {
                value.push(c);
            } else if chars.peek() == Some(&'\'') {
                chars.next();
                value.push('\'');
            } else {
                break;
            }
        }
        return Some(CardValue::String(value.trim_end().to_string()));
    }

    let value = field.split('/').next().unwrap_or_default().trim();
    match value {
        "" => None,
        "T" => Some(CardValue::Logical(true)),
        "F" => Some(CardValue::Logical(false)),
        _ => value.parse::<i64>().map(CardValue::Integer).ok().or_else(|| {
            value
                .replace(['D', 'd'], "E")
                .parse::<f64>()
                .ok()
                .map(CardValue::Real)
        }),
    }
}

fn data_size(header: &Header, origin: &Path) -> CatalogResult<usize> {
    let naxis = header.require_count("NAXIS", origin)?;
    if naxis == 0 {
        return Ok(0);
    }
    let bitpix = header.require_integer("BITPIX", origin)?.unsigned_abs() as usize;
    let mut elements = 1usize;
    for axis in 1..=naxis {
        elements *= header.require_count(&format!("NAXIS{}", axis), origin)?;
    }
    let pcount = usize::try_from(header.integer("PCOUNT").unwrap_or(0)).unwrap_or(0);
    let gcount = usize::try_from(header.integer("GCOUNT").unwrap_or(1)).unwrap_or(1);
    Ok(bitpix / 8 * gcount * (pcount + elements))
}

fn padded(size: usize) -> usize {
    (size + BLOCK_SIZE - 1) / BLOCK_SIZE * BLOCK_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Logical,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    /// Read past but not decoded.
    Skipped,
}

#[derive(Debug, Clone)]
struct Field {
    name: String,
    format: String,
    kind: FieldKind,
    offset: usize,
    width: usize,
    null: Option<i64>,
    scale: f64,
    zero: f64,
}

#[derive(Debug)]
struct BinaryTable {
    row_size: usize,
    rows: usize,
    fields: Vec<Field>,
}

impl BinaryTable {
    fn from_header(header: &Header, origin: &Path) -> CatalogResult<Self> {
        let row_size = header.require_count("NAXIS1", origin)?;
        let rows = header.require_count("NAXIS2", origin)?;
        let count = header.require_count("TFIELDS", origin)?;

        let mut fields = Vec::with_capacity(count);
        let mut offset = 0;
        for n in 1..=count {
            let format = header
                .string(&format!("TFORM{}", n))
                .ok_or_else(|| CatalogError::fits(origin, format!("missing keyword TFORM{}", n)))?
                .trim()
                .to_string();
            let bad_format = || CatalogError::fits(origin, format!("bad TFORM{} '{}'", n, format));
            let (repeat, code) = parse_format(&format).ok_or_else(bad_format)?;
            let width = field_width(code, repeat).ok_or_else(bad_format)?;
            let name = header
                .string(&format!("TTYPE{}", n))
                .map(str::to_string)
                .unwrap_or_else(|| format!("col{}", n));
            fields.push(Field {
                name,
                kind: field_kind(code, repeat),
                format,
                offset,
                width,
                null: header.integer(&format!("TNULL{}", n)),
                scale: header.real(&format!("TSCAL{}", n)).unwrap_or(1.0),
                zero: header.real(&format!("TZERO{}", n)).unwrap_or(0.0),
            });
            offset += width;
        }
        if offset > row_size {
            return Err(CatalogError::fits(
                origin,
                format!("fields need {} bytes but NAXIS1 is {}", offset, row_size),
            ));
        }
        Ok(Self {
            row_size,
            rows,
            fields,
        })
    }

    fn decode(&self, data: &[u8]) -> CatalogResult<Table> {
        let mut columns = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.kind == FieldKind::Skipped {
                debug!(column = %field.name, format = %field.format, "skipping FITS column");
                continue;
            }
            let cells: Vec<&[u8]> = (0..self.rows)
                .map(|row| {
                    let start = row * self.row_size + field.offset;
                    &data[start..start + field.width]
                })
                .collect();
            columns.push((field.name.clone(), field.decode(&cells)));
        }
        Table::from_columns(columns)
    }
}

impl Field {
    fn has_scaling(&self) -> bool {
        self.scale != 1.0 || self.zero != 0.0
    }

    fn decode(&self, cells: &[&[u8]]) -> Column {
        match self.kind {
            FieldKind::Float => self.floats(cells.iter().map(|c| BigEndian::read_f32(c) as f64)),
            FieldKind::Double => self.floats(cells.iter().map(|c| BigEndian::read_f64(c))),
            FieldKind::Char => Column::Text(
                cells
                    .iter()
                    .map(|c| {
                        let end = c.iter().position(|&b| b == 0).unwrap_or(c.len());
                        let text = String::from_utf8_lossy(&c[..end]).trim_end().to_string();
                        (!text.is_empty()).then_some(text)
                    })
                    .collect(),
            ),
            FieldKind::Logical => Column::Int(
                cells
                    .iter()
                    .map(|c| match c[0] {
                        b'T' => Some(1),
                        b'F' => Some(0),
                        _ => None,
                    })
                    .collect(),
            ),
            FieldKind::Byte => self.integers(cells.iter().map(|c| i64::from(c[0]))),
            FieldKind::Short => {
                self.integers(cells.iter().map(|c| i64::from(BigEndian::read_i16(c))))
            }
            FieldKind::Int => {
                self.integers(cells.iter().map(|c| i64::from(BigEndian::read_i32(c))))
            }
            FieldKind::Long => self.integers(cells.iter().map(|c| BigEndian::read_i64(c))),
            FieldKind::Skipped => Column::Float(Vec::new()),
        }
    }

    fn floats(&self, raw: impl Iterator<Item = f64>) -> Column {
        if self.has_scaling() {
            Column::Float(raw.map(|v| v * self.scale + self.zero).collect())
        } else {
            Column::Float(raw.collect())
        }
    }

    /// Integer offsets such as the unsigned `TZERO = 32768` stay integral.
    fn integers(&self, raw: impl Iterator<Item = i64>) -> Column {
        let raw = raw.map(|v| Some(v).filter(|v| Some(*v) != self.null));
        let integral_zero = self.zero.fract() == 0.0 && self.zero.abs() < 9.0e15;
        if self.scale == 1.0 && integral_zero {
            let zero = self.zero as i64;
            Column::Int(raw.map(|v| v.and_then(|v| v.checked_add(zero))).collect())
        } else {
            Column::Float(
                raw.map(|v| v.map_or(f64::NAN, |v| v as f64 * self.scale + self.zero))
                    .collect(),
            )
        }
    }
}

/// `rT` into repeat count and type code.
fn parse_format(format: &str) -> Option<(usize, char)> {
    let digits = format.chars().take_while(char::is_ascii_digit).count();
    let repeat = if digits == 0 {
        1
    } else {
        format[..digits].parse().ok()?
    };
    let code = format[digits..].chars().next()?;
    Some((repeat, code))
}

fn field_width(code: char, repeat: usize) -> Option<usize> {
    let element = match code {
        'X' => return Some((repeat + 7) / 8),
        'L' | 'B' | 'A' => 1,
        'I' => 2,
        'J' | 'E' => 4,
        'K' | 'D' | 'C' | 'P' => 8,
        'M' | 'Q' => 16,
        _ => return None,
    };
    Some(element * repeat)
}

fn field_kind(code: char, repeat: usize) -> FieldKind {
    match (code, repeat) {
        ('A', _) => FieldKind::Char,
        ('L', 1) => FieldKind::Logical,
        ('B', 1) => FieldKind::Byte,
        ('I', 1) => FieldKind::Short,
        ('J', 1) => FieldKind::Int,
        ('K', 1) => FieldKind::Long,
        ('E', 1) => FieldKind::Float,
        ('D', 1) => FieldKind::Double,
        _ => FieldKind::Skipped,
    }
}
