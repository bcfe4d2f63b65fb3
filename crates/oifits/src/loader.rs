//! Builds an [`OiFitsFile`] from the HDUs of a FITS file.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use num_complex::Complex32;

use crate::error::{Error, Result};
use crate::file::OiFitsFile;
use crate::fits::{self, Card, FitsError, Hdu, HduKind, RawColumn, TypedArray, Value};
use crate::meta::{ColumnDescriptor, DataType};
use crate::table::{ColumnData, HeaderCard, KeywordValue, Table, TableKind};

/// Read and decode every HDU of the file at `path` (gzip accepted).
pub fn load_hdus<P: AsRef<Path>>(path: P) -> Result<Vec<Hdu>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    fits::read_hdus(&bytes).map_err(|source| Error::Fits {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an OIFITS file from disk.
pub fn load_oifits<P: AsRef<Path>>(path: P) -> Result<OiFitsFile> {
    let path = path.as_ref();
    log::debug!("Loading {}", path.display());
    let hdus = load_hdus(path)?;
    let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    load_from_hdus(&hdus, &absolute)
}

/// Build an [`OiFitsFile`] from already decoded HDUs.
pub fn load_from_hdus(hdus: &[Hdu], path: &Path) -> Result<OiFitsFile> {
    let mut file = OiFitsFile::with_path(path);
    let Some((primary, extensions)) = hdus.split_first() else {
        return Ok(file);
    };
    file.primary_cards = primary.cards.iter().map(header_card).collect();

    for hdu in extensions {
        let table = build_table(hdu, path)?;
        if !table.kind.is_known() {
            log::debug!(
                "HDU #{} '{}' is not an OIFITS table, keeping its header only",
                hdu.index,
                table.ext_name()
            );
        }
        file.add_table(table)?;
    }
    Ok(file)
}

fn header_card(card: &Card) -> HeaderCard {
    HeaderCard {
        key: card.keyword.clone(),
        value: card.value.as_ref().map(Value::to_string),
        comment: card.comment.clone(),
    }
}

/// Keywords describing the binary table layout rather than its content.
fn is_structural(keyword: &str) -> bool {
    const INDEXED: [&str; 9] = [
        "NAXIS", "TTYPE", "TFORM", "TUNIT", "TDIM", "TNULL", "TSCAL", "TZERO", "TDISP",
    ];
    if matches!(
        keyword,
        "XTENSION" | "BITPIX" | "PCOUNT" | "GCOUNT" | "TFIELDS" | "EXTNAME" | "EXTVER" | "THEAP"
    ) {
        return true;
    }
    INDEXED.iter().any(|prefix| {
        keyword
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
    })
}

fn build_table(hdu: &Hdu, path: &Path) -> Result<Table> {
    let kind = match hdu.kind {
        HduKind::BinaryTable => TableKind::from_ext_name(hdu.ext_name().unwrap_or_default()),
        _ => TableKind::Unknown(hdu.ext_name().unwrap_or_default().to_string()),
    };
    let mut table = Table::new(kind);
    table.row_count = hdu.row_count;

    for card in &hdu.cards {
        if is_structural(&card.keyword) {
            continue;
        }
        let descriptor = table.kind.keyword_descriptor(&card.keyword);
        match (descriptor, &card.value) {
            (Some(descriptor), Some(value)) => {
                table.set_keyword(descriptor.name, keyword_value(value, descriptor.data_type))
            }
            _ => table.extra_cards.push(header_card(card)),
        }
    }

    if !table.kind.is_known() {
        return Ok(table);
    }

    for raw in &hdu.columns {
        let Some(descriptor) = table.kind.column_descriptor(&raw.name) else {
            log::debug!("Ignoring column '{}' of {}", raw.name, table.ext_name());
            continue;
        };
        let data = column_data(raw, descriptor, hdu.row_count).map_err(|e| match e {
            ColumnError::Overflow => Error::IntegerOverflow {
                column: raw.name.clone(),
            },
            ColumnError::Shape => Error::Fits {
                path: path.to_path_buf(),
                source: FitsError::InvalidValue(raw.name.clone()),
            },
        })?;
        if let Some(unit) = &raw.unit {
            table.column_units.insert(raw.name.clone(), unit.clone());
        }
        table.set_column(&raw.name, data);
    }
    Ok(table)
}

/// Convert a header value, widening integers where a float is declared.
fn keyword_value(value: &Value, expected: DataType) -> KeywordValue {
    match (value, expected) {
        (Value::String(s), _) => KeywordValue::Char(s.clone()),
        (Value::Logical(b), _) => KeywordValue::Logical(*b),
        (Value::Integer(n), DataType::Real) => KeywordValue::Real(*n as f32),
        (Value::Integer(n), DataType::Double) => KeywordValue::Double(*n as f64),
        (Value::Integer(n), _) => match i32::try_from(*n) {
            Ok(n) => KeywordValue::Int(n),
            Err(_) => KeywordValue::Double(*n as f64),
        },
        (Value::Float(v), DataType::Real) => KeywordValue::Real(*v as f32),
        (Value::Float(v), _) => KeywordValue::Double(*v),
        (Value::Complex(re, im), _) => {
            KeywordValue::Complex(Complex32::new(*re as f32, *im as f32))
        }
    }
}

enum ColumnError {
    Overflow,
    Shape,
}

fn shaped<T>(values: Vec<T>, shape: &[usize]) -> std::result::Result<ArrayD<T>, ColumnError> {
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| ColumnError::Shape)
}

/// Shape raw column values as `[rows]` or `[rows, repeat]`.
fn column_data(
    raw: &RawColumn,
    descriptor: &ColumnDescriptor,
    rows: usize,
) -> std::result::Result<ColumnData, ColumnError> {
    let array_shape = [rows, raw.repeat];
    let shape: &[usize] = match &raw.data {
        TypedArray::Ascii(_) => &array_shape[..1],
        _ if descriptor.is_array() || raw.repeat != 1 => &array_shape,
        _ => &array_shape[..1],
    };

    let data = match &raw.data {
        TypedArray::Ascii(v) => ColumnData::Char(shaped(v.clone(), shape)?),
        TypedArray::Logical(v) => ColumnData::Logical(shaped(v.clone(), shape)?),
        TypedArray::Byte(v) => {
            ColumnData::Int(shaped(v.iter().map(|&b| i32::from(b)).collect(), shape)?)
        }
        TypedArray::Short(v) => {
            ColumnData::Int(shaped(v.iter().map(|&s| i32::from(s)).collect(), shape)?)
        }
        TypedArray::Int(v) => ColumnData::Int(shaped(v.clone(), shape)?),
        TypedArray::Long(v) => {
            let narrowed = v
                .iter()
                .map(|&n| i32::try_from(n).map_err(|_| ColumnError::Overflow))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            ColumnData::Int(shaped(narrowed, shape)?)
        }
        TypedArray::Float(v) => ColumnData::Real(shaped(v.clone(), shape)?),
        TypedArray::Double(v) => ColumnData::Double(shaped(v.clone(), shape)?),
        TypedArray::ComplexFloat(v) => ColumnData::Complex(shaped(
            v.iter().map(|&(re, im)| Complex32::new(re, im)).collect(),
            shape,
        )?),
        TypedArray::ComplexDouble(v) => ColumnData::Complex(shaped(
            v.iter()
                .map(|&(re, im)| Complex32::new(re as f32, im as f32))
                .collect(),
            shape,
        )?),
    };
    Ok(data)
}
