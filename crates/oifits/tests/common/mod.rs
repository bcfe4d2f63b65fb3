#![allow(dead_code)]

use std::path::PathBuf;

use ndarray::{arr1, arr2, ArrayD};
use oifits::meta::Cardinality;
use oifits::table::CellView;
use oifits::{ColumnData, KeywordValue, OiFitsFile, Revision, Table, TableKind};
use tempfile::TempDir;

const BLOCK: usize = 2880;

pub fn ints(values: &[i32]) -> ColumnData {
    ColumnData::Int(arr1(values).into_dyn())
}

pub fn doubles(values: &[f64]) -> ColumnData {
    ColumnData::Double(arr1(values).into_dyn())
}

pub fn reals(values: &[f32]) -> ColumnData {
    ColumnData::Real(arr1(values).into_dyn())
}

pub fn chars(values: &[&str]) -> ColumnData {
    let owned: Vec<String> = values.iter().map(|s| s.to_string()).collect();
    ColumnData::Char(ArrayD::from_shape_vec(vec![owned.len()], owned).unwrap())
}

pub fn target() -> Table {
    let mut table = Table::allocate(TableKind::Target, Revision::V2, 1, 0);
    table.set_column("TARGET_ID", ints(&[1]));
    table.set_column("TARGET", chars(&["Vega"]));
    table.set_column("RAEP0", doubles(&[279.2347]));
    table.set_column("DECEP0", doubles(&[38.7837]));
    table.set_column("EQUINOX", reals(&[2000.0]));
    table
}

pub fn array() -> Table {
    let mut table = Table::allocate(TableKind::Array, Revision::V2, 4, 0);
    table.set_keyword("ARRNAME", KeywordValue::from("VLTI"));
    for axis in ["ARRAYX", "ARRAYY", "ARRAYZ"] {
        table.set_keyword(axis, KeywordValue::Double(0.0));
    }
    table.set_column("TEL_NAME", chars(&["UT1", "UT2", "UT3", "UT4"]));
    table.set_column("STA_NAME", chars(&["U1", "U2", "U3", "U4"]));
    table.set_column("STA_INDEX", ints(&[1, 2, 3, 4]));
    table.set_column("DIAMETER", reals(&[8.2; 4]));
    table
}

pub fn wavelength() -> Table {
    let mut table = Table::allocate(TableKind::Wavelength, Revision::V2, 3, 0);
    table.set_keyword("INSNAME", KeywordValue::from("GRAVITY"));
    table.set_column("EFF_WAVE", reals(&[2.0e-6, 2.1e-6, 2.2e-6]));
    table.set_column("EFF_BAND", reals(&[1.0e-7, 1.0e-7, 1.0e-7]));
    table
}

pub fn vis2() -> Table {
    let mut table = Table::allocate(TableKind::Vis2, Revision::V2, 2, 3);
    table.set_keyword("DATE-OBS", KeywordValue::from("2024-05-01"));
    table.set_keyword("ARRNAME", KeywordValue::from("VLTI"));
    table.set_keyword("INSNAME", KeywordValue::from("GRAVITY"));
    table.set_column("TARGET_ID", ints(&[1, 1]));
    table.set_column("MJD", doubles(&[60431.1, 60431.2]));
    table.set_column("INT_TIME", doubles(&[30.0, 60.0]));
    table.set_column(
        "VIS2DATA",
        ColumnData::Double(arr2(&[[0.9, 0.8, 0.7], [0.6, 0.5, 0.4]]).into_dyn()),
    );
    table.set_column("STA_INDEX", ColumnData::Int(arr2(&[[1, 2], [3, 4]]).into_dyn()));
    table
}

/// One target, one array, one instrument and two squared visibilities.
pub fn valid_file() -> OiFitsFile {
    let mut file = OiFitsFile::with_path("/data/vega.fits");
    file.add_table(target()).unwrap();
    file.add_table(array()).unwrap();
    file.add_table(wavelength()).unwrap();
    file.add_table(vis2()).unwrap();
    file
}

/// Like [`valid_file`] but the first baseline uses station 7.
pub fn unknown_station_file() -> OiFitsFile {
    let mut file = OiFitsFile::with_path("/data/vega.fits");
    let mut data = vis2();
    data.set_column("STA_INDEX", ColumnData::Int(arr2(&[[1, 7], [3, 4]]).into_dyn()));
    file.add_table(target()).unwrap();
    file.add_table(array()).unwrap();
    file.add_table(wavelength()).unwrap();
    file.add_table(data).unwrap();
    file
}

/// [`valid_file`] plus a second OI_WAVELENGTH named GRAVITY.
pub fn duplicate_instrument_file() -> OiFitsFile {
    let mut file = valid_file();
    file.add_table(wavelength()).unwrap();
    file
}

fn card(text: String) -> String {
    format!("{text:<80.80}")
}

fn value_card(key: &str, value: &str) -> String {
    card(format!("{key:<8}= {value:>20}"))
}

fn string_card(key: &str, value: &str) -> String {
    let quoted = value.replace('\'', "''");
    card(format!("{key:<8}= '{quoted:<8}'"))
}

fn keyword_card(key: &str, value: &KeywordValue) -> String {
    match value {
        KeywordValue::Char(s) => string_card(key, s),
        KeywordValue::Int(n) => value_card(key, &n.to_string()),
        KeywordValue::Real(v) => value_card(key, &format!("{:E}", f64::from(*v))),
        KeywordValue::Double(v) => value_card(key, &format!("{v:E}")),
        KeywordValue::Logical(b) => value_card(key, if *b { "T" } else { "F" }),
        KeywordValue::Complex(c) => value_card(key, &format!("({:E}, {:E})", c.re, c.im)),
    }
}

fn header_bytes(cards: &[String]) -> Vec<u8> {
    let mut bytes: Vec<u8> = cards
        .iter()
        .chain(std::iter::once(&card("END".to_string())))
        .flat_map(|c| c.bytes())
        .collect();
    let padded = bytes.len().div_ceil(BLOCK) * BLOCK;
    bytes.resize(padded, b' ');
    bytes
}

/// TFORM letter and repeat of a column, with CHAR cells as wide as the
/// declared size or the longest value.
fn tform(table: &Table, name: &str, data: &ColumnData) -> (char, usize) {
    match data {
        ColumnData::Char(values) => {
            let declared = match table.kind.column_descriptor(name).map(|c| c.repeat) {
                Some(Cardinality::Fixed(n)) => n,
                _ => 1,
            };
            let longest = values.iter().map(String::len).max().unwrap_or(0);
            ('A', declared.max(longest).max(1))
        }
        ColumnData::Int(_) => ('J', data.width()),
        ColumnData::Real(_) => ('E', data.width()),
        ColumnData::Double(_) => ('D', data.width()),
        ColumnData::Logical(_) => ('L', data.width()),
        ColumnData::Complex(_) => ('C', data.width()),
    }
}

fn cell_bytes(cell: CellView<'_>, width: usize, out: &mut Vec<u8>) {
    match cell {
        CellView::Char(v) => {
            let mut text = v.iter().next().cloned().unwrap_or_default().into_bytes();
            text.resize(width, b' ');
            out.extend_from_slice(&text);
        }
        CellView::Int(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        CellView::Real(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        CellView::Double(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        CellView::Logical(v) => v.iter().for_each(|&b| out.push(if b { b'T' } else { b'F' })),
        CellView::Complex(v) => v.iter().for_each(|c| {
            out.extend_from_slice(&c.re.to_be_bytes());
            out.extend_from_slice(&c.im.to_be_bytes());
        }),
    }
}

fn element_size(code: char) -> usize {
    match code {
        'A' | 'L' => 1,
        'J' | 'E' => 4,
        'D' | 'C' => 8,
        _ => unreachable!("no writer for TFORM {code}"),
    }
}

fn bintable_bytes(table: &Table) -> Vec<u8> {
    let columns: Vec<(&str, &ColumnData, char, usize)> = table
        .columns
        .iter()
        .map(|(name, data)| {
            let (code, repeat) = tform(table, name, data);
            (name.as_str(), data, code, repeat)
        })
        .collect();
    let row_width: usize = columns
        .iter()
        .map(|(_, _, code, repeat)| element_size(*code) * repeat)
        .sum();

    let mut cards = vec![
        string_card("XTENSION", "BINTABLE"),
        value_card("BITPIX", "8"),
        value_card("NAXIS", "2"),
        value_card("NAXIS1", &row_width.to_string()),
        value_card("NAXIS2", &table.row_count.to_string()),
        value_card("PCOUNT", "0"),
        value_card("GCOUNT", "1"),
        value_card("TFIELDS", &columns.len().to_string()),
    ];
    for (i, (name, _, code, repeat)) in columns.iter().enumerate() {
        let n = i + 1;
        cards.push(string_card(&format!("TTYPE{n}"), name));
        cards.push(string_card(&format!("TFORM{n}"), &format!("{repeat}{code}")));
        let unit = table
            .column_unit(name)
            .map(str::to_string)
            .or_else(|| {
                table
                    .kind
                    .column_descriptor(name)
                    .map(|c| c.meta.unit.as_str().to_string())
            })
            .unwrap_or_default();
        if !unit.is_empty() {
            cards.push(string_card(&format!("TUNIT{n}"), &unit));
        }
    }
    cards.push(string_card("EXTNAME", table.ext_name()));
    cards.push(value_card("EXTVER", &table.ext_version().to_string()));
    for (key, value) in &table.keywords {
        cards.push(keyword_card(key, value));
    }
    for extra in &table.extra_cards {
        let value = extra.value.as_deref().unwrap_or_default();
        cards.push(string_card(&extra.key, value));
    }

    let mut bytes = header_bytes(&cards);
    let mut data = Vec::with_capacity(row_width * table.row_count);
    for row in 0..table.row_count {
        for (_, column, code, repeat) in &columns {
            if let Some(cell) = column.cell(row) {
                let width = if *code == 'A' { *repeat } else { 0 };
                cell_bytes(cell, width, &mut data);
            }
        }
    }
    let padded = data.len().div_ceil(BLOCK) * BLOCK;
    data.resize(padded, 0);
    bytes.extend_from_slice(&data);
    bytes
}

/// Serialise `file` as a FITS byte stream: an empty primary HDU followed by
/// one binary table per registered table.
pub fn fits_bytes(file: &OiFitsFile) -> Vec<u8> {
    let mut bytes = header_bytes(&[
        value_card("SIMPLE", "T"),
        value_card("BITPIX", "8"),
        value_card("NAXIS", "0"),
        value_card("EXTEND", "T"),
    ]);
    for table in file.tables() {
        bytes.extend_from_slice(&bintable_bytes(table));
    }
    bytes
}

/// Wrap `payload` in a minimal gzip member.
pub fn gzip(payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0x1f, 0x8b, 8, 0, 0, 0, 0, 0, 0, 255];
    out.extend_from_slice(&miniz_oxide::deflate::compress_to_vec(payload, 6));
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out
}

/// Write `bytes` to a fresh temporary directory.
pub fn write_temp(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}
