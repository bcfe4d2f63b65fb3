//! FITS binary table (BINTABLE) column extraction.

use super::card::Card;
use super::{FitsError, TypedArray};

/// The data type of a column in a FITS binary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    /// L -- logical, stored as a single byte (T/F/0).
    Logical,
    /// X -- bit array.
    Bit,
    /// B -- unsigned byte.
    Byte,
    /// I -- 16-bit signed integer.
    Short,
    /// J -- 32-bit signed integer.
    Int,
    /// K -- 64-bit signed integer.
    Long,
    /// E -- 32-bit IEEE float.
    Float,
    /// D -- 64-bit IEEE float.
    Double,
    /// C -- complex: pair of 32-bit IEEE floats.
    ComplexFloat,
    /// M -- complex: pair of 64-bit IEEE floats.
    ComplexDouble,
    /// A -- ASCII character.
    Ascii,
    /// P or Q -- variable-length array descriptor.
    VarArray { wide: bool },
}

impl ColumnFormat {
    /// Bytes per element. Bit columns use `ceil(repeat / 8)` instead.
    fn element_size(self) -> usize {
        match self {
            ColumnFormat::Logical | ColumnFormat::Byte | ColumnFormat::Ascii => 1,
            ColumnFormat::Bit => 0,
            ColumnFormat::Short => 2,
            ColumnFormat::Int | ColumnFormat::Float => 4,
            ColumnFormat::Long | ColumnFormat::Double | ColumnFormat::ComplexFloat => 8,
            ColumnFormat::ComplexDouble => 16,
            ColumnFormat::VarArray { wide } => {
                if wide {
                    16
                } else {
                    8
                }
            }
        }
    }
}

/// Describes one column of a binary table as declared in the header.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    /// Column name from TTYPEn (empty when absent).
    pub name: String,
    /// Repeat count from TFORMn.
    pub repeat: usize,
    pub format: ColumnFormat,
    /// Physical unit from TUNITn.
    pub unit: Option<String>,
    /// Byte offset of this column inside a row.
    pub offset: usize,
    /// Total bytes this column occupies per row.
    pub byte_width: usize,
}

/// Parse a TFORMn value like "1J", "10E", "16A", "1PB(200)".
pub fn parse_tform(s: &str) -> Result<(usize, ColumnFormat), FitsError> {
    let s = s.trim();
    let s = s.split_once('(').map_or(s, |(head, _)| head);
    let invalid = || FitsError::UnsupportedFormat(s.to_string());

    let code_pos = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let repeat = if code_pos == 0 {
        1
    } else {
        s[..code_pos].parse::<usize>().map_err(|_| invalid())?
    };

    let format = match &s[code_pos..] {
        "L" => ColumnFormat::Logical,
        "X" => ColumnFormat::Bit,
        "B" => ColumnFormat::Byte,
        "I" => ColumnFormat::Short,
        "J" => ColumnFormat::Int,
        "K" => ColumnFormat::Long,
        "E" => ColumnFormat::Float,
        "D" => ColumnFormat::Double,
        "C" => ColumnFormat::ComplexFloat,
        "M" => ColumnFormat::ComplexDouble,
        "A" => ColumnFormat::Ascii,
        code if code.len() == 2 && (code.starts_with('P') || code.starts_with('Q')) => {
            ColumnFormat::VarArray {
                wide: code.starts_with('Q'),
            }
        }
        _ => return Err(invalid()),
    };
    Ok((repeat, format))
}

fn find_card<'a>(cards: &'a [Card], keyword: &str) -> Option<&'a Card> {
    cards.iter().find(|c| c.keyword == keyword)
}

/// Extract the column layouts of a binary table from its header cards.
pub fn parse_column_layouts(
    cards: &[Card],
    tfields: usize,
) -> Result<Vec<ColumnLayout>, FitsError> {
    let mut columns = Vec::with_capacity(tfields);
    let mut offset = 0;

    for i in 1..=tfields {
        let tform = find_card(cards, &format!("TFORM{i}"))
            .and_then(Card::string_value)
            .ok_or(FitsError::MissingKeyword("TFORMn"))?;
        let (repeat, format) = parse_tform(tform)?;
        let name = find_card(cards, &format!("TTYPE{i}"))
            .and_then(Card::string_value)
            .unwrap_or_default()
            .trim()
            .to_string();
        let unit = find_card(cards, &format!("TUNIT{i}"))
            .and_then(Card::string_value)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let byte_width = match format {
            ColumnFormat::Bit => Some(repeat.div_ceil(8)),
            _ => repeat.checked_mul(format.element_size()),
        }
        .ok_or(FitsError::InvalidHeader("column size overflow"))?;
        columns.push(ColumnLayout {
            name,
            repeat,
            format,
            unit,
            offset,
            byte_width,
        });
        offset = offset
            .checked_add(byte_width)
            .ok_or(FitsError::InvalidHeader("column size overflow"))?;
    }

    Ok(columns)
}

/// Iterate over the bytes of each cell of `layout` across all rows.
fn cells<'a>(
    data: &'a [u8],
    row_width: usize,
    rows: usize,
    layout: &'a ColumnLayout,
) -> impl Iterator<Item = &'a [u8]> + 'a {
    (0..rows).map(move |row| {
        let start = row * row_width + layout.offset;
        &data[start..start + layout.byte_width]
    })
}

macro_rules! read_be {
    ($data:expr, $row_width:expr, $rows:expr, $layout:expr, $ty:ty, $size:expr) => {{
        let mut values = Vec::with_capacity($rows * $layout.repeat);
        for cell in cells($data, $row_width, $rows, $layout) {
            for chunk in cell.chunks_exact($size) {
                let mut bytes = [0u8; $size];
                bytes.copy_from_slice(chunk);
                values.push(<$ty>::from_be_bytes(bytes));
            }
        }
        values
    }};
}

/// Read every cell of one column from the (unpadded) table data segment.
///
/// Values are returned flattened in row-major order (`rows * repeat`
/// elements), except ASCII columns which yield one string per row.
pub fn read_column(
    data: &[u8],
    row_width: usize,
    rows: usize,
    layout: &ColumnLayout,
) -> Result<TypedArray, FitsError> {
    let table_len = row_width.checked_mul(rows);
    let column_end = layout.offset.checked_add(layout.byte_width);
    match (table_len, column_end) {
        (Some(len), Some(end)) if data.len() >= len && end <= row_width => {}
        _ => return Err(FitsError::UnexpectedEof),
    }

    let array = match layout.format {
        ColumnFormat::Logical => TypedArray::Logical(
            cells(data, row_width, rows, layout)
                .flat_map(|cell| cell.iter().map(|&b| b == b'T'))
                .collect(),
        ),
        ColumnFormat::Byte => {
            TypedArray::Byte(cells(data, row_width, rows, layout).flatten().copied().collect())
        }
        ColumnFormat::Short => TypedArray::Short(read_be!(data, row_width, rows, layout, i16, 2)),
        ColumnFormat::Int => TypedArray::Int(read_be!(data, row_width, rows, layout, i32, 4)),
        ColumnFormat::Long => TypedArray::Long(read_be!(data, row_width, rows, layout, i64, 8)),
        ColumnFormat::Float => TypedArray::Float(read_be!(data, row_width, rows, layout, f32, 4)),
        ColumnFormat::Double => TypedArray::Double(read_be!(data, row_width, rows, layout, f64, 8)),
        ColumnFormat::ComplexFloat => {
            let flat = read_be!(data, row_width, rows, layout, f32, 4);
            TypedArray::ComplexFloat(flat.chunks_exact(2).map(|c| (c[0], c[1])).collect())
        }
        ColumnFormat::ComplexDouble => {
            let flat = read_be!(data, row_width, rows, layout, f64, 8);
            TypedArray::ComplexDouble(flat.chunks_exact(2).map(|c| (c[0], c[1])).collect())
        }
        ColumnFormat::Ascii => {
            let mut values = Vec::with_capacity(rows);
            for cell in cells(data, row_width, rows, layout) {
                // Strings end at the first NUL; trailing blanks are not significant.
                let end = cell.iter().position(|&b| b == 0).unwrap_or(cell.len());
                let text = String::from_utf8_lossy(&cell[..end]);
                values.push(text.trim_end().to_string());
            }
            TypedArray::Ascii(values)
        }
        ColumnFormat::Bit | ColumnFormat::VarArray { .. } => {
            return Err(FitsError::UnsupportedFormat(layout.name.clone()))
        }
    };
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fits::card::Value;

    fn card(keyword: &str, value: Value) -> Card {
        Card {
            keyword: keyword.to_string(),
            value: Some(value),
            comment: None,
        }
    }

    #[test]
    fn parse_tform_variants() {
        assert_eq!(parse_tform("1J").unwrap(), (1, ColumnFormat::Int));
        assert_eq!(parse_tform("J").unwrap(), (1, ColumnFormat::Int));
        assert_eq!(parse_tform("16A").unwrap(), (16, ColumnFormat::Ascii));
        assert_eq!(parse_tform(" 3D ").unwrap(), (3, ColumnFormat::Double));
        assert_eq!(parse_tform("12C").unwrap(), (12, ColumnFormat::ComplexFloat));
        assert_eq!(
            parse_tform("1PE(200)").unwrap(),
            (1, ColumnFormat::VarArray { wide: false })
        );
    }

    #[test]
    fn parse_tform_rejects_garbage() {
        assert!(parse_tform("").is_err());
        assert!(parse_tform("12").is_err());
        assert!(parse_tform("3Z").is_err());
    }

    #[test]
    fn layouts_accumulate_offsets() {
        let cards = vec![
            card("TTYPE1", Value::String("STA_INDEX".into())),
            card("TFORM1", Value::String("2I".into())),
            card("TTYPE2", Value::String("VIS2DATA".into())),
            card("TFORM2", Value::String("3D".into())),
            card("TUNIT2", Value::String("  ".into())),
            card("TTYPE3", Value::String("UCOORD".into())),
            card("TFORM3", Value::String("1D".into())),
            card("TUNIT3", Value::String("m".into())),
        ];
        let layouts = parse_column_layouts(&cards, 3).unwrap();
        assert_eq!(layouts[0].byte_width, 4);
        assert_eq!(layouts[1].offset, 4);
        assert_eq!(layouts[1].byte_width, 24);
        assert_eq!(layouts[1].unit, None);
        assert_eq!(layouts[2].offset, 28);
        assert_eq!(layouts[2].unit.as_deref(), Some("m"));
    }

    #[test]
    fn huge_repeat_is_a_header_error() {
        let cards = vec![
            card("TTYPE1", Value::String("X".into())),
            card("TFORM1", Value::String("2305843009213693952D".into())),
        ];
        assert!(matches!(
            parse_column_layouts(&cards, 1),
            Err(FitsError::InvalidHeader("column size overflow"))
        ));
    }

    #[test]
    fn row_width_sum_overflow_is_a_header_error() {
        let huge = format!("{}A", usize::MAX);
        let cards = vec![
            card("TTYPE1", Value::String("A".into())),
            card("TFORM1", Value::String("1D".into())),
            card("TTYPE2", Value::String("B".into())),
            card("TFORM2", Value::String(huge)),
        ];
        assert!(matches!(
            parse_column_layouts(&cards, 2),
            Err(FitsError::InvalidHeader("column size overflow"))
        ));
    }

    #[test]
    fn missing_tform_is_an_error() {
        let cards = vec![card("TTYPE1", Value::String("X".into()))];
        assert!(matches!(
            parse_column_layouts(&cards, 1),
            Err(FitsError::MissingKeyword("TFORMn"))
        ));
    }

    #[test]
    fn reads_big_endian_cells_per_row() {
        let cards = vec![
            card("TTYPE1", Value::String("STA_INDEX".into())),
            card("TFORM1", Value::String("2I".into())),
            card("TTYPE2", Value::String("FLAG".into())),
            card("TFORM2", Value::String("2L".into())),
            card("TTYPE3", Value::String("TARGET".into())),
            card("TFORM3", Value::String("4A".into())),
        ];
        let layouts = parse_column_layouts(&cards, 3).unwrap();
        let mut data = Vec::new();
        for (a, b, flags, name) in [(1i16, 2i16, b"TF", b"Vega"), (3, 4, b"FF", b"M1\0\0")] {
            data.extend_from_slice(&a.to_be_bytes());
            data.extend_from_slice(&b.to_be_bytes());
            data.extend_from_slice(flags);
            data.extend_from_slice(name);
        }

        assert_eq!(
            read_column(&data, 10, 2, &layouts[0]).unwrap(),
            TypedArray::Short(vec![1, 2, 3, 4])
        );
        assert_eq!(
            read_column(&data, 10, 2, &layouts[1]).unwrap(),
            TypedArray::Logical(vec![true, false, false, false])
        );
        assert_eq!(
            read_column(&data, 10, 2, &layouts[2]).unwrap(),
            TypedArray::Ascii(vec!["Vega".into(), "M1".into()])
        );
    }

    #[test]
    fn invalid_utf8_text_is_replaced() {
        let layout = ColumnLayout {
            name: "TARGET".into(),
            repeat: 4,
            format: ColumnFormat::Ascii,
            unit: None,
            offset: 0,
            byte_width: 4,
        };
        let data = [b'V', 0xff, b'g', b'a', b'M', b'1', b' ', b' '];
        assert_eq!(
            read_column(&data, 4, 2, &layout).unwrap(),
            TypedArray::Ascii(vec!["V\u{fffd}ga".into(), "M1".into()])
        );
    }

    #[test]
    fn reads_complex_pairs() {
        let layout = ColumnLayout {
            name: "JXX".into(),
            repeat: 2,
            format: ColumnFormat::ComplexFloat,
            unit: None,
            offset: 0,
            byte_width: 16,
        };
        let data: Vec<u8> = [1.0f32, -1.0, 0.5, 2.0]
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect();
        assert_eq!(
            read_column(&data, 16, 1, &layout).unwrap(),
            TypedArray::ComplexFloat(vec![(1.0, -1.0), (0.5, 2.0)])
        );
    }

    #[test]
    fn truncated_data_is_rejected() {
        let layout = ColumnLayout {
            name: "MJD".into(),
            repeat: 1,
            format: ColumnFormat::Double,
            unit: None,
            offset: 0,
            byte_width: 8,
        };
        assert!(matches!(
            read_column(&[0u8; 12], 8, 2, &layout),
            Err(FitsError::UnexpectedEof)
        ));
    }

    #[test]
    fn variable_length_arrays_are_unsupported() {
        let layout = ColumnLayout {
            name: "VAR".into(),
            repeat: 1,
            format: ColumnFormat::VarArray { wide: false },
            unit: None,
            offset: 0,
            byte_width: 8,
        };
        assert!(read_column(&[0u8; 8], 8, 1, &layout).is_err());
    }
}
