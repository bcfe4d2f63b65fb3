//! Minimal FITS container reader.
//!
//! Only what OIFITS needs is supported: header parsing for every HDU and
//! column extraction for binary table extensions. Image payloads are
//! skipped, not decoded.

pub mod bintable;
pub mod card;
pub mod gzip;

use thiserror::Error;

use bintable::{parse_column_layouts, read_column};
pub use card::{Card, Value};

/// FITS block size in bytes (each logical record is one block).
pub const BLOCK_SIZE: usize = 2880;

/// FITS card (keyword record) size in bytes.
pub const CARD_SIZE: usize = 80;

/// Number of cards that fit in a single block.
pub const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Errors raised while decoding the FITS container.
#[derive(Error, Debug)]
pub enum FitsError {
    #[error("invalid FITS header: {0}")]
    InvalidHeader(&'static str),

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("invalid keyword name")]
    InvalidKeyword,

    #[error("missing required keyword: {0}")]
    MissingKeyword(&'static str),

    #[error("invalid value for {0}")]
    InvalidValue(String),

    #[error("unsupported column format: {0}")]
    UnsupportedFormat(String),

    #[error("gzip stream could not be decompressed")]
    Decompression,
}

/// Returns the total byte length (in whole blocks) required to hold `num_bytes`.
pub const fn padded_byte_len(num_bytes: usize) -> usize {
    num_bytes.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// The structural kind of an HDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HduKind {
    Primary,
    Image,
    AsciiTable,
    BinaryTable,
}

/// Column values decoded from a binary table, flattened in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    Logical(Vec<bool>),
    Byte(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    ComplexFloat(Vec<(f32, f32)>),
    ComplexDouble(Vec<(f64, f64)>),
    /// One string per row.
    Ascii(Vec<String>),
}

impl TypedArray {
    pub fn len(&self) -> usize {
        match self {
            TypedArray::Logical(v) => v.len(),
            TypedArray::Byte(v) => v.len(),
            TypedArray::Short(v) => v.len(),
            TypedArray::Int(v) => v.len(),
            TypedArray::Long(v) => v.len(),
            TypedArray::Float(v) => v.len(),
            TypedArray::Double(v) => v.len(),
            TypedArray::ComplexFloat(v) => v.len(),
            TypedArray::ComplexDouble(v) => v.len(),
            TypedArray::Ascii(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One binary table column as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub repeat: usize,
    pub unit: Option<String>,
    pub data: TypedArray,
}

/// A single Header Data Unit.
#[derive(Debug, Clone)]
pub struct Hdu {
    /// Position in the file, the primary HDU being 0.
    pub index: usize,
    pub kind: HduKind,
    /// All header cards except END.
    pub cards: Vec<Card>,
    /// NAXIS2 for tables, 0 otherwise.
    pub row_count: usize,
    /// Decoded columns (binary tables only).
    pub columns: Vec<RawColumn>,
}

impl Hdu {
    pub fn card(&self, keyword: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.keyword == keyword)
    }

    pub fn ext_name(&self) -> Option<&str> {
        self.card("EXTNAME")
            .and_then(Card::string_value)
            .map(str::trim)
    }

    pub fn ext_ver(&self) -> Option<i64> {
        self.card("EXTVER").and_then(Card::integer_value)
    }
}

/// Parse header blocks starting at `offset` until the END card.
///
/// Returns the cards (END excluded) and the byte length of the header.
fn parse_header(data: &[u8], offset: usize) -> Result<(Vec<Card>, usize), FitsError> {
    let mut cards = Vec::new();
    let mut pos = offset;
    loop {
        let block = data
            .get(pos..pos + BLOCK_SIZE)
            .ok_or(FitsError::UnexpectedEof)?;
        pos += BLOCK_SIZE;
        for raw in block.chunks_exact(CARD_SIZE) {
            let mut bytes = [0u8; CARD_SIZE];
            bytes.copy_from_slice(raw);
            let card = card::parse_card(&bytes)?;
            if card.is_end() {
                return Ok((cards, pos - offset));
            }
            cards.push(card);
        }
    }
}

fn integer_card(cards: &[Card], keyword: &'static str) -> Result<i64, FitsError> {
    cards
        .iter()
        .find(|c| c.keyword == keyword)
        .and_then(Card::integer_value)
        .ok_or(FitsError::MissingKeyword(keyword))
}

fn to_usize(value: i64, keyword: &str) -> Result<usize, FitsError> {
    usize::try_from(value).map_err(|_| FitsError::InvalidValue(keyword.to_string()))
}

/// Unpadded byte length of the data segment described by `cards`.
fn data_byte_len(cards: &[Card], is_primary: bool) -> Result<usize, FitsError> {
    let bitpix = integer_card(cards, "BITPIX")?;
    let naxis = to_usize(integer_card(cards, "NAXIS")?, "NAXIS")?;
    if naxis == 0 {
        return Ok(0);
    }

    let mut pixels: usize = 1;
    for i in 1..=naxis {
        let keyword = format!("NAXIS{i}");
        let dim = cards
            .iter()
            .find(|c| c.keyword == keyword)
            .and_then(Card::integer_value)
            .ok_or(FitsError::MissingKeyword("NAXISn"))?;
        pixels = pixels
            .checked_mul(to_usize(dim, &keyword)?)
            .ok_or(FitsError::InvalidHeader("data size overflow"))?;
    }

    let (pcount, gcount) = if is_primary {
        (0, 1)
    } else {
        let pcount = integer_card(cards, "PCOUNT").unwrap_or(0);
        let gcount = integer_card(cards, "GCOUNT").unwrap_or(1).max(1);
        (to_usize(pcount, "PCOUNT")?, to_usize(gcount, "GCOUNT")?)
    };

    let bytes_per_value = (bitpix.unsigned_abs() as usize) / 8;
    pixels
        .checked_add(pcount)
        .and_then(|n| n.checked_mul(gcount))
        .and_then(|n| n.checked_mul(bytes_per_value))
        .ok_or(FitsError::InvalidHeader("data size overflow"))
}

fn hdu_kind(cards: &[Card], is_primary: bool) -> Result<HduKind, FitsError> {
    if is_primary {
        return match cards.first() {
            Some(c) if c.keyword == "SIMPLE" => Ok(HduKind::Primary),
            _ => Err(FitsError::InvalidHeader("first card is not SIMPLE")),
        };
    }
    let xtension = cards
        .first()
        .filter(|c| c.keyword == "XTENSION")
        .and_then(Card::string_value)
        .ok_or(FitsError::MissingKeyword("XTENSION"))?;
    Ok(match xtension.trim() {
        "BINTABLE" | "A3DTABLE" => HduKind::BinaryTable,
        "TABLE" => HduKind::AsciiTable,
        _ => HduKind::Image,
    })
}

fn decode_columns(cards: &[Card], data: &[u8]) -> Result<(usize, Vec<RawColumn>), FitsError> {
    let row_width = to_usize(integer_card(cards, "NAXIS1")?, "NAXIS1")?;
    let rows = to_usize(integer_card(cards, "NAXIS2")?, "NAXIS2")?;
    let tfields = to_usize(integer_card(cards, "TFIELDS")?, "TFIELDS")?;

    let layouts = parse_column_layouts(cards, tfields)?;
    if layouts.last().is_some_and(|l| l.offset + l.byte_width > row_width) {
        return Err(FitsError::InvalidHeader("columns wider than NAXIS1"));
    }

    let mut columns = Vec::with_capacity(tfields);
    for layout in layouts {
        match read_column(data, row_width, rows, &layout) {
            Ok(data) => columns.push(RawColumn {
                name: layout.name,
                repeat: layout.repeat,
                unit: layout.unit,
                data,
            }),
            Err(FitsError::UnsupportedFormat(name)) => {
                log::warn!("Skipping column '{name}': unsupported binary table format");
            }
            Err(e) => return Err(e),
        }
    }
    Ok((rows, columns))
}

/// Walk a complete FITS byte stream and decode every HDU.
///
/// Gzip-compressed input is inflated first.
pub fn read_hdus(data: &[u8]) -> Result<Vec<Hdu>, FitsError> {
    if gzip::is_gzip(data) {
        let inflated = gzip::decompress(data)?;
        return read_hdus(&inflated);
    }

    let mut hdus = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let index = hdus.len();
        let is_primary = index == 0;
        let (cards, header_len) = match parse_header(data, offset) {
            Ok(parsed) => parsed,
            // Trailing blank padding after the last HDU is tolerated.
            Err(_) if !is_primary && data[offset..].iter().all(|&b| b == 0 || b == b' ') => break,
            Err(e) => return Err(e),
        };
        let kind = hdu_kind(&cards, is_primary)?;
        let data_start = offset + header_len;
        let data_len = data_byte_len(&cards, is_primary)?;
        let payload = data_start
            .checked_add(data_len)
            .and_then(|end| data.get(data_start..end))
            .ok_or(FitsError::UnexpectedEof)?;

        let (row_count, columns) = match kind {
            HduKind::BinaryTable => decode_columns(&cards, payload)?,
            HduKind::AsciiTable => (
                to_usize(integer_card(&cards, "NAXIS2")?, "NAXIS2")?,
                Vec::new(),
            ),
            HduKind::Primary | HduKind::Image => (0, Vec::new()),
        };

        log::debug!(
            "HDU #{index}: {:?} '{}' with {row_count} rows",
            kind,
            cards
                .iter()
                .find(|c| c.keyword == "EXTNAME")
                .and_then(Card::string_value)
                .unwrap_or("")
        );
        hdus.push(Hdu {
            index,
            kind,
            cards,
            row_count,
            columns,
        });
        offset = data_start + padded_byte_len(data_len);
    }

    if hdus.is_empty() {
        return Err(FitsError::UnexpectedEof);
    }
    Ok(hdus)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_block(cards: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for text in cards.iter().chain(std::iter::once(&"END")) {
            let mut card = [b' '; CARD_SIZE];
            card[..text.len()].copy_from_slice(text.as_bytes());
            out.extend_from_slice(&card);
        }
        out.resize(padded_byte_len(out.len()), b' ');
        out
    }

    fn primary() -> Vec<u8> {
        header_block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                    8",
            "NAXIS   =                    0",
        ])
    }

    #[test]
    fn padded_lengths() {
        assert_eq!(padded_byte_len(0), 0);
        assert_eq!(padded_byte_len(1), BLOCK_SIZE);
        assert_eq!(padded_byte_len(BLOCK_SIZE + 1), 2 * BLOCK_SIZE);
    }

    #[test]
    fn reads_primary_only() {
        let hdus = read_hdus(&primary()).unwrap();
        assert_eq!(hdus.len(), 1);
        assert_eq!(hdus[0].kind, HduKind::Primary);
        assert_eq!(hdus[0].cards.len(), 3);
    }

    #[test]
    fn reads_binary_table_extension() {
        let mut data = primary();
        data.extend(header_block(&[
            "XTENSION= 'BINTABLE'",
            "BITPIX  =                    8",
            "NAXIS   =                    2",
            "NAXIS1  =                   10",
            "NAXIS2  =                    2",
            "PCOUNT  =                    0",
            "GCOUNT  =                    1",
            "TFIELDS =                    2",
            "TTYPE1  = 'EFF_WAVE'",
            "TFORM1  = '1E      '",
            "TUNIT1  = 'm       '",
            "TTYPE2  = 'NAME    '",
            "TFORM2  = '6A      '",
            "EXTNAME = 'OI_WAVELENGTH'",
            "EXTVER  =                    3",
        ]));
        let mut payload = Vec::new();
        payload.extend_from_slice(&2.0e-6f32.to_be_bytes());
        payload.extend_from_slice(b"first ");
        payload.extend_from_slice(&2.1e-6f32.to_be_bytes());
        payload.extend_from_slice(b"second");
        payload.resize(BLOCK_SIZE, 0);
        data.extend(payload);

        let hdus = read_hdus(&data).unwrap();
        assert_eq!(hdus.len(), 2);
        let table = &hdus[1];
        assert_eq!(table.kind, HduKind::BinaryTable);
        assert_eq!(table.ext_name(), Some("OI_WAVELENGTH"));
        assert_eq!(table.ext_ver(), Some(3));
        assert_eq!(table.row_count, 2);
        assert_eq!(table.columns[0].unit.as_deref(), Some("m"));
        assert_eq!(table.columns[0].data, TypedArray::Float(vec![2.0e-6, 2.1e-6]));
        assert_eq!(
            table.columns[1].data,
            TypedArray::Ascii(vec!["first".into(), "second".into()])
        );
    }

    #[test]
    fn skips_image_payload() {
        let mut data = header_block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                   16",
            "NAXIS   =                    1",
            "NAXIS1  =                 2000",
        ]);
        data.resize(data.len() + 2 * BLOCK_SIZE, 0);
        data.extend(header_block(&[
            "XTENSION= 'IMAGE   '",
            "BITPIX  =                    8",
            "NAXIS   =                    0",
        ]));
        let hdus = read_hdus(&data).unwrap();
        assert_eq!(hdus.len(), 2);
        assert_eq!(hdus[1].kind, HduKind::Image);
    }

    #[test]
    fn truncated_data_segment_is_an_error() {
        let mut data = header_block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                    8",
            "NAXIS   =                    1",
            "NAXIS1  =                 4000",
        ]);
        data.resize(data.len() + BLOCK_SIZE, 0);
        assert!(matches!(read_hdus(&data), Err(FitsError::UnexpectedEof)));
    }

    #[test]
    fn oversized_extension_is_an_error() {
        let mut data = primary();
        data.extend(header_block(&[
            "XTENSION= 'BINTABLE'",
            "BITPIX  =                    8",
            "NAXIS   =                    2",
            "NAXIS1  =  9223372036854775807",
            "NAXIS2  =                    2",
            "PCOUNT  =                    0",
            "GCOUNT  =                    1",
            "TFIELDS =                    0",
        ]));
        assert!(matches!(read_hdus(&data), Err(FitsError::UnexpectedEof)));
    }

    #[test]
    fn columns_wider_than_row_are_rejected() {
        let mut data = primary();
        data.extend(header_block(&[
            "XTENSION= 'BINTABLE'",
            "BITPIX  =                    8",
            "NAXIS   =                    2",
            "NAXIS1  =                    4",
            "NAXIS2  =                    1",
            "PCOUNT  =                    0",
            "GCOUNT  =                    1",
            "TFIELDS =                    1",
            "TTYPE1  = 'MJD     '",
            "TFORM1  = '1D      '",
        ]));
        data.resize(data.len() + BLOCK_SIZE, 0);
        assert!(matches!(
            read_hdus(&data),
            Err(FitsError::InvalidHeader("columns wider than NAXIS1"))
        ));
    }

    #[test]
    fn rejects_non_fits_input() {
        assert!(read_hdus(b"hello").is_err());
        let block = header_block(&["XTENSION= 'BINTABLE'"]);
        assert!(matches!(
            read_hdus(&block),
            Err(FitsError::InvalidHeader(_))
        ));
    }
}
