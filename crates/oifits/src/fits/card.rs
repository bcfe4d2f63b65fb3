//! FITS header card and value parsing.

use std::fmt;
use std::str;

use super::{FitsError, CARD_SIZE};

/// A parsed FITS header value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// FITS logical value (`T` or `F`).
    Logical(bool),
    /// FITS integer value.
    Integer(i64),
    /// FITS floating-point value.
    Float(f64),
    /// FITS character string (content between single quotes).
    String(String),
    /// FITS complex value `(real, imaginary)`.
    Complex(f64, f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Complex(re, im) => write!(f, "({re}, {im})"),
        }
    }
}

/// A parsed FITS header card (one 80-byte keyword record).
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// The keyword name, trimmed.
    pub keyword: String,
    /// The parsed value, if this card has a value indicator (`= ` in bytes 8..10).
    pub value: Option<Value>,
    /// An optional comment string (or the free text of commentary cards).
    pub comment: Option<String>,
}

impl Card {
    pub fn is_end(&self) -> bool {
        self.keyword == "END"
    }

    /// Returns `true` if this card carries a commentary keyword
    /// (COMMENT, HISTORY, or blank).
    pub fn is_commentary(&self) -> bool {
        matches!(self.keyword.as_str(), "COMMENT" | "HISTORY" | "")
    }

    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn integer_value(&self) -> Option<i64> {
        match &self.value {
            Some(Value::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn logical_value(&self) -> Option<bool> {
        match &self.value {
            Some(Value::Logical(b)) => Some(*b),
            _ => None,
        }
    }
}

/// Parse a single 80-byte FITS header card.
pub fn parse_card(card_bytes: &[u8; CARD_SIZE]) -> Result<Card, FitsError> {
    let raw_keyword = &card_bytes[..8];
    for &b in raw_keyword {
        match b {
            b'A'..=b'Z' | b'0'..=b'9' | b' ' | b'-' | b'_' => {}
            _ => return Err(FitsError::InvalidKeyword),
        }
    }
    let keyword = str::from_utf8(raw_keyword)
        .map_err(|_| FitsError::InvalidKeyword)?
        .trim_end()
        .to_string();

    let has_value = card_bytes[8] == b'=' && card_bytes[9] == b' ';
    let commentary = matches!(keyword.as_str(), "COMMENT" | "HISTORY" | "" | "END");

    if has_value && !commentary {
        let value_field = &card_bytes[10..CARD_SIZE];
        return match parse_value(value_field) {
            Some((value, comment)) => Ok(Card {
                keyword,
                value: Some(value),
                comment: comment.map(String::from),
            }),
            None => {
                let field = str::from_utf8(value_field)
                    .map_err(|_| FitsError::InvalidHeader("non-ASCII value field"))?;
                Ok(Card {
                    keyword,
                    value: None,
                    comment: comment_after_separator(field.as_bytes()).map(String::from),
                })
            }
        };
    }

    let text = str::from_utf8(&card_bytes[8..CARD_SIZE])
        .map_err(|_| FitsError::InvalidHeader("non-ASCII commentary text"))?
        .trim_end();
    Ok(Card {
        keyword,
        value: None,
        comment: (!text.is_empty()).then(|| text.to_string()),
    })
}

/// Find the text after a ` /` separator, skipping one optional space.
///
/// Real-world files omit the space after the slash, so ` /` alone is enough.
fn comment_after_separator(field: &[u8]) -> Option<&str> {
    let pos = field.windows(2).position(|w| w == b" /")?;
    let mut start = pos + 2;
    if field.get(start) == Some(&b' ') {
        start += 1;
    }
    str::from_utf8(&field[start..])
        .ok()
        .map(str::trim_end)
        .filter(|s| !s.is_empty())
}

/// Parse a quoted FITS string. Doubled quotes (`''`) are literal quotes and
/// trailing blanks are not significant.
fn parse_string(field: &[u8]) -> (Value, Option<&str>) {
    let mut value = String::new();
    let mut i = 1;
    while i < field.len() {
        if field[i] == b'\'' {
            if field.get(i + 1) == Some(&b'\'') {
                value.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            break;
        }
        value.push(field[i] as char);
        i += 1;
    }
    let remainder = field.get(i..).unwrap_or(&[]);
    (
        Value::String(value.trim_end().to_string()),
        comment_after_separator(remainder),
    )
}

fn parse_float_str(s: &str) -> Option<f64> {
    s.replace(['D', 'd'], "E").parse::<f64>().ok()
}

fn parse_complex(text: &str) -> Option<Value> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let (re, im) = inner.split_once(',')?;
    Some(Value::Complex(
        parse_float_str(re.trim())?,
        parse_float_str(im.trim())?,
    ))
}

/// Parse the 70-byte value field of a card (bytes 10..80).
///
/// Returns `None` for an undefined (blank) value.
pub fn parse_value(field: &[u8]) -> Option<(Value, Option<&str>)> {
    let start = field.iter().position(|&b| b != b' ')?;
    let field = &field[start..];
    if field[0] == b'\'' {
        return Some(parse_string(field));
    }

    let (value_part, comment) = match field.iter().position(|&b| b == b'/') {
        Some(pos) => (
            &field[..pos],
            comment_after_separator(&field[pos.saturating_sub(1)..]),
        ),
        None => (field, None),
    };
    let text = str::from_utf8(value_part).ok()?.trim();
    if text.is_empty() {
        return None;
    }

    let value = match text {
        "T" => Value::Logical(true),
        "F" => Value::Logical(false),
        _ if text.starts_with('(') => parse_complex(text)?,
        _ if !text.contains(['.', 'E', 'e', 'D', 'd']) => match text.parse::<i64>() {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::Float(parse_float_str(text)?),
        },
        _ => Value::Float(parse_float_str(text)?),
    };
    Some((value, comment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_bytes(text: &str) -> [u8; CARD_SIZE] {
        let mut buf = [b' '; CARD_SIZE];
        buf[..text.len()].copy_from_slice(text.as_bytes());
        buf
    }

    #[test]
    fn parses_string_card_with_comment() {
        let card =
            parse_card(&card_bytes("INSNAME = 'GRAVITY_SC'         / name of detector")).unwrap();
        assert_eq!(card.keyword, "INSNAME");
        assert_eq!(card.string_value(), Some("GRAVITY_SC"));
        assert_eq!(card.comment.as_deref(), Some("name of detector"));
    }

    #[test]
    fn parses_embedded_quotes() {
        let card = parse_card(&card_bytes("OBSERVER= 'O''Brien'")).unwrap();
        assert_eq!(card.string_value(), Some("O'Brien"));
    }

    #[test]
    fn parses_blank_string() {
        let card = parse_card(&card_bytes("ARRNAME = '        '")).unwrap();
        assert_eq!(card.string_value(), Some(""));
    }

    #[test]
    fn parses_integer_and_logical() {
        let card = parse_card(&card_bytes("OI_REVN =                    2 / revision")).unwrap();
        assert_eq!(card.integer_value(), Some(2));
        assert_eq!(card.comment.as_deref(), Some("revision"));

        let card = parse_card(&card_bytes("SIMPLE  =                    T")).unwrap();
        assert_eq!(card.logical_value(), Some(true));
    }

    #[test]
    fn parses_float_with_d_exponent() {
        let card = parse_card(&card_bytes("ARRAYX  =      1.9424D+06")).unwrap();
        assert_eq!(card.value, Some(Value::Float(1.9424e6)));
    }

    #[test]
    fn parses_comment_without_trailing_space() {
        let card = parse_card(&card_bytes("NAXIS   =                    2 /axes")).unwrap();
        assert_eq!(card.integer_value(), Some(2));
        assert_eq!(card.comment.as_deref(), Some("axes"));
    }

    #[test]
    fn parses_complex_value() {
        let card = parse_card(&card_bytes("CVAL    = (1.5, -2.0)")).unwrap();
        assert_eq!(card.value, Some(Value::Complex(1.5, -2.0)));
    }

    #[test]
    fn commentary_cards_keep_text() {
        let card = parse_card(&card_bytes("HISTORY created by the pipeline")).unwrap();
        assert!(card.is_commentary());
        assert_eq!(card.value, None);
        assert_eq!(card.comment.as_deref(), Some("created by the pipeline"));
    }

    #[test]
    fn undefined_value_keeps_comment() {
        let card = parse_card(&card_bytes("BLANKVAL=                      / undefined")).unwrap();
        assert_eq!(card.value, None);
        assert_eq!(card.comment.as_deref(), Some("undefined"));
    }

    #[test]
    fn rejects_lowercase_keyword() {
        assert!(matches!(
            parse_card(&card_bytes("insname = 'X'")),
            Err(FitsError::InvalidKeyword)
        ));
    }

    #[test]
    fn end_card_detected() {
        assert!(parse_card(&card_bytes("END")).unwrap().is_end());
    }

    #[test]
    fn value_display_round_trips_logical() {
        assert_eq!(Value::Logical(false).to_string(), "F");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
    }
}
