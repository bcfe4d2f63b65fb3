//! Number rendering shared by the XML and CSV outputs.
//!
//! All functions are pure; no formatter state is shared between calls.

use num_complex::Complex32;

use crate::table::{CellView, KeywordValue};

/// How floating-point values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberFormat {
    /// Shortest representation that round-trips.
    #[default]
    Plain,
    /// `#0.###` for `1e-2 < |v| < 1e7`, `0.###E0` otherwise.
    Beautify,
}

impl NumberFormat {
    pub fn from_flag(format: bool) -> Self {
        if format {
            NumberFormat::Beautify
        } else {
            NumberFormat::Plain
        }
    }

    pub fn format_f64(self, value: f64) -> String {
        match self {
            NumberFormat::Plain => plain(value),
            NumberFormat::Beautify => beautify(value),
        }
    }

    pub fn format_f32(self, value: f32) -> String {
        match self {
            NumberFormat::Plain if value.is_finite() => value.to_string(),
            _ => self.format_f64(f64::from(value)),
        }
    }

    pub fn format_bool(self, value: bool) -> String {
        match (self, value) {
            (NumberFormat::Beautify, true) => "T".to_string(),
            (NumberFormat::Beautify, false) => "F".to_string(),
            (NumberFormat::Plain, b) => b.to_string(),
        }
    }

    pub fn format_complex(self, value: Complex32) -> String {
        format!("{},{}", self.format_f32(value.re), self.format_f32(value.im))
    }

    pub fn format_keyword(self, value: &KeywordValue) -> String {
        match value {
            KeywordValue::Char(s) => s.clone(),
            KeywordValue::Int(n) => n.to_string(),
            KeywordValue::Real(v) => self.format_f32(*v),
            KeywordValue::Double(v) => self.format_f64(*v),
            KeywordValue::Logical(b) => self.format_bool(*b),
            KeywordValue::Complex(c) => self.format_complex(*c),
        }
    }

    /// Render one cell; array elements are separated by a single space.
    pub fn format_cell(self, cell: &CellView<'_>) -> String {
        let parts: Vec<String> = match cell {
            CellView::Char(v) => v.iter().map(|s| s.trim_end().to_string()).collect(),
            CellView::Int(v) => v.iter().map(i32::to_string).collect(),
            CellView::Real(v) => v.iter().map(|&x| self.format_f32(x)).collect(),
            CellView::Double(v) => v.iter().map(|&x| self.format_f64(x)).collect(),
            CellView::Logical(v) => v.iter().map(|&b| self.format_bool(b)).collect(),
            CellView::Complex(v) => v.iter().map(|&c| self.format_complex(c)).collect(),
        };
        parts.join(" ")
    }
}

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("Inf")
    } else if value == f64::NEG_INFINITY {
        Some("-Inf")
    } else {
        None
    }
}

fn plain(value: f64) -> String {
    match non_finite(value) {
        Some(token) => token.to_string(),
        None => value.to_string(),
    }
}

/// Strip trailing zeros of a fixed-point mantissa, then a dangling dot.
fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Render `value` the way tables are shown to humans: three decimals at
/// most, scientific notation outside `(1e-2, 1e7)`.
pub fn beautify(value: f64) -> String {
    if let Some(token) = non_finite(value) {
        return token.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude > 1e-2 && magnitude < 1e7 {
        let fixed = format!("{value:.3}");
        return match trim_fraction(&fixed) {
            "-0" => "0".to_string(),
            trimmed => trimmed.to_string(),
        };
    }

    // `{:e}` renormalises the mantissa after rounding (9.9996e3 -> 1.000e4).
    let scientific = format!("{value:.3e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) => format!("{}E{exponent}", trim_fraction(mantissa)),
        None => scientific,
    }
}
