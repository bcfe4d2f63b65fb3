use std::fmt;

use ndarray::{ArrayD, ArrayViewD, Axis};
use num_complex::Complex32;

use crate::meta::DataType;

/// A scalar header keyword value.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Char(String),
    Int(i32),
    Real(f32),
    Double(f64),
    Logical(bool),
    Complex(Complex32),
}

impl KeywordValue {
    pub fn data_type(&self) -> DataType {
        match self {
            KeywordValue::Char(_) => DataType::Char,
            KeywordValue::Int(_) => DataType::Int,
            KeywordValue::Real(_) => DataType::Real,
            KeywordValue::Double(_) => DataType::Double,
            KeywordValue::Logical(_) => DataType::Logical,
            KeywordValue::Complex(_) => DataType::Complex,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeywordValue::Char(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            KeywordValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KeywordValue::Int(n) => Some(f64::from(*n)),
            KeywordValue::Real(v) => Some(f64::from(*v)),
            KeywordValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for KeywordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordValue::Char(s) => f.write_str(s),
            KeywordValue::Int(n) => write!(f, "{n}"),
            KeywordValue::Real(v) => write!(f, "{v}"),
            KeywordValue::Double(v) => write!(f, "{v}"),
            KeywordValue::Logical(b) => write!(f, "{b}"),
            KeywordValue::Complex(c) => write!(f, "{},{}", c.re, c.im),
        }
    }
}

impl From<&str> for KeywordValue {
    fn from(s: &str) -> Self {
        KeywordValue::Char(s.to_string())
    }
}

impl From<i32> for KeywordValue {
    fn from(n: i32) -> Self {
        KeywordValue::Int(n)
    }
}

impl From<f64> for KeywordValue {
    fn from(v: f64) -> Self {
        KeywordValue::Double(v)
    }
}

/// A header card that is not part of a table's schema, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCard {
    pub key: String,
    pub value: Option<String>,
    pub comment: Option<String>,
}

/// One cell of a column, borrowed from its [`ColumnData`].
#[derive(Debug, Clone)]
pub enum CellView<'a> {
    Char(ArrayViewD<'a, String>),
    Int(ArrayViewD<'a, i32>),
    Real(ArrayViewD<'a, f32>),
    Double(ArrayViewD<'a, f64>),
    Logical(ArrayViewD<'a, bool>),
    Complex(ArrayViewD<'a, Complex32>),
}

/// Column values. Axis 0 is the row; array columns carry a second axis.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Char(ArrayD<String>),
    Int(ArrayD<i32>),
    Real(ArrayD<f32>),
    Double(ArrayD<f64>),
    Logical(ArrayD<bool>),
    /// Complex cells; the logical (real, imaginary) axis is implicit.
    Complex(ArrayD<Complex32>),
}

macro_rules! each_array {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            ColumnData::Char($arr) => $body,
            ColumnData::Int($arr) => $body,
            ColumnData::Real($arr) => $body,
            ColumnData::Double($arr) => $body,
            ColumnData::Logical($arr) => $body,
            ColumnData::Complex($arr) => $body,
        }
    };
}

impl ColumnData {
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Char(_) => DataType::Char,
            ColumnData::Int(_) => DataType::Int,
            ColumnData::Real(_) => DataType::Real,
            ColumnData::Double(_) => DataType::Double,
            ColumnData::Logical(_) => DataType::Logical,
            ColumnData::Complex(_) => DataType::Complex,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        each_array!(self, a => a.shape().first().copied().unwrap_or(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements per row (1 for scalar columns).
    pub fn width(&self) -> usize {
        each_array!(self, a => a.shape().iter().skip(1).product())
    }

    /// Whether the column has a per-row array axis.
    pub fn is_array(&self) -> bool {
        each_array!(self, a => a.ndim() > 1)
    }

    /// Logical shape; complex columns end with a length-2 axis.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = each_array!(self, a => a.shape().to_vec());
        if let ColumnData::Complex(_) = self {
            shape.push(2);
        }
        shape
    }

    /// Borrow the cell at `row`.
    pub fn cell(&self, row: usize) -> Option<CellView<'_>> {
        if row >= self.len() {
            return None;
        }
        let view = match self {
            ColumnData::Char(a) => CellView::Char(a.index_axis(Axis(0), row)),
            ColumnData::Int(a) => CellView::Int(a.index_axis(Axis(0), row)),
            ColumnData::Real(a) => CellView::Real(a.index_axis(Axis(0), row)),
            ColumnData::Double(a) => CellView::Double(a.index_axis(Axis(0), row)),
            ColumnData::Logical(a) => CellView::Logical(a.index_axis(Axis(0), row)),
            ColumnData::Complex(a) => CellView::Complex(a.index_axis(Axis(0), row)),
        };
        Some(view)
    }

    pub fn as_int(&self) -> Option<&ArrayD<i32>> {
        match self {
            ColumnData::Int(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<&ArrayD<String>> {
        match self {
            ColumnData::Char(a) => Some(a),
            _ => None,
        }
    }

    /// All values of a numeric column as `f64`, in row-major order.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            ColumnData::Int(a) => Some(a.iter().map(|&v| f64::from(v)).collect()),
            ColumnData::Real(a) => Some(a.iter().map(|&v| f64::from(v)).collect()),
            ColumnData::Double(a) => Some(a.iter().copied().collect()),
            _ => None,
        }
    }

    /// A column of `rows` default cells of the given type and width.
    ///
    /// A width of `None` yields a scalar (1-D) column.
    pub fn defaults(data_type: DataType, rows: usize, width: Option<usize>, fill: &str) -> Self {
        let shape: Vec<usize> = match width {
            Some(w) => vec![rows, w],
            None => vec![rows],
        };
        match data_type {
            DataType::Char => ColumnData::Char(ArrayD::from_elem(shape, fill.to_string())),
            DataType::Int => ColumnData::Int(ArrayD::zeros(shape)),
            DataType::Real => ColumnData::Real(ArrayD::zeros(shape)),
            DataType::Double => ColumnData::Double(ArrayD::zeros(shape)),
            DataType::Logical => ColumnData::Logical(ArrayD::from_elem(shape, false)),
            DataType::Complex => ColumnData::Complex(ArrayD::zeros(shape)),
        }
    }
}
