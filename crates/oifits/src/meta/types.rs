use std::fmt;

/// Physical type of an OIFITS keyword or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Char,
    Int,
    Real,
    Double,
    Logical,
    Complex,
}

impl DataType {
    /// FITS type letter used in TFORMn and in the XML `<type>` element.
    pub fn fits_code(self) -> char {
        match self {
            DataType::Char => 'A',
            DataType::Int => 'I',
            DataType::Real => 'E',
            DataType::Double => 'D',
            DataType::Logical => 'L',
            DataType::Complex => 'C',
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int | DataType::Real | DataType::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Char => "CHAR",
            DataType::Int => "INT",
            DataType::Real => "REAL",
            DataType::Double => "DBL",
            DataType::Logical => "LOGICAL",
            DataType::Complex => "COMPLEX",
        };
        f.write_str(name)
    }
}
