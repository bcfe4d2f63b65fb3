//! Generic OIFITS table: keyword map, column map and row count.
//!
//! Every kind shares this one structure; what differs between kinds is the
//! schema returned by [`TableKind::keywords`] and [`TableKind::columns`].

mod kind;
pub mod schema;
mod value;

use std::fmt;

use indexmap::IndexMap;
use ndarray::ArrayD;

pub use kind::TableKind;
pub use value::{CellView, ColumnData, HeaderCard, KeywordValue};

use crate::meta::{Cardinality, DataType, Revision};

/// Stable handle of a table registered in an [`crate::OiFitsFile`].
///
/// Ids are never reused, even after a table is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub(crate) u64);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub kind: TableKind,
    pub keywords: IndexMap<String, KeywordValue>,
    pub columns: IndexMap<String, ColumnData>,
    /// TUNITn values found in the file, by column name.
    pub column_units: IndexMap<String, String>,
    pub row_count: usize,
    /// Header cards outside the schema, in file order.
    pub extra_cards: Vec<HeaderCard>,
    pub(crate) ext_number: usize,
    pub(crate) ext_version: usize,
}

impl Table {
    /// An empty table of the given kind. Keywords and columns are added
    /// with [`Table::set_keyword`] and [`Table::set_column`].
    pub fn new(kind: TableKind) -> Self {
        Table {
            kind,
            keywords: IndexMap::new(),
            columns: IndexMap::new(),
            column_units: IndexMap::new(),
            row_count: 0,
            extra_cards: Vec::new(),
            ext_number: 0,
            ext_version: 0,
        }
    }

    /// Build a table with `rows` default rows for every column required at
    /// `revision`. NWAVE-sized columns get `nwave` elements per cell;
    /// station-sized columns are left empty.
    ///
    /// Whitelisted CHAR columns and keywords are filled with their first
    /// accepted value.
    pub fn allocate(kind: TableKind, revision: Revision, rows: usize, nwave: usize) -> Self {
        let mut table = Table::new(kind);
        table.row_count = rows;
        table.set_keyword("OI_REVN", KeywordValue::Int(revision.number()));

        for keyword in table.kind.keywords() {
            if let Some(first) = keyword.accepted.first_string() {
                if keyword.is_required(revision) {
                    table.set_keyword(keyword.name, KeywordValue::Char(first.to_string()));
                }
            }
        }

        for column in table.kind.columns() {
            if !column.meta.is_required(revision) {
                continue;
            }
            let width = if column.is_array() {
                Some(column.repeat.resolve_with(Some(nwave), Some(0)).unwrap_or(0))
            } else {
                None
            };
            let fill = column.meta.accepted.first_string().unwrap_or("");
            let data = ColumnData::defaults(column.data_type(), rows, width, fill);
            table.set_column(column.name(), data);
        }
        table
    }

    pub fn ext_name(&self) -> &str {
        self.kind.ext_name()
    }

    /// Position among all tables of the file, starting at 0.
    pub fn ext_number(&self) -> usize {
        self.ext_number
    }

    /// 1-based position among tables of the same kind.
    pub fn ext_version(&self) -> usize {
        self.ext_version
    }

    pub fn keyword(&self, name: &str) -> Option<&KeywordValue> {
        self.keywords.get(name)
    }

    pub fn set_keyword(&mut self, name: &str, value: KeywordValue) {
        self.keywords.insert(name.to_string(), value);
    }

    pub fn remove_keyword(&mut self, name: &str) -> Option<KeywordValue> {
        self.keywords.shift_remove(name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.get(name)
    }

    /// Store a column. Its length is not checked against `row_count`; the
    /// checker reports mismatches.
    pub fn set_column(&mut self, name: &str, data: ColumnData) {
        self.columns.insert(name.to_string(), data);
    }

    pub fn column_unit(&self, name: &str) -> Option<&str> {
        self.column_units.get(name).map(String::as_str)
    }

    /// Declared OI_REVN, if it is a known revision.
    pub fn revision(&self) -> Option<Revision> {
        self.keyword("OI_REVN")
            .and_then(KeywordValue::as_int)
            .and_then(Revision::from_revn)
    }

    /// Revision used to decide which entries are required.
    pub fn effective_revision(&self) -> Revision {
        self.revision()
            .unwrap_or_else(|| self.kind.min_revision())
            .max(self.kind.min_revision())
    }

    fn keyword_str(&self, name: &str) -> Option<&str> {
        self.keyword(name).and_then(KeywordValue::as_str).map(str::trim)
    }

    pub fn ins_name(&self) -> Option<&str> {
        self.keyword_str("INSNAME")
    }

    pub fn arr_name(&self) -> Option<&str> {
        self.keyword_str("ARRNAME")
    }

    pub fn corr_name(&self) -> Option<&str> {
        self.keyword_str("CORRNAME")
    }

    /// Number of spectral channels described by an OI_WAVELENGTH table.
    pub fn nwave(&self) -> Option<usize> {
        (self.kind == TableKind::Wavelength).then_some(self.row_count)
    }

    pub fn sta_indexes(&self) -> Option<&ArrayD<i32>> {
        self.column("STA_INDEX").and_then(ColumnData::as_int)
    }

    pub fn target_ids(&self) -> Option<Vec<i32>> {
        self.column("TARGET_ID")
            .and_then(ColumnData::as_int)
            .map(|ids| ids.iter().copied().collect())
    }

    pub fn eff_wave(&self) -> Option<Vec<f64>> {
        self.column("EFF_WAVE").and_then(ColumnData::to_f64_vec)
    }

    pub fn eff_band(&self) -> Option<Vec<f64>> {
        self.column("EFF_BAND").and_then(ColumnData::to_f64_vec)
    }

    /// Smallest and largest MJD of the table, ignoring NaN.
    pub fn mjd_range(&self) -> Option<(f64, f64)> {
        let mjd = self.column("MJD").and_then(ColumnData::to_f64_vec)?;
        mjd.into_iter()
            .filter(|v| !v.is_nan())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    /// Expected type and width for `column` given a resolved NWAVE, used when
    /// a caller fills columns by hand.
    pub fn expected_shape(&self, column: &str, nwave: usize) -> Option<(DataType, Option<usize>)> {
        let descriptor = self.kind.column_descriptor(column)?;
        let width = match descriptor.repeat {
            _ if !descriptor.is_array() => None,
            Cardinality::NStations => None,
            repeat => repeat.resolve_with(Some(nwave), None),
        };
        Some((descriptor.data_type(), width))
    }
}
