//! Text renderings of an [`OiFitsFile`].
//!
//! [`walk`] fixes the order in which tables are presented; the XML and CSV
//! outputs only decide what each table turns into.

pub mod csv;
pub mod format;
pub mod xml;

use crate::checker::Checker;
use crate::file::OiFitsFile;
use crate::table::{Table, TableKind};

pub use csv::CsvOutput;
pub use format::{beautify, NumberFormat};
pub use xml::XmlOutput;

/// Receiver of the table walk.
pub trait OutputVisitor {
    fn enter_file(&mut self, file: &OiFitsFile);

    /// Called once per visited table. `verbose` asks for row data.
    fn visit_table(&mut self, file: &OiFitsFile, table: &Table, verbose: bool);

    fn check_report(&mut self, _checker: &Checker) {}

    fn exit_file(&mut self, file: &OiFitsFile);
}

/// Walk `file` in presentation order:
///
/// 1. the first OI_ARRAY of each ARRNAME, then the first OI_WAVELENGTH of
///    each INSNAME, then OI_TARGET, all with row data;
/// 2. the first OI_CORR of each CORRNAME and every OI_INSPOL;
/// 3. the data tables in insertion order;
/// 4. the checker report, when given.
///
/// Tables of step 2 and 3 carry row data only when `verbose` is set.
pub fn walk<V: OutputVisitor + ?Sized>(
    file: &OiFitsFile,
    visitor: &mut V,
    verbose: bool,
    checker: Option<&Checker>,
) {
    visitor.enter_file(file);

    for name in file.accepted_arr_names() {
        if let Some(table) = file.get_oi_array(&name) {
            visitor.visit_table(file, table, true);
        }
    }
    for name in file.accepted_ins_names() {
        if let Some(table) = file.get_oi_wavelength(&name) {
            visitor.visit_table(file, table, true);
        }
    }
    if let Some(target) = file.oi_target() {
        visitor.visit_table(file, target, true);
    }

    for name in file.accepted_corr_names() {
        if let Some(table) = file.get_oi_corr(&name) {
            visitor.visit_table(file, table, verbose);
        }
    }
    for table in file.tables_of_kind(&TableKind::Inspol) {
        visitor.visit_table(file, table, verbose);
    }

    for table in file.data_tables() {
        visitor.visit_table(file, table, verbose);
    }

    if let Some(checker) = checker {
        visitor.check_report(checker);
    }
    visitor.exit_file(file);
}
