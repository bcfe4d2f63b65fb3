//! Syntactic and referential validation of an [`OiFitsFile`].
//!
//! Problems are collected as [`Diagnostic`]s; nothing here fails hard and
//! every table is always visited.

use std::fmt;

use crate::file::OiFitsFile;
use crate::meta::{Accepted, Cardinality, ColumnDescriptor, KeywordDescriptor, Revision, Validation};
use crate::table::{ColumnData, KeywordValue, Table, TableKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Severe => "SEVERE",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub table_ext_number: Option<usize>,
    pub table_name: Option<String>,
    /// Keyword or column the diagnostic is about.
    pub name: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t", self.severity)?;
        if let (Some(table), Some(number)) = (&self.table_name, self.table_ext_number) {
            write!(f, "[{table}#{number}] ")?;
        }
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Checker {
    diagnostics: Vec<Diagnostic>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `file`, replacing the diagnostics of any previous run.
    pub fn run(&mut self, file: &OiFitsFile) {
        self.diagnostics.clear();
        self.push(Severity::Info, None, None, "Analysing values and references".to_string());

        if file.oi_target().is_none() {
            self.push(
                Severity::Severe,
                None,
                None,
                "No OI_TARGET table found: one and only one must be present".to_string(),
            );
        }
        if file.tables_of_kind(&TableKind::Wavelength).next().is_none() {
            self.push(
                Severity::Severe,
                None,
                None,
                "No OI_WAVELENGTH table found: one or more must be present".to_string(),
            );
        }
        self.check_duplicates(file);

        for table in file.tables() {
            self.check_table(file, table);
        }
        log::debug!(
            "Check done: {} severe, {} warnings",
            self.nb_severe(),
            self.nb_warnings()
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn nb_warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn nb_severe(&self) -> usize {
        self.count(Severity::Severe)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    /// One line per diagnostic, in the order they were found.
    pub fn report(&self) -> String {
        self.diagnostics.iter().map(|d| format!("{d}\n")).collect()
    }

    fn push(
        &mut self,
        severity: Severity,
        table: Option<&Table>,
        name: Option<&str>,
        message: String,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            message,
            table_ext_number: table.map(Table::ext_number),
            table_name: table.map(|t| t.ext_name().to_string()),
            name: name.map(str::to_string),
        });
    }

    fn check_duplicates(&mut self, file: &OiFitsFile) {
        for (ext_name, keyword, index) in file.indexes() {
            for (identifier, ids) in index.iter().filter(|(_, ids)| ids.len() > 1) {
                let numbers = ids
                    .iter()
                    .filter_map(|id| file.table(*id))
                    .map(|t| t.ext_number().to_string())
                    .collect::<Vec<_>>()
                    .join("|");
                self.push(
                    Severity::Severe,
                    None,
                    None,
                    format!(
                        "{ext_name} tables [{numbers}] are identified by same \
                         {keyword}='{identifier}'"
                    ),
                );
            }
        }
    }

    fn check_table(&mut self, file: &OiFitsFile, table: &Table) {
        if !table.kind.is_known() {
            return;
        }
        for keyword in table.kind.keywords() {
            self.check_keyword(file, table, keyword);
        }
        self.check_references(file, table);
        for column in table.kind.columns() {
            self.check_column(file, table, column);
        }

        match table.kind {
            TableKind::Target if table.row_count == 0 => {
                self.push(Severity::Severe, Some(table), None, "No target defined".to_string());
            }
            TableKind::Inspol => self.check_mjd_interval(table),
            TableKind::Corr => self.check_corr_indexes(table),
            _ => {}
        }
    }

    fn check_keyword(&mut self, file: &OiFitsFile, table: &Table, keyword: &KeywordDescriptor) {
        let name = keyword.name;
        let Some(value) = table.keyword(name) else {
            if keyword.is_required(table.effective_revision()) {
                self.push(Severity::Severe, Some(table), Some(name), "missing keyword".to_string());
            }
            return;
        };

        match keyword.validate(value, file, table) {
            Validation::Ok => {}
            Validation::TypeMismatch => self.push(
                Severity::Severe,
                Some(table),
                Some(name),
                format!("invalid type {}, expected {}", value.data_type(), keyword.data_type),
            ),
            Validation::BlankString => self.push(
                Severity::Severe,
                Some(table),
                None,
                format!("{name} identifier has blank value"),
            ),
            Validation::NotInWhitelist
                if name == "OI_REVN" && table.kind.min_revision() > Revision::V1 =>
            {
                self.push(
                    Severity::Severe,
                    Some(table),
                    Some(name),
                    format!("{} table requires OI_REVN=2", table.ext_name()),
                )
            }
            Validation::NotInWhitelist => {
                let accepted = keyword
                    .accepted
                    .resolve(file, table)
                    .map(|a| a.to_string())
                    .unwrap_or_default();
                self.push(
                    Severity::Severe,
                    Some(table),
                    Some(name),
                    format!("invalid value '{value}', expected one of {accepted}"),
                )
            }
        }
    }

    /// Identifier keywords must name a registered table.
    fn check_references(&mut self, file: &OiFitsFile, table: &Table) {
        let references_array = table.kind.is_data() || table.kind == TableKind::Inspol;
        if references_array {
            if let Some(arr_name) = table.arr_name().filter(|n| !n.is_empty()) {
                if file.get_oi_array(arr_name).is_none() {
                    self.push(
                        Severity::Severe,
                        Some(table),
                        Some("ARRNAME"),
                        format!("unresolved ARRNAME reference '{arr_name}'"),
                    );
                }
            }
        }
        if !table.kind.is_data() {
            return;
        }
        if let Some(ins_name) = table.ins_name().filter(|n| !n.is_empty()) {
            if file.get_oi_wavelength(ins_name).is_none() {
                self.push(
                    Severity::Severe,
                    Some(table),
                    Some("INSNAME"),
                    format!("unresolved INSNAME reference '{ins_name}'"),
                );
            }
        }
        if let Some(corr_name) = table.corr_name().filter(|n| !n.is_empty()) {
            if file.get_oi_corr(corr_name).is_none() {
                self.push(
                    Severity::Severe,
                    Some(table),
                    Some("CORRNAME"),
                    format!("unresolved CORRNAME reference '{corr_name}'"),
                );
            }
        }
    }

    fn check_column(&mut self, file: &OiFitsFile, table: &Table, column: &ColumnDescriptor) {
        let name = column.name();
        let Some(data) = table.column(name) else {
            if column.meta.is_required(table.effective_revision()) {
                self.push(Severity::Severe, Some(table), Some(name), "missing column".to_string());
            }
            return;
        };

        if data.data_type() != column.data_type() {
            self.push(
                Severity::Severe,
                Some(table),
                Some(name),
                format!("invalid type {}, expected {}", data.data_type(), column.data_type()),
            );
            return;
        }

        if data.len() != table.row_count {
            self.push(
                Severity::Severe,
                Some(table),
                Some(name),
                format!("column has {} rows instead of {}", data.len(), table.row_count),
            );
        }

        self.check_repeat(file, table, column, data);

        if let Some(unit) = table.column_unit(name) {
            if !column.meta.unit.matches(unit) {
                self.push(
                    Severity::Warning,
                    Some(table),
                    Some(name),
                    format!("invalid unit '{unit}', expected '{}'", column.meta.unit),
                );
            }
        }

        for value in column.invalid_values(data, file, table) {
            let message = match column.meta.accepted {
                Accepted::StaIndexes => format!(
                    "{name}={value} is not a station of OI_ARRAY '{}'",
                    table.arr_name().unwrap_or_default()
                ),
                Accepted::TargetIds => format!("{name}={value} is not defined in OI_TARGET"),
                Accepted::InsNames => format!("unresolved INSNAME reference '{value}'"),
                _ => {
                    let accepted = column
                        .meta
                        .accepted
                        .resolve(file, table)
                        .map(|a| a.to_string())
                        .unwrap_or_default();
                    format!("invalid value {name}='{value}', expected one of {accepted}")
                }
            };
            self.push(Severity::Severe, Some(table), Some(name), message);
        }
    }

    fn check_repeat(
        &mut self,
        file: &OiFitsFile,
        table: &Table,
        column: &ColumnDescriptor,
        data: &ColumnData,
    ) {
        let name = column.name();
        if !column.is_array() {
            if let (ColumnData::Char(values), Cardinality::Fixed(width)) = (data, column.repeat) {
                if values.iter().any(|v| v.trim_end().chars().count() > width) {
                    self.push(
                        Severity::Warning,
                        Some(table),
                        Some(name),
                        format!("value exceeds {width} characters"),
                    );
                }
            } else if data.width() != 1 {
                self.push(
                    Severity::Severe,
                    Some(table),
                    Some(name),
                    format!("invalid repeat {}, expected 1", data.width()),
                );
            }
            return;
        }

        match column.resolve_repeat(file, table) {
            Some(expected) if data.is_array() && data.width() == expected => {}
            Some(expected) => self.push(
                Severity::Severe,
                Some(table),
                Some(name),
                format!("invalid repeat {}, expected {expected}", data.width()),
            ),
            None => {
                let dimension = column.repeat.dimension_name();
                log::warn!(
                    "{}#{}: can't check repeat for column '{name}': unresolved {dimension}",
                    table.ext_name(),
                    table.ext_number()
                );
                self.push(
                    Severity::Warning,
                    Some(table),
                    Some(name),
                    format!("Can't check repeat for column '{name}': unresolved {dimension}"),
                );
            }
        }
    }

    fn check_mjd_interval(&mut self, table: &Table) {
        let (Some(start), Some(end)) = (
            table.column("MJD_OBS").and_then(ColumnData::to_f64_vec),
            table.column("MJD_END").and_then(ColumnData::to_f64_vec),
        ) else {
            return;
        };
        for (row, (start, end)) in start.iter().zip(&end).enumerate() {
            if start > end {
                self.push(
                    Severity::Warning,
                    Some(table),
                    Some("MJD_OBS"),
                    format!("MJD_OBS={start} is after MJD_END={end} at row {row}"),
                );
            }
        }
    }

    fn check_corr_indexes(&mut self, table: &Table) {
        let Some(ndata) = table.keyword("NDATA").and_then(KeywordValue::as_int) else {
            return;
        };
        for name in ["IINDX", "JINDX"] {
            let Some(indexes) = table.column(name).and_then(ColumnData::as_int) else {
                continue;
            };
            let mut reported: Vec<i32> = Vec::new();
            for &index in indexes.iter() {
                if !(1..=ndata).contains(&index) && !reported.contains(&index) {
                    reported.push(index);
                    self.push(
                        Severity::Severe,
                        Some(table),
                        Some(name),
                        format!("{name}={index} is out of range 1..{ndata}"),
                    );
                }
            }
        }
    }
}

/// Convenience wrapper running a fresh [`Checker`] over `file`.
pub fn check(file: &OiFitsFile) -> Checker {
    let mut checker = Checker::new();
    checker.run(file);
    checker
}
