//! Tab-separated per-target summary, one record per (target, instrument).

use std::fmt::Write as _;

use super::{walk, NumberFormat, OutputVisitor};
use crate::file::{OiFitsFile, TargetSummary};
use crate::table::{Table, TableKind};

pub const SEPARATOR: char = '\t';

pub const HEADER: [&str; 15] = [
    "target_name",
    "s_ra",
    "s_dec",
    "t_exptime",
    "t_min",
    "t_max",
    "em_res_power",
    "em_min",
    "em_max",
    "facility_name",
    "instrument_name",
    "nb_vis",
    "nb_vis2",
    "nb_t3",
    "nb_channels",
];

#[derive(Debug, Clone, Default)]
pub struct CsvOutput {
    format: NumberFormat,
    verbose: bool,
    buffer: String,
}

impl CsvOutput {
    pub fn new(format: NumberFormat, verbose: bool) -> Self {
        CsvOutput {
            format,
            verbose,
            buffer: String::new(),
        }
    }

    /// Header and records, or nothing but the preamble when the file has no
    /// OI_TARGET.
    pub fn render(&mut self, file: &OiFitsFile) -> String {
        let verbose = self.verbose;
        self.buffer.clear();
        walk(file, self, verbose, None);
        std::mem::take(&mut self.buffer)
    }

    fn push_line<I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = String>,
    {
        let line: Vec<String> = fields.into_iter().collect();
        self.buffer.push_str(&line.join(&SEPARATOR.to_string()));
        self.buffer.push('\n');
    }

    fn push_record(&mut self, summary: &TargetSummary) {
        let number = |v: f64| self.format.format_f64(v);
        let fields = vec![
            summary.target_name.clone(),
            number(summary.ra),
            number(summary.dec),
            number(summary.t_exptime),
            number(summary.t_min),
            number(summary.t_max),
            number(summary.res_power),
            number(summary.em_min),
            number(summary.em_max),
            summary.facility_name.clone(),
            summary.instrument_name.clone(),
            summary.nb_vis.to_string(),
            summary.nb_vis2.to_string(),
            summary.nb_t3.to_string(),
            summary.nb_channels.to_string(),
        ];
        self.push_line(fields);
    }
}

impl OutputVisitor for CsvOutput {
    fn enter_file(&mut self, file: &OiFitsFile) {
        if !self.verbose {
            return;
        }
        if let Some(path) = file.absolute_path() {
            let path = path.display();
            let _ = writeln!(self.buffer, "# filename       {path}");
            let _ = writeln!(self.buffer, "# local_filename {path}");
        }
    }

    fn visit_table(&mut self, file: &OiFitsFile, table: &Table, _verbose: bool) {
        if table.kind != TableKind::Target {
            return;
        }
        self.push_line(HEADER.iter().map(|h| h.to_string()));
        for summary in &file.analyze().summaries {
            self.push_record(summary);
        }
    }

    fn exit_file(&mut self, _file: &OiFitsFile) {}
}
