//! XML description of a file: `<oifits>` with one element per table.

use std::fmt::Write as _;

use super::{walk, NumberFormat, OutputVisitor};
use crate::checker::Checker;
use crate::file::OiFitsFile;
use crate::table::Table;

/// Escape the characters that would break element text.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, Default)]
pub struct XmlOutput {
    format: NumberFormat,
    verbose: bool,
    buffer: String,
}

impl XmlOutput {
    pub fn new(format: NumberFormat, verbose: bool) -> Self {
        XmlOutput {
            format,
            verbose,
            buffer: String::new(),
        }
    }

    /// Describe the whole file, appending the checker report if given.
    pub fn render(&mut self, file: &OiFitsFile, checker: Option<&Checker>) -> String {
        let verbose = self.verbose;
        self.buffer.clear();
        walk(file, self, verbose, checker);
        std::mem::take(&mut self.buffer)
    }

    /// Describe a single table, wrapped in its own `<oifits>` element.
    pub fn render_table(&mut self, table: &Table) -> String {
        let verbose = self.verbose;
        self.buffer.clear();
        self.buffer.push_str("<oifits>\n");
        self.write_table(table, verbose);
        self.buffer.push_str("</oifits>\n");
        std::mem::take(&mut self.buffer)
    }

    fn write_keyword(
        &mut self,
        name: &str,
        value: &str,
        description: &str,
        code: char,
        unit: &str,
    ) {
        let _ = writeln!(
            self.buffer,
            "<keyword><name>{}</name><value>{}</value><description>{}</description>\
             <type>{code}</type><unit>{}</unit></keyword>",
            escape(name),
            escape(value),
            escape(description),
            escape(unit),
        );
    }

    fn write_table(&mut self, table: &Table, verbose: bool) {
        let ext_name = escape(table.ext_name());
        let _ = writeln!(self.buffer, "<{ext_name}>");

        self.buffer.push_str("<keywords>\n");
        for descriptor in table.kind.keywords() {
            if let Some(value) = table.keyword(descriptor.name) {
                let value = NumberFormat::Plain.format_keyword(value);
                self.write_keyword(
                    descriptor.name,
                    &value,
                    descriptor.description,
                    descriptor.data_type.fits_code(),
                    descriptor.unit.as_str(),
                );
            }
        }
        for card in &table.extra_cards {
            self.write_keyword(
                &card.key,
                card.value.as_deref().unwrap_or_default(),
                card.comment.as_deref().unwrap_or_default(),
                'A',
                "",
            );
        }
        self.buffer.push_str("</keywords>\n");

        let present: Vec<_> = table
            .kind
            .columns()
            .iter()
            .filter(|c| table.column(c.name()).is_some())
            .collect();

        self.buffer.push_str("<columns>\n");
        for column in &present {
            let _ = writeln!(
                self.buffer,
                "<column><name>{}</name><description>{}</description>\
                 <type>{}</type><unit>{}</unit></column>",
                column.name(),
                escape(column.meta.description),
                column.data_type().fits_code(),
                column.meta.unit,
            );
        }
        self.buffer.push_str("</columns>\n");

        if verbose {
            self.buffer.push_str("<table>\n<tr>\n");
            for column in &present {
                let _ = write!(self.buffer, "<th>{}</th>", column.name());
            }
            self.buffer.push_str("</tr>\n");

            for row in 0..table.row_count {
                self.buffer.push_str("<tr>");
                for column in &present {
                    let cell = table
                        .column(column.name())
                        .and_then(|data| data.cell(row))
                        .map(|cell| self.format.format_cell(&cell))
                        .unwrap_or_default();
                    let _ = write!(self.buffer, "<td>{}</td>", escape(&cell));
                }
                self.buffer.push_str("</tr>\n");
            }
            self.buffer.push_str("</table>\n");
        }

        let _ = writeln!(self.buffer, "</{ext_name}>");
    }
}

impl OutputVisitor for XmlOutput {
    fn enter_file(&mut self, file: &OiFitsFile) {
        self.buffer.push_str("<oifits>\n");
        if let Some(path) = file.absolute_path() {
            let _ = writeln!(
                self.buffer,
                "<filename>{}</filename>",
                escape(&path.display().to_string())
            );
        }
    }

    fn visit_table(&mut self, _file: &OiFitsFile, table: &Table, verbose: bool) {
        self.write_table(table, verbose);
    }

    fn check_report(&mut self, checker: &Checker) {
        let _ = writeln!(
            self.buffer,
            "<checkReport>\n{}</checkReport>",
            escape(&checker.report())
        );
    }

    fn exit_file(&mut self, _file: &OiFitsFile) {
        self.buffer.push_str("</oifits>\n");
    }
}
