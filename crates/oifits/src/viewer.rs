//! Load, check and describe OIFITS files, returning the text instead of
//! printing it.

use std::path::Path;

use crate::checker::{check, Checker};
use crate::error::Result;
use crate::file::OiFitsFile;
use crate::loader::load_oifits;
use crate::output::{CsvOutput, NumberFormat, XmlOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Xml,
    /// Tab-separated target summary.
    Tsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewerOptions {
    pub mode: OutputMode,
    /// Include row data (XML) or the file preamble (TSV).
    pub verbose: bool,
    /// Beautify numbers.
    pub format: bool,
    /// Only emit the checker report.
    pub check_only: bool,
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub text: String,
    pub nb_severe: usize,
    pub nb_warnings: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OiFitsViewer {
    options: ViewerOptions,
}

impl OiFitsViewer {
    pub fn new(options: ViewerOptions) -> Self {
        OiFitsViewer { options }
    }

    pub fn options(&self) -> ViewerOptions {
        self.options
    }

    /// Load `path` and describe it. Load failures are returned as errors;
    /// schema problems only show up in the counts and the report.
    pub fn process<P: AsRef<Path>>(&self, path: P) -> Result<ProcessOutput> {
        let file = load_oifits(path)?;
        Ok(self.describe(&file))
    }

    /// Describe an already loaded file.
    pub fn describe(&self, file: &OiFitsFile) -> ProcessOutput {
        let checker = check(file);
        let format = NumberFormat::from_flag(self.options.format);

        let text = if self.options.check_only {
            checker.report()
        } else {
            match self.options.mode {
                OutputMode::Xml => {
                    let report: Option<&Checker> = self.options.verbose.then_some(&checker);
                    XmlOutput::new(format, self.options.verbose).render(file, report)
                }
                OutputMode::Tsv => CsvOutput::new(format, self.options.verbose).render(file),
            }
        };

        ProcessOutput {
            text,
            nb_severe: checker.nb_severe(),
            nb_warnings: checker.nb_warnings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_reports_missing_tables() {
        let viewer = OiFitsViewer::new(ViewerOptions {
            check_only: true,
            ..Default::default()
        });
        let output = viewer.describe(&OiFitsFile::new());
        assert_eq!(output.nb_severe, 2);
        assert_eq!(output.nb_warnings, 0);
        assert!(output.text.starts_with("INFO\tAnalysing values and references\n"));
        assert!(output.text.contains("SEVERE\tNo OI_TARGET table found"));
    }

    #[test]
    fn xml_report_only_when_verbose() {
        let file = OiFitsFile::new();
        let quiet = OiFitsViewer::default().describe(&file);
        assert_eq!(quiet.text, "<oifits>\n</oifits>\n");

        let verbose = OiFitsViewer::new(ViewerOptions {
            verbose: true,
            ..Default::default()
        })
        .describe(&file);
        assert!(verbose.text.contains("<checkReport>\n"));
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = OiFitsViewer::default().process(dir.path().join("absent.fits"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
