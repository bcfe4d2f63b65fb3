//! Read, validate and describe OIFITS (optical interferometry FITS) files.
//!
//! ```no_run
//! let file = oifits::load_oifits("obs.fits")?;
//! let checker = oifits::check(&file);
//! print!("{}", checker.report());
//! # Ok::<(), oifits::Error>(())
//! ```

pub mod checker;
pub mod error;
pub mod file;
pub mod fits;
pub mod loader;
pub mod meta;
pub mod output;
pub mod table;
pub mod viewer;

pub use checker::{check, Checker, Diagnostic, Severity};
pub use error::{Error, Result};
pub use file::{Analysis, OiFitsFile, TargetSummary};
pub use loader::{load_from_hdus, load_hdus, load_oifits};
pub use meta::Revision;
pub use output::{CsvOutput, NumberFormat, XmlOutput};
pub use table::{ColumnData, KeywordValue, Table, TableId, TableKind};
pub use viewer::{OiFitsViewer, OutputMode, ProcessOutput, ViewerOptions};
