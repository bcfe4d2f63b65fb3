use std::path::PathBuf;

use thiserror::Error;

use crate::fits::FitsError;
use crate::table::TableId;

/// Fatal errors. Schema violations are never reported through this type;
/// they are collected by the [`crate::Checker`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid FITS file: {source}", .path.display())]
    Fits {
        path: PathBuf,
        #[source]
        source: FitsError,
    },

    #[error("OI_TARGET table is already defined: one and only one must be present")]
    DuplicateTarget,

    #[error("{0} is not a data table and cannot be removed")]
    NotADataTable(String),

    #[error("No table registered with id {0}")]
    UnknownTable(TableId),

    #[error("Values of column '{column}' do not fit in a 32-bit integer")]
    IntegerOverflow { column: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
