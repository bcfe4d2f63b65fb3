use std::fmt;

use super::schema;
use crate::meta::{ColumnDescriptor, KeywordDescriptor, Revision};

/// The kind of an OIFITS table, selected by its EXTNAME.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableKind {
    Target,
    Array,
    Wavelength,
    Corr,
    Inspol,
    Vis,
    Vis2,
    T3,
    Spectrum,
    /// Any other extension, kept as an opaque header.
    Unknown(String),
}

impl TableKind {
    pub fn from_ext_name(ext_name: &str) -> TableKind {
        match ext_name.trim() {
            "OI_TARGET" => TableKind::Target,
            "OI_ARRAY" => TableKind::Array,
            "OI_WAVELENGTH" => TableKind::Wavelength,
            "OI_CORR" => TableKind::Corr,
            "OI_INSPOL" => TableKind::Inspol,
            "OI_VIS" => TableKind::Vis,
            "OI_VIS2" => TableKind::Vis2,
            "OI_T3" => TableKind::T3,
            "OI_SPECTRUM" => TableKind::Spectrum,
            other => TableKind::Unknown(other.to_string()),
        }
    }

    pub fn ext_name(&self) -> &str {
        match self {
            TableKind::Target => "OI_TARGET",
            TableKind::Array => "OI_ARRAY",
            TableKind::Wavelength => "OI_WAVELENGTH",
            TableKind::Corr => "OI_CORR",
            TableKind::Inspol => "OI_INSPOL",
            TableKind::Vis => "OI_VIS",
            TableKind::Vis2 => "OI_VIS2",
            TableKind::T3 => "OI_T3",
            TableKind::Spectrum => "OI_SPECTRUM",
            TableKind::Unknown(name) => name,
        }
    }

    /// Data tables carry observations and reference the other tables.
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            TableKind::Vis | TableKind::Vis2 | TableKind::T3 | TableKind::Spectrum
        )
    }

    /// Only interferometric data tables may be removed from a file.
    pub fn is_removable(&self) -> bool {
        matches!(self, TableKind::Vis | TableKind::Vis2 | TableKind::T3)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TableKind::Unknown(_))
    }

    /// Lowest OI_REVN at which this kind exists.
    pub fn min_revision(&self) -> Revision {
        match self {
            TableKind::Corr | TableKind::Inspol | TableKind::Spectrum => Revision::V2,
            _ => Revision::V1,
        }
    }

    pub fn keywords(&self) -> &'static [KeywordDescriptor] {
        schema::keywords(self)
    }

    pub fn columns(&self) -> &'static [ColumnDescriptor] {
        schema::columns(self)
    }

    pub fn keyword_descriptor(&self, name: &str) -> Option<&'static KeywordDescriptor> {
        self.keywords().iter().find(|k| k.name == name)
    }

    pub fn column_descriptor(&self, name: &str) -> Option<&'static ColumnDescriptor> {
        self.columns().iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext_name())
    }
}
