//! Keyword and column schemas of every OIFITS table kind.

use super::TableKind;
use crate::meta::DataType::{Char, Complex, Double, Int, Logical, Real};
use crate::meta::{
    Accepted, Cardinality::*, ColumnDescriptor as Col, KeywordDescriptor as Kw, Revision::V2,
    Unit,
};

const OI_REVN: Kw = Kw::new("OI_REVN", "revision number of the table definition", Int)
    .accepted(Accepted::Ints(&[1, 2]));
const OI_REVN_2: Kw = Kw::new("OI_REVN", "revision number of the table definition", Int)
    .accepted(Accepted::Ints(&[2]));

const ARRNAME: Kw = Kw::new("ARRNAME", "array name for cross-referencing", Char).identifier();
const INSNAME: Kw =
    Kw::new("INSNAME", "name of detector for cross-referencing", Char).identifier();
const CORRNAME: Kw = Kw::new("CORRNAME", "name of correlation data set", Char).identifier();
const DATE_OBS: Kw = Kw::new("DATE-OBS", "UTC start date of observations", Char);
const FOVTYPE_VALUES: Accepted = Accepted::Strings(&["FWHM", "RADIUS"]);

const TARGET_ID: Col = Col::new(
    "TARGET_ID",
    "target number as index into OI_TARGET table",
    Int,
    Fixed(1),
)
.accepted(Accepted::TargetIds);
const TIME: Col = Col::new("TIME", "UTC time of observation", Double, Fixed(1)).unit(Unit::Second);
const MJD: Col = Col::new("MJD", "modified Julian Day", Double, Fixed(1)).unit(Unit::Mjd);
const INT_TIME: Col = Col::new("INT_TIME", "integration time", Double, Fixed(1)).unit(Unit::Second);
const UCOORD: Col =
    Col::new("UCOORD", "U coordinate of the data", Double, Fixed(1)).unit(Unit::Meter);
const VCOORD: Col =
    Col::new("VCOORD", "V coordinate of the data", Double, Fixed(1)).unit(Unit::Meter);
const FLAG: Col = Col::new("FLAG", "flag", Logical, NWave);

static TARGET_KEYWORDS: &[Kw] = &[OI_REVN];

static TARGET_COLUMNS: &[Col] = &[
    Col::new("TARGET_ID", "index number", Int, Fixed(1)),
    Col::new("TARGET", "target name", Char, Fixed(16)),
    Col::new("RAEP0", "RA at mean equinox", Double, Fixed(1)).unit(Unit::Deg),
    Col::new("DECEP0", "DEC at mean equinox", Double, Fixed(1)).unit(Unit::Deg),
    Col::new("EQUINOX", "equinox", Real, Fixed(1)).unit(Unit::Year),
    Col::new("RA_ERR", "error in RA at mean equinox", Double, Fixed(1)).unit(Unit::Deg),
    Col::new("DEC_ERR", "error in DEC at mean equinox", Double, Fixed(1)).unit(Unit::Deg),
    Col::new("SYSVEL", "systemic radial velocity", Double, Fixed(1)).unit(Unit::MeterPerSecond),
    Col::new("VELTYP", "reference for radial velocity", Char, Fixed(8))
        .accepted(Accepted::Strings(&[
            "LSR", "HELIOCEN", "BARYCENT", "GEOCENTR", "TOPOCENT", "UNKNOWN",
        ])),
    Col::new("VELDEF", "definition of radial velocity", Char, Fixed(8))
        .accepted(Accepted::Strings(&["RADIO", "OPTICAL"])),
    Col::new("PMRA", "proper motion in RA", Double, Fixed(1)).unit(Unit::DegPerYear),
    Col::new("PMDEC", "proper motion in DEC", Double, Fixed(1)).unit(Unit::DegPerYear),
    Col::new("PMRA_ERR", "error of proper motion in RA", Double, Fixed(1)).unit(Unit::DegPerYear),
    Col::new("PMDEC_ERR", "error of proper motion in DEC", Double, Fixed(1)).unit(Unit::DegPerYear),
    Col::new("PARALLAX", "parallax", Real, Fixed(1)).unit(Unit::Deg),
    Col::new("PARA_ERR", "error in parallax", Real, Fixed(1)).unit(Unit::Deg),
    Col::new("SPECTYP", "spectral type", Char, Fixed(16)),
    Col::new("CATEGORY", "CAL or SCI", Char, Fixed(3))
        .accepted(Accepted::Strings(&["SCI", "CAL"]))
        .since(V2)
        .optional(),
];

static ARRAY_KEYWORDS: &[Kw] = &[
    OI_REVN,
    ARRNAME,
    Kw::new("FRAME", "coordinate frame", Char).accepted(Accepted::Strings(&["GEOCENTRIC", "SKY"])),
    Kw::new("ARRAYX", "array center x coordinate", Double).unit(Unit::Meter),
    Kw::new("ARRAYY", "array center y coordinate", Double).unit(Unit::Meter),
    Kw::new("ARRAYZ", "array center z coordinate", Double).unit(Unit::Meter),
];

static ARRAY_COLUMNS: &[Col] = &[
    Col::new("TEL_NAME", "telescope name", Char, Fixed(16)),
    Col::new("STA_NAME", "station name", Char, Fixed(16)),
    Col::new("STA_INDEX", "station number", Int, Fixed(1)),
    Col::new("DIAMETER", "element diameter", Real, Fixed(1)).unit(Unit::Meter),
    Col::new("STAXYZ", "station coordinates relative to array center", Double, Fixed(3))
        .unit(Unit::Meter),
    Col::new("FOV", "photometric field of view", Double, Fixed(1))
        .unit(Unit::Arcsec)
        .since(V2),
    Col::new("FOVTYPE", "model for FOV", Char, Fixed(6))
        .accepted(FOVTYPE_VALUES)
        .since(V2),
];

static WAVELENGTH_KEYWORDS: &[Kw] = &[OI_REVN, INSNAME];

static WAVELENGTH_COLUMNS: &[Col] = &[
    Col::new("EFF_WAVE", "effective wavelength of channel", Real, Fixed(1)).unit(Unit::Meter),
    Col::new("EFF_BAND", "effective bandpass of channel", Real, Fixed(1)).unit(Unit::Meter),
];

static CORR_KEYWORDS: &[Kw] = &[
    OI_REVN_2,
    CORRNAME,
    Kw::new("NDATA", "number of correlated data", Int),
];

static CORR_COLUMNS: &[Col] = &[
    Col::new("IINDX", "first index of correlation matrix element", Int, Fixed(1)),
    Col::new("JINDX", "second index of correlation matrix element", Int, Fixed(1)),
    Col::new("CORR", "matrix element", Double, Fixed(1)),
];

static INSPOL_KEYWORDS: &[Kw] = &[
    OI_REVN_2,
    Kw::new("DATE-OBS", "UTC start date of observations", Char).optional(),
    Kw::new("NPOL", "number of polarization types", Int),
    ARRNAME,
    Kw::new("ORIENT", "orientation of the Jones matrix", Char)
        .accepted(Accepted::Strings(&["NORTH", "LABORATORY"])),
    Kw::new("MODEL", "method used to determine the Jones matrix", Char),
];

static INSPOL_COLUMNS: &[Col] = &[
    TARGET_ID,
    Col::new("INSNAME", "INSNAME of this polarization", Char, Fixed(70))
        .accepted(Accepted::InsNames),
    Col::new("MJD_OBS", "modified Julian day, start of time lapse", Double, Fixed(1))
        .unit(Unit::Mjd),
    Col::new("MJD_END", "modified Julian day, end of time lapse", Double, Fixed(1)).unit(Unit::Mjd),
    Col::new("JXX", "complex Jones matrix component along X axis", Complex, NWave),
    Col::new("JYY", "complex Jones matrix component along Y axis", Complex, NWave),
    Col::new("JXY", "complex Jones matrix component between X and Y axis", Complex, NWave),
    Col::new("JYX", "complex Jones matrix component between Y and X axis", Complex, NWave),
    Col::new("STA_INDEX", "station number for the above matrices", Int, Fixed(1))
        .accepted(Accepted::StaIndexes),
];

static VIS_KEYWORDS: &[Kw] = &[
    OI_REVN,
    DATE_OBS,
    ARRNAME.since(V2),
    INSNAME,
    CORRNAME.since(V2).optional(),
    Kw::new("AMPTYP", "type for amplitude measurement", Char)
        .accepted(Accepted::Strings(&["absolute", "differential", "correlated flux"]))
        .since(V2)
        .optional(),
    Kw::new("PHITYP", "type for phase measurement", Char)
        .accepted(Accepted::Strings(&["absolute", "differential"]))
        .since(V2)
        .optional(),
    Kw::new("AMPORDER", "polynomial fit order for differential amplitudes", Int)
        .since(V2)
        .optional(),
    Kw::new("PHIORDER", "polynomial fit order for differential phases", Int)
        .since(V2)
        .optional(),
];

static VIS_COLUMNS: &[Col] = &[
    TARGET_ID,
    TIME,
    MJD,
    INT_TIME,
    Col::new("VISAMP", "visibility amplitude", Double, NWave),
    Col::new("VISAMPERR", "error in visibility amplitude", Double, NWave),
    Col::new(
        "CORRINDX_VISAMP",
        "index into correlation matrix for 1st VISAMP element",
        Int,
        Fixed(1),
    )
    .since(V2)
    .optional(),
    Col::new("VISPHI", "visibility phase", Double, NWave).unit(Unit::Deg),
    Col::new("VISPHIERR", "error in visibility phase", Double, NWave).unit(Unit::Deg),
    Col::new(
        "CORRINDX_VISPHI",
        "index into correlation matrix for 1st VISPHI element",
        Int,
        Fixed(1),
    )
    .since(V2)
    .optional(),
    Col::new(
        "VISREFMAP",
        "matrix indicating which channels were used as reference",
        Logical,
        NWaveSquared,
    )
    .since(V2)
    .optional(),
    Col::new("RVIS", "complex coherent flux (real part)", Double, NWave)
        .since(V2)
        .optional(),
    Col::new("RVISERR", "error on RVIS", Double, NWave).since(V2).optional(),
    Col::new("IVIS", "complex coherent flux (imaginary part)", Double, NWave)
        .since(V2)
        .optional(),
    Col::new("IVISERR", "error on IVIS", Double, NWave).since(V2).optional(),
    UCOORD,
    VCOORD,
    Col::new("STA_INDEX", "station numbers contributing to the data", Int, Fixed(2))
        .accepted(Accepted::StaIndexes),
    FLAG,
];

static VIS2_KEYWORDS: &[Kw] = &[
    OI_REVN,
    DATE_OBS,
    ARRNAME.since(V2),
    INSNAME,
    CORRNAME.since(V2).optional(),
];

static VIS2_COLUMNS: &[Col] = &[
    TARGET_ID,
    TIME,
    MJD,
    INT_TIME,
    Col::new("VIS2DATA", "squared visibility", Double, NWave),
    Col::new("VIS2ERR", "error in squared visibility", Double, NWave),
    Col::new(
        "CORRINDX_VIS2DATA",
        "index into correlation matrix for 1st VIS2DATA element",
        Int,
        Fixed(1),
    )
    .since(V2)
    .optional(),
    UCOORD,
    VCOORD,
    Col::new("STA_INDEX", "station numbers contributing to the data", Int, Fixed(2))
        .accepted(Accepted::StaIndexes),
    FLAG,
];

static T3_COLUMNS: &[Col] = &[
    TARGET_ID,
    TIME,
    MJD,
    INT_TIME,
    Col::new("T3AMP", "triple product amplitude", Double, NWave),
    Col::new("T3AMPERR", "error in triple product amplitude", Double, NWave),
    Col::new("CORRINDX_T3AMP", "index into correlation matrix for 1st T3AMP element", Int, Fixed(1))
        .since(V2)
        .optional(),
    Col::new("T3PHI", "triple product phase", Double, NWave).unit(Unit::Deg),
    Col::new("T3PHIERR", "error in triple product phase", Double, NWave).unit(Unit::Deg),
    Col::new("CORRINDX_T3PHI", "index into correlation matrix for 1st T3PHI element", Int, Fixed(1))
        .since(V2)
        .optional(),
    Col::new("U1COORD", "U coordinate of baseline AB of the triangle", Double, Fixed(1))
        .unit(Unit::Meter),
    Col::new("V1COORD", "V coordinate of baseline AB of the triangle", Double, Fixed(1))
        .unit(Unit::Meter),
    Col::new("U2COORD", "U coordinate of baseline BC of the triangle", Double, Fixed(1))
        .unit(Unit::Meter),
    Col::new("V2COORD", "V coordinate of baseline BC of the triangle", Double, Fixed(1))
        .unit(Unit::Meter),
    Col::new("STA_INDEX", "station numbers contributing to the data", Int, Fixed(3))
        .accepted(Accepted::StaIndexes),
    FLAG,
];

static SPECTRUM_KEYWORDS: &[Kw] = &[
    OI_REVN_2,
    DATE_OBS,
    ARRNAME.since(V2),
    INSNAME,
    CORRNAME.since(V2).optional(),
    Kw::new("FOV", "area on sky over which flux is integrated", Double)
        .unit(Unit::Arcsec)
        .optional(),
    Kw::new("FOVTYPE", "model for FOV", Char)
        .accepted(FOVTYPE_VALUES)
        .optional(),
    Kw::new("CALSTAT", "calibration status", Char).accepted(Accepted::Strings(&["C", "U"])),
];

static SPECTRUM_COLUMNS: &[Col] = &[
    TARGET_ID,
    MJD,
    INT_TIME,
    Col::new("FLUXDATA", "flux", Double, NWave),
    Col::new("FLUXERR", "flux error", Double, NWave),
    Col::new("STA_INDEX", "station number contributing to the data", Int, Fixed(1))
        .accepted(Accepted::StaIndexes)
        .optional(),
    FLAG,
];

/// Keyword schema of `kind`, in the order keywords are written.
pub fn keywords(kind: &TableKind) -> &'static [Kw] {
    match kind {
        TableKind::Target => TARGET_KEYWORDS,
        TableKind::Array => ARRAY_KEYWORDS,
        TableKind::Wavelength => WAVELENGTH_KEYWORDS,
        TableKind::Corr => CORR_KEYWORDS,
        TableKind::Inspol => INSPOL_KEYWORDS,
        TableKind::Vis => VIS_KEYWORDS,
        TableKind::Vis2 | TableKind::T3 => VIS2_KEYWORDS,
        TableKind::Spectrum => SPECTRUM_KEYWORDS,
        TableKind::Unknown(_) => &[],
    }
}

/// Column schema of `kind`, in the order columns are written.
pub fn columns(kind: &TableKind) -> &'static [Col] {
    match kind {
        TableKind::Target => TARGET_COLUMNS,
        TableKind::Array => ARRAY_COLUMNS,
        TableKind::Wavelength => WAVELENGTH_COLUMNS,
        TableKind::Corr => CORR_COLUMNS,
        TableKind::Inspol => INSPOL_COLUMNS,
        TableKind::Vis => VIS_COLUMNS,
        TableKind::Vis2 => VIS2_COLUMNS,
        TableKind::T3 => T3_COLUMNS,
        TableKind::Spectrum => SPECTRUM_COLUMNS,
        TableKind::Unknown(_) => &[],
    }
}
