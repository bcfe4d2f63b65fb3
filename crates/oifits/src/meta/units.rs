use std::fmt;

/// Physical units understood by the OIFITS schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    NoUnit,
    Meter,
    Deg,
    Mjd,
    Second,
    Hz,
    PerMeter,
    Radian,
    Arcsec,
    Year,
    MeterPerSecond,
    DegPerYear,
}

impl Unit {
    /// Canonical FITS string form (TUNITn value).
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::NoUnit => "",
            Unit::Meter => "m",
            Unit::Deg => "deg",
            Unit::Mjd => "day",
            Unit::Second => "s",
            Unit::Hz => "Hz",
            Unit::PerMeter => "m-1",
            Unit::Radian => "rad",
            Unit::Arcsec => "arcsec",
            Unit::Year => "yr",
            Unit::MeterPerSecond => "m/s",
            Unit::DegPerYear => "deg/yr",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Unit::NoUnit => &[""],
            Unit::Meter => &["m", "meter", "meters"],
            Unit::Deg => &["deg", "degree", "degrees"],
            Unit::Mjd => &["day", "days", "d", "mjd"],
            Unit::Second => &["s", "sec", "second", "seconds"],
            Unit::Hz => &["hz"],
            Unit::PerMeter => &["m-1", "m^-1", "1/m"],
            Unit::Radian => &["rad", "radian", "radians"],
            Unit::Arcsec => &["arcsec"],
            Unit::Year => &["yr", "year", "years", "a"],
            Unit::MeterPerSecond => &["m/s", "m s-1", "m.s-1"],
            Unit::DegPerYear => &["deg/yr", "deg/year", "deg yr-1", "deg.yr-1"],
        }
    }

    /// Case-insensitive comparison against a unit string found in a file.
    pub fn matches(self, unit: &str) -> bool {
        let unit = unit.trim().to_ascii_lowercase();
        self.aliases().iter().any(|alias| *alias == unit)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
