//! Keyword and column descriptors: the atoms every table schema is built from.

use std::fmt;

use super::{DataType, Unit};
use crate::table::{ColumnData, KeywordValue, Table};

/// OIFITS standard revision (`OI_REVN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Revision {
    V1 = 1,
    V2 = 2,
}

impl Revision {
    pub fn from_revn(revn: i32) -> Option<Revision> {
        match revn {
            1 => Some(Revision::V1),
            2 => Some(Revision::V2),
            _ => None,
        }
    }

    pub fn number(self) -> i32 {
        self as i32
    }
}

/// Values a keyword or column is allowed to take.
///
/// The dynamic variants are resolved against the owning file every time a
/// check runs; nothing is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    Any,
    Strings(&'static [&'static str]),
    Ints(&'static [i32]),
    /// INSNAME of every registered OI_WAVELENGTH.
    InsNames,
    /// ARRNAME of every registered OI_ARRAY.
    ArrNames,
    /// CORRNAME of every registered OI_CORR.
    CorrNames,
    /// STA_INDEX values of the OI_ARRAY referenced by the table.
    StaIndexes,
    /// TARGET_ID values of the OI_TARGET table.
    TargetIds,
}

/// A concrete accepted-value set, produced by [`Accepted::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptedValues {
    Strings(Vec<String>),
    Ints(Vec<i32>),
}

impl AcceptedValues {
    pub fn contains_str(&self, value: &str) -> bool {
        match self {
            AcceptedValues::Strings(values) => values.iter().any(|v| v == value),
            AcceptedValues::Ints(_) => false,
        }
    }

    pub fn contains_int(&self, value: i32) -> bool {
        match self {
            AcceptedValues::Ints(values) => values.contains(&value),
            AcceptedValues::Strings(_) => false,
        }
    }
}

impl fmt::Display for AcceptedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = match self {
            AcceptedValues::Strings(values) => values.join("|"),
            AcceptedValues::Ints(values) => values
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join("|"),
        };
        write!(f, "[{joined}]")
    }
}

impl Accepted {
    /// Resolve the accepted set for `table`.
    ///
    /// `None` means there is nothing to check against: either any value is
    /// accepted, or the reference the set depends on is not resolvable.
    pub fn resolve(
        &self,
        resolver: &dyn ReferenceResolver,
        table: &Table,
    ) -> Option<AcceptedValues> {
        match *self {
            Accepted::Any => None,
            Accepted::Strings(values) => Some(AcceptedValues::Strings(
                values.iter().map(|v| v.to_string()).collect(),
            )),
            Accepted::Ints(values) => Some(AcceptedValues::Ints(values.to_vec())),
            Accepted::InsNames => Some(AcceptedValues::Strings(resolver.accepted_ins_names())),
            Accepted::ArrNames => Some(AcceptedValues::Strings(resolver.accepted_arr_names())),
            Accepted::CorrNames => Some(AcceptedValues::Strings(resolver.accepted_corr_names())),
            Accepted::StaIndexes => resolver.accepted_sta_indexes(table).map(AcceptedValues::Ints),
            Accepted::TargetIds => resolver.accepted_target_ids().map(AcceptedValues::Ints),
        }
    }

    /// The first statically known accepted value, used to fill new tables.
    pub fn first_string(&self) -> Option<&'static str> {
        match *self {
            Accepted::Strings(values) => values.first().copied(),
            _ => None,
        }
    }
}

/// Lookups a descriptor needs from the file that owns a table.
pub trait ReferenceResolver {
    fn accepted_ins_names(&self) -> Vec<String>;
    fn accepted_arr_names(&self) -> Vec<String>;
    fn accepted_corr_names(&self) -> Vec<String>;
    /// STA_INDEX values of the OI_ARRAY named by `table`'s ARRNAME.
    fn accepted_sta_indexes(&self, table: &Table) -> Option<Vec<i32>>;
    fn accepted_target_ids(&self) -> Option<Vec<i32>>;
    /// Number of spectral channels for `table`.
    fn nwave(&self, table: &Table) -> Option<usize>;
    /// Row count of the OI_ARRAY referenced by `table`.
    fn nstations(&self, table: &Table) -> Option<usize>;
}

/// Outcome of validating a single value against a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Ok,
    TypeMismatch,
    NotInWhitelist,
    BlankString,
}

/// Schema entry for a header keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub data_type: DataType,
    pub unit: Unit,
    pub accepted: Accepted,
    /// Optional keywords are never required, whatever the revision.
    pub optional: bool,
    /// First revision at which a non-optional entry becomes mandatory.
    pub revision: Revision,
    /// Identifiers (ARRNAME, INSNAME, CORRNAME) must not be blank.
    pub identifier: bool,
}

impl KeywordDescriptor {
    pub const fn new(name: &'static str, description: &'static str, data_type: DataType) -> Self {
        KeywordDescriptor {
            name,
            description,
            data_type,
            unit: Unit::NoUnit,
            accepted: Accepted::Any,
            optional: false,
            revision: Revision::V1,
            identifier: false,
        }
    }

    pub const fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub const fn accepted(mut self, accepted: Accepted) -> Self {
        self.accepted = accepted;
        self
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub const fn since(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    pub const fn identifier(mut self) -> Self {
        self.identifier = true;
        self
    }

    pub fn is_required(&self, revision: Revision) -> bool {
        !self.optional && revision >= self.revision
    }

    /// Validate a keyword value. Integers are accepted where floats are
    /// declared, as FITS writers often drop the decimal point.
    pub fn validate(
        &self,
        value: &KeywordValue,
        resolver: &dyn ReferenceResolver,
        table: &Table,
    ) -> Validation {
        let found = value.data_type();
        let compatible = found == self.data_type
            || (found == DataType::Int
                && matches!(self.data_type, DataType::Real | DataType::Double));
        if !compatible {
            return Validation::TypeMismatch;
        }

        if let KeywordValue::Char(s) = value {
            if self.identifier && s.trim().is_empty() {
                return Validation::BlankString;
            }
        }

        match self.accepted.resolve(resolver, table) {
            Some(accepted) => {
                let ok = match value {
                    KeywordValue::Char(s) => accepted.contains_str(s.trim()),
                    KeywordValue::Int(n) => accepted.contains_int(*n),
                    _ => true,
                };
                if ok {
                    Validation::Ok
                } else {
                    Validation::NotInWhitelist
                }
            }
            None => Validation::Ok,
        }
    }
}

/// Array length of a column cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Known statically (string width for CHAR columns).
    Fixed(usize),
    /// Row count of the referenced OI_WAVELENGTH.
    NWave,
    NWaveSquared,
    /// Row count of the referenced OI_ARRAY.
    NStations,
}

impl Cardinality {
    /// Resolve against explicit dimensions.
    pub fn resolve_with(self, nwave: Option<usize>, nstations: Option<usize>) -> Option<usize> {
        match self {
            Cardinality::Fixed(n) => Some(n),
            Cardinality::NWave => nwave,
            Cardinality::NWaveSquared => nwave.map(|n| n * n),
            Cardinality::NStations => nstations,
        }
    }

    /// Name of the dimension a dynamic cardinality depends on.
    pub fn dimension_name(self) -> &'static str {
        match self {
            Cardinality::Fixed(_) => "repeat",
            Cardinality::NWave | Cardinality::NWaveSquared => "NWAVE",
            Cardinality::NStations => "NSTATIONS",
        }
    }
}

/// Schema entry for a binary table column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDescriptor {
    pub meta: KeywordDescriptor,
    pub repeat: Cardinality,
}

impl ColumnDescriptor {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        data_type: DataType,
        repeat: Cardinality,
    ) -> Self {
        ColumnDescriptor {
            meta: KeywordDescriptor::new(name, description, data_type),
            repeat,
        }
    }

    pub const fn unit(mut self, unit: Unit) -> Self {
        self.meta.unit = unit;
        self
    }

    pub const fn accepted(mut self, accepted: Accepted) -> Self {
        self.meta.accepted = accepted;
        self
    }

    pub const fn optional(mut self) -> Self {
        self.meta.optional = true;
        self
    }

    pub const fn since(mut self, revision: Revision) -> Self {
        self.meta.revision = revision;
        self
    }

    pub fn name(&self) -> &'static str {
        self.meta.name
    }

    pub fn data_type(&self) -> DataType {
        self.meta.data_type
    }

    /// CHAR columns store one string per row; their repeat is a width.
    pub fn is_array(&self) -> bool {
        match self.repeat {
            Cardinality::Fixed(n) => n > 1 && self.meta.data_type != DataType::Char,
            _ => true,
        }
    }

    /// Resolve the expected cell width against the owning file.
    pub fn resolve_repeat(&self, resolver: &dyn ReferenceResolver, table: &Table) -> Option<usize> {
        match self.repeat {
            Cardinality::Fixed(n) => Some(n),
            Cardinality::NWave | Cardinality::NWaveSquared => self
                .repeat
                .resolve_with(resolver.nwave(table), None),
            Cardinality::NStations => self.repeat.resolve_with(None, resolver.nstations(table)),
        }
    }

    /// Distinct cell values outside the accepted set, in first-seen order.
    ///
    /// Returns an empty list when no accepted set applies.
    pub fn invalid_values(
        &self,
        data: &ColumnData,
        resolver: &dyn ReferenceResolver,
        table: &Table,
    ) -> Vec<String> {
        let Some(accepted) = self.meta.accepted.resolve(resolver, table) else {
            return Vec::new();
        };

        let mut invalid: Vec<String> = Vec::new();
        let mut push = |value: String| {
            if !invalid.contains(&value) {
                invalid.push(value);
            }
        };
        match data {
            ColumnData::Char(values) => values
                .iter()
                .filter(|v| !accepted.contains_str(v.trim()))
                .for_each(|v| push(v.trim().to_string())),
            ColumnData::Int(values) => values
                .iter()
                .filter(|v| !accepted.contains_int(**v))
                .for_each(|v| push(v.to_string())),
            _ => {}
        }
        invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableKind;
    use ndarray::{arr1, arr2};

    struct Fixture;

    impl ReferenceResolver for Fixture {
        fn accepted_ins_names(&self) -> Vec<String> {
            vec!["GRAVITY".into()]
        }
        fn accepted_arr_names(&self) -> Vec<String> {
            vec!["VLTI".into()]
        }
        fn accepted_corr_names(&self) -> Vec<String> {
            Vec::new()
        }
        fn accepted_sta_indexes(&self, _table: &Table) -> Option<Vec<i32>> {
            Some(vec![1, 2, 3, 4])
        }
        fn accepted_target_ids(&self) -> Option<Vec<i32>> {
            None
        }
        fn nwave(&self, _table: &Table) -> Option<usize> {
            Some(3)
        }
        fn nstations(&self, _table: &Table) -> Option<usize> {
            Some(4)
        }
    }

    const FRAME: KeywordDescriptor =
        KeywordDescriptor::new("FRAME", "coordinate frame", DataType::Char)
            .accepted(Accepted::Strings(&["GEOCENTRIC", "SKY"]));

    #[test]
    fn required_by_revision() {
        let arrname =
            KeywordDescriptor::new("ARRNAME", "array name", DataType::Char).since(Revision::V2);
        assert!(!arrname.is_required(Revision::V1));
        assert!(arrname.is_required(Revision::V2));
        assert!(!arrname.optional().is_required(Revision::V2));
    }

    #[test]
    fn keyword_validation_outcomes() {
        let table = Table::new(TableKind::Array);
        let frame = |v: KeywordValue| FRAME.validate(&v, &Fixture, &table);
        assert_eq!(frame(KeywordValue::Char("SKY".into())), Validation::Ok);
        assert_eq!(frame(KeywordValue::Char("LOCAL".into())), Validation::NotInWhitelist);
        assert_eq!(frame(KeywordValue::Int(1)), Validation::TypeMismatch);

        let arrname = KeywordDescriptor::new("ARRNAME", "array name", DataType::Char).identifier();
        assert_eq!(
            arrname.validate(&KeywordValue::Char("  ".into()), &Fixture, &table),
            Validation::BlankString
        );

        let arrayx = KeywordDescriptor::new("ARRAYX", "x", DataType::Double);
        assert_eq!(arrayx.validate(&KeywordValue::Int(0), &Fixture, &table), Validation::Ok);
    }

    #[test]
    fn dynamic_whitelist_follows_resolver() {
        let table = Table::new(TableKind::Inspol);
        let insname = KeywordDescriptor::new("INSNAME", "instrument", DataType::Char)
            .accepted(Accepted::InsNames);
        assert_eq!(
            insname.validate(&KeywordValue::Char("GRAVITY".into()), &Fixture, &table),
            Validation::Ok
        );
        assert_eq!(
            insname.validate(&KeywordValue::Char("PIONIER".into()), &Fixture, &table),
            Validation::NotInWhitelist
        );
    }

    #[test]
    fn column_array_flags_and_repeat() {
        let target =
            ColumnDescriptor::new("TARGET", "name", DataType::Char, Cardinality::Fixed(16));
        assert!(!target.is_array());
        let staxyz =
            ColumnDescriptor::new("STAXYZ", "xyz", DataType::Double, Cardinality::Fixed(3));
        assert!(staxyz.is_array());
        let refmap = ColumnDescriptor::new(
            "VISREFMAP",
            "map",
            DataType::Logical,
            Cardinality::NWaveSquared,
        );
        let table = Table::new(TableKind::Vis);
        assert_eq!(refmap.resolve_repeat(&Fixture, &table), Some(9));
        assert_eq!(Cardinality::NStations.resolve_with(None, None), None);
    }

    #[test]
    fn invalid_cells_are_distinct() {
        let table = Table::new(TableKind::Vis2);
        let sta =
            ColumnDescriptor::new("STA_INDEX", "stations", DataType::Int, Cardinality::Fixed(2))
                .accepted(Accepted::StaIndexes);
        let data = ColumnData::Int(arr2(&[[1, 7], [7, 9]]).into_dyn());
        assert_eq!(sta.invalid_values(&data, &Fixture, &table), vec!["7", "9"]);

        let target_id =
            ColumnDescriptor::new("TARGET_ID", "id", DataType::Int, Cardinality::Fixed(1))
                .accepted(Accepted::TargetIds);
        let ids = ColumnData::Int(arr1(&[5]).into_dyn());
        assert!(target_id.invalid_values(&ids, &Fixture, &table).is_empty());
    }

    #[test]
    fn accepted_values_display() {
        assert_eq!(AcceptedValues::Ints(vec![1, 2]).to_string(), "[1|2]");
        assert_eq!(
            AcceptedValues::Strings(vec!["C".into(), "U".into()]).to_string(),
            "[C|U]"
        );
    }
}
