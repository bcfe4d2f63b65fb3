//! Physical types, units and schema descriptors.

mod descriptor;
mod types;
mod units;

pub use descriptor::{
    Accepted, AcceptedValues, Cardinality, ColumnDescriptor, KeywordDescriptor, ReferenceResolver,
    Revision, Validation,
};
pub use types::DataType;
pub use units::Unit;
