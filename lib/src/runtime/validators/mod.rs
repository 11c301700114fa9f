//! Per-component checks, grouped the way the SHACL recommendation groups
//! constraint components.

pub(crate) mod cardinality;
pub(crate) mod comparison;
pub(crate) mod logical;
pub(crate) mod other;
pub(crate) mod property_pair;
pub(crate) mod shape_based;
pub(crate) mod sparql;
pub(crate) mod string_based;
pub(crate) mod value_range;
pub(crate) mod value_type;
