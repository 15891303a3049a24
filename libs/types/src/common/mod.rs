//! Common identifier and validation types

pub mod errors;
pub mod identifiers;
