//! Field-descriptor tables for envlayer destinations.
//!
//! A destination type describes its fields once through [`Settings::fields`];
//! both the file source and the environment source walk the same table, so
//! neither needs runtime reflection over the struct.

pub mod duration;
mod field;
mod naming;

/// Descriptor types and the `Settings` capability.
pub use field::{FieldDescriptor, FieldKind, Settings};
/// Environment variable naming helpers.
pub use naming::{join_variable, normalize_prefix, variable_name};
