//! Descriptor table types.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// A configuration record that can be populated by the envlayer loader.
///
/// Implementors return the descriptor table for their named fields. The table
/// is rebuilt on every load call, so it may depend on nothing but the type.
/// Every descriptor must name a serialized field; the loader rejects tables
/// that do not match the struct. `#[derive(Settings)]` from `envlayer-rs`
/// generates the table from the struct definition.
pub trait Settings: Serialize + DeserializeOwned {
    /// Describe every field of the record, in declaration order.
    fn fields() -> Vec<FieldDescriptor>;
}

/// Declared type of a field, as far as the loader needs to know it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// `true`/`false` style flags.
    Bool,
    /// Signed integers of any width.
    Integer,
    /// Unsigned integers of any width.
    Unsigned,
    /// Finite floating point numbers.
    Float,
    /// Verbatim text.
    String,
    /// `std::time::Duration` stored through [`crate::duration`].
    Duration,
    /// Comma-separated list of the inner kind.
    List(Box<FieldKind>),
    /// Comma-separated `key:value` pairs with values of the inner kind.
    Map(Box<FieldKind>),
    /// Nested record with its own descriptor table.
    Record(Vec<FieldDescriptor>),
}

impl FieldKind {
    /// Shorthand for `FieldKind::List(Box::new(inner))`.
    pub fn list(inner: FieldKind) -> Self {
        FieldKind::List(Box::new(inner))
    }

    /// Shorthand for `FieldKind::Map(Box::new(inner))`.
    pub fn map(inner: FieldKind) -> Self {
        FieldKind::Map(Box::new(inner))
    }

    /// Whether this kind is a nested record.
    pub fn is_record(&self) -> bool {
        matches!(self, FieldKind::Record(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => f.write_str("bool"),
            FieldKind::Integer => f.write_str("integer"),
            FieldKind::Unsigned => f.write_str("unsigned integer"),
            FieldKind::Float => f.write_str("float"),
            FieldKind::String => f.write_str("string"),
            FieldKind::Duration => f.write_str("duration"),
            FieldKind::List(inner) => write!(f, "list of {inner}"),
            FieldKind::Map(inner) => write!(f, "map of {inner}"),
            FieldKind::Record(_) => f.write_str("record"),
        }
    }
}

/// Metadata for a single field of a destination record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Serialized key of the field (the serde name).
    pub name: String,
    /// Declared type.
    pub kind: FieldKind,
    /// Fail the load when no source supplies a value.
    pub required: bool,
    /// Explicit environment variable name, used verbatim.
    pub env: Option<String>,
    /// Literal applied when neither the file nor the environment sets the field.
    pub default: Option<String>,
    /// Skip this field in the environment source.
    pub ignored: bool,
    /// Free-form help text shown in usage output.
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// Describe a field with the given serialized name and kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            env: None,
            default: None,
            ignored: false,
            description: None,
        }
    }

    /// Describe a nested record field.
    pub fn record(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, FieldKind::Record(fields))
    }

    /// Mark the field as mandatory.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the environment variable name.
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.env = Some(name.into());
        self
    }

    /// Set the literal applied when no source supplies a value.
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Exclude the field from environment lookup.
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Attach help text.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Child descriptors when this field is a nested record.
    pub fn children(&self) -> Option<&[FieldDescriptor]> {
        match &self.kind {
            FieldKind::Record(fields) => Some(fields),
            _ => None,
        }
    }
}
