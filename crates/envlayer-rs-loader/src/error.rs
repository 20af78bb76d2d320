//! Error types for shape validation, file decoding, and environment loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that escape the loader entry points.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The destination is not a record, or its descriptor table is malformed.
    #[error("invalid config destination: {0}")]
    Shape(#[from] ShapeError),
    /// The environment could not populate the destination.
    #[error("failed to read environment variables: {0}")]
    Env(#[from] EnvError),
}

/// Programmer errors detected before any I/O.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// The destination does not serialize as a struct with named fields.
    #[error("config should be a struct with named fields, found {found}")]
    NotARecord { found: &'static str },
    /// A nested record field holds something other than a record.
    #[error("field {path} is described as a record but holds {found}")]
    NestedNotARecord { path: String, found: &'static str },
    /// Two descriptors share a name (compared case-insensitively).
    #[error("field {path} is described more than once")]
    DuplicateField { path: String },
    /// Two fields resolve to the same environment variable.
    #[error("fields {first} and {second} both map to {variable}")]
    DuplicateVariable {
        variable: String,
        first: String,
        second: String,
    },
    /// A descriptor names a field the destination does not serialize.
    #[error("field {path} is described but the config has no such field")]
    UnknownField { path: String },
    /// A float field holds NaN or an infinity, which cannot be carried through a load.
    #[error("field {path} holds a non-finite float")]
    NonFiniteFloat { path: String },
    /// The destination could not be snapshotted.
    #[error("failed to snapshot config: {0}")]
    Snapshot(#[from] serde_json::Error),
    /// The snapshot does not decode back into the destination type.
    #[error("config does not decode from its own snapshot: {0}")]
    RoundTrip(#[source] serde_json::Error),
}

/// Non-fatal failures of the file source. Reported, never returned.
#[derive(Debug, Error)]
pub enum FileError {
    /// Opening the file failed.
    #[error("failed to open config file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid YAML.
    #[error("failed to parse config file {path}: {source}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// The document is valid YAML but not a mapping at the top level.
    #[error("config file {path} must contain a mapping at the top level")]
    NotAMapping { path: PathBuf },
    /// A nested record key holds a scalar or sequence.
    #[error("config file {path}: field {field} must be a mapping, found {found}")]
    FieldNotAMapping {
        path: PathBuf,
        field: String,
        found: &'static str,
    },
    /// A value in the file does not fit the destination.
    #[error("failed to decode config file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fatal failures of the environment source.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A required field has no value from any source.
    #[error("required key {variable} missing value (field {field})")]
    Missing { variable: String, field: String },
    /// A variable is present but does not parse as the field's kind, or its
    /// value is out of range for the field's concrete type.
    #[error("assigning {variable} to {field}: converting {value:?} to {kind}: {reason}")]
    Parse {
        variable: String,
        field: String,
        value: String,
        kind: String,
        reason: String,
    },
    /// A declared default literal does not parse as the field's kind.
    #[error("default {value:?} for field {field} is not a valid {kind}: {reason}")]
    InvalidDefault {
        field: String,
        value: String,
        kind: String,
        reason: String,
    },
    /// Prefixed variables that match no field while strict mode is on.
    #[error("unknown environment variables: {}", .variables.join(", "))]
    Unrecognized { variables: Vec<String> },
    /// The populated snapshot does not fit the destination type.
    #[error("failed to decode populated config: {0}")]
    Decode(#[from] serde_json::Error),
}
