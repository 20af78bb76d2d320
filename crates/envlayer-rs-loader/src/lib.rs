//! Layered config loading from a YAML file and environment variables.
//!
//! The pipeline is fixed: shape validation, then the optional file source
//! (best effort), then the environment source (authoritative). Environment
//! values always override file values.

mod environment;
mod error;
mod loader;
pub mod shape;
mod usage;

/// Error types returned or reported by the loader.
pub use error::{ConfigError, EnvError, FileError, ShapeError};
/// Environment lookup capability.
pub use environment::{Environment, ProcessEnvironment};
/// Loader, its options, and its report.
pub use loader::{FileOutcome, FileResolution, LEGACY_FILE_NAME, LoadReport, Loader, read};
/// Usage listing helpers.
pub use usage::{UsageEntry, render_usage, usage};

/// Re-export of the descriptor types destinations implement.
pub use envlayer_rs_schema::{FieldDescriptor, FieldKind, Settings, duration};
