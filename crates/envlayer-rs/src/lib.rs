//! Public surface for envlayer.
//!
//! Populate a config struct from an optional YAML file and the process
//! environment, with environment variables taking precedence:
//!
//! ```no_run
//! use envlayer_rs::Settings;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Settings)]
//! #[serde(default)]
//! struct AppConfig {
//!     #[envlayer(required, env = "PORT")]
//!     port: u16,
//!     #[envlayer(default = "app")]
//!     name: String,
//! }
//!
//! let mut config = AppConfig::default();
//! envlayer_rs::read("config.yml", &mut config)?;
//! # Ok::<(), envlayer_rs::ConfigError>(())
//! ```
//!
//! The derive writes the same table a hand-written [`Settings`] impl would:
//!
//! ```
//! use envlayer_rs::{FieldDescriptor, FieldKind, Settings};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct AppConfig {
//!     port: u16,
//! }
//!
//! impl Settings for AppConfig {
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![FieldDescriptor::new("port", FieldKind::Unsigned).required().env("PORT")]
//!     }
//! }
//! ```

/// Re-export for convenience.
pub use envlayer_rs_loader as loader;
/// Re-export for convenience.
pub use envlayer_rs_schema as schema;

pub use envlayer_rs_loader::{
    ConfigError, EnvError, Environment, FileError, FileOutcome, FileResolution, LEGACY_FILE_NAME,
    LoadReport, Loader, ProcessEnvironment, ShapeError, UsageEntry, read, render_usage, usage,
};
pub use envlayer_rs_schema::{FieldDescriptor, FieldKind, Settings, duration};

/// `#[derive(Settings)]`, see the derive crate for field options.
pub use envlayer_rs_derive::Settings;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// The feature is on by default; without it this is a no-op. File-source
/// diagnostics are emitted as `warn` records, so binaries should call this
/// before loading or use [`Loader::load`] to get them as a [`FileOutcome`].
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
    log::debug!("envlayer logging initialized");
}
