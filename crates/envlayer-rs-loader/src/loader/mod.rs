//! Two-source config loader.
//!
//! Validates the destination shape, decodes an optional YAML file onto it, then
//! overrides it from environment variables. File failures are downgraded to
//! diagnostics; shape and environment failures are returned.

mod env_source;
mod file_source;
mod parse;


pub use file_source::{FileOutcome, FileResolution, LEGACY_FILE_NAME};

use crate::usage::{UsageEntry, collect_usage};
use crate::{ConfigError, Environment, ProcessEnvironment, shape};
use env_source::EnvPass;
use envlayer_rs_schema::{Settings, normalize_prefix};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::Path;

/// What each source contributed to a successful load.
#[derive(Debug)]
pub struct LoadReport {
    /// Outcome of the file source.
    pub file: FileOutcome,
    /// Environment variables that were applied.
    pub from_env: Vec<String>,
    /// Field paths that fell back to their declared default.
    pub from_defaults: Vec<String>,
}

/// Options and environment for loading a destination.
#[derive(Debug, Clone)]
pub struct Loader<E = ProcessEnvironment> {
    environment: E,
    prefix: String,
    file_resolution: FileResolution,
    deny_unknown_vars: bool,
}

impl Loader<ProcessEnvironment> {
    /// Loader over the process environment with no prefix.
    pub fn new() -> Self {
        Self {
            environment: ProcessEnvironment,
            prefix: String::new(),
            file_resolution: FileResolution::default(),
            deny_unknown_vars: false,
        }
    }
}

impl Default for Loader<ProcessEnvironment> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Environment> Loader<E> {
    /// Read variables from `environment` instead.
    pub fn with_environment<F: Environment>(self, environment: F) -> Loader<F> {
        Loader {
            environment,
            prefix: self.prefix,
            file_resolution: self.file_resolution,
            deny_unknown_vars: self.deny_unknown_vars,
        }
    }

    /// Prefix every derived variable name, e.g. `app` -> `APP_PORT`.
    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.prefix = normalize_prefix(prefix.as_ref());
        self
    }

    /// Choose which file is opened when a path is requested.
    pub fn with_file_resolution(mut self, resolution: FileResolution) -> Self {
        self.file_resolution = resolution;
        self
    }

    /// Reject `PREFIX_*` variables that match no field. Needs a prefix.
    pub fn deny_unknown_vars(mut self, deny: bool) -> Self {
        self.deny_unknown_vars = deny;
        self
    }

    /// Normalized variable prefix (empty when unset).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Populate `destination` from the file at `path` and the environment.
    ///
    /// An empty `path` skips the file. The destination is only written after a
    /// source has fully decoded, so a failed source leaves it as the previous
    /// source left it.
    ///
    /// A file that cannot be used is reported only as a `warn` log record.
    /// Install a logger (see `init_logging` in `envlayer-rs`) or call
    /// [`Loader::load`] and inspect [`LoadReport::file`] to see it.
    pub fn read<T: Settings>(
        &self,
        path: impl AsRef<Path>,
        destination: &mut T,
    ) -> Result<(), ConfigError> {
        self.load(path, destination).map(|_| ())
    }

    /// Like [`Loader::read`], also reporting what each source contributed.
    ///
    /// A degraded file source is returned as [`FileOutcome::Degraded`].
    pub fn load<T: Settings>(
        &self,
        path: impl AsRef<Path>,
        destination: &mut T,
    ) -> Result<LoadReport, ConfigError> {
        let shape::Validated {
            fields,
            mut snapshot,
        } = shape::validate(&*destination, T::fields(), &self.prefix)?;

        let requested = path.as_ref();
        let file = match self.file_resolution.resolve(requested) {
            None => {
                debug!("no config file requested; using environment only");
                FileOutcome::Skipped
            }
            Some(file_path) => {
                if file_path != requested {
                    debug!(
                        "config file name is fixed (requested={}, opened={})",
                        requested.display(),
                        file_path.display()
                    );
                }
                match file_source::read_file::<T>(&file_path, &fields, &snapshot) {
                    Ok(loaded) => {
                        info!(
                            "loaded config file (path={}, fields={})",
                            file_path.display(),
                            loaded.supplied.len()
                        );
                        *destination = loaded.decoded;
                        snapshot = loaded.snapshot;
                        FileOutcome::Applied {
                            path: file_path,
                            fields: loaded.supplied,
                        }
                    }
                    Err(err) => {
                        warn!("error reading config file, continuing without it: {err}");
                        FileOutcome::Degraded(err)
                    }
                }
            }
        };

        let none = BTreeSet::new();
        let pass = EnvPass {
            environment: &self.environment,
            prefix: &self.prefix,
            deny_unknown: self.deny_unknown_vars,
            supplied: file.supplied().unwrap_or(&none),
        };
        let populated = pass.populate::<T>(&fields, snapshot)?;
        *destination = populated.decoded;

        info!(
            "config loaded (file={}, env={}, defaults={})",
            match &file {
                FileOutcome::Skipped => "skipped",
                FileOutcome::Applied { .. } => "applied",
                FileOutcome::Degraded(_) => "degraded",
            },
            populated.from_env.len(),
            populated.from_defaults.len()
        );
        Ok(LoadReport {
            file,
            from_env: populated.from_env,
            from_defaults: populated.from_defaults,
        })
    }

    /// Variables this loader would read for `T`.
    pub fn usage<T: Settings>(&self) -> Vec<UsageEntry> {
        collect_usage(&T::fields(), &self.prefix)
    }
}

/// Populate `destination` from `path` and the process environment.
///
/// File problems are logged at `warn` and otherwise dropped; use
/// [`Loader::load`] to receive them as a [`FileOutcome`].
pub fn read<T: Settings>(path: impl AsRef<Path>, destination: &mut T) -> Result<(), ConfigError> {
    Loader::new().read(path, destination)
}
