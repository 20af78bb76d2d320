//! YAML file source.
//!
//! Decodes a YAML mapping onto the destination snapshot. Every failure here is
//! non-fatal; the caller downgrades it to a diagnostic.

use crate::FileError;
use crate::shape::{field_path, json_kind};
use envlayer_rs_schema::{FieldDescriptor, FieldKind};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// File name opened by [`FileResolution::legacy`] regardless of the requested path.
pub const LEGACY_FILE_NAME: &str = "config.yml";

/// Which file the file source opens once a non-empty path was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileResolution {
    /// Open the requested path.
    #[default]
    RequestedPath,
    /// Open this path whenever any path is requested.
    FixedName(PathBuf),
}

impl FileResolution {
    /// Always open [`LEGACY_FILE_NAME`]; the requested path only gates the read.
    pub fn legacy() -> Self {
        FileResolution::FixedName(PathBuf::from(LEGACY_FILE_NAME))
    }

    /// File to open for `requested`, or `None` when no file was requested.
    pub(crate) fn resolve(&self, requested: &Path) -> Option<PathBuf> {
        if requested.as_os_str().is_empty() {
            return None;
        }
        match self {
            FileResolution::RequestedPath => Some(requested.to_path_buf()),
            FileResolution::FixedName(path) => Some(path.clone()),
        }
    }
}

/// Result of the file source, recorded in the load report.
#[derive(Debug)]
pub enum FileOutcome {
    /// No file was requested.
    Skipped,
    /// The file was decoded into the destination.
    Applied {
        /// File that was read.
        path: PathBuf,
        /// Dotted field paths the file supplied.
        fields: BTreeSet<String>,
    },
    /// The file could not be used; loading continued without it.
    Degraded(FileError),
}

impl FileOutcome {
    /// Whether the file source failed.
    pub fn is_degraded(&self) -> bool {
        matches!(self, FileOutcome::Degraded(_))
    }

    /// The diagnostic for a degraded outcome.
    pub fn diagnostic(&self) -> Option<&FileError> {
        match self {
            FileOutcome::Degraded(err) => Some(err),
            _ => None,
        }
    }

    /// Field paths the file supplied, if it was applied.
    pub fn supplied(&self) -> Option<&BTreeSet<String>> {
        match self {
            FileOutcome::Applied { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

/// A decoded file, ready to be committed to the destination.
pub(super) struct LoadedFile<T> {
    pub(super) decoded: T,
    pub(super) snapshot: Map<String, Value>,
    pub(super) supplied: BTreeSet<String>,
}

/// Read `path` and merge it over `snapshot`. Nothing is committed on error.
pub(super) fn read_file<T: DeserializeOwned>(
    path: &Path,
    fields: &[FieldDescriptor],
    snapshot: &Map<String, Value>,
) -> Result<LoadedFile<T>, FileError> {
    debug!("reading config file (path={})", path.display());
    let file = File::open(path).map_err(|source| FileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let document: serde_yaml::Value =
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| FileError::Syntax {
            path: path.to_path_buf(),
            source,
        })?;
    let decode_err = |source| FileError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let entries = match serde_json::to_value(document).map_err(decode_err)? {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        _ => {
            return Err(FileError::NotAMapping {
                path: path.to_path_buf(),
            });
        }
    };

    let mut merged = snapshot.clone();
    let mut supplied = BTreeSet::new();
    overlay(path, fields, &mut merged, entries, "", &mut supplied)?;
    let decoded = serde_json::from_value(Value::Object(merged.clone())).map_err(decode_err)?;
    Ok(LoadedFile {
        decoded,
        snapshot: merged,
        supplied,
    })
}

/// Copy file entries onto `target`, matching keys to fields case-insensitively.
///
/// Keys without a descriptor still land on a matching destination field and
/// are type-checked by the final decode. Keys matching nothing are skipped.
fn overlay(
    file: &Path,
    fields: &[FieldDescriptor],
    target: &mut Map<String, Value>,
    entries: Map<String, Value>,
    path_prefix: &str,
    supplied: &mut BTreeSet<String>,
) -> Result<(), FileError> {
    for (key, value) in entries {
        let Some(field) = fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(&key))
        else {
            let existing = target
                .keys()
                .find(|name| name.eq_ignore_ascii_case(&key))
                .cloned();
            match existing {
                Some(name) if !value.is_null() => {
                    supplied.insert(field_path(path_prefix, &name));
                    target.insert(name, value);
                }
                Some(_) => {}
                None => debug!(
                    "ignoring unknown config key (key={})",
                    field_path(path_prefix, &key)
                ),
            }
            continue;
        };
        let path = field_path(path_prefix, &field.name);

        match (&field.kind, value) {
            // An empty block (`key:`) leaves the field as it was.
            (_, Value::Null) => {}
            (FieldKind::Record(children), Value::Object(nested)) => {
                if let Some(Value::Object(slot)) = target.get_mut(&field.name) {
                    overlay(file, children, slot, nested, &path, supplied)?;
                } else {
                    let mut slot = Map::new();
                    overlay(file, children, &mut slot, nested, &path, supplied)?;
                    target.insert(field.name.clone(), Value::Object(slot));
                }
            }
            (FieldKind::Record(_), other) => {
                return Err(FileError::FieldNotAMapping {
                    path: file.to_path_buf(),
                    field: path,
                    found: json_kind(&other),
                });
            }
            (_, value) => {
                target.insert(field.name.clone(), value);
                supplied.insert(path);
            }
        }
    }
    Ok(())
}
