//! Environment variable source.
//!
//! Environment values always win over file values. Any failure here is fatal.

use super::parse::parse_literal;
use crate::shape::field_path;
use crate::{EnvError, Environment};
use envlayer_rs_schema::{FieldDescriptor, FieldKind, variable_name};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

/// A populated destination, ready to be committed.
pub(super) struct Populated<T> {
    pub(super) decoded: T,
    pub(super) from_env: Vec<String>,
    pub(super) from_defaults: Vec<String>,
}

/// Settings for one environment pass.
pub(super) struct EnvPass<'a, E: ?Sized> {
    pub(super) environment: &'a E,
    pub(super) prefix: &'a str,
    pub(super) deny_unknown: bool,
    /// Field paths already supplied by the file.
    pub(super) supplied: &'a BTreeSet<String>,
}

impl<E: Environment + ?Sized> EnvPass<'_, E> {
    /// Populate `snapshot` from the environment and decode it as `T`.
    pub(super) fn populate<T: DeserializeOwned>(
        &self,
        fields: &[FieldDescriptor],
        mut snapshot: Map<String, Value>,
    ) -> Result<Populated<T>, EnvError> {
        let base = snapshot.clone();
        let mut walk = Walk {
            pass: self,
            known: HashSet::new(),
            keys: Vec::new(),
            assigned: Vec::new(),
            from_env: Vec::new(),
            from_defaults: Vec::new(),
        };
        walk.fields(fields, &mut snapshot, "", self.prefix)?;

        if self.deny_unknown && !self.prefix.is_empty() {
            let scope = format!("{}_", self.prefix);
            let mut variables: Vec<String> = self
                .environment
                .names()
                .into_iter()
                .filter(|name| name.starts_with(&scope) && !walk.known.contains(name))
                .collect();
            if !variables.is_empty() {
                variables.sort();
                return Err(EnvError::Unrecognized { variables });
            }
        }

        let decoded = match serde_json::from_value(Value::Object(snapshot)) {
            Ok(decoded) => decoded,
            Err(err) => return Err(rejected::<T>(&walk.assigned, &base).unwrap_or(err.into())),
        };
        Ok(Populated {
            decoded,
            from_env: walk.from_env,
            from_defaults: walk.from_defaults,
        })
    }
}

/// Where an assigned value came from.
enum Origin {
    Variable { name: String, raw: String },
    Default(String),
}

/// A parsed value written into the snapshot.
struct Assignment {
    keys: Vec<String>,
    field: String,
    kind: String,
    value: Value,
    origin: Origin,
}

/// Find the first assignment that alone makes `base` fail to decode as `T`.
///
/// Parsed literals are only checked against the kind, so a value can still
/// overflow the concrete field type (`70000` into a `u16`).
fn rejected<T: DeserializeOwned>(
    assigned: &[Assignment],
    base: &Map<String, Value>,
) -> Option<EnvError> {
    assigned.iter().find_map(|assignment| {
        let mut single = base.clone();
        assign(&mut single, &assignment.keys, assignment.value.clone());
        let reason = serde_json::from_value::<T>(Value::Object(single))
            .err()?
            .to_string();
        Some(match &assignment.origin {
            Origin::Variable { name, raw } => EnvError::Parse {
                variable: name.clone(),
                field: assignment.field.clone(),
                value: raw.clone(),
                kind: assignment.kind.clone(),
                reason,
            },
            Origin::Default(literal) => EnvError::InvalidDefault {
                field: assignment.field.clone(),
                value: literal.clone(),
                kind: assignment.kind.clone(),
                reason,
            },
        })
    })
}

fn assign(target: &mut Map<String, Value>, keys: &[String], value: Value) {
    let Some((last, parents)) = keys.split_last() else {
        return;
    };
    let mut slot = target;
    for key in parents {
        let entry = slot
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Some(map) = entry.as_object_mut() else {
            return;
        };
        slot = map;
    }
    slot.insert(last.clone(), value);
}

struct Walk<'p, 'a, E: ?Sized> {
    pass: &'p EnvPass<'a, E>,
    known: HashSet<String>,
    /// Snapshot keys of the record being walked.
    keys: Vec<String>,
    assigned: Vec<Assignment>,
    from_env: Vec<String>,
    from_defaults: Vec<String>,
}

impl<E: Environment + ?Sized> Walk<'_, '_, E> {
    fn fields(
        &mut self,
        fields: &[FieldDescriptor],
        target: &mut Map<String, Value>,
        path_prefix: &str,
        var_prefix: &str,
    ) -> Result<(), EnvError> {
        for field in fields {
            if field.ignored {
                continue;
            }
            let path = field_path(path_prefix, &field.name);
            let variable = variable_name(var_prefix, field);

            if let FieldKind::Record(children) = &field.kind {
                self.keys.push(field.name.clone());
                if let Some(Value::Object(slot)) = target.get_mut(&field.name) {
                    self.fields(children, slot, &path, &variable)?;
                } else {
                    let mut slot = Map::new();
                    self.fields(children, &mut slot, &path, &variable)?;
                    if !slot.is_empty() {
                        target.insert(field.name.clone(), Value::Object(slot));
                    }
                }
                self.keys.pop();
                continue;
            }

            self.known.insert(variable.clone());
            if let Some(raw) = self.pass.environment.var(&variable) {
                let value = parse_literal(&field.kind, &raw).map_err(|reason| EnvError::Parse {
                    variable: variable.clone(),
                    field: path.clone(),
                    value: raw.clone(),
                    kind: field.kind.to_string(),
                    reason,
                })?;
                debug!("applied environment variable (variable={variable}, field={path})");
                self.track(
                    field,
                    &path,
                    &value,
                    Origin::Variable {
                        name: variable.clone(),
                        raw,
                    },
                );
                target.insert(field.name.clone(), value);
                self.from_env.push(variable);
            } else if self.pass.supplied.contains(&path) {
                continue;
            } else if let Some(literal) = &field.default {
                let value =
                    parse_literal(&field.kind, literal).map_err(|reason| EnvError::InvalidDefault {
                        field: path.clone(),
                        value: literal.clone(),
                        kind: field.kind.to_string(),
                        reason,
                    })?;
                debug!("applied default (field={path})");
                self.track(field, &path, &value, Origin::Default(literal.clone()));
                target.insert(field.name.clone(), value);
                self.from_defaults.push(path);
            } else if field.required {
                return Err(EnvError::Missing {
                    variable,
                    field: path,
                });
            }
        }
        Ok(())
    }

    fn track(&mut self, field: &FieldDescriptor, path: &str, value: &Value, origin: Origin) {
        let mut keys = self.keys.clone();
        keys.push(field.name.clone());
        self.assigned.push(Assignment {
            keys,
            field: path.to_string(),
            kind: field.kind.to_string(),
            value: value.clone(),
            origin,
        });
    }
}
