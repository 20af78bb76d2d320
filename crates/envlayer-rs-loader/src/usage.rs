//! Listing of the environment variables a destination reads.

use crate::shape::field_path;
use envlayer_rs_schema::{FieldDescriptor, FieldKind, Settings, normalize_prefix, variable_name};

/// One environment variable read for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    /// Variable name.
    pub variable: String,
    /// Dotted field path.
    pub field: String,
    /// Declared kind, as text.
    pub kind: String,
    /// Default literal, if any.
    pub default: Option<String>,
    /// Whether the load fails without a value.
    pub required: bool,
    /// Help text.
    pub description: Option<String>,
}

/// Variables read for `T` under `prefix`, in declaration order.
pub fn usage<T: Settings>(prefix: &str) -> Vec<UsageEntry> {
    collect_usage(&T::fields(), &normalize_prefix(prefix))
}

pub(crate) fn collect_usage(fields: &[FieldDescriptor], prefix: &str) -> Vec<UsageEntry> {
    let mut entries = Vec::new();
    walk(fields, "", prefix, &mut entries);
    entries
}

fn walk(fields: &[FieldDescriptor], path_prefix: &str, var_prefix: &str, out: &mut Vec<UsageEntry>) {
    for field in fields.iter().filter(|field| !field.ignored) {
        let path = field_path(path_prefix, &field.name);
        let variable = variable_name(var_prefix, field);
        if let FieldKind::Record(children) = &field.kind {
            walk(children, &path, &variable, out);
            continue;
        }
        out.push(UsageEntry {
            variable,
            field: path,
            kind: field.kind.to_string(),
            default: field.default.clone(),
            required: field.required,
            description: field.description.clone(),
        });
    }
}

/// Render entries as an aligned text table.
pub fn render_usage(entries: &[UsageEntry]) -> String {
    const HEADER: [&str; 5] = ["KEY", "TYPE", "DEFAULT", "REQUIRED", "DESCRIPTION"];

    let rows: Vec<[String; 5]> = entries
        .iter()
        .map(|entry| {
            [
                entry.variable.clone(),
                entry.kind.clone(),
                entry.default.clone().unwrap_or_default(),
                if entry.required { "true" } else { "" }.to_string(),
                entry.description.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = HEADER.map(str::to_string);
    let mut out = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
