//! Environment variable naming.

use crate::FieldDescriptor;
use heck::ToShoutySnakeCase;

/// Variable name for `field` under `prefix`.
///
/// An explicit `env` override is returned verbatim. Otherwise the field name is
/// rendered SHOUTY_SNAKE_CASE and joined to the prefix with `_`. Nested records
/// use the returned name as the prefix for their children.
pub fn variable_name(prefix: &str, field: &FieldDescriptor) -> String {
    match &field.env {
        Some(name) => name.clone(),
        None => join_variable(prefix, &field.name.to_shouty_snake_case()),
    }
}

/// Normalize a user supplied prefix (`app`, `myApp`) to its variable form.
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_matches('_').to_shouty_snake_case()
}

/// Join a prefix and a segment with `_`, skipping an empty prefix.
pub fn join_variable(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}_{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_shouty_snake_case() {
        let snake = FieldDescriptor::new("max_conns", FieldKind::Integer);
        let camel = FieldDescriptor::new("maxConns", FieldKind::Integer);
        assert_eq!(variable_name("", &snake), "MAX_CONNS");
        assert_eq!(variable_name("", &camel), "MAX_CONNS");
    }

    #[test]
    fn prefixes_derived_names() {
        let field = FieldDescriptor::new("host", FieldKind::String);
        assert_eq!(variable_name("APP_DATABASE", &field), "APP_DATABASE_HOST");
    }

    #[test]
    fn override_is_verbatim() {
        let field = FieldDescriptor::new("port", FieldKind::Unsigned).env("PORT");
        assert_eq!(variable_name("APP", &field), "PORT");
    }

    #[test]
    fn normalizes_prefixes() {
        assert_eq!(normalize_prefix("myApp"), "MY_APP");
        assert_eq!(normalize_prefix("APP_"), "APP");
        assert_eq!(normalize_prefix(""), "");
    }
}
