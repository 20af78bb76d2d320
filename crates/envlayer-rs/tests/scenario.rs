//! End-to-end loading through the public surface.

use envlayer_rs::{
    ConfigError, EnvError, FieldDescriptor, FieldKind, FileOutcome, Loader, Settings, ShapeError,
};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct AppConfig {
    port: i64,
    name: String,
}

impl Settings for AppConfig {
    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("port", FieldKind::Integer)
                .required()
                .env("PORT"),
            FieldDescriptor::new("name", FieldKind::String)
                .env("NAME")
                .default_value("app"),
        ]
    }
}

fn environment(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Environment alone satisfies the config when no file is given.
#[test]
fn port_from_environment_with_default_name() {
    let mut config = AppConfig::default();
    Loader::new()
        .with_environment(environment(&[("PORT", "8080")]))
        .read("", &mut config)
        .expect("load");

    assert_eq!(
        config,
        AppConfig {
            port: 8080,
            name: "app".to_string(),
        }
    );
}

/// A required field with no source fails the load.
#[test]
fn missing_port_fails() {
    let mut config = AppConfig::default();
    let err = Loader::new()
        .with_environment(environment(&[]))
        .read("", &mut config)
        .unwrap_err();

    assert!(matches!(err, ConfigError::Env(EnvError::Missing { .. })));
    assert!(err.to_string().contains("PORT"));
}

/// Environment wins over the file for the same field.
#[test]
fn environment_name_beats_file_name() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("config.yml");
    fs::write(&path, "name: fromfile\n").expect("write");

    let mut config = AppConfig::default();
    let report = Loader::new()
        .with_environment(environment(&[("PORT", "1"), ("NAME", "fromenv")]))
        .load(&path, &mut config)
        .expect("load");

    assert_eq!(config.name, "fromenv");
    assert!(matches!(report.file, FileOutcome::Applied { .. }));
}

/// A broken file never blocks an environment-complete config.
#[test]
fn broken_file_is_not_fatal() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("config.yml");
    fs::write(&path, "name: [unclosed\n").expect("write");

    let mut config = AppConfig::default();
    let report = Loader::new()
        .with_environment(environment(&[("PORT", "2")]))
        .load(&path, &mut config)
        .expect("load");

    assert!(report.file.is_degraded());
    assert_eq!(config.port, 2);
    assert_eq!(config.name, "app");
}

/// Literals round-trip into their declared types.
#[test]
fn literal_round_trip() {
    let mut config = AppConfig::default();
    Loader::new()
        .with_environment(environment(&[("PORT", "-17"), ("NAME", "with spaces ")]))
        .read("", &mut config)
        .expect("load");

    assert_eq!(config.port, -17);
    assert_eq!(config.name, "with spaces ");
}

/// The process-environment entry point reports unset required variables.
#[test]
fn read_uses_process_environment() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Unset {
        value: String,
    }

    impl Settings for Unset {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::new("value", FieldKind::String)
                    .required()
                    .env("ENVLAYER_TEST_NEVER_SET_7F3A"),
            ]
        }
    }

    let err = envlayer_rs::read("", &mut Unset::default()).unwrap_err();
    assert!(err.to_string().contains("ENVLAYER_TEST_NEVER_SET_7F3A"));
}

/// Non-record destinations are rejected through the entry point.
#[test]
fn read_rejects_sequences() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    struct Ports(Vec<u16>);

    impl Settings for Ports {
        fn fields() -> Vec<FieldDescriptor> {
            Vec::new()
        }
    }

    let err = envlayer_rs::read("config.yml", &mut Ports::default()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Shape(ShapeError::NotARecord { found: "a sequence" })
    ));
}

/// The usage table names every variable the config reads.
#[test]
fn usage_table_lists_variables() {
    let table = envlayer_rs::render_usage(&envlayer_rs::usage::<AppConfig>(""));
    let lines: Vec<_> = table.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("KEY"));
    assert!(lines[1].starts_with("PORT"));
    assert!(lines[2].starts_with("NAME"));
    assert!(lines[2].contains("app"));
}

/// A file problem reaches callers without a logger through the report.
#[test]
fn file_diagnostic_reaches_caller() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("absent.yml");

    let mut config = AppConfig::default();
    let report = Loader::new()
        .with_environment(environment(&[("PORT", "1")]))
        .load(&path, &mut config)
        .expect("load");

    let diagnostic = report.file.diagnostic().expect("degraded");
    assert!(diagnostic.to_string().contains("absent.yml"));
    assert_eq!(config.port, 1);
}

/// Default features install a logger, so `warn` diagnostics are printed.
#[cfg(feature = "logging")]
#[test]
fn logging_is_enabled_by_default() {
    envlayer_rs::init_logging();
    assert_ne!(log::max_level(), log::LevelFilter::Off);
}
