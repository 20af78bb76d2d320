//! Descriptor tables generated by `#[derive(Settings)]`.

use envlayer_rs::{ConfigError, EnvError, FieldDescriptor, FieldKind, Loader, Settings};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Settings)]
#[serde(default)]
struct ServerConfig {
    /// Listen port.
    #[envlayer(required, env = "PORT")]
    port: u16,
    #[envlayer(default = "server")]
    name: String,
    offset: i32,
    ratio: f64,
    verbose: bool,
    #[serde(with = "envlayer_rs::duration")]
    #[envlayer(default = "5s", describe = "request timeout")]
    timeout: Duration,
    tags: Vec<String>,
    weights: BTreeMap<String, f64>,
    nickname: Option<String>,
    #[envlayer(ignored)]
    token: String,
    #[serde(skip)]
    cache: Vec<u8>,
    store: StoreConfig,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Settings)]
#[serde(default, rename_all = "camelCase")]
struct StoreConfig {
    #[envlayer(default = 4)]
    max_conns: u32,
    #[serde(rename = "url")]
    #[envlayer(kind = "string")]
    address: Address,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
struct Address(String);

#[test]
fn table_follows_struct_definition() {
    let expected = vec![
        FieldDescriptor::new("port", FieldKind::Unsigned)
            .required()
            .env("PORT")
            .describe("Listen port."),
        FieldDescriptor::new("name", FieldKind::String).default_value("server"),
        FieldDescriptor::new("offset", FieldKind::Integer),
        FieldDescriptor::new("ratio", FieldKind::Float),
        FieldDescriptor::new("verbose", FieldKind::Bool),
        FieldDescriptor::new("timeout", FieldKind::Duration)
            .default_value("5s")
            .describe("request timeout"),
        FieldDescriptor::new("tags", FieldKind::list(FieldKind::String)),
        FieldDescriptor::new("weights", FieldKind::map(FieldKind::Float)),
        FieldDescriptor::new("nickname", FieldKind::String),
        FieldDescriptor::new("token", FieldKind::String).ignored(),
        FieldDescriptor::record(
            "store",
            vec![
                FieldDescriptor::new("maxConns", FieldKind::Unsigned).default_value("4"),
                FieldDescriptor::new("url", FieldKind::String),
            ],
        ),
    ];
    assert_eq!(ServerConfig::fields(), expected);
}

#[test]
fn derived_table_loads_every_source() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("config.yml");
    fs::write(
        &path,
        "name: fromfile\ntags: [a, b]\nstore:\n  url: db.local\n",
    )
    .expect("write");

    let environment: HashMap<String, String> = [
        ("PORT", "8080"),
        ("STORE_MAX_CONNS", "16"),
        ("WEIGHTS", "a:0.5"),
        ("TOKEN", "leak"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();

    let mut config = ServerConfig::default();
    Loader::new()
        .with_environment(environment)
        .read(&path, &mut config)
        .expect("load");

    assert_eq!(config.port, 8080);
    assert_eq!(config.name, "fromfile");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.tags, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(config.weights.get("a"), Some(&0.5));
    assert_eq!(config.token, "");
    assert_eq!(config.store.max_conns, 16);
    assert_eq!(config.store.address, Address("db.local".to_string()));
}

#[test]
fn derived_required_field_is_enforced() {
    let mut config = ServerConfig::default();
    let err = Loader::new()
        .with_environment(HashMap::new())
        .read("", &mut config)
        .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Env(EnvError::Missing { ref variable, ref field })
            if variable == "PORT" && field == "port"
    ));
}

#[derive(Debug, Default, Serialize, Deserialize, Settings)]
#[serde(default)]
struct Optional {
    limits: Option<Limits>,
    #[serde(rename = "type")]
    r#type: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Settings)]
#[serde(default)]
struct Limits {
    max: u8,
}

#[test]
fn optional_records_and_raw_names() {
    assert_eq!(
        Optional::fields(),
        vec![
            FieldDescriptor::record(
                "limits",
                vec![FieldDescriptor::new("max", FieldKind::Unsigned)],
            ),
            FieldDescriptor::new("type", FieldKind::String),
        ]
    );

    let environment: HashMap<String, String> = [("LIMITS_MAX", "3"), ("TYPE", "edge")]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    let mut config = Optional::default();
    Loader::new()
        .with_environment(environment)
        .read("", &mut config)
        .expect("load");

    assert_eq!(config.limits.map(|limits| limits.max), Some(3));
    assert_eq!(config.r#type, "edge");
}
