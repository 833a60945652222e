//! Configuration loading tests

use orca_gate::config::{LogFormat, load_config, load_config_from_str};
use orca_gate::error::ConfigError;
use std::env;
use std::fs;
use tempfile::tempdir;

const FULL_CONFIG: &str = r#"
[registry]
path = "~/orca-gate/controls.toml"

[decoration]
enabled = true
metadata_key = "Ownership"
denied_status = 404

[routes]
path_prefix = "/api/endpoints/[0-9]+/docker"

[logging]
level = "debug"
format = "json"
"#;

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    assert_eq!(config.registry.path.as_deref(), Some("~/orca-gate/controls.toml"));
    assert!(config.decoration.enabled);
    assert_eq!(config.decoration.metadata_key, "Ownership");
    assert_eq!(config.decoration.denied_status, 404);
    assert_eq!(config.routes.path_prefix, "/api/endpoints/[0-9]+/docker");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_full_config_builds_decorator() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();
    let decorator = config.decorator().unwrap();

    assert!(decorator.options().decorate);
    assert_eq!(decorator.options().metadata_key, "Ownership");
    assert_eq!(decorator.routes().len(), 14);
}

#[test]
fn test_unknown_log_format() {
    let config_str = r#"
[logging]
format = "xml"
"#;
    assert!(matches!(
        load_config_from_str(config_str),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn test_denied_status_out_of_range() {
    let config_str = r#"
[decoration]
denied_status = 500
"#;
    assert!(matches!(
        load_config_from_str(config_str),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
#[serial_test::serial]
fn test_env_var_overrides_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("orca-gate.toml");
    fs::write(
        &config_path,
        r#"
[decoration]
enabled = false
metadata_key = "FromFile"
"#,
    )
    .unwrap();

    unsafe {
        env::set_var("ORCA_GATE__DECORATION__ENABLED", "true");
        env::set_var("ORCA_GATE__REGISTRY__PATH", "/tmp/controls.json");
    }

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();

    assert!(config.decoration.enabled);
    assert_eq!(config.decoration.metadata_key, "FromFile");
    assert_eq!(config.registry.path.as_deref(), Some("/tmp/controls.json"));

    // Cleanup
    unsafe {
        env::remove_var("ORCA_GATE__DECORATION__ENABLED");
        env::remove_var("ORCA_GATE__REGISTRY__PATH");
    }
}

#[test]
#[serial_test::serial]
fn test_file_values_without_env() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("orca-gate.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.decoration.denied_status, 404);
}
