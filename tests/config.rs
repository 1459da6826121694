//! Tests for config loading, format inference, and hot-reload semantics.

use logwarden::config::ConfigManager;
use logwarden::{Error, Level, Mode};
use std::fs;
use tempfile::tempdir;

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let manager = ConfigManager::load_from(path.clone()).unwrap();
    assert!(path.exists());

    let config = manager.handle().current();
    assert_eq!(config.port, 9999);
    assert_eq!(config.level, "INFO");
    assert_eq!(config.default_log_path, "stdout");
    assert_eq!(config.mode, Mode::Standalone);
    assert_eq!(config.max_log_size, 20 * 1024 * 1024);
}

#[test]
fn json_uses_camel_case_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "port": 8080,
            "bindAddress": "127.0.0.1",
            "maxLogSize": 1024,
            "moduleLogSize": 512,
            "mode": "service",
            "level": "DEBUG",
            "notifiers": {
                "ops": {
                    "type": "http",
                    "enabled": true,
                    "webhookURL": "http://example.test/hook",
                    "logLevel": "ERROR",
                    "whitelist": ["api"]
                }
            }
        }"#,
    )
    .unwrap();

    let config = ConfigManager::load_from(path).unwrap().handle().current();
    assert_eq!(config.port, 8080);
    assert_eq!(config.bind_address, "127.0.0.1");
    assert_eq!(config.max_log_size, 1024);
    assert_eq!(config.module_log_size, 512);
    assert_eq!(config.mode, Mode::Service);
    assert_eq!(config.parse_level(), Level::Debug);

    let ops = &config.notifiers["ops"];
    assert_eq!(ops.kind, "http");
    assert_eq!(ops.webhook_url, "http://example.test/hook");
    assert_eq!(ops.log_level, "ERROR");
    assert_eq!(ops.whitelist, vec!["api"]);
}

#[test]
fn yaml_is_inferred_from_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "port: 7070\nlevel: WARN\n").unwrap();

    let config = ConfigManager::load_from(path).unwrap().handle().current();
    assert_eq!(config.port, 7070);
    assert_eq!(config.parse_level(), Level::Warn);
}

#[test]
fn toml_is_inferred_from_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "port = 6060\nlevel = \"ERROR\"\n").unwrap();

    let config = ConfigManager::load_from(path).unwrap().handle().current();
    assert_eq!(config.port, 6060);
    assert_eq!(config.parse_level(), Level::Error);
}

#[test]
fn ini_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.ini");
    fs::write(&path, "[server]\nport = 5050\n").unwrap();

    let err = ConfigManager::load_from(path).unwrap_err();
    assert!(matches!(err, Error::UnsupportedConfigFormat(ext) if ext == "ini"));
}

#[test]
fn unknown_mode_falls_back_to_standalone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "mode": "turbo" }"#).unwrap();

    let config = ConfigManager::load_from(path).unwrap().handle().current();
    assert_eq!(config.mode, Mode::Standalone);
}

#[test]
fn invalid_level_falls_back_to_info() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "level": "LOUD" }"#).unwrap();

    let config = ConfigManager::load_from(path).unwrap().handle().current();
    assert_eq!(config.parse_level(), Level::Info);
}

#[test]
fn reload_publishes_a_new_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "port": 1111 }"#).unwrap();

    let manager = ConfigManager::load_from(path.clone()).unwrap();
    let handle = manager.handle();
    assert_eq!(handle.current().port, 1111);

    fs::write(&path, r#"{ "port": 2222 }"#).unwrap();
    manager.reload().unwrap();
    assert_eq!(handle.current().port, 2222);
}

#[test]
fn failed_reload_keeps_the_previous_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "port": 1111 }"#).unwrap();

    let manager = ConfigManager::load_from(path.clone()).unwrap();
    fs::write(&path, "{ this is not json").unwrap();

    assert!(manager.reload().is_err());
    assert_eq!(manager.handle().current().port, 1111);
}

#[test]
fn snapshots_are_immutable_to_readers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "port": 1111 }"#).unwrap();

    let manager = ConfigManager::load_from(path.clone()).unwrap();
    let held = manager.handle().current();

    fs::write(&path, r#"{ "port": 2222 }"#).unwrap();
    manager.reload().unwrap();

    // The snapshot taken before the reload still reads the old value.
    assert_eq!(held.port, 1111);
    assert_eq!(manager.handle().current().port, 2222);
}
